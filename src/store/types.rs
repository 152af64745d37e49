//! Shared types used by the store backends.

use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::students::{Student, StudentFields};

/// Errors returned while interacting with the storage layer.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Identifier supplied by the caller is not a valid ObjectId.
    #[error("Cast to ObjectId failed for value \"{0}\" at path \"_id\"")]
    InvalidId(String),
    /// The MongoDB backend was selected without a connection string.
    #[error("MongoDB connection string is not configured")]
    MissingConnectionString,
    /// Driver-level failure: connectivity, query rejection, or decoding.
    #[error("MongoDB request failed: {0}")]
    Mongo(#[from] mongodb::error::Error),
}

/// Parse a caller-supplied identifier.
pub fn parse_id(raw: &str) -> Result<ObjectId, StoreError> {
    ObjectId::parse_str(raw).map_err(|_| StoreError::InvalidId(raw.to_string()))
}

/// Persisted document shape: `{ _id, name?, age?, grade? }`.
///
/// Unknown keys written by other clients (such as a `__v` version key) are ignored on read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct StudentDocument {
    #[serde(rename = "_id")]
    pub(crate) id: ObjectId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) age: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) grade: Option<String>,
}

impl StudentDocument {
    pub(crate) fn new(fields: StudentFields) -> Self {
        let StudentFields { name, age, grade } = fields;
        Self {
            id: ObjectId::new(),
            name,
            age,
            grade,
        }
    }
}

impl From<StudentDocument> for Student {
    fn from(document: StudentDocument) -> Self {
        let StudentDocument {
            id,
            name,
            age,
            grade,
        } = document;
        Student::with_id(id, StudentFields { name, age, grade })
    }
}
