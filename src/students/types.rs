//! Core data types for student records and the errors raised while reading request bodies.

use mongodb::bson::oid::ObjectId;
use serde::{Serialize, Serializer};
use thiserror::Error;

/// Errors produced while coercing an untyped request body into student fields.
#[derive(Debug, Error, PartialEq)]
pub enum InputError {
    /// The body parsed as JSON but was not an object.
    #[error("Request body must be a JSON object")]
    NotAnObject,
    /// A recognized field carried a value that cannot be cast to its semantic type.
    #[error("Cast to {expected} failed for value {value} at path \"{field}\"")]
    Cast {
        /// Field name as it appears in the request body.
        field: &'static str,
        /// Semantic type the field is stored as.
        expected: &'static str,
        /// Offending value rendered as JSON.
        value: String,
    },
}

/// A stored student record as returned to callers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Student {
    /// Identifier assigned by the storage layer at creation.
    #[serde(rename = "_id", serialize_with = "serialize_object_id")]
    pub id: ObjectId,
    /// Display name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Age in years.
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_age"
    )]
    pub age: Option<f64>,
    /// Letter grade.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grade: Option<String>,
}

impl Student {
    /// Build a freshly identified record from the supplied fields.
    pub fn new(fields: StudentFields) -> Self {
        Self::with_id(ObjectId::new(), fields)
    }

    /// Build a record with an explicit identifier.
    pub fn with_id(id: ObjectId, fields: StudentFields) -> Self {
        let StudentFields { name, age, grade } = fields;
        Self {
            id,
            name,
            age,
            grade,
        }
    }
}

/// Field values accepted when creating a record. Absent fields are not stored.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StudentFields {
    /// Optional display name.
    pub name: Option<String>,
    /// Optional age.
    pub age: Option<f64>,
    /// Optional grade.
    pub grade: Option<String>,
}

/// Change applied to a single field by a partial update.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum FieldUpdate<T> {
    /// Field was not mentioned; keep the stored value.
    #[default]
    Keep,
    /// Field was explicitly `null`; remove the stored value.
    Clear,
    /// Replace the stored value.
    Set(T),
}

impl<T> FieldUpdate<T> {
    /// Whether the update leaves the field untouched.
    pub fn is_keep(&self) -> bool {
        matches!(self, Self::Keep)
    }

    fn apply(self, slot: &mut Option<T>) {
        match self {
            Self::Keep => {}
            Self::Clear => *slot = None,
            Self::Set(value) => *slot = Some(value),
        }
    }
}

/// Partial field set merged into an existing record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StudentPatch {
    /// Change to `name`.
    pub name: FieldUpdate<String>,
    /// Change to `age`.
    pub age: FieldUpdate<f64>,
    /// Change to `grade`.
    pub grade: FieldUpdate<String>,
}

impl StudentPatch {
    /// True when no field would change.
    pub fn is_empty(&self) -> bool {
        self.name.is_keep() && self.age.is_keep() && self.grade.is_keep()
    }

    /// Merge the patch into `student` in place.
    pub fn apply_to(self, student: &mut Student) {
        let Self { name, age, grade } = self;
        name.apply(&mut student.name);
        age.apply(&mut student.age);
        grade.apply(&mut student.grade);
    }
}

/// Counts reported by a bulk grade update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkUpdateSummary {
    /// Whether the storage layer acknowledged the write.
    pub acknowledged: bool,
    /// Records matched by the update filter.
    pub matched_count: u64,
    /// Records whose stored value actually changed.
    pub modified_count: u64,
}

/// Counts reported by a bulk delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkDeleteSummary {
    /// Whether the storage layer acknowledged the write.
    pub acknowledged: bool,
    /// Records removed.
    pub deleted_count: u64,
}

fn serialize_object_id<S>(id: &ObjectId, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&id.to_hex())
}

// Integral ages go out as JSON integers so `22` round-trips as `22`, not `22.0`.
fn serialize_age<S>(age: &Option<f64>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    const MAX_EXACT: f64 = 9_007_199_254_740_992.0;
    match *age {
        Some(value) if value.fract() == 0.0 && value.abs() <= MAX_EXACT => {
            serializer.serialize_i64(value as i64)
        }
        Some(value) => serializer.serialize_f64(value),
        None => serializer.serialize_none(),
    }
}
