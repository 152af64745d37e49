//! Persistence for student records.
//!
//! [`StudentStore`] is the seam between the HTTP surface and storage. Every method maps to a
//! single storage call; "not found" comes back as `Ok(None)`, never as an error.

pub mod filters;
pub mod memory;
pub mod mongo;
pub mod types;

pub use memory::MemoryStudentStore;
pub use mongo::MongoStudentStore;
pub use types::{StoreError, parse_id};

use crate::config::{Config, StorageBackend};
use crate::students::{BulkDeleteSummary, BulkUpdateSummary, Student, StudentFields, StudentPatch};
use async_trait::async_trait;
use std::sync::Arc;

/// Operations over the student collection used by the HTTP surface.
#[async_trait]
pub trait StudentStore: Send + Sync {
    /// Insert a new record and return it with its generated identifier.
    async fn create(&self, fields: StudentFields) -> Result<Student, StoreError>;

    /// Return every record.
    async fn list(&self) -> Result<Vec<Student>, StoreError>;

    /// Look up a record by identifier.
    async fn get(&self, id: &str) -> Result<Option<Student>, StoreError>;

    /// Merge `patch` into the record and return its post-update state.
    async fn update(&self, id: &str, patch: StudentPatch) -> Result<Option<Student>, StoreError>;

    /// Remove a record and return its prior state.
    async fn delete(&self, id: &str) -> Result<Option<Student>, StoreError>;

    /// Records whose grade equals `grade` exactly.
    async fn find_by_grade(&self, grade: &str) -> Result<Vec<Student>, StoreError>;

    /// Records whose age is at least `min_age`.
    async fn find_by_min_age(&self, min_age: f64) -> Result<Vec<Student>, StoreError>;

    /// Every record ordered by name, descending.
    async fn list_sorted_by_name_desc(&self) -> Result<Vec<Student>, StoreError>;

    /// Set every record's grade to `grade`.
    async fn set_all_grades(&self, grade: &str) -> Result<BulkUpdateSummary, StoreError>;

    /// Remove every record whose grade equals `grade`.
    async fn delete_by_grade(&self, grade: &str) -> Result<BulkDeleteSummary, StoreError>;
}

/// Build the store selected by configuration.
pub async fn connect(config: &Config) -> Result<Arc<dyn StudentStore>, StoreError> {
    match config.storage_backend {
        StorageBackend::Mongo => {
            let uri = config
                .mongo_uri
                .as_deref()
                .ok_or(StoreError::MissingConnectionString)?;
            let store = MongoStudentStore::connect(
                uri,
                config.mongo_database.as_deref(),
                &config.student_collection,
            )
            .await?;
            Ok(Arc::new(store))
        }
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory student store; records are lost on exit");
            Ok(Arc::new(MemoryStudentStore::new()))
        }
    }
}
