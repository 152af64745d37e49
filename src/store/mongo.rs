//! MongoDB-backed student store.

use async_trait::async_trait;
use futures_util::TryStreamExt;
use mongodb::{
    Client, Collection, Cursor,
    bson::doc,
    options::{Acknowledgment, ReturnDocument, WriteConcern},
};

use super::{
    StudentStore, filters,
    types::{StoreError, StudentDocument, parse_id},
};
use crate::students::{BulkDeleteSummary, BulkUpdateSummary, Student, StudentFields, StudentPatch};

const FALLBACK_DATABASE: &str = "test";

/// Student store backed by a single long-lived MongoDB client.
///
/// The driver maintains its own connection pool; construct the store once at process start and
/// share it through an `Arc`.
pub struct MongoStudentStore {
    collection: Collection<StudentDocument>,
}

impl MongoStudentStore {
    /// Create a client for `uri` and bind it to `<database>.<collection_name>`.
    ///
    /// The database defaults to the one named in the connection string, then to `test`. A ping
    /// is issued so that connection problems show up in the logs early; a failed ping is logged
    /// but not fatal, since the driver reconnects on demand.
    pub async fn connect(
        uri: &str,
        database: Option<&str>,
        collection_name: &str,
    ) -> Result<Self, StoreError> {
        let client = Client::with_uri_str(uri).await?;
        let database = match database {
            Some(name) => client.database(name),
            None => client
                .default_database()
                .unwrap_or_else(|| client.database(FALLBACK_DATABASE)),
        };
        tracing::debug!(
            database = database.name(),
            collection = collection_name,
            "Initialized MongoDB client"
        );

        match database.run_command(doc! { "ping": 1 }).await {
            Ok(_) => tracing::info!(database = database.name(), "Connected to MongoDB"),
            Err(err) => tracing::error!(error = %err, "Could not connect to MongoDB"),
        }

        Ok(Self {
            collection: database.collection(collection_name),
        })
    }

    async fn collect(cursor: Cursor<StudentDocument>) -> Result<Vec<Student>, StoreError> {
        let documents: Vec<StudentDocument> = cursor.try_collect().await?;
        Ok(documents.into_iter().map(Student::from).collect())
    }

    fn acknowledged(&self) -> bool {
        is_acknowledged(self.collection.write_concern())
    }
}

/// Writes are acknowledged unless the effective write concern is `w: 0`.
fn is_acknowledged(write_concern: Option<&WriteConcern>) -> bool {
    !matches!(
        write_concern.and_then(|concern| concern.w.as_ref()),
        Some(Acknowledgment::Nodes(0))
    )
}

#[async_trait]
impl StudentStore for MongoStudentStore {
    async fn create(&self, fields: StudentFields) -> Result<Student, StoreError> {
        let document = StudentDocument::new(fields);
        self.collection.insert_one(&document).await?;
        Ok(document.into())
    }

    async fn list(&self) -> Result<Vec<Student>, StoreError> {
        let cursor = self.collection.find(filters::all()).await?;
        Self::collect(cursor).await
    }

    async fn get(&self, id: &str) -> Result<Option<Student>, StoreError> {
        let id = parse_id(id)?;
        let document = self.collection.find_one(filters::by_id(id)).await?;
        Ok(document.map(Student::from))
    }

    async fn update(&self, id: &str, patch: StudentPatch) -> Result<Option<Student>, StoreError> {
        let id = parse_id(id)?;
        let Some(update) = filters::patch_update(&patch) else {
            let document = self.collection.find_one(filters::by_id(id)).await?;
            return Ok(document.map(Student::from));
        };
        let document = self
            .collection
            .find_one_and_update(filters::by_id(id), update)
            .return_document(ReturnDocument::After)
            .await?;
        Ok(document.map(Student::from))
    }

    async fn delete(&self, id: &str) -> Result<Option<Student>, StoreError> {
        let id = parse_id(id)?;
        let document = self
            .collection
            .find_one_and_delete(filters::by_id(id))
            .await?;
        Ok(document.map(Student::from))
    }

    async fn find_by_grade(&self, grade: &str) -> Result<Vec<Student>, StoreError> {
        let cursor = self.collection.find(filters::grade_equals(grade)).await?;
        Self::collect(cursor).await
    }

    async fn find_by_min_age(&self, min_age: f64) -> Result<Vec<Student>, StoreError> {
        let cursor = self.collection.find(filters::age_at_least(min_age)).await?;
        Self::collect(cursor).await
    }

    async fn list_sorted_by_name_desc(&self) -> Result<Vec<Student>, StoreError> {
        let cursor = self
            .collection
            .find(filters::all())
            .sort(filters::name_descending())
            .await?;
        Self::collect(cursor).await
    }

    async fn set_all_grades(&self, grade: &str) -> Result<BulkUpdateSummary, StoreError> {
        let result = self
            .collection
            .update_many(filters::all(), filters::set_grade(grade))
            .await?;
        Ok(BulkUpdateSummary {
            acknowledged: self.acknowledged(),
            matched_count: result.matched_count,
            modified_count: result.modified_count,
        })
    }

    async fn delete_by_grade(&self, grade: &str) -> Result<BulkDeleteSummary, StoreError> {
        let result = self
            .collection
            .delete_many(filters::grade_equals(grade))
            .await?;
        Ok(BulkDeleteSummary {
            acknowledged: self.acknowledged(),
            deleted_count: result.deleted_count,
        })
    }
}
