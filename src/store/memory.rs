//! In-process student store.
//!
//! Mirrors the MongoDB backend's observable behavior (exact grade matching, inclusive age bound,
//! descending name sort with unnamed records last, matched/modified counts) without a server.
//! Records live only as long as the process.

use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use tokio::sync::RwLock;

use super::{
    StudentStore,
    types::{StoreError, parse_id},
};
use crate::students::{BulkDeleteSummary, BulkUpdateSummary, Student, StudentFields, StudentPatch};

/// Student store holding records in insertion order behind an async lock.
#[derive(Default)]
pub struct MemoryStudentStore {
    records: RwLock<Vec<Student>>,
}

impl MemoryStudentStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    async fn select(&self, predicate: impl Fn(&Student) -> bool) -> Vec<Student> {
        self.records
            .read()
            .await
            .iter()
            .filter(|student| predicate(student))
            .cloned()
            .collect()
    }
}

fn position(records: &[Student], id: ObjectId) -> Option<usize> {
    records.iter().position(|student| student.id == id)
}

#[async_trait]
impl StudentStore for MemoryStudentStore {
    async fn create(&self, fields: StudentFields) -> Result<Student, StoreError> {
        let student = Student::new(fields);
        self.records.write().await.push(student.clone());
        Ok(student)
    }

    async fn list(&self) -> Result<Vec<Student>, StoreError> {
        Ok(self.records.read().await.clone())
    }

    async fn get(&self, id: &str) -> Result<Option<Student>, StoreError> {
        let id = parse_id(id)?;
        let records = self.records.read().await;
        Ok(position(&records, id).map(|index| records[index].clone()))
    }

    async fn update(&self, id: &str, patch: StudentPatch) -> Result<Option<Student>, StoreError> {
        let id = parse_id(id)?;
        let mut records = self.records.write().await;
        let Some(index) = position(&records, id) else {
            return Ok(None);
        };
        let student = &mut records[index];
        patch.apply_to(student);
        Ok(Some(student.clone()))
    }

    async fn delete(&self, id: &str) -> Result<Option<Student>, StoreError> {
        let id = parse_id(id)?;
        let mut records = self.records.write().await;
        Ok(position(&records, id).map(|index| records.remove(index)))
    }

    async fn find_by_grade(&self, grade: &str) -> Result<Vec<Student>, StoreError> {
        Ok(self
            .select(|student| student.grade.as_deref() == Some(grade))
            .await)
    }

    async fn find_by_min_age(&self, min_age: f64) -> Result<Vec<Student>, StoreError> {
        Ok(self
            .select(|student| student.age.is_some_and(|age| age >= min_age))
            .await)
    }

    async fn list_sorted_by_name_desc(&self) -> Result<Vec<Student>, StoreError> {
        let mut students = self.records.read().await.clone();
        // `None < Some(_)`, so unnamed records land at the end.
        students.sort_by(|a, b| b.name.cmp(&a.name));
        Ok(students)
    }

    async fn set_all_grades(&self, grade: &str) -> Result<BulkUpdateSummary, StoreError> {
        let mut records = self.records.write().await;
        let mut modified_count = 0;
        for student in records.iter_mut() {
            if student.grade.as_deref() != Some(grade) {
                student.grade = Some(grade.to_string());
                modified_count += 1;
            }
        }
        Ok(BulkUpdateSummary {
            acknowledged: true,
            matched_count: records.len() as u64,
            modified_count,
        })
    }

    async fn delete_by_grade(&self, grade: &str) -> Result<BulkDeleteSummary, StoreError> {
        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|student| student.grade.as_deref() != Some(grade));
        Ok(BulkDeleteSummary {
            acknowledged: true,
            deleted_count: (before - records.len()) as u64,
        })
    }
}
