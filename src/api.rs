//! HTTP surface for the student directory.
//!
//! Every route is a direct pass-through to one [`StudentStore`] call:
//!
//! - `POST /students` – Create a record from `{ name?, age?, grade? }`; responds `201` with the
//!   stored record including its generated `_id`.
//! - `GET /students` – List every record.
//! - `GET /students/:id` – Fetch one record; `404` with an empty body when absent.
//! - `PATCH /students/:id` – Merge the supplied fields and return the post-update record.
//! - `DELETE /students/:id` – Remove a record and return its prior state.
//! - `GET /students/grade/:grade` – Records with exactly that grade (`/students/grade/A`).
//! - `GET /students/age/20plus` – Records aged 20 or older.
//! - `GET /students/sorted` – Every record ordered by name, descending.
//! - `PUT /students/updateall` – Set every record's grade to `B`; returns match/modify counts.
//! - `DELETE /students/deletefail` – Remove every record graded `F`; returns the delete count.
//!
//! Literal segments (`sorted`, `updateall`, `deletefail`, `grade/…`, `age/20plus`) always win
//! over the `:id` capture. Malformed bodies are `400`, storage failures `500`, both with an
//! `{"error": "..."}` body.

use crate::store::{StoreError, StudentStore};
use crate::students::{
    BulkDeleteSummary, BulkUpdateSummary, Student, coerce_fields, coerce_patch,
};
use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
};
use serde_json::{Value, json};
use std::fmt::Display;
use std::sync::Arc;

/// Minimum age served by `GET /students/age/20plus`.
pub const ADULT_AGE: f64 = 20.0;
/// Grade assigned to every record by `PUT /students/updateall`.
pub const BULK_ASSIGNED_GRADE: &str = "B";
/// Grade removed by `DELETE /students/deletefail`.
pub const FAILING_GRADE: &str = "F";

/// Build the HTTP router over the given store.
pub fn create_router<S>(store: Arc<S>) -> Router
where
    S: StudentStore + ?Sized + 'static,
{
    Router::new()
        .route(
            "/students",
            post(create_student::<S>).get(list_students::<S>),
        )
        .route("/students/sorted", get(list_sorted::<S>))
        .route("/students/updateall", put(update_all_grades::<S>))
        .route("/students/deletefail", delete(delete_failing::<S>))
        .route("/students/grade/:grade", get(list_by_grade::<S>))
        .route("/students/age/20plus", get(list_adults::<S>))
        .route(
            "/students/:id",
            get(get_student::<S>)
                .patch(update_student::<S>)
                .delete(delete_student::<S>),
        )
        .with_state(store)
}

async fn create_student<S>(
    State(store): State<Arc<S>>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<Student>), ApiError>
where
    S: StudentStore + ?Sized,
{
    let Json(body) = body.map_err(|rejection| ApiError::client("create", rejection.body_text()))?;
    let fields = coerce_fields(&body).map_err(|err| ApiError::client("create", err))?;
    let student = store
        .create(fields)
        .await
        .map_err(|err| ApiError::server("create", err))?;
    tracing::info!(id = %student.id, "Student created");
    Ok((StatusCode::CREATED, Json(student)))
}

async fn list_students<S>(State(store): State<Arc<S>>) -> Result<Json<Vec<Student>>, ApiError>
where
    S: StudentStore + ?Sized,
{
    let students = store
        .list()
        .await
        .map_err(|err| ApiError::server("list", err))?;
    tracing::debug!(count = students.len(), "Listed students");
    Ok(Json(students))
}

async fn get_student<S>(
    State(store): State<Arc<S>>,
    Path(id): Path<String>,
) -> Result<Response, ApiError>
where
    S: StudentStore + ?Sized,
{
    let student = store
        .get(&id)
        .await
        .map_err(|err| ApiError::server("get", err))?;
    Ok(found_or_not_found("get", &id, student))
}

async fn update_student<S>(
    State(store): State<Arc<S>>,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Response, ApiError>
where
    S: StudentStore + ?Sized,
{
    let Json(body) = body.map_err(|rejection| ApiError::client("update", rejection.body_text()))?;
    let patch = coerce_patch(&body).map_err(|err| ApiError::client("update", err))?;
    let student = store.update(&id, patch).await.map_err(|err| match err {
        StoreError::InvalidId(_) => ApiError::client("update", err),
        other => ApiError::server("update", other),
    })?;
    if student.is_some() {
        tracing::info!(id = %id, "Student updated");
    }
    Ok(found_or_not_found("update", &id, student))
}

async fn delete_student<S>(
    State(store): State<Arc<S>>,
    Path(id): Path<String>,
) -> Result<Response, ApiError>
where
    S: StudentStore + ?Sized,
{
    let student = store
        .delete(&id)
        .await
        .map_err(|err| ApiError::server("delete", err))?;
    if student.is_some() {
        tracing::info!(id = %id, "Student deleted");
    }
    Ok(found_or_not_found("delete", &id, student))
}

async fn list_by_grade<S>(
    State(store): State<Arc<S>>,
    Path(grade): Path<String>,
) -> Result<Json<Vec<Student>>, ApiError>
where
    S: StudentStore + ?Sized,
{
    let students = store
        .find_by_grade(&grade)
        .await
        .map_err(|err| ApiError::server("filter_grade", err))?;
    tracing::debug!(grade = %grade, count = students.len(), "Filtered students by grade");
    Ok(Json(students))
}

async fn list_adults<S>(State(store): State<Arc<S>>) -> Result<Json<Vec<Student>>, ApiError>
where
    S: StudentStore + ?Sized,
{
    let students = store
        .find_by_min_age(ADULT_AGE)
        .await
        .map_err(|err| ApiError::server("filter_age", err))?;
    tracing::debug!(min_age = ADULT_AGE, count = students.len(), "Filtered students by age");
    Ok(Json(students))
}

async fn list_sorted<S>(State(store): State<Arc<S>>) -> Result<Json<Vec<Student>>, ApiError>
where
    S: StudentStore + ?Sized,
{
    let students = store
        .list_sorted_by_name_desc()
        .await
        .map_err(|err| ApiError::server("sorted", err))?;
    Ok(Json(students))
}

async fn update_all_grades<S>(
    State(store): State<Arc<S>>,
) -> Result<Json<BulkUpdateSummary>, ApiError>
where
    S: StudentStore + ?Sized,
{
    let summary = store
        .set_all_grades(BULK_ASSIGNED_GRADE)
        .await
        .map_err(|err| ApiError::server("update_all", err))?;
    tracing::info!(
        grade = BULK_ASSIGNED_GRADE,
        matched = summary.matched_count,
        modified = summary.modified_count,
        "Bulk grade update completed"
    );
    Ok(Json(summary))
}

async fn delete_failing<S>(
    State(store): State<Arc<S>>,
) -> Result<Json<BulkDeleteSummary>, ApiError>
where
    S: StudentStore + ?Sized,
{
    let summary = store
        .delete_by_grade(FAILING_GRADE)
        .await
        .map_err(|err| ApiError::server("delete_failing", err))?;
    tracing::info!(
        grade = FAILING_GRADE,
        deleted = summary.deleted_count,
        "Bulk delete completed"
    );
    Ok(Json(summary))
}

fn found_or_not_found(operation: &'static str, id: &str, student: Option<Student>) -> Response {
    match student {
        Some(student) => Json(student).into_response(),
        None => {
            tracing::debug!(operation, id, "Student not found");
            StatusCode::NOT_FOUND.into_response()
        }
    }
}

#[derive(Debug)]
enum ApiError {
    BadRequest(String),
    Internal(String),
}

impl ApiError {
    fn client(operation: &'static str, err: impl Display) -> Self {
        let message = err.to_string();
        tracing::debug!(operation, error = %message, "Rejected request");
        Self::BadRequest(message)
    }

    fn server(operation: &'static str, err: StoreError) -> Self {
        tracing::error!(operation, error = %err, "Storage request failed");
        Self::Internal(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            Self::Internal(message) => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::create_router;
    use crate::store::{StoreError, StudentStore};
    use crate::students::{
        BulkDeleteSummary, BulkUpdateSummary, Student, StudentFields, StudentPatch,
    };
    use async_trait::async_trait;
    use axum::{
        body::{Body, to_bytes},
        http::{Method, Request, StatusCode},
        response::Response,
    };
    use std::sync::Arc;
    use tokio::sync::Mutex;
    use tower::ServiceExt;

    /// Records which store operation each request reached; every call fails.
    #[derive(Default)]
    struct UnavailableStore {
        calls: Mutex<Vec<String>>,
    }

    impl UnavailableStore {
        async fn record(&self, call: impl Into<String>) -> StoreError {
            self.calls.lock().await.push(call.into());
            StoreError::MissingConnectionString
        }

        async fn recorded_calls(&self) -> Vec<String> {
            self.calls.lock().await.clone()
        }
    }

    #[async_trait]
    impl StudentStore for UnavailableStore {
        async fn create(&self, _fields: StudentFields) -> Result<Student, StoreError> {
            Err(self.record("create").await)
        }

        async fn list(&self) -> Result<Vec<Student>, StoreError> {
            Err(self.record("list").await)
        }

        async fn get(&self, id: &str) -> Result<Option<Student>, StoreError> {
            Err(self.record(format!("get:{id}")).await)
        }

        async fn update(
            &self,
            id: &str,
            _patch: StudentPatch,
        ) -> Result<Option<Student>, StoreError> {
            Err(self.record(format!("update:{id}")).await)
        }

        async fn delete(&self, id: &str) -> Result<Option<Student>, StoreError> {
            Err(self.record(format!("delete:{id}")).await)
        }

        async fn find_by_grade(&self, grade: &str) -> Result<Vec<Student>, StoreError> {
            Err(self.record(format!("grade:{grade}")).await)
        }

        async fn find_by_min_age(&self, min_age: f64) -> Result<Vec<Student>, StoreError> {
            Err(self.record(format!("age:{min_age}")).await)
        }

        async fn list_sorted_by_name_desc(&self) -> Result<Vec<Student>, StoreError> {
            Err(self.record("sorted").await)
        }

        async fn set_all_grades(&self, grade: &str) -> Result<BulkUpdateSummary, StoreError> {
            Err(self.record(format!("update_all:{grade}")).await)
        }

        async fn delete_by_grade(&self, grade: &str) -> Result<BulkDeleteSummary, StoreError> {
            Err(self.record(format!("delete_grade:{grade}")).await)
        }
    }

    async fn send(
        store: Arc<UnavailableStore>,
        method: Method,
        uri: &str,
        body: Option<&str>,
    ) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);
        if body.is_some() {
            builder = builder.header("content-type", "application/json");
        }
        let request = builder
            .body(body.map_or_else(Body::empty, |text| Body::from(text.to_string())))
            .expect("request");
        create_router(store)
            .oneshot(request)
            .await
            .expect("router response")
    }

    async fn error_message(response: Response) -> String {
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        let json: serde_json::Value = serde_json::from_slice(&body).expect("json body");
        json["error"].as_str().expect("error string").to_string()
    }

    #[tokio::test]
    async fn literal_routes_dispatch_to_their_operations() {
        let store = Arc::new(UnavailableStore::default());
        for (method, uri) in [
            (Method::GET, "/students/sorted"),
            (Method::GET, "/students/grade/A"),
            (Method::GET, "/students/age/20plus"),
            (Method::PUT, "/students/updateall"),
            (Method::DELETE, "/students/deletefail"),
            (Method::GET, "/students/65f1c0ffee0000000000abcd"),
        ] {
            let response = send(store.clone(), method, uri, None).await;
            assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        }

        assert_eq!(
            store.recorded_calls().await,
            vec![
                "sorted",
                "grade:A",
                "age:20",
                "update_all:B",
                "delete_grade:F",
                "get:65f1c0ffee0000000000abcd",
            ]
        );
    }

    #[tokio::test]
    async fn storage_failure_is_reported_as_server_error() {
        let store = Arc::new(UnavailableStore::default());
        let response = send(store, Method::GET, "/students", None).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let message = error_message(response).await;
        assert!(message.contains("not configured"));
    }

    #[tokio::test]
    async fn malformed_create_body_never_reaches_store() {
        let store = Arc::new(UnavailableStore::default());

        let response = send(store.clone(), Method::POST, "/students", Some("{not json")).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = send(
            store.clone(),
            Method::POST,
            "/students",
            Some(r#"{"age":"old"}"#),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(error_message(response).await.contains("age"));

        let response = send(store.clone(), Method::POST, "/students", None).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        assert!(store.recorded_calls().await.is_empty());
    }

    #[tokio::test]
    async fn malformed_patch_body_is_client_error() {
        let store = Arc::new(UnavailableStore::default());
        let response = send(
            store.clone(),
            Method::PATCH,
            "/students/65f1c0ffee0000000000abcd",
            Some(r#"["grade"]"#),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(store.recorded_calls().await.is_empty());
    }
}
