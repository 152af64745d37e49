//! Student records: domain types and request-body coercion.

pub mod coerce;
pub mod types;

pub use coerce::{coerce_fields, coerce_patch};
pub use types::{
    BulkDeleteSummary, BulkUpdateSummary, FieldUpdate, InputError, Student, StudentFields,
    StudentPatch,
};
