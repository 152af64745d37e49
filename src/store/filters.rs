//! Query, sort, and update documents issued against the student collection.

use mongodb::bson::{Bson, Document, doc, oid::ObjectId};

use crate::students::{FieldUpdate, StudentPatch};

/// Match a single record by identifier.
pub fn by_id(id: ObjectId) -> Document {
    doc! { "_id": id }
}

/// Match every record.
pub fn all() -> Document {
    Document::new()
}

/// Exact, case-sensitive match on `grade`.
pub fn grade_equals(grade: &str) -> Document {
    doc! { "grade": grade }
}

/// Records whose `age` is at least `min_age`. Records without an age never match.
pub fn age_at_least(min_age: f64) -> Document {
    doc! { "age": { "$gte": min_age } }
}

/// Sort specification ordering records by `name`, descending.
pub fn name_descending() -> Document {
    doc! { "name": -1 }
}

/// Unconditional `$set` of `grade`.
pub fn set_grade(grade: &str) -> Document {
    doc! { "$set": { "grade": grade } }
}

/// Translate a patch into `$set`/`$unset` operators.
///
/// Returns `None` when the patch changes nothing, since an update document must carry at least
/// one operator.
pub fn patch_update(patch: &StudentPatch) -> Option<Document> {
    let mut set = Document::new();
    let mut unset = Document::new();

    accumulate(&mut set, &mut unset, "name", &patch.name, |v| Bson::String(v.clone()));
    accumulate(&mut set, &mut unset, "age", &patch.age, |v| Bson::Double(*v));
    accumulate(&mut set, &mut unset, "grade", &patch.grade, |v| Bson::String(v.clone()));

    let mut update = Document::new();
    if !set.is_empty() {
        update.insert("$set", set);
    }
    if !unset.is_empty() {
        update.insert("$unset", unset);
    }

    if update.is_empty() { None } else { Some(update) }
}

fn accumulate<T>(
    set: &mut Document,
    unset: &mut Document,
    key: &str,
    update: &FieldUpdate<T>,
    to_bson: impl Fn(&T) -> Bson,
) {
    match update {
        FieldUpdate::Keep => {}
        FieldUpdate::Clear => {
            unset.insert(key, "");
        }
        FieldUpdate::Set(value) => {
            set.insert(key, to_bson(value));
        }
    }
}
