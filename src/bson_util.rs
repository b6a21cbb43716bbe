use crate::{
    bson::{oid::ObjectId, Bson, Document},
    error::{Error, Result},
};

/// Coerce numeric types into an `i64` if it would be lossless to do so. If this Bson is not numeric
/// or the conversion would be lossy (e.g. 1.5 -> 1), this returns `None`.
pub(crate) fn get_int(val: &Bson) -> Option<i64> {
    match *val {
        Bson::Int32(i) => Some(i64::from(i)),
        Bson::Int64(i) => Some(i),
        Bson::Double(f) if (f - (f as i64 as f64)).abs() <= f64::EPSILON => Some(f as i64),
        _ => None,
    }
}

/// Returns the first top-level key of `query` that is an update modifier (i.e. starts with `$`).
pub(crate) fn find_update_modifier(query: &Document) -> Option<&str> {
    query
        .keys()
        .map(String::as_str)
        .find(|key| key.starts_with('$'))
}

/// Whether `query` selects a single document by `ObjectId`, i.e. it consists of exactly one field
/// named `_id` whose value is an `ObjectId`.
pub(crate) fn is_object_id_query(query: &Document) -> bool {
    query.len() == 1 && matches!(query.get("_id"), Some(Bson::ObjectId(_)))
}

/// Ensures `document` has an `_id` field, generating an `ObjectId` and inserting it as the first
/// field if it does not. Returns the document's `_id`.
pub(crate) fn ensure_id(document: &mut Document) -> Bson {
    if let Some(id) = document.get("_id") {
        return id.clone();
    }

    let id = Bson::ObjectId(ObjectId::new());
    let rest = std::mem::take(document);
    document.insert("_id", id.clone());
    document.extend(rest);
    id
}

/// Field names of a database reference, the only `$`-prefixed names a stored document may use.
const DBREF_KEYS: [&str; 3] = ["$ref", "$id", "$db"];

/// Checks that no field name in `document` (at any depth) starts with `$` or contains `.`. The
/// server refuses to store such names, except for the fields of a database reference.
pub(crate) fn validate_element_names(document: &Document) -> Result<()> {
    for (key, value) in document {
        if key.starts_with('$') && !DBREF_KEYS.contains(&key.as_str()) {
            return Err(Error::invalid_argument(format!(
                "field name {:?} must not start with '$'",
                key
            )));
        }
        if key.contains('.') {
            return Err(Error::invalid_argument(format!(
                "field name {:?} must not contain '.'",
                key
            )));
        }
        validate_value_names(value)?;
    }
    Ok(())
}

fn validate_value_names(value: &Bson) -> Result<()> {
    match value {
        Bson::Document(document) => validate_element_names(document),
        Bson::Array(values) => values.iter().try_for_each(validate_value_names),
        _ => Ok(()),
    }
}
