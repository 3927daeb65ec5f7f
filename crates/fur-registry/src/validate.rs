//! Inbound descriptor validation.
//!
//! Checks run in a fixed order so the same payload always produces the same
//! error: payload shape, required fields, version format, field types and
//! finally whether the name can be stored at all.

use fur_utils::slug;
use serde_json::{Map, Value};

use crate::{
    error::{RegistryError, Result},
    package::Descriptor,
};

/// Fields every upload must carry, in reporting order.
pub const REQUIRED_FIELDS: [&str; 8] = [
    "name",
    "version",
    "authors",
    "homepage",
    "issue_tracker",
    "git",
    "installer",
    "dependencies",
];

/// Whether `value` is the empty value of its JSON type.
fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}

/// Required fields that are absent or empty, in [`REQUIRED_FIELDS`] order.
///
/// `dependencies` only has to be present: a package without dependencies
/// sends an empty list.
pub fn missing_fields(document: &Map<String, Value>) -> Vec<String> {
    REQUIRED_FIELDS
        .iter()
        .filter(|field| {
            match document.get(**field) {
                None => true,
                Some(value) if **field == "dependencies" => value.is_null(),
                Some(value) => is_empty_value(value),
            }
        })
        .map(|field| field.to_string())
        .collect()
}

/// Exactly three dot-separated segments of ASCII digits.
///
/// ```
/// use fur_registry::validate::is_valid_version;
///
/// assert!(is_valid_version("1.0.0"));
/// assert!(is_valid_version("01.002.3"));
/// assert!(!is_valid_version("1.0"));
/// assert!(!is_valid_version("1.0.0-beta"));
/// ```
pub fn is_valid_version(version: &str) -> bool {
    let parts: Vec<&str> = version.split('.').collect();
    parts.len() == 3
        && parts
            .iter()
            .all(|part| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit()))
}

/// Validates a raw JSON payload and turns it into a [`Descriptor`].
///
/// Optional fields that are missing or `null` take their empty defaults;
/// unknown fields are dropped.
pub fn validate(payload: &Value) -> Result<Descriptor> {
    let document = match payload {
        Value::Object(map) if !map.is_empty() => map,
        _ => return Err(RegistryError::EmptyPayload),
    };

    let missing = missing_fields(document);
    if !missing.is_empty() {
        return Err(RegistryError::MissingFields(missing));
    }

    let version = document.get("version").unwrap_or(&Value::Null);
    if !version.as_str().is_some_and(is_valid_version) {
        let shown = version
            .as_str()
            .map(str::to_string)
            .unwrap_or_else(|| version.to_string());
        return Err(RegistryError::InvalidVersion(shown));
    }

    let descriptor: Descriptor = serde_json::from_value(payload.clone())
        .map_err(|err| RegistryError::InvalidDescriptor(err.to_string()))?;

    if !slug::is_usable(&slug::sanitize(&descriptor.name)) {
        return Err(RegistryError::InvalidName(descriptor.name));
    }

    Ok(descriptor)
}
