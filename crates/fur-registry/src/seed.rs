//! Example catalog used to populate an empty store.

use std::{fs, path::Path};

use serde_json::Value;

use crate::{
    error::{ErrorContext, Result},
    package::Descriptor,
    validate::validate,
};

/// The bundled example packages, as a JSON array of descriptors.
pub const BUNDLED_SEED: &str = include_str!("../seed/default_packages.json");

/// Parses and validates a JSON array of descriptors.
pub fn parse_seed(content: &str) -> Result<Vec<Descriptor>> {
    let entries: Vec<Value> = serde_json::from_str(content)?;
    entries.iter().map(validate).collect()
}

/// The bundled example packages.
pub fn bundled() -> Result<Vec<Descriptor>> {
    parse_seed(BUNDLED_SEED)
}

/// Reads a seed file in the same format as the bundled one.
pub fn load_seed_file<P: AsRef<Path>>(path: P) -> Result<Vec<Descriptor>> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading seed file {}", path.display()))?;
    parse_seed(&content)
}
