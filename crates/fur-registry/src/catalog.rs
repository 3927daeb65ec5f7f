use std::collections::HashMap;

use fur_utils::slug;

use crate::{
    error::{RegistryError, Result},
    package::PackageRecord,
};

/// In-memory catalog of every known package, in insertion order.
///
/// Names can be reserved while their descriptor is being written. A reserved
/// name is not listed but blocks other packages from taking the name or its
/// slug.
#[derive(Debug, Default)]
pub struct CatalogIndex {
    records: Vec<PackageRecord>,
    by_name: HashMap<String, usize>,
    by_slug: HashMap<String, String>,
    reserved: HashMap<String, String>,
}

impl CatalogIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn all(&self) -> &[PackageRecord] {
        &self.records
    }

    pub fn by_name(&self, name: &str) -> Option<&PackageRecord> {
        self.by_name.get(name).map(|&idx| &self.records[idx])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Name of the package already stored under `slug`, if any.
    pub fn slug_owner(&self, slug: &str) -> Option<&str> {
        self.by_slug.get(slug).map(String::as_str)
    }

    /// Checks that a package called `name` could be added.
    ///
    /// Reserved names count as taken.
    pub fn check_insertable(&self, name: &str) -> Result<()> {
        let slug = slug::sanitize(name);
        let reserved_by = self.reserved.get(&slug).map(String::as_str);

        if self.contains(name) || reserved_by == Some(name) {
            return Err(RegistryError::AlreadyExists(name.to_string()));
        }

        if let Some(existing) = self.slug_owner(&slug).or(reserved_by) {
            return Err(RegistryError::SlugCollision {
                name: name.to_string(),
                existing: existing.to_string(),
            });
        }

        Ok(())
    }

    /// Holds `name` and its slug until [`add`](Self::add) or
    /// [`release`](Self::release) is called for it.
    pub fn reserve(&mut self, name: &str) -> Result<()> {
        self.check_insertable(name)?;
        self.reserved.insert(slug::sanitize(name), name.to_string());
        Ok(())
    }

    /// Drops the reservation held for `name`, if any.
    pub fn release(&mut self, name: &str) {
        let slug = slug::sanitize(name);
        if self.reserved.get(&slug).is_some_and(|owner| owner == name) {
            self.reserved.remove(&slug);
        }
    }

    /// Appends `record`, failing if its name or slug is taken.
    ///
    /// A reservation held for the record's own name is consumed.
    pub fn add(&mut self, record: PackageRecord) -> Result<()> {
        self.release(record.name());
        self.check_insertable(record.name())?;

        let name = record.name().to_string();
        self.by_slug.insert(slug::sanitize(&name), name.clone());
        self.by_name.insert(name, self.records.len());
        self.records.push(record);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
