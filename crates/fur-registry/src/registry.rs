use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use tracing::{error, info, warn};

use crate::{
    catalog::CatalogIndex,
    error::{RegistryError, Result},
    package::{Descriptor, PackageRecord},
    query::{self, Page, SortKey},
    stats::{self, Statistics},
    store::DescriptorStore,
    validate::validate,
};

/// Parameters of a catalog listing.
#[derive(Debug, Clone, Default)]
pub struct ListQuery {
    pub search: Option<String>,
    pub sort: SortKey,
    pub page: Option<Page>,
}

/// Outcome of a catalog listing.
#[derive(Debug, Clone)]
pub struct ListResult {
    /// Number of records matching the search, before pagination.
    pub total: usize,
    pub records: Vec<PackageRecord>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Health {
    pub status: &'static str,
    pub timestamp: DateTime<Utc>,
    pub total_packages: usize,
}

/// The package registry: a descriptor store plus its in-memory catalog.
///
/// Reads share the catalog lock. An upload reserves its name under the write
/// lock, writes the descriptor with no lock held and takes the write lock
/// again only to index the record, so a package is on disk before it becomes
/// visible and slow writes never block readers.
pub struct Registry {
    store: Arc<dyn DescriptorStore>,
    catalog: RwLock<CatalogIndex>,
}

impl Registry {
    /// Loads every stored descriptor into a new registry.
    ///
    /// When the store holds nothing and `seed` is given, each seed descriptor
    /// is persisted and indexed. Seeds that cannot be stored are logged and
    /// left out.
    pub fn open(store: Arc<dyn DescriptorStore>, seed: Option<Vec<Descriptor>>) -> Result<Self> {
        let now = Utc::now();
        let mut catalog = CatalogIndex::new();

        let loaded = store.load_all()?;
        let seeding = loaded.is_empty();

        if seeding {
            for descriptor in seed.unwrap_or_default() {
                if let Err(err) = catalog.check_insertable(&descriptor.name) {
                    warn!(name = %descriptor.name, "skipping seed package: {err}");
                    continue;
                }
                if let Err(err) = store.put(&descriptor) {
                    error!(name = %descriptor.name, "failed to persist seed package: {err}");
                    continue;
                }
                catalog.add(PackageRecord::bootstrapped(descriptor, now))?;
            }
            if !catalog.is_empty() {
                info!(count = catalog.len(), "seeded empty registry");
            }
        } else {
            for descriptor in loaded {
                let name = descriptor.name.clone();
                if let Err(err) = catalog.add(PackageRecord::bootstrapped(descriptor, now)) {
                    warn!(name = %name, "skipping stored package: {err}");
                }
            }
            info!(count = catalog.len(), "loaded packages");
        }

        Ok(Self {
            store,
            catalog: RwLock::new(catalog),
        })
    }

    fn read_catalog(&self) -> RwLockReadGuard<'_, CatalogIndex> {
        self.catalog
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write_catalog(&self) -> RwLockWriteGuard<'_, CatalogIndex> {
        self.catalog
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Looks up `name`, optionally requiring an exact `version`.
    pub fn get(&self, name: &str, version: Option<&str>) -> Result<Descriptor> {
        let catalog = self.read_catalog();
        let record = catalog.by_name(name).ok_or_else(|| {
            RegistryError::NotFound {
                name: name.to_string(),
            }
        })?;

        match version {
            Some(version) if version != record.version() => {
                Err(RegistryError::VersionNotFound {
                    name: name.to_string(),
                    version: version.to_string(),
                })
            }
            _ => Ok(record.descriptor.clone()),
        }
    }

    /// Searches, sorts and optionally paginates the catalog.
    pub fn list(&self, list_query: &ListQuery) -> ListResult {
        let catalog = self.read_catalog();
        let matched = query::query(catalog.all(), list_query.search.as_deref(), list_query.sort);

        let page = match list_query.page {
            Some(page) => page.slice(&matched),
            None => &matched[..],
        };

        ListResult {
            total: matched.len(),
            records: page.iter().map(|&record| record.clone()).collect(),
        }
    }

    /// Validates, persists and indexes a new package.
    ///
    /// Returns the stored descriptor. On any error neither the store nor the
    /// catalog has changed.
    pub fn upload(&self, payload: &Value) -> Result<Descriptor> {
        let descriptor = validate(payload)?;

        self.write_catalog().reserve(&descriptor.name)?;
        if let Err(err) = self.store.put(&descriptor) {
            self.write_catalog().release(&descriptor.name);
            return Err(err);
        }
        self.write_catalog()
            .add(PackageRecord::uploaded_at(descriptor.clone(), Utc::now()))?;

        info!(name = %descriptor.name, version = %descriptor.version, "package uploaded");
        Ok(descriptor)
    }

    pub fn health(&self) -> Health {
        Health {
            status: "healthy",
            timestamp: Utc::now(),
            total_packages: self.len(),
        }
    }

    pub fn statistics(&self) -> Statistics {
        stats::statistics(self.read_catalog().all(), Utc::now())
    }

    pub fn popular_tags(&self, limit: usize) -> Vec<String> {
        stats::popular_tags(self.read_catalog().all(), limit)
    }

    pub fn popular_authors(&self, limit: usize) -> Vec<String> {
        stats::popular_authors(self.read_catalog().all(), limit)
    }

    pub fn by_tag(&self, tag: &str) -> Vec<PackageRecord> {
        let catalog = self.read_catalog();
        stats::by_tag(catalog.all(), tag)
            .into_iter()
            .cloned()
            .collect()
    }

    pub fn by_author(&self, author: &str) -> Vec<PackageRecord> {
        let catalog = self.read_catalog();
        stats::by_author(catalog.all(), author)
            .into_iter()
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.read_catalog().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read_catalog().is_empty()
    }
}
