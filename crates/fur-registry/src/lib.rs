//! Core of the fur package registry.
//!
//! Descriptors are validated by [`validate`], persisted through a
//! [`store::DescriptorStore`] and indexed in a [`catalog::CatalogIndex`].
//! [`Registry`] ties these together behind the get, list, upload and health
//! operations.

pub mod catalog;
pub mod error;
pub mod package;
pub mod query;
pub mod registry;
pub mod seed;
pub mod stats;
pub mod store;
pub mod validate;

pub use error::{ErrorKind, RegistryError, Result};
pub use package::{Descriptor, PackageRecord};
pub use registry::{Health, ListQuery, ListResult, Registry};
