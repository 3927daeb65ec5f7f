//! Package descriptor and catalog record types.
//!
//! A [`Descriptor`] is the uploader-supplied furconfig document; it is the
//! only thing written to disk. A [`PackageRecord`] wraps a descriptor with the
//! registry-managed counters and timestamps that live in memory only.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Treats an explicit `null` the same as an absent field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// The furconfig document describing one package.
///
/// Field order matches the on-disk layout. Optional fields default to an empty
/// string or list, both when missing and when `null`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Descriptor {
    pub name: String,
    pub version: String,
    pub authors: Vec<String>,

    #[serde(
        rename = "Supported_Platforms",
        default,
        deserialize_with = "null_as_default"
    )]
    pub supported_platforms: Vec<String>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub long_description: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub license: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub license_url: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub keywords: Vec<String>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<String>,

    pub homepage: String,
    pub issue_tracker: String,
    pub git: String,
    pub installer: String,
    pub dependencies: Vec<String>,
}

/// A catalog entry: the descriptor plus registry-managed metadata.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PackageRecord {
    #[serde(flatten)]
    pub descriptor: Descriptor,
    pub downloads: u64,
    pub uploaded: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

impl PackageRecord {
    /// A record for a package uploaded at `now`.
    pub fn uploaded_at(descriptor: Descriptor, now: DateTime<Utc>) -> Self {
        Self {
            descriptor,
            downloads: 0,
            uploaded: now,
            updated: now,
        }
    }

    /// A record for a descriptor found on disk (or seeded) at startup.
    ///
    /// Counters and timestamps are not persisted, so they are reset on every
    /// load: no downloads, uploaded 30 days and updated 2 days before `now`.
    pub fn bootstrapped(descriptor: Descriptor, now: DateTime<Utc>) -> Self {
        Self {
            descriptor,
            downloads: 0,
            uploaded: now - Duration::days(30),
            updated: now - Duration::days(2),
        }
    }

    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    pub fn version(&self) -> &str {
        &self.descriptor.version
    }
}
