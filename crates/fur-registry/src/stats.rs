//! Catalog-wide statistics and tag/author browsing.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::package::PackageRecord;

const POPULAR_AUTHORS_LIMIT: usize = 20;
const HIGHLIGHT_LIMIT: usize = 5;

/// Short summary of a package for statistics listings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PackageStats {
    pub name: String,
    pub version: String,
    pub downloads: u64,
    pub added_date: DateTime<Utc>,
}

impl From<&PackageRecord> for PackageStats {
    fn from(record: &PackageRecord) -> Self {
        Self {
            name: record.name().to_string(),
            version: record.version().to_string(),
            downloads: record.downloads,
            added_date: record.uploaded,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Statistics {
    pub total_packages: usize,
    pub total_downloads: u64,
    pub popular_authors: Vec<String>,
    pub most_downloaded: Vec<PackageStats>,
    pub recently_added: Vec<PackageStats>,
    pub last_updated: DateTime<Utc>,
}

/// Ranks values by the number of packages carrying them, most frequent
/// first.
///
/// Each item of `per_package` holds one package's values; repeats within a
/// package count once. Values with the same count keep the order in which
/// they were first seen.
fn rank_by_count<I, J>(per_package: I, limit: usize) -> Vec<String>
where
    I: IntoIterator<Item = J>,
    J: IntoIterator<Item = String>,
{
    let mut counts: Vec<(String, usize)> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();

    for values in per_package {
        let mut seen = HashSet::new();
        for value in values {
            if !seen.insert(value.clone()) {
                continue;
            }
            match positions.get(&value) {
                Some(&idx) => counts[idx].1 += 1,
                None => {
                    positions.insert(value.clone(), counts.len());
                    counts.push((value, 1));
                }
            }
        }
    }

    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
        .into_iter()
        .take(limit)
        .map(|(value, _)| value)
        .collect()
}

fn trimmed_authors(record: &PackageRecord) -> impl Iterator<Item = String> + '_ {
    record
        .descriptor
        .authors
        .iter()
        .map(|author| author.trim().to_string())
        .filter(|author| !author.is_empty())
}

/// Tags ranked by the number of packages carrying them.
pub fn popular_tags(records: &[PackageRecord], limit: usize) -> Vec<String> {
    rank_by_count(
        records
            .iter()
            .map(|record| record.descriptor.tags.iter().cloned()),
        limit,
    )
}

/// Authors ranked by the number of packages listing them.
pub fn popular_authors(records: &[PackageRecord], limit: usize) -> Vec<String> {
    rank_by_count(records.iter().map(trimmed_authors), limit)
}

/// Packages tagged `tag` (case-insensitive), sorted by name.
pub fn by_tag<'a>(records: &'a [PackageRecord], tag: &str) -> Vec<&'a PackageRecord> {
    let tag = tag.to_lowercase();
    let mut matches: Vec<&PackageRecord> = records
        .iter()
        .filter(|record| {
            record
                .descriptor
                .tags
                .iter()
                .any(|t| t.to_lowercase() == tag)
        })
        .collect();
    matches.sort_by(|a, b| a.name().cmp(b.name()));
    matches
}

/// Packages listing `author` (trimmed, case-insensitive), sorted by name.
pub fn by_author<'a>(records: &'a [PackageRecord], author: &str) -> Vec<&'a PackageRecord> {
    let author = author.trim().to_lowercase();
    let mut matches: Vec<&PackageRecord> = records
        .iter()
        .filter(|record| trimmed_authors(record).any(|a| a.to_lowercase() == author))
        .collect();
    matches.sort_by(|a, b| a.name().cmp(b.name()));
    matches
}

/// Summarizes the catalog as of `now`.
pub fn statistics(records: &[PackageRecord], now: DateTime<Utc>) -> Statistics {
    let mut most_downloaded: Vec<&PackageRecord> = records.iter().collect();
    most_downloaded.sort_by(|a, b| b.downloads.cmp(&a.downloads));

    let mut recently_added: Vec<&PackageRecord> = records.iter().collect();
    recently_added.sort_by(|a, b| b.uploaded.cmp(&a.uploaded));

    Statistics {
        total_packages: records.len(),
        total_downloads: records.iter().map(|record| record.downloads).sum(),
        popular_authors: popular_authors(records, POPULAR_AUTHORS_LIMIT),
        most_downloaded: most_downloaded
            .into_iter()
            .take(HIGHLIGHT_LIMIT)
            .map(PackageStats::from)
            .collect(),
        recently_added: recently_added
            .into_iter()
            .take(HIGHLIGHT_LIMIT)
            .map(PackageStats::from)
            .collect(),
        last_updated: now,
    }
}
