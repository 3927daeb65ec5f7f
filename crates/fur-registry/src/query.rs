//! Search, sort and pagination over catalog records.

use std::{convert::Infallible, fmt, str::FromStr};

use crate::package::PackageRecord;

/// Named orderings for list results.
///
/// Unknown names fall back to [`SortKey::Name`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortKey {
    MostDownloads,
    LeastDownloads,
    RecentlyUpdated,
    RecentlyUploaded,
    OldestUpdated,
    OldestUploaded,
    #[default]
    Name,
}

impl SortKey {
    pub fn parse(key: &str) -> Self {
        match key {
            "mostDownloads" => Self::MostDownloads,
            "leastDownloads" => Self::LeastDownloads,
            "recentlyUpdated" => Self::RecentlyUpdated,
            "recentlyUploaded" => Self::RecentlyUploaded,
            "oldestUpdated" => Self::OldestUpdated,
            "oldestUploaded" => Self::OldestUploaded,
            _ => Self::Name,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MostDownloads => "mostDownloads",
            Self::LeastDownloads => "leastDownloads",
            Self::RecentlyUpdated => "recentlyUpdated",
            Self::RecentlyUploaded => "recentlyUploaded",
            Self::OldestUpdated => "oldestUpdated",
            Self::OldestUploaded => "oldestUploaded",
            Self::Name => "name",
        }
    }

    /// Stable in-place sort of `records` by this key.
    pub fn sort(&self, records: &mut [&PackageRecord]) {
        match self {
            Self::MostDownloads => records.sort_by(|a, b| b.downloads.cmp(&a.downloads)),
            Self::LeastDownloads => records.sort_by(|a, b| a.downloads.cmp(&b.downloads)),
            Self::RecentlyUpdated => records.sort_by(|a, b| b.updated.cmp(&a.updated)),
            Self::RecentlyUploaded => records.sort_by(|a, b| b.uploaded.cmp(&a.uploaded)),
            Self::OldestUpdated => records.sort_by(|a, b| a.updated.cmp(&b.updated)),
            Self::OldestUploaded => records.sort_by(|a, b| a.uploaded.cmp(&b.uploaded)),
            Self::Name => records.sort_by(|a, b| a.name().cmp(b.name())),
        }
    }
}

impl FromStr for SortKey {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether `record` matches an already lowercased search term.
fn matches_term(record: &PackageRecord, term: &str) -> bool {
    let descriptor = &record.descriptor;
    descriptor.name.to_lowercase().contains(term)
        || descriptor.authors.join(" ").to_lowercase().contains(term)
        || descriptor.description.to_lowercase().contains(term)
        || descriptor
            .keywords
            .iter()
            .any(|keyword| keyword.to_lowercase().contains(term))
        || descriptor
            .tags
            .iter()
            .any(|tag| tag.to_lowercase().contains(term))
}

/// Filters `all` by `search` and orders the result by `sort`.
///
/// An empty or absent search term keeps every record. Matching is a
/// case-insensitive substring test over name, authors, description, keywords
/// and tags.
pub fn query<'a>(
    all: &'a [PackageRecord],
    search: Option<&str>,
    sort: SortKey,
) -> Vec<&'a PackageRecord> {
    let mut results: Vec<&PackageRecord> = match search.filter(|s| !s.is_empty()) {
        Some(search) => {
            let term = search.to_lowercase();
            all.iter()
                .filter(|record| matches_term(record, &term))
                .collect()
        }
        None => all.iter().collect(),
    };

    sort.sort(&mut results);
    results
}

/// A 1-based page of results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub number: usize,
    pub size: usize,
}

impl Page {
    /// Builds a page, treating a zero page number as the first page.
    ///
    /// Returns `None` for a zero page size.
    pub fn new(number: usize, size: usize) -> Option<Self> {
        (size > 0).then_some(Self {
            number: number.max(1),
            size,
        })
    }

    /// The slice of `items` covered by this page; empty past the end.
    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        let start = (self.number - 1).saturating_mul(self.size);
        if start >= items.len() {
            return &[];
        }
        let end = start.saturating_add(self.size).min(items.len());
        &items[start..end]
    }
}
