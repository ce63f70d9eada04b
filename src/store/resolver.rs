//! # Version Resolver
//!
//! Write path: pick the next free storage name for a base key.
//! Read path: pick the current version among the names stored for an id.
//!
//! Both directions are pure functions over a snapshot of names, so calling
//! them twice against the same listing yields the same answer.

use std::cmp::Ordering;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use super::backend::{join_path, BlobStore};
use super::errors::StoreResult;
use super::naming::{sanitize_id, sanitize_timestamp, versioned_name, StorageKey, EXTENSION};

/// Which timestamp decides the current version of a document
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LatestOrdering {
    /// Timestamp embedded in the storage name (one listing, no fetches)
    #[default]
    Name,
    /// `createdAt` parsed from each candidate's content
    Content,
}

/// Version of `name` relative to `base`, if `name` is one of its versions
pub fn version_of(name: &str, base: &str) -> Option<u32> {
    let rest = name.strip_prefix(base)?;
    if rest == EXTENSION {
        return Some(1);
    }

    let digits = rest.strip_prefix("-v")?.strip_suffix(EXTENSION)?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Next free name for `base` given the names already stored
///
/// Returns `base.json` when that name is free. Otherwise returns
/// `base-v<N+1>.json` where `N` is the highest existing version (the
/// unsuffixed name counts as 1).
pub fn next_key<I, S>(existing: I, base: &str) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let first = versioned_name(base, 1);
    let mut base_taken = false;
    let mut highest = 0u32;

    for name in existing {
        let name = name.as_ref();
        base_taken |= name == first;
        if let Some(version) = version_of(name, base) {
            highest = highest.max(version);
        }
    }

    if !base_taken {
        return first;
    }
    versioned_name(base, highest.saturating_add(1).max(2))
}

/// Next free name for `base` found by probing one candidate at a time
///
/// Costs one `exists` round trip per taken version. Use for backends
/// whose listing is expensive; `next_key` over a single listing is
/// otherwise preferred.
pub async fn probe_next_key<B>(store: &B, dir: &str, base: &str) -> StoreResult<String>
where
    B: BlobStore + ?Sized,
{
    let mut version = 1u32;
    loop {
        let candidate = versioned_name(base, version);
        if !store.exists(&join_path(dir, &candidate)).await? {
            return Ok(candidate);
        }
        version = version.saturating_add(1).max(2);
    }
}

/// Comparable point in time for ordering versions
///
/// Parsed instants compare first; the sanitized raw text breaks ties and
/// orders timestamps that do not parse.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct TimeKey {
    pub instant: Option<DateTime<Utc>>,
    pub raw: String,
}

impl TimeKey {
    /// From the timestamp component of a storage name
    pub fn from_name(key: &StorageKey) -> Self {
        Self {
            instant: None,
            raw: key.timestamp.clone(),
        }
    }

    /// From a document's `createdAt` text
    pub fn from_created_at(created_at: &str) -> Self {
        Self {
            instant: parse_instant(created_at),
            raw: sanitize_timestamp(created_at),
        }
    }
}

const NAIVE_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

/// Parse an ISO-8601-like timestamp; values without an offset are UTC
pub fn parse_instant(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// A stored name eligible for latest-version resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub name: String,
    /// Parsed `createdAt`, when ordering by content
    pub created_at: Option<String>,
}

impl Candidate {
    pub fn from_name(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            created_at: None,
        }
    }

    pub fn with_created_at(name: impl Into<String>, created_at: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            created_at: Some(created_at.into()),
        }
    }

    fn time_key(&self, key: &StorageKey) -> TimeKey {
        match &self.created_at {
            Some(created_at) => TimeKey::from_created_at(created_at),
            None => TimeKey::from_name(key),
        }
    }
}

/// Names belonging to `id`, in no particular order
pub fn filter_by_id<'a, I>(names: I, id: &str) -> Vec<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    let id = sanitize_id(id);
    names
        .into_iter()
        .filter(|name| matches!(StorageKey::parse(name), Ok(key) if key.id == id))
        .collect()
}

/// The current version of `id` among `candidates`
///
/// Orders by timestamp descending, then by version descending. Candidates
/// carrying a `createdAt` are ordered by it; the rest by the timestamp
/// embedded in their name. Names that do not belong to `id` are ignored.
pub fn latest<'a>(candidates: &'a [Candidate], id: &str) -> Option<&'a Candidate> {
    let id = sanitize_id(id);

    candidates
        .iter()
        .filter_map(|candidate| {
            let key = StorageKey::parse(&candidate.name).ok()?;
            (key.id == id).then(|| (candidate.time_key(&key), key.version, candidate))
        })
        .max_by(|a, b| {
            a.0.cmp(&b.0)
                .then(a.1.cmp(&b.1))
                .then_with(|| a.2.name.cmp(&b.2.name))
        })
        .map(|(_, _, candidate)| candidate)
}

/// Newest-first order over (time, version, name) triples
pub fn newest_first(a: (&TimeKey, u32, &str), b: (&TimeKey, u32, &str)) -> Ordering {
    b.0.cmp(a.0)
        .then(b.1.cmp(&a.1))
        .then_with(|| b.2.cmp(a.2))
}
