//! # Naming Scheme
//!
//! Storage keys have the shape `<id>--<timestamp>[-v<N>].json`:
//!
//! - `<id>` keeps only `[A-Za-z0-9-]` from the document id
//! - `<timestamp>` keeps only ASCII alphanumerics from `createdAt`
//! - `-v<N>` is absent for the first document of a base and `2, 3, ...` after
//!
//! The timestamp component never contains `-`, which is what keeps the
//! `--` separator and the `-v` suffix unambiguous even for ids that end in
//! or contain dashes.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;

use super::errors::{StoreError, StoreResult};

/// Separator between the id and timestamp components
pub const ID_SEPARATOR: &str = "--";

/// Extension of every stored document
pub const EXTENSION: &str = ".json";

/// Strip every character outside `[A-Za-z0-9-]`
pub fn sanitize_id(id: &str) -> String {
    id.chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-')
        .collect()
}

/// Strip every character outside ASCII alphanumerics
pub fn sanitize_timestamp(created_at: &str) -> String {
    created_at
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect()
}

/// Storage key before any version suffix, e.g. `INV-1--20240101T100000Z`
pub fn base_key(id: &str, created_at: &str) -> StoreResult<String> {
    let id_part = sanitize_id(id);
    if id_part.is_empty() {
        return Err(StoreError::InvalidIdentifier(id.to_string()));
    }

    let ts_part = sanitize_timestamp(created_at);
    if ts_part.is_empty() {
        return Err(StoreError::Validation(format!(
            "createdAt has no usable characters: {:?}",
            created_at
        )));
    }

    Ok(format!("{}{}{}", id_part, ID_SEPARATOR, ts_part))
}

/// Prefix shared by every version of every document with this id
pub fn id_prefix(id: &str) -> StoreResult<String> {
    let id_part = sanitize_id(id);
    if id_part.is_empty() {
        return Err(StoreError::InvalidIdentifier(id.to_string()));
    }
    Ok(format!("{}{}", id_part, ID_SEPARATOR))
}

/// File name for `version` of `base`; version 1 carries no suffix
pub fn versioned_name(base: &str, version: u32) -> String {
    if version <= 1 {
        format!("{}{}", base, EXTENSION)
    } else {
        format!("{}-v{}{}", base, version, EXTENSION)
    }
}

fn key_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^([A-Za-z0-9-]+?)--([A-Za-z0-9]+)(?:-v([0-9]+))?\.json$")
            .expect("storage key pattern is valid")
    })
}

/// A parsed storage key
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StorageKey {
    /// Sanitized id component
    pub id: String,
    /// Sanitized timestamp component
    pub timestamp: String,
    /// 1 for the unsuffixed name
    pub version: u32,
}

impl StorageKey {
    /// Parse a blob file name
    pub fn parse(name: &str) -> StoreResult<Self> {
        let caps = key_pattern()
            .captures(name)
            .ok_or_else(|| StoreError::parse(name, "not a storage key"))?;

        let version = match caps.get(3) {
            Some(v) => v
                .as_str()
                .parse::<u32>()
                .map_err(|e| StoreError::parse(name, e))?,
            None => 1,
        };

        Ok(Self {
            id: caps[1].to_string(),
            timestamp: caps[2].to_string(),
            version,
        })
    }

    /// Key without the version suffix or extension
    pub fn base(&self) -> String {
        format!("{}{}{}", self.id, ID_SEPARATOR, self.timestamp)
    }

    pub fn file_name(&self) -> String {
        versioned_name(&self.base(), self.version)
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.file_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_key() {
        let base = base_key("INV-1", "2024-01-01T10:00:00Z").unwrap();
        assert_eq!(base, "INV-1--20240101T100000Z");
    }

    #[test]
    fn test_base_key_strips_unsafe_characters() {
        let base = base_key("INV/2024 #7", "2024-01-01T10:00:00.000+02:00").unwrap();
        assert_eq!(base, "INV20247--20240101T1000000000200");
    }

    #[test]
    fn test_equal_timestamps_sanitize_identically() {
        let a = base_key("A", "2024-06-01T00:00:00Z").unwrap();
        let b = base_key("A", "2024-06-01T00:00:00Z").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_empty_identifier_rejected() {
        assert!(matches!(
            base_key("", "2024-01-01"),
            Err(StoreError::InvalidIdentifier(_))
        ));
        assert!(matches!(
            base_key("  /#", "2024-01-01"),
            Err(StoreError::InvalidIdentifier(_))
        ));
        assert!(matches!(id_prefix("!!"), Err(StoreError::InvalidIdentifier(_))));
    }

    #[test]
    fn test_empty_timestamp_rejected() {
        assert!(matches!(base_key("INV-1", ":-"), Err(StoreError::Validation(_))));
    }

    #[test]
    fn test_versioned_name() {
        assert_eq!(versioned_name("A--1", 1), "A--1.json");
        assert_eq!(versioned_name("A--1", 2), "A--1-v2.json");
        assert_eq!(versioned_name("A--1", 12), "A--1-v12.json");
    }

    #[test]
    fn test_parse_unsuffixed() {
        let key = StorageKey::parse("INV-1--20240101T100000Z.json").unwrap();
        assert_eq!(key.id, "INV-1");
        assert_eq!(key.timestamp, "20240101T100000Z");
        assert_eq!(key.version, 1);
        assert_eq!(key.to_string(), "INV-1--20240101T100000Z.json");
    }

    #[test]
    fn test_parse_versioned() {
        let key = StorageKey::parse("INV-1--20240101T100000Z-v3.json").unwrap();
        assert_eq!(key.id, "INV-1");
        assert_eq!(key.version, 3);
        assert_eq!(key.base(), "INV-1--20240101T100000Z");
    }

    #[test]
    fn test_parse_dashed_ids() {
        let key = StorageKey::parse("INV---2024-v2.json").unwrap();
        assert_eq!(key.id, "INV-");
        assert_eq!(key.timestamp, "2024");
        assert_eq!(key.version, 2);

        let key = StorageKey::parse("A--B--2024.json").unwrap();
        assert_eq!(key.id, "A--B");
        assert_eq!(key.timestamp, "2024");
    }

    #[test]
    fn test_parse_rejects_foreign_names() {
        for name in ["README.md", "INV-1.json", "INV-1--.json", "--2024.json", "INV--2024-vx.json"] {
            assert!(
                matches!(StorageKey::parse(name), Err(StoreError::Parse { .. })),
                "{} should not parse",
                name
            );
        }
    }
}
