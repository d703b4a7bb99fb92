//! Exact-term point lookup on a single field.
//!
//! The value is matched as one literal term, never analyzed. Segments are
//! searched in manifest order and the first live posting wins; a value whose
//! every posting is deleted resolves to [`LookupOutcome::NotFound`].

use std::fmt;

use crate::error::LookupError;
use crate::segment::{is_valid_field_name, Ordinal};
use crate::snapshot::IndexSnapshot;

/// Field/value pair to resolve
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct LookupKey {
    pub field: String,
    pub value: String,
}

impl LookupKey {
    pub fn new(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }
}

impl fmt::Display for LookupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.field, self.value)
    }
}

/// Result of a successful lookup
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LookupOutcome {
    Found(Ordinal),
    NotFound,
}

impl LookupOutcome {
    pub fn ordinal(self) -> Option<Ordinal> {
        match self {
            LookupOutcome::Found(ordinal) => Some(ordinal),
            LookupOutcome::NotFound => None,
        }
    }
}

/// Resolve `field:value` to the first live matching ordinal
pub fn lookup(
    snapshot: &IndexSnapshot,
    field: &str,
    value: &str,
) -> Result<LookupOutcome, LookupError> {
    if !is_valid_field_name(field) {
        return Err(LookupError::MalformedField {
            field: field.to_string(),
        });
    }
    let state = snapshot.state().map_err(|_| LookupError::Closed)?;

    for segment in state.segments() {
        let hit = segment
            .reader
            .first_live_posting(field, value)
            .map_err(|source| LookupError::Backend {
                field: field.to_string(),
                value: value.to_string(),
                source,
            })?;
        if let Some(docno) = hit {
            return Ok(LookupOutcome::Found(Ordinal::new(
                segment.doc_base + docno.as_u32(),
            )));
        }
    }

    Ok(LookupOutcome::NotFound)
}

/// [`lookup`] for a prepared key
pub fn lookup_key(snapshot: &IndexSnapshot, key: &LookupKey) -> Result<LookupOutcome, LookupError> {
    lookup(snapshot, &key.field, &key.value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Document;
    use crate::segment::IndexWriter;
    use tempfile::TempDir;

    fn build(dir: &TempDir) -> IndexSnapshot {
        let mut writer = IndexWriter::open(dir.path()).unwrap();
        writer
            .add_document(&Document::new().with_field("id", "a").with_field("title", "Hello World"))
            .unwrap();
        writer
            .add_document(&Document::new().with_field("id", "b").with_field("group", "g1"))
            .unwrap();
        writer.commit().unwrap();

        writer
            .add_document(&Document::new().with_field("id", "c").with_field("group", "g1"))
            .unwrap();
        writer
            .add_document(&Document::new().with_field("id", "gone"))
            .unwrap();
        writer.delete_term("id", "gone");
        writer.commit().unwrap();

        IndexSnapshot::open(dir.path()).unwrap()
    }

    #[test]
    fn test_found_in_each_segment() {
        let dir = TempDir::new().unwrap();
        let snapshot = build(&dir);

        assert_eq!(
            lookup(&snapshot, "id", "a").unwrap(),
            LookupOutcome::Found(Ordinal::new(0))
        );
        assert_eq!(
            lookup(&snapshot, "id", "c").unwrap(),
            LookupOutcome::Found(Ordinal::new(2))
        );
    }

    #[test]
    fn test_not_found() {
        let dir = TempDir::new().unwrap();
        let snapshot = build(&dir);

        assert_eq!(lookup(&snapshot, "id", "zzz").unwrap(), LookupOutcome::NotFound);
        // Field scoping: "a" is an id, not a group
        assert_eq!(lookup(&snapshot, "group", "a").unwrap(), LookupOutcome::NotFound);
    }

    #[test]
    fn test_literal_match_only() {
        let dir = TempDir::new().unwrap();
        let snapshot = build(&dir);

        assert!(lookup(&snapshot, "title", "Hello World").unwrap().ordinal().is_some());
        assert_eq!(lookup(&snapshot, "title", "hello world").unwrap(), LookupOutcome::NotFound);
        assert_eq!(lookup(&snapshot, "title", "Hello").unwrap(), LookupOutcome::NotFound);
    }

    #[test]
    fn test_first_match_wins() {
        let dir = TempDir::new().unwrap();
        let snapshot = build(&dir);

        assert_eq!(
            lookup_key(&snapshot, &LookupKey::new("group", "g1")).unwrap(),
            LookupOutcome::Found(Ordinal::new(1))
        );
    }

    #[test]
    fn test_only_deleted_hit_is_not_found() {
        let dir = TempDir::new().unwrap();
        let snapshot = build(&dir);

        assert!(snapshot.is_deleted(Ordinal::new(3)).unwrap());
        assert_eq!(lookup(&snapshot, "id", "gone").unwrap(), LookupOutcome::NotFound);
    }

    #[test]
    fn test_first_live_match_across_segments() {
        let dir = TempDir::new().unwrap();
        let mut writer = IndexWriter::open(dir.path()).unwrap();
        writer.add_document(&Document::new().with_field("id", "x").with_field("v", "1")).unwrap();
        writer.delete_term("id", "x");
        writer.commit().unwrap();
        writer.add_document(&Document::new().with_field("id", "x").with_field("v", "2")).unwrap();
        writer.commit().unwrap();
        let snapshot = IndexSnapshot::open(dir.path()).unwrap();

        assert_eq!(
            lookup(&snapshot, "id", "x").unwrap(),
            LookupOutcome::Found(Ordinal::new(1))
        );
    }

    #[test]
    fn test_malformed_field() {
        let dir = TempDir::new().unwrap();
        let snapshot = build(&dir);

        assert!(matches!(
            lookup(&snapshot, "", "a"),
            Err(LookupError::MalformedField { .. })
        ));
        assert!(matches!(
            lookup(&snapshot, "i\0d", "a"),
            Err(LookupError::MalformedField { .. })
        ));
    }

    #[test]
    fn test_closed_snapshot() {
        let dir = TempDir::new().unwrap();
        let mut snapshot = build(&dir);
        snapshot.close();
        assert!(matches!(
            lookup(&snapshot, "id", "a"),
            Err(LookupError::Closed)
        ));
    }
}
