//! Segment manifest for tracking the segments of an index
//!
//! The manifest is the root of an index directory: a snapshot sees exactly
//! the segments it lists, in listed order. Writers replace it atomically
//! (write `segments.manifest.tmp`, then rename).

use std::io;

use serde::{Deserialize, Serialize};

use super::reader::SegmentMeta;
use super::types::SegmentId;

/// Manifest entry for a segment
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub meta: SegmentMeta,
    /// CRC32 over the segment's term dictionary, postings and delete bitset
    pub checksum: u64,
}

/// The segment manifest tracks all live segments
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SegmentManifest {
    /// Manifest version (for format upgrades)
    pub version: u32,
    /// Generation number (incremented on each update)
    pub generation: u64,
    /// Next segment ID to allocate
    pub next_segment_id: SegmentId,
    pub segments: Vec<ManifestEntry>,
    /// Timestamp of last update
    pub updated_at: u64,
}

impl SegmentManifest {
    /// Current manifest format version
    pub const VERSION: u32 = 1;

    pub fn new() -> Self {
        Self {
            version: Self::VERSION,
            generation: 0,
            next_segment_id: SegmentId::new(0),
            segments: Vec::new(),
            updated_at: 0,
        }
    }

    /// Allocate a new segment ID
    pub fn allocate_segment_id(&mut self) -> SegmentId {
        let id = self.next_segment_id;
        self.next_segment_id = id.next();
        id
    }

    /// Append a segment to the manifest
    pub fn add_segment(&mut self, meta: SegmentMeta, checksum: u64) {
        self.segments.push(ManifestEntry { meta, checksum });
        self.generation += 1;
        self.updated_at = current_timestamp();
    }

    /// Whether this build can read the manifest's format
    pub fn is_supported(&self) -> bool {
        self.version >= 1 && self.version <= Self::VERSION
    }

    /// Total document count across all segments, deleted ones included
    pub fn total_doc_count(&self) -> u64 {
        self.segments.iter().map(|e| e.meta.doc_count as u64).sum()
    }

    pub fn total_live_doc_count(&self) -> u64 {
        self.segments
            .iter()
            .map(|e| e.meta.live_doc_count as u64)
            .sum()
    }

    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ManifestEntry> {
        self.segments.iter()
    }

    pub fn to_bincode(&self) -> io::Result<Vec<u8>> {
        bincode::serialize(self).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    pub fn from_bincode(data: &[u8]) -> io::Result<Self> {
        bincode::deserialize(data).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }
}

impl Default for SegmentManifest {
    fn default() -> Self {
        Self::new()
    }
}

/// Get current Unix timestamp in seconds
pub(crate) fn current_timestamp() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
