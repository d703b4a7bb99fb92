//! Core types for the segment-based index

use serde::{Deserialize, Serialize};
use std::fmt;

/// Segment identifier (monotonically increasing per index)
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SegmentId(pub u64);

impl SegmentId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn next(&self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for SegmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "segment_{}", self.0)
    }
}

/// Dense document number within a segment (0..max_doc)
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DocNo(pub u32);

impl DocNo {
    pub fn new(n: u32) -> Self {
        Self(n)
    }

    pub fn as_u32(self) -> u32 {
        self.0
    }

    pub fn as_usize(self) -> usize {
        self.0 as usize
    }
}

/// Position of a document within a whole snapshot.
///
/// Equal to the owning segment's doc base plus the segment-local [`DocNo`].
/// Only meaningful for the lifetime of the snapshot that produced it; merges
/// and deletions may reassign ordinals between snapshots.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Ordinal(pub u32);

impl Ordinal {
    pub fn new(n: u32) -> Self {
        Self(n)
    }

    pub fn as_u32(self) -> u32 {
        self.0
    }

    pub fn as_usize(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for Ordinal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Number of postings per encoded block
pub const BLOCK_SIZE: usize = 128;

/// A block of docnos waiting to be encoded
#[derive(Clone, Debug)]
pub struct PostingBlock {
    pub docnos: Vec<DocNo>,
    /// Maximum document number in this block (for skip data)
    pub max_docno: DocNo,
}

impl PostingBlock {
    pub fn new() -> Self {
        Self {
            docnos: Vec::with_capacity(BLOCK_SIZE),
            max_docno: DocNo(0),
        }
    }

    pub fn is_full(&self) -> bool {
        self.docnos.len() >= BLOCK_SIZE
    }

    pub fn is_empty(&self) -> bool {
        self.docnos.is_empty()
    }

    pub fn len(&self) -> usize {
        self.docnos.len()
    }

    pub fn push(&mut self, docno: DocNo) {
        if docno > self.max_docno {
            self.max_docno = docno;
        }
        self.docnos.push(docno);
    }
}

impl Default for PostingBlock {
    fn default() -> Self {
        Self::new()
    }
}

/// Posting list metadata stored in the term dictionary
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PostingListMeta {
    /// Offset in the postings file
    pub offset: u64,
    /// Length in bytes
    pub length: u64,
    /// Document frequency (number of documents containing this term)
    pub doc_frequency: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_id() {
        let id = SegmentId::new(42);
        assert_eq!(id.0, 42);
        assert_eq!(id.next().0, 43);
        assert_eq!(format!("{}", id), "segment_42");
    }

    #[test]
    fn test_ordinal_display() {
        assert_eq!(Ordinal::new(7).to_string(), "7");
        assert_eq!(Ordinal::new(7).as_usize(), 7);
    }

    #[test]
    fn test_posting_block() {
        let mut block = PostingBlock::new();
        assert!(block.is_empty());
        assert!(!block.is_full());

        block.push(DocNo(1));
        block.push(DocNo(10));

        assert_eq!(block.len(), 2);
        assert_eq!(block.max_docno, DocNo(10));
    }
}
