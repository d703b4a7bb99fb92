//! Read-only point-in-time view over every segment of an index directory.
//!
//! A snapshot concatenates its segments in manifest order. The global
//! [`Ordinal`] of a document is its segment's doc base plus its local
//! [`DocNo`], so ordinals cover `[0, total_doc_count)` without gaps.
//!
//! Snapshots hold open file handles. [`IndexSnapshot::close`] releases them
//! and is idempotent; dropping a snapshot closes it as well, so every exit
//! path releases the index.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::debug;

use crate::error::{Result, SegscopeError};
use crate::models::Document;
use crate::segment::{DocNo, Ordinal, SegmentReader, SegmentStore, MANIFEST_FILE};

/// A segment plus the ordinal of its first document
pub(crate) struct LoadedSegment {
    pub(crate) doc_base: u32,
    pub(crate) reader: SegmentReader,
}

/// Everything a snapshot owns while open
pub(crate) struct SnapshotState {
    generation: u64,
    segments: Vec<LoadedSegment>,
    total_docs: u32,
    live_docs: u32,
}

impl SnapshotState {
    pub(crate) fn total_docs(&self) -> u32 {
        self.total_docs
    }

    pub(crate) fn segments(&self) -> &[LoadedSegment] {
        &self.segments
    }

    /// Resolve an ordinal to its segment and local docno
    pub(crate) fn locate(&self, ordinal: Ordinal) -> Result<(&SegmentReader, DocNo)> {
        if ordinal.as_u32() >= self.total_docs {
            return Err(SegscopeError::OutOfRange {
                ordinal,
                total: self.total_docs,
            });
        }
        // Last segment whose doc base is <= ordinal. Empty segments share a
        // base with their successor and are skipped by taking the last one.
        let idx = self
            .segments
            .partition_point(|s| s.doc_base <= ordinal.as_u32())
            - 1;
        let segment = &self.segments[idx];
        Ok((
            &segment.reader,
            DocNo::new(ordinal.as_u32() - segment.doc_base),
        ))
    }

    pub(crate) fn is_deleted(&self, ordinal: Ordinal) -> Result<bool> {
        let (reader, docno) = self.locate(ordinal)?;
        Ok(reader.is_deleted(docno))
    }

    pub(crate) fn document(&self, ordinal: Ordinal) -> Result<Document> {
        let (reader, docno) = self.locate(ordinal)?;
        reader.document(docno)
    }
}

/// Summary counters of an open snapshot
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SnapshotStats {
    pub live_docs: u32,
    pub total_docs: u32,
    pub segments: usize,
    pub generation: u64,
}

/// Immutable read-only view of an index directory
pub struct IndexSnapshot {
    path: PathBuf,
    state: Option<SnapshotState>,
}

impl IndexSnapshot {
    /// Open the index at `path`.
    ///
    /// Fails with [`SegscopeError::Open`] when the path is not a directory,
    /// has no manifest, or any listed segment cannot be loaded and validated.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let open_err = |reason: &dyn std::fmt::Display| SegscopeError::open(&path, reason);

        let store = SegmentStore::open(&path).map_err(|e| open_err(&e))?;
        let manifest = store
            .load_manifest()
            .map_err(|e| open_err(&e))?
            .ok_or_else(|| open_err(&format!("no {} found", MANIFEST_FILE)))?;

        let mut segments = Vec::with_capacity(manifest.segment_count());
        let mut total_docs: u32 = 0;
        let mut live_docs: u32 = 0;

        for entry in manifest.iter() {
            let reader = store.read_segment(entry).map_err(|e| open_err(&e))?;
            if reader.meta().live_doc_count != reader.live_doc_count() {
                return Err(open_err(&format!(
                    "{} has {} live documents, manifest says {}",
                    reader.id(),
                    reader.live_doc_count(),
                    reader.meta().live_doc_count
                )));
            }
            let doc_base = total_docs;
            total_docs = total_docs
                .checked_add(reader.max_doc())
                .ok_or_else(|| open_err(&"index holds more than u32::MAX documents"))?;
            live_docs += reader.live_doc_count();
            segments.push(LoadedSegment { doc_base, reader });
        }

        debug!(
            path = %path.display(),
            segments = segments.len(),
            total_docs,
            live_docs,
            generation = manifest.generation,
            "opened index snapshot"
        );

        Ok(Self {
            path,
            state: Some(SnapshotState {
                generation: manifest.generation,
                segments,
                total_docs,
                live_docs,
            }),
        })
    }

    /// Release every segment and file handle. Safe to call repeatedly.
    pub fn close(&mut self) {
        if self.state.take().is_some() {
            debug!(path = %self.path.display(), "closed index snapshot");
        }
    }

    pub fn is_closed(&self) -> bool {
        self.state.is_none()
    }

    pub(crate) fn state(&self) -> Result<&SnapshotState> {
        self.state.as_ref().ok_or(SegscopeError::Closed)
    }

    /// Path the snapshot was opened from
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of non-deleted documents
    pub fn live_doc_count(&self) -> Result<u32> {
        Ok(self.state()?.live_docs)
    }

    /// Number of documents including deleted ones; ordinals range over
    /// `[0, total_doc_count)`
    pub fn total_doc_count(&self) -> Result<u32> {
        Ok(self.state()?.total_docs)
    }

    /// Whether the document at `ordinal` is deleted
    pub fn is_deleted(&self, ordinal: Ordinal) -> Result<bool> {
        self.state()?.is_deleted(ordinal)
    }

    pub fn segment_count(&self) -> Result<usize> {
        Ok(self.state()?.segments.len())
    }

    /// Manifest generation this snapshot was opened at
    pub fn generation(&self) -> Result<u64> {
        Ok(self.state()?.generation)
    }

    pub fn stats(&self) -> Result<SnapshotStats> {
        let state = self.state()?;
        Ok(SnapshotStats {
            live_docs: state.live_docs,
            total_docs: state.total_docs,
            segments: state.segments.len(),
            generation: state.generation,
        })
    }
}

impl Drop for IndexSnapshot {
    fn drop(&mut self) {
        self.close();
    }
}
