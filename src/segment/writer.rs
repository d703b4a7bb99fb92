//! Segment writer for creating new immutable segments
//!
//! Documents added to an [`IndexWriter`] accumulate in a pending segment; on
//! `commit` they are written as one new segment:
//! - term dictionary + postings, one literal term per field value
//! - delete bitset
//! - stored fields
//!
//! Existing segments are never touched. Deleted documents keep their postings
//! and stored fields, only the delete bitset marks them.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use tracing::debug;

use super::live_docs::LiveDocs;
use super::manifest::{current_timestamp, SegmentManifest};
use super::postings::PostingsWriter;
use super::reader::SegmentMeta;
use super::store::{SegmentFiles, SegmentStore};
use super::stored::StoredFieldsWriter;
use super::term_dict::{is_valid_field_name, TermDictionaryBuilder};
use super::types::{DocNo, SegmentId};
use crate::error::{Result, SegscopeError};
use crate::models::Document;

#[derive(Default)]
struct PendingSegment {
    stored: StoredFieldsWriter,
    /// (field, term) -> docnos in ascending order
    postings: BTreeMap<(String, String), Vec<DocNo>>,
    deletes: HashSet<(String, String)>,
}

impl PendingSegment {
    fn doc_count(&self) -> u32 {
        self.stored.len() as u32
    }
}

/// Writes new segments into an index directory
pub struct IndexWriter {
    store: SegmentStore,
    manifest: SegmentManifest,
    pending: PendingSegment,
}

impl IndexWriter {
    /// Open an index directory for appending, creating it when missing
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let store = SegmentStore::create(path)?;
        let manifest = store.load_manifest()?.unwrap_or_default();
        Ok(Self {
            store,
            manifest,
            pending: PendingSegment::default(),
        })
    }

    /// Add a document to the pending segment and return its segment-local docno
    pub fn add_document(&mut self, doc: &Document) -> Result<DocNo> {
        if let Some(bad) = doc.iter().find(|f| !is_valid_field_name(&f.name)) {
            return Err(SegscopeError::InvalidField {
                field: bad.name.clone(),
            });
        }

        let docno = DocNo::new(self.pending.doc_count());
        self.pending.stored.append(doc)?;

        for field in doc.iter() {
            let postings = self
                .pending
                .postings
                .entry((field.name.clone(), field.value.clone()))
                .or_default();
            if postings.last() != Some(&docno) {
                postings.push(docno);
            }
        }

        Ok(docno)
    }

    /// Mark every pending document carrying `field:value` as deleted
    pub fn delete_term(&mut self, field: &str, value: &str) {
        self.pending
            .deletes
            .insert((field.to_string(), value.to_string()));
    }

    /// Number of documents waiting for the next commit
    pub fn pending_docs(&self) -> u32 {
        self.pending.doc_count()
    }

    /// Write the pending segment (if any) and publish a new manifest
    pub fn commit(&mut self) -> Result<Option<SegmentId>> {
        let pending = std::mem::take(&mut self.pending);
        if pending.doc_count() == 0 {
            self.store.save_manifest(&self.manifest)?;
            return Ok(None);
        }

        let id = self.manifest.allocate_segment_id();
        let doc_count = pending.doc_count();

        let mut live_docs = LiveDocs::new(doc_count);
        for key in &pending.deletes {
            if let Some(postings) = pending.postings.get(key) {
                for &docno in postings {
                    live_docs.delete(docno);
                }
            }
        }

        let mut postings_writer = PostingsWriter::new();
        let mut term_builder = TermDictionaryBuilder::with_capacity(pending.postings.len());
        for ((field, term), postings) in &pending.postings {
            postings_writer.start_posting_list();
            for &docno in postings {
                postings_writer.add_posting(docno);
            }
            let meta = postings_writer.finish_posting_list(postings.len() as u32);
            term_builder.add(field, term, meta);
        }
        let term_dict = term_builder.build()?;

        let (stored_data, stored_index) = pending.stored.finish();
        let files = SegmentFiles {
            id,
            fst_data: term_dict.fst_bytes().to_vec(),
            term_metadata: term_dict.metadata().to_vec(),
            postings_data: postings_writer.into_data(),
            live_docs_data: live_docs.serialize()?,
            stored_data,
            stored_index,
        };

        let meta = SegmentMeta {
            id,
            doc_count,
            live_doc_count: live_docs.live_count(),
            size_bytes: files.size_bytes(),
            created_at: current_timestamp(),
        };

        self.store.write_segment(&files)?;
        self.manifest.add_segment(meta, files.checksum()?);
        self.store.save_manifest(&self.manifest)?;

        debug!(
            segment = %id,
            docs = doc_count,
            deleted = live_docs.deleted_count(),
            "committed segment"
        );
        Ok(Some(id))
    }

    pub fn manifest(&self) -> &SegmentManifest {
        &self.manifest
    }
}
