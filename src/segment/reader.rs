//! Immutable segment reader
//!
//! Each segment reader provides access to the term dictionary, postings,
//! delete bitset and stored fields of one segment.

use std::io;

use serde::{Deserialize, Serialize};

use super::live_docs::LiveDocs;
use super::postings::{PostingIterator, PostingsReader};
use super::stored::StoredFieldsReader;
use super::term_dict::TermDictionary;
use super::types::{DocNo, SegmentId};
use crate::error::Result;
use crate::models::Document;

/// Metadata for a segment stored in the manifest
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SegmentMeta {
    /// Unique segment identifier
    pub id: SegmentId,
    /// Number of documents in the segment, deleted ones included
    pub doc_count: u32,
    /// Number of live (non-deleted) documents
    pub live_doc_count: u32,
    /// Size in bytes (all segment files combined)
    pub size_bytes: u64,
    /// Creation timestamp
    pub created_at: u64,
}

/// Immutable segment reader
pub struct SegmentReader {
    meta: SegmentMeta,
    terms: TermDictionary,
    postings: PostingsReader,
    live_docs: LiveDocs,
    stored: StoredFieldsReader,
}

impl SegmentReader {
    pub fn new(
        meta: SegmentMeta,
        terms: TermDictionary,
        postings: PostingsReader,
        live_docs: LiveDocs,
        stored: StoredFieldsReader,
    ) -> Self {
        Self {
            meta,
            terms,
            postings,
            live_docs,
            stored,
        }
    }

    pub fn meta(&self) -> &SegmentMeta {
        &self.meta
    }

    pub fn id(&self) -> SegmentId {
        self.meta.id
    }

    /// Get a posting iterator for a field/term pair
    pub fn get_postings(&self, field: &str, term: &str) -> io::Result<Option<PostingIterator<'_>>> {
        match self.terms.get(field, term) {
            Some(meta) => Ok(Some(self.postings.get_postings(meta)?)),
            None => Ok(None),
        }
    }

    /// First docno in the term's posting list that is not deleted
    pub fn first_live_posting(&self, field: &str, term: &str) -> io::Result<Option<DocNo>> {
        let Some(postings) = self.get_postings(field, term)? else {
            return Ok(None);
        };
        for posting in postings {
            let docno = posting?;
            if docno.as_u32() >= self.max_doc() {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!(
                        "Posting docno {} beyond segment of {} documents",
                        docno.0,
                        self.max_doc()
                    ),
                ));
            }
            if !self.live_docs.is_deleted(docno) {
                return Ok(Some(docno));
            }
        }
        Ok(None)
    }

    pub fn is_deleted(&self, docno: DocNo) -> bool {
        self.live_docs.is_deleted(docno)
    }

    /// Read the stored fields of a document
    pub fn document(&self, docno: DocNo) -> Result<Document> {
        self.stored.read(docno)
    }

    /// Number of documents, deleted ones included
    pub fn max_doc(&self) -> u32 {
        self.live_docs.max_doc()
    }

    pub fn live_doc_count(&self) -> u32 {
        self.live_docs.live_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segment::{PostingsWriter, StoredFieldsWriter, TermDictionaryBuilder};
    use std::fs;
    use tempfile::TempDir;

    fn create_test_segment(dir: &TempDir) -> SegmentReader {
        let mut postings_writer = PostingsWriter::new();
        let mut term_builder = TermDictionaryBuilder::new();

        postings_writer.start_posting_list();
        postings_writer.add_posting(DocNo(0));
        term_builder.add("id", "a", postings_writer.finish_posting_list(1));

        postings_writer.start_posting_list();
        postings_writer.add_posting(DocNo(1));
        postings_writer.add_posting(DocNo(2));
        term_builder.add("id", "b", postings_writer.finish_posting_list(2));

        postings_writer.start_posting_list();
        postings_writer.add_posting(DocNo(3));
        term_builder.add("id", "c", postings_writer.finish_posting_list(1));

        let mut stored = StoredFieldsWriter::new();
        for id in ["a", "b", "b", "c"] {
            stored
                .append(&Document::new().with_field("id", id))
                .unwrap();
        }
        let (stored_data, pointers) = stored.finish();
        let stored_path = dir.path().join("stored.bin");
        fs::write(&stored_path, stored_data).unwrap();

        let mut live_docs = LiveDocs::new(4);
        live_docs.delete(DocNo(1));
        live_docs.delete(DocNo(3));

        let meta = SegmentMeta {
            id: SegmentId::new(1),
            doc_count: 4,
            live_doc_count: 2,
            size_bytes: 0,
            created_at: 0,
        };

        SegmentReader::new(
            meta,
            term_builder.build().unwrap(),
            PostingsReader::new(postings_writer.into_data()),
            live_docs,
            StoredFieldsReader::open(&stored_path, pointers).unwrap(),
        )
    }

    #[test]
    fn test_segment_reader_basic() {
        let dir = TempDir::new().unwrap();
        let reader = create_test_segment(&dir);

        assert_eq!(reader.id(), SegmentId::new(1));
        assert_eq!(reader.meta().doc_count, 4);
        assert_eq!(reader.max_doc(), 4);
        assert_eq!(reader.live_doc_count(), 2);
    }

    #[test]
    fn test_first_live_posting_skips_deletes() {
        let dir = TempDir::new().unwrap();
        let reader = create_test_segment(&dir);

        // docno 1 is deleted, docno 2 is the first live hit for "b"
        assert_eq!(reader.first_live_posting("id", "b").unwrap(), Some(DocNo(2)));
        assert_eq!(reader.first_live_posting("id", "a").unwrap(), Some(DocNo(0)));
        assert_eq!(reader.first_live_posting("id", "zzz").unwrap(), None);
    }

    #[test]
    fn test_only_deleted_hits_is_none() {
        let dir = TempDir::new().unwrap();
        let reader = create_test_segment(&dir);

        assert!(reader.is_deleted(DocNo(3)));
        assert_eq!(reader.first_live_posting("id", "c").unwrap(), None);
    }

    #[test]
    fn test_stored_document() {
        let dir = TempDir::new().unwrap();
        let reader = create_test_segment(&dir);

        let doc = reader.document(DocNo(0)).unwrap();
        assert_eq!(doc.get_first("id"), Some("a"));
    }
}
