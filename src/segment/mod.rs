//! Segment-based inverted index storage
//!
//! An index directory holds a manifest plus one sub-directory per immutable
//! segment.
//!
//! # Architecture
//!
//! - `TermDictionary`: FST from `<field>\0<term>` to postings metadata
//! - `PostingsReader`: block-encoded posting lists
//! - `LiveDocs`: per-segment delete bitset
//! - `StoredFieldsReader`: checksummed stored-field records
//! - `SegmentStore`: directory layout, manifest load/save
//! - `IndexWriter`: appends new segments

mod types;
mod postings;
mod term_dict;
mod live_docs;
mod stored;
mod reader;
mod manifest;
mod store;
mod writer;

pub use types::*;
pub use postings::*;
pub use term_dict::*;
pub use live_docs::*;
pub use stored::*;
pub use reader::*;
pub use manifest::{ManifestEntry, SegmentManifest};
pub use store::*;
pub use writer::*;
