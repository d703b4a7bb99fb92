use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crc32fast::Hasher;
use tracing::debug;

use crate::error::{Result, SegscopeError};
use crate::segment::live_docs::LiveDocs;
use crate::segment::manifest::{ManifestEntry, SegmentManifest};
use crate::segment::postings::PostingsReader;
use crate::segment::reader::SegmentReader;
use crate::segment::stored::{RecordPointer, StoredFieldsReader};
use crate::segment::term_dict::TermDictionary;
use crate::segment::types::{PostingListMeta, SegmentId};

pub const MANIFEST_FILE: &str = "segments.manifest";
const MANIFEST_TMP_FILE: &str = "segments.manifest.tmp";

const TERMS_FST_FILE: &str = "terms.fst";
const TERMS_META_FILE: &str = "terms.meta";
const POSTINGS_FILE: &str = "postings.bin";
const LIVE_DOCS_FILE: &str = "live.bin";
const STORED_FILE: &str = "stored.bin";
const STORED_INDEX_FILE: &str = "stored.idx";

/// Serialized files of one segment, ready to be written
pub struct SegmentFiles {
    pub id: SegmentId,
    pub fst_data: Vec<u8>,
    pub term_metadata: Vec<PostingListMeta>,
    pub postings_data: Vec<u8>,
    pub live_docs_data: Vec<u8>,
    pub stored_data: Vec<u8>,
    pub stored_index: Vec<RecordPointer>,
}

impl SegmentFiles {
    /// Checksum over the index structures of the segment.
    ///
    /// Stored records are excluded: each carries its own CRC32 and is
    /// verified when read.
    pub fn checksum(&self) -> Result<u64> {
        let term_meta_bytes = bincode::serialize(&self.term_metadata)?;
        Ok(structure_checksum(
            &self.fst_data,
            &term_meta_bytes,
            &self.postings_data,
            &self.live_docs_data,
        ))
    }

    pub fn size_bytes(&self) -> u64 {
        (self.fst_data.len()
            + self.postings_data.len()
            + self.live_docs_data.len()
            + self.stored_data.len()) as u64
    }
}

fn structure_checksum(fst: &[u8], term_meta: &[u8], postings: &[u8], live_docs: &[u8]) -> u64 {
    let mut hasher = Hasher::new();
    hasher.update(fst);
    hasher.update(term_meta);
    hasher.update(postings);
    hasher.update(live_docs);
    hasher.finalize() as u64
}

fn invalid_data(e: impl std::fmt::Display) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, e.to_string())
}

/// Segment files and manifest of one index directory.
pub struct SegmentStore {
    base_dir: PathBuf,
}

impl SegmentStore {
    /// Attach to an existing index directory without creating anything
    pub fn open<P: AsRef<Path>>(base_dir: P) -> io::Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        if !base_dir.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("{} is not a directory", base_dir.display()),
            ));
        }
        Ok(Self { base_dir })
    }

    /// Create (if needed) and attach to an index directory
    pub fn create<P: AsRef<Path>>(base_dir: P) -> io::Result<Self> {
        fs::create_dir_all(&base_dir)?;
        Ok(Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn segment_dir(&self, id: SegmentId) -> PathBuf {
        self.base_dir.join(id.to_string())
    }

    pub fn write_segment(&self, files: &SegmentFiles) -> Result<()> {
        let dir = self.segment_dir(files.id);
        fs::create_dir_all(&dir)?;

        fs::write(dir.join(TERMS_FST_FILE), &files.fst_data)?;
        fs::write(
            dir.join(TERMS_META_FILE),
            bincode::serialize(&files.term_metadata)?,
        )?;
        fs::write(dir.join(POSTINGS_FILE), &files.postings_data)?;
        fs::write(dir.join(LIVE_DOCS_FILE), &files.live_docs_data)?;
        fs::write(dir.join(STORED_FILE), &files.stored_data)?;
        fs::write(
            dir.join(STORED_INDEX_FILE),
            bincode::serialize(&files.stored_index)?,
        )?;
        Ok(())
    }

    /// Load a segment listed in the manifest, validating it against its entry
    pub fn read_segment(&self, entry: &ManifestEntry) -> Result<SegmentReader> {
        let meta = entry.meta.clone();
        let dir = self.segment_dir(meta.id);

        let fst_data = fs::read(dir.join(TERMS_FST_FILE))?;
        let term_meta_bytes = fs::read(dir.join(TERMS_META_FILE))?;
        let postings = fs::read(dir.join(POSTINGS_FILE))?;
        let live_docs_bytes = fs::read(dir.join(LIVE_DOCS_FILE))?;

        let checksum =
            structure_checksum(&fst_data, &term_meta_bytes, &postings, &live_docs_bytes);
        if checksum != entry.checksum {
            return Err(SegscopeError::Corrupt(format!(
                "{} checksum mismatch: manifest has {:#x}, files hash to {:#x}",
                meta.id, entry.checksum, checksum
            )));
        }

        let term_meta: Vec<PostingListMeta> = bincode::deserialize(&term_meta_bytes)?;
        let terms = TermDictionary::new(fst_data, term_meta)?;
        let live_docs = LiveDocs::deserialize(&live_docs_bytes)?;

        if live_docs.max_doc() != meta.doc_count {
            return Err(SegscopeError::Corrupt(format!(
                "{} holds {} documents, manifest says {}",
                meta.id,
                live_docs.max_doc(),
                meta.doc_count
            )));
        }

        let stored_index: Vec<RecordPointer> =
            bincode::deserialize(&fs::read(dir.join(STORED_INDEX_FILE))?)?;
        if stored_index.len() != meta.doc_count as usize {
            return Err(SegscopeError::Corrupt(format!(
                "{} stored index has {} records for {} documents",
                meta.id,
                stored_index.len(),
                meta.doc_count
            )));
        }
        let stored = StoredFieldsReader::open(dir.join(STORED_FILE), stored_index)?;

        debug!(
            segment = %meta.id,
            docs = meta.doc_count,
            terms = terms.len(),
            deleted = live_docs.deleted_count(),
            "loaded segment"
        );

        Ok(SegmentReader::new(
            meta,
            terms,
            PostingsReader::new(postings),
            live_docs,
            stored,
        ))
    }

    /// Replace the manifest atomically (write temp file, then rename)
    pub fn save_manifest(&self, manifest: &SegmentManifest) -> io::Result<()> {
        let bytes = manifest.to_bincode()?;
        let tmp = self.base_dir.join(MANIFEST_TMP_FILE);
        fs::write(&tmp, bytes)?;
        fs::rename(tmp, self.base_dir.join(MANIFEST_FILE))?;
        Ok(())
    }

    /// Load the manifest, `None` when the directory has none yet
    pub fn load_manifest(&self) -> io::Result<Option<SegmentManifest>> {
        let path = self.base_dir.join(MANIFEST_FILE);
        if !path.exists() {
            return Ok(None);
        }
        let bytes = fs::read(path)?;
        let manifest = SegmentManifest::from_bincode(&bytes)?;
        if !manifest.is_supported() {
            return Err(invalid_data(format!(
                "unsupported manifest version {} (this build reads up to {})",
                manifest.version,
                SegmentManifest::VERSION
            )));
        }
        Ok(Some(manifest))
    }
}
