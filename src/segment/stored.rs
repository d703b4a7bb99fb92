//! Stored-field records for a segment.
//!
//! Record format in `stored.bin`:
//! - u32 length (little endian)
//! - u32 crc32 of payload
//! - bincode-encoded [`Document`]
//!
//! `stored.idx` holds one [`RecordPointer`] per docno. Records are read and
//! verified lazily, so a damaged record only affects its own document.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

use crc32fast::Hasher;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use super::types::DocNo;
use crate::error::{Result, SegscopeError};
use crate::models::Document;

const HEADER_LEN: u64 = 8;

/// Location of one stored record inside `stored.bin`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordPointer {
    pub offset: u64,
    pub len: u32,
    pub crc32: u32,
}

impl RecordPointer {
    pub fn new(offset: u64, len: u32, crc32: u32) -> Self {
        Self { offset, len, crc32 }
    }
}

fn checksum(payload: &[u8]) -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(payload);
    hasher.finalize()
}

/// Accumulates stored records in memory until the segment is written
#[derive(Default)]
pub struct StoredFieldsWriter {
    data: Vec<u8>,
    pointers: Vec<RecordPointer>,
}

impl StoredFieldsWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a document and return its pointer
    pub fn append(&mut self, doc: &Document) -> Result<RecordPointer> {
        let payload = bincode::serialize(doc)?;
        let len = u32::try_from(payload.len())
            .map_err(|_| SegscopeError::Corrupt("stored document exceeds 4 GiB".to_string()))?;
        let crc32 = checksum(&payload);
        let offset = self.data.len() as u64;

        self.data.extend_from_slice(&len.to_le_bytes());
        self.data.extend_from_slice(&crc32.to_le_bytes());
        self.data.extend_from_slice(&payload);

        let ptr = RecordPointer::new(offset, len, crc32);
        self.pointers.push(ptr);
        Ok(ptr)
    }

    pub fn len(&self) -> usize {
        self.pointers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pointers.is_empty()
    }

    /// Consume the writer, returning the record log and its index
    pub fn finish(self) -> (Vec<u8>, Vec<RecordPointer>) {
        (self.data, self.pointers)
    }
}

/// Random-access reader over a segment's stored records
pub struct StoredFieldsReader {
    file: Mutex<File>,
    /// Size of `stored.bin` when opened; no record may reach past it
    file_len: u64,
    pointers: Vec<RecordPointer>,
}

impl StoredFieldsReader {
    pub fn open(path: impl AsRef<Path>, pointers: Vec<RecordPointer>) -> Result<Self> {
        let file = File::open(path)?;
        let file_len = file.metadata()?.len();
        Ok(Self {
            file: Mutex::new(file),
            file_len,
            pointers,
        })
    }

    /// Read and verify the stored document for a docno
    pub fn read(&self, docno: DocNo) -> Result<Document> {
        let ptr = *self.pointers.get(docno.as_usize()).ok_or_else(|| {
            SegscopeError::Corrupt(format!("no stored record for docno {}", docno.0))
        })?;

        let mut header = [0u8; HEADER_LEN as usize];
        let payload = {
            let mut file = self.file.lock();
            file.seek(SeekFrom::Start(ptr.offset))?;
            file.read_exact(&mut header)?;

            let len = u32::from_le_bytes([header[0], header[1], header[2], header[3]]);
            if len != ptr.len {
                return Err(SegscopeError::Corrupt(format!(
                    "record length mismatch at offset {}: expected {}, found {}",
                    ptr.offset, ptr.len, len
                )));
            }
            let end = ptr.offset.saturating_add(HEADER_LEN + len as u64);
            if end > self.file_len {
                return Err(SegscopeError::Corrupt(format!(
                    "record at offset {} of {} bytes runs past end of log ({} bytes)",
                    ptr.offset, len, self.file_len
                )));
            }

            let mut payload = vec![0u8; len as usize];
            file.read_exact(&mut payload)?;
            payload
        };

        let stored_crc = u32::from_le_bytes([header[4], header[5], header[6], header[7]]);
        let crc = checksum(&payload);
        if crc != stored_crc || crc != ptr.crc32 {
            return Err(SegscopeError::Corrupt(format!(
                "checksum mismatch at offset {}",
                ptr.offset
            )));
        }

        Ok(bincode::deserialize(&payload)?)
    }
}
