//! Per-segment delete bitset
//!
//! Every segment allocates dense docnos in `[0..max_doc)`. Deleted documents
//! keep their docno, postings and stored fields; only this bitset marks them.

use std::io;

use roaring::RoaringBitmap;

use super::postings::{decode_vbyte, encode_vbyte};
use super::types::DocNo;

/// Document count plus delete bitset for one segment
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LiveDocs {
    max_doc: u32,
    deleted: RoaringBitmap,
}

impl LiveDocs {
    pub fn new(max_doc: u32) -> Self {
        Self {
            max_doc,
            deleted: RoaringBitmap::new(),
        }
    }

    /// Mark a docno as deleted. Returns false when the docno is out of range.
    pub fn delete(&mut self, docno: DocNo) -> bool {
        if docno.as_u32() >= self.max_doc {
            return false;
        }
        self.deleted.insert(docno.as_u32());
        true
    }

    /// Check if a docno is deleted
    pub fn is_deleted(&self, docno: DocNo) -> bool {
        self.deleted.contains(docno.as_u32())
    }

    /// Number of documents, deleted ones included
    pub fn max_doc(&self) -> u32 {
        self.max_doc
    }

    pub fn live_count(&self) -> u32 {
        self.max_doc - self.deleted.len() as u32
    }

    pub fn deleted_count(&self) -> u32 {
        self.deleted.len() as u32
    }

    /// Serialize to bytes: vbyte max_doc, vbyte bitmap length, roaring bitmap
    pub fn serialize(&self) -> io::Result<Vec<u8>> {
        let mut output = Vec::new();
        encode_vbyte(self.max_doc, &mut output);

        let mut delete_bytes = Vec::with_capacity(self.deleted.serialized_size());
        self.deleted.serialize_into(&mut delete_bytes)?;
        encode_vbyte(delete_bytes.len() as u32, &mut output);
        output.extend(delete_bytes);

        Ok(output)
    }

    /// Deserialize from bytes
    pub fn deserialize(data: &[u8]) -> io::Result<Self> {
        let mut pos = 0;
        let max_doc = decode_vbyte(data, &mut pos)?;
        let delete_len = decode_vbyte(data, &mut pos)? as usize;

        let bitmap_bytes = data.get(pos..pos + delete_len).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "Not enough data for delete bitset",
            )
        })?;
        let deleted = RoaringBitmap::deserialize_from(bitmap_bytes)?;

        if let Some(max_deleted) = deleted.max() {
            if max_deleted >= max_doc {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!(
                        "Deleted docno {} is outside segment of {} documents",
                        max_deleted, max_doc
                    ),
                ));
            }
        }

        Ok(Self { max_doc, deleted })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_live_docs_delete() {
        let mut live = LiveDocs::new(3);
        let docno = DocNo::new(1);

        assert!(!live.is_deleted(docno));
        assert!(live.delete(docno));
        assert!(live.is_deleted(docno));
        assert_eq!(live.max_doc(), 3);
        assert_eq!(live.live_count(), 2);
        assert_eq!(live.deleted_count(), 1);
    }

    #[test]
    fn test_delete_out_of_range() {
        let mut live = LiveDocs::new(2);
        assert!(!live.delete(DocNo::new(2)));
        assert_eq!(live.deleted_count(), 0);
        assert_eq!(live.live_count(), 2);
    }

    #[test]
    fn test_live_docs_serialization() {
        let mut live = LiveDocs::new(10);
        live.delete(DocNo::new(2));
        live.delete(DocNo::new(9));

        let data = live.serialize().unwrap();
        let restored = LiveDocs::deserialize(&data).unwrap();

        assert_eq!(restored, live);
        assert!(restored.is_deleted(DocNo::new(9)));
        assert_eq!(restored.live_count(), 8);
    }

    #[test]
    fn test_rejects_deleted_beyond_max_doc() {
        let mut live = LiveDocs::new(10);
        live.delete(DocNo::new(9));
        let mut data = live.serialize().unwrap();
        // Shrink max_doc to 5 (single vbyte byte)
        data[0] = 5 | 0x80;

        assert!(LiveDocs::deserialize(&data).is_err());
    }

    #[test]
    fn test_truncated_bitset() {
        let live = LiveDocs::new(4);
        let data = live.serialize().unwrap();
        assert!(LiveDocs::deserialize(&data[..data.len() - 1]).is_err());
    }
}
