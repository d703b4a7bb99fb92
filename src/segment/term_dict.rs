//! Term dictionary using FST (Finite State Transducer)
//!
//! Keys are `<field>\0<term>` so a single FST covers every field of a
//! segment. The FST value indexes into a parallel [`PostingListMeta`] array.

use std::io;

use fst::{Map, MapBuilder};

use super::types::PostingListMeta;

/// Separator between field name and term inside a dictionary key
pub const FIELD_SEPARATOR: u8 = 0;

/// Build the dictionary key for a field/term pair
pub fn term_key(field: &str, term: &str) -> Vec<u8> {
    let mut key = Vec::with_capacity(field.len() + 1 + term.len());
    key.extend_from_slice(field.as_bytes());
    key.push(FIELD_SEPARATOR);
    key.extend_from_slice(term.as_bytes());
    key
}

/// Check that a field name can be encoded into a dictionary key
pub fn is_valid_field_name(field: &str) -> bool {
    !field.is_empty() && !field.as_bytes().contains(&FIELD_SEPARATOR)
}

/// Immutable term dictionary backed by an FST
pub struct TermDictionary {
    fst: Map<Vec<u8>>,
    metadata: Vec<PostingListMeta>,
}

impl TermDictionary {
    /// Create a term dictionary from FST data and metadata
    pub fn new(fst_data: Vec<u8>, metadata: Vec<PostingListMeta>) -> io::Result<Self> {
        let fst = Map::new(fst_data).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        if fst.len() != metadata.len() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!(
                    "Term dictionary has {} keys but {} metadata entries",
                    fst.len(),
                    metadata.len()
                ),
            ));
        }
        Ok(Self { fst, metadata })
    }

    /// Look up the postings metadata for a literal term of a field
    pub fn get(&self, field: &str, term: &str) -> Option<&PostingListMeta> {
        self.fst
            .get(term_key(field, term))
            .and_then(|idx| self.metadata.get(idx as usize))
    }

    /// Get the number of terms
    pub fn len(&self) -> usize {
        self.metadata.len()
    }

    pub fn is_empty(&self) -> bool {
        self.metadata.is_empty()
    }

    /// Get the raw FST data (for serialization)
    pub fn fst_bytes(&self) -> &[u8] {
        self.fst.as_fst().as_bytes()
    }

    /// Get the metadata array (for serialization)
    pub fn metadata(&self) -> &[PostingListMeta] {
        &self.metadata
    }
}

/// Builder for term dictionaries
pub struct TermDictionaryBuilder {
    terms: Vec<(Vec<u8>, PostingListMeta)>,
}

impl TermDictionaryBuilder {
    pub fn new() -> Self {
        Self { terms: Vec::new() }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            terms: Vec::with_capacity(capacity),
        }
    }

    /// Add a field/term pair with its postings metadata
    pub fn add(&mut self, field: &str, term: &str, meta: PostingListMeta) {
        self.terms.push((term_key(field, term), meta));
    }

    /// Build the term dictionary
    pub fn build(mut self) -> io::Result<TermDictionary> {
        // FST requires sorted input
        self.terms.sort_by(|a, b| a.0.cmp(&b.0));

        let mut fst_builder = MapBuilder::memory();
        let mut metadata = Vec::with_capacity(self.terms.len());

        for (idx, (key, meta)) in self.terms.into_iter().enumerate() {
            fst_builder
                .insert(&key, idx as u64)
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
            metadata.push(meta);
        }

        let fst_data = fst_builder.into_inner().map_err(io::Error::other)?;

        TermDictionary::new(fst_data, metadata)
    }
}

impl Default for TermDictionaryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta(offset: u64, doc_frequency: u32) -> PostingListMeta {
        PostingListMeta {
            offset,
            length: 10,
            doc_frequency,
        }
    }

    #[test]
    fn test_term_dictionary_builder() {
        let mut builder = TermDictionaryBuilder::new();
        builder.add("title", "cherry", meta(20, 1));
        builder.add("id", "a", meta(0, 1));
        builder.add("id", "b", meta(10, 2));

        let dict = builder.build().unwrap();

        assert_eq!(dict.len(), 3);
        assert!(dict.get("id", "a").is_some());
        assert!(dict.get("title", "a").is_none());
        assert_eq!(dict.get("id", "b").unwrap().doc_frequency, 2);
        assert_eq!(dict.get("title", "cherry").unwrap().offset, 20);
    }

    #[test]
    fn test_field_scoping() {
        let mut builder = TermDictionaryBuilder::new();
        builder.add("id", "x", meta(0, 1));
        let dict = builder.build().unwrap();

        assert!(dict.get("id", "x").is_some());
        assert!(dict.get("i", "d\0x").is_none());
        assert!(dict.get("idx", "").is_none());
        assert!(dict.get("id", "x\0").is_none());
    }

    #[test]
    fn test_field_name_validation() {
        assert!(is_valid_field_name("id"));
        assert!(!is_valid_field_name(""));
        assert!(!is_valid_field_name("bad\0name"));
    }

    #[test]
    fn test_rejects_mismatched_metadata() {
        let mut builder = TermDictionaryBuilder::new();
        builder.add("id", "a", meta(0, 1));
        let dict = builder.build().unwrap();

        let result = TermDictionary::new(dict.fst_bytes().to_vec(), Vec::new());
        assert!(result.is_err());
    }
}
