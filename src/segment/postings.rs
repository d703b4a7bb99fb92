//! Postings format with block-based compression
//!
//! A posting list is stored as a vbyte block count followed by blocks of at
//! most [`BLOCK_SIZE`] postings. Each block holds:
//! - vbyte posting count
//! - bitpacked docno deltas (relative to the previous block's last docno)
//!
//! The decoded docno count must match the list's `doc_frequency`.

use std::io;

use super::types::{DocNo, PostingBlock, PostingListMeta};

/// Variable-byte encoding for integers
pub fn encode_vbyte(value: u32, output: &mut Vec<u8>) {
    let mut v = value;
    loop {
        let byte = (v & 0x7F) as u8;
        v >>= 7;
        if v == 0 {
            output.push(byte | 0x80); // high bit marks the last byte
            break;
        } else {
            output.push(byte);
        }
    }
}

/// Decode a variable-byte encoded integer
pub fn decode_vbyte(input: &[u8], pos: &mut usize) -> io::Result<u32> {
    let mut result: u32 = 0;
    let mut shift = 0;

    loop {
        if *pos >= input.len() {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "Unexpected end of vbyte",
            ));
        }

        let byte = input[*pos];
        *pos += 1;

        result |= ((byte & 0x7F) as u32) << shift;

        if byte & 0x80 != 0 {
            return Ok(result);
        }

        shift += 7;
        if shift > 28 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "VByte value too large",
            ));
        }
    }
}

/// Pack integers using the minimum number of bits needed for the max value
pub fn bitpack_encode(values: &[u32], output: &mut Vec<u8>) {
    let Some(max_val) = values.iter().copied().max() else {
        output.push(0);
        return;
    };

    let bits_needed = if max_val == 0 {
        1
    } else {
        32 - max_val.leading_zeros()
    } as u8;

    output.push(bits_needed);

    let mut current: u64 = 0;
    let mut bits_in_current = 0;

    for &value in values {
        current |= (value as u64) << bits_in_current;
        bits_in_current += bits_needed as u32;

        while bits_in_current >= 8 {
            output.push(current as u8);
            current >>= 8;
            bits_in_current -= 8;
        }
    }

    if bits_in_current > 0 {
        output.push(current as u8);
    }
}

/// Decode bitpacked integers
pub fn bitpack_decode(input: &[u8], pos: &mut usize, count: usize) -> io::Result<Vec<u32>> {
    if *pos >= input.len() {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "Unexpected end of bitpack",
        ));
    }

    let bits_needed = input[*pos] as u32;
    *pos += 1;

    if bits_needed == 0 {
        return Ok(vec![0; count]);
    }
    if bits_needed > 32 {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("Invalid bitpack width {}", bits_needed),
        ));
    }

    let total_bits = count as u64 * bits_needed as u64;
    let bytes_needed = total_bits.div_ceil(8) as usize;

    if *pos + bytes_needed > input.len() {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "Not enough bytes for bitpack",
        ));
    }

    let mut values = Vec::with_capacity(count);
    let mut current: u64 = 0;
    let mut bits_available = 0;
    let mask = (1u64 << bits_needed) - 1;
    let end = *pos + bytes_needed;

    for _ in 0..count {
        while bits_available < bits_needed {
            if *pos < end {
                current |= (input[*pos] as u64) << bits_available;
                *pos += 1;
            }
            bits_available += 8;
        }

        values.push((current & mask) as u32);
        current >>= bits_needed;
        bits_available -= bits_needed;
    }

    *pos = end;
    Ok(values)
}

/// Writer for posting lists
pub struct PostingsWriter {
    /// Encoded blocks for the current posting list
    block_data: Vec<u8>,
    block_count: u32,
    /// Last docno of the previous block, base for delta encoding
    last_docno: u32,
    current_block: PostingBlock,
    /// Final output data
    data: Vec<u8>,
}

impl PostingsWriter {
    pub fn new() -> Self {
        Self {
            block_data: Vec::new(),
            block_count: 0,
            last_docno: 0,
            current_block: PostingBlock::new(),
            data: Vec::new(),
        }
    }

    /// Start writing a new posting list
    pub fn start_posting_list(&mut self) {
        self.block_data.clear();
        self.block_count = 0;
        self.last_docno = 0;
        self.current_block = PostingBlock::new();
    }

    /// Add a docno to the current list. Docnos must be strictly ascending.
    pub fn add_posting(&mut self, docno: DocNo) {
        self.current_block.push(docno);

        if self.current_block.is_full() {
            self.flush_block();
        }
    }

    /// Finish writing a posting list and return metadata
    pub fn finish_posting_list(&mut self, doc_frequency: u32) -> PostingListMeta {
        if !self.current_block.is_empty() {
            self.flush_block();
        }

        let offset = self.data.len() as u64;
        encode_vbyte(self.block_count, &mut self.data);
        self.data.extend_from_slice(&self.block_data);
        let length = self.data.len() as u64 - offset;

        PostingListMeta {
            offset,
            length,
            doc_frequency,
        }
    }

    /// Take the data (consuming the writer)
    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    fn flush_block(&mut self) {
        if self.current_block.is_empty() {
            return;
        }

        encode_vbyte(self.current_block.len() as u32, &mut self.block_data);

        let mut deltas = Vec::with_capacity(self.current_block.len());
        let mut prev = self.last_docno;
        for docno in &self.current_block.docnos {
            deltas.push(docno.0 - prev);
            prev = docno.0;
        }
        bitpack_encode(&deltas, &mut self.block_data);

        self.last_docno = self.current_block.max_docno.0;
        self.block_count += 1;
        self.current_block = PostingBlock::new();
    }
}

impl Default for PostingsWriter {
    fn default() -> Self {
        Self::new()
    }
}

/// Reader for posting lists
pub struct PostingsReader {
    data: Vec<u8>,
}

impl PostingsReader {
    pub fn new(data: Vec<u8>) -> Self {
        Self { data }
    }

    /// Get an iterator over postings for a term
    pub fn get_postings(&self, meta: &PostingListMeta) -> io::Result<PostingIterator<'_>> {
        let start = meta.offset as usize;
        let end = meta
            .offset
            .checked_add(meta.length)
            .map(|e| e as usize)
            .filter(|&e| e <= self.data.len() && start <= e)
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::InvalidData,
                    "Posting list extends beyond data",
                )
            })?;

        PostingIterator::new(&self.data[start..end], meta.doc_frequency)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Iterator over the docnos of one posting list, ascending.
///
/// Decoding errors are yielded once and end the iteration.
pub struct PostingIterator<'a> {
    data: &'a [u8],
    pos: usize,
    blocks_remaining: u32,
    current_block: Vec<DocNo>,
    block_pos: usize,
    last_docno: u32,
    /// Docnos announced by the list's metadata
    expected: u32,
    decoded: u32,
    failed: bool,
}

impl<'a> PostingIterator<'a> {
    pub fn new(data: &'a [u8], doc_frequency: u32) -> io::Result<Self> {
        let mut pos = 0;
        let blocks_remaining = decode_vbyte(data, &mut pos)?;

        Ok(Self {
            data,
            pos,
            blocks_remaining,
            current_block: Vec::new(),
            block_pos: 0,
            last_docno: 0,
            expected: doc_frequency,
            decoded: 0,
            failed: false,
        })
    }

    fn load_next_block(&mut self) -> io::Result<bool> {
        if self.blocks_remaining == 0 {
            if self.decoded != self.expected {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!(
                        "Posting list holds {} docnos, metadata says {}",
                        self.decoded, self.expected
                    ),
                ));
            }
            return Ok(false);
        }

        let count = decode_vbyte(self.data, &mut self.pos)? as usize;
        if count == 0 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "Empty posting block",
            ));
        }

        let deltas = bitpack_decode(self.data, &mut self.pos, count)?;

        self.current_block.clear();
        let mut docno = self.last_docno;
        for delta in deltas {
            docno = docno.checked_add(delta).ok_or_else(|| {
                io::Error::new(io::ErrorKind::InvalidData, "Docno delta overflow")
            })?;
            self.current_block.push(DocNo(docno));
        }

        self.last_docno = docno;
        self.decoded = self.decoded.saturating_add(count as u32);
        self.block_pos = 0;
        self.blocks_remaining -= 1;
        Ok(true)
    }
}

impl Iterator for PostingIterator<'_> {
    type Item = io::Result<DocNo>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        if self.block_pos >= self.current_block.len() {
            match self.load_next_block() {
                Ok(true) => {}
                Ok(false) => return None,
                Err(e) => {
                    self.failed = true;
                    return Some(Err(e));
                }
            }
        }

        let result = self.current_block.get(self.block_pos).copied();
        self.block_pos += 1;
        result.map(Ok)
    }
}
