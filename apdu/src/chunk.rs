// Copyright (c) 2023-2024 The Spacemesh Ledger Contributors

//! Payload chunking for multi-exchange instructions
//!
//! The derivation path is carried at the start of the first chunk, followed
//! by as much of the payload as fits. Remaining payload bytes are split into
//! chunks of `chunk_size` bytes. A payload that exactly fills the last chunk
//! does not produce an additional empty chunk, and an empty payload still
//! produces a single chunk carrying the path.

use alloc::vec::Vec;

use crate::{
    command::{header, MAX_DATA_LEN},
    path::{Path, PATH_LEN},
    ApduError, ApduHeader, Instruction,
};

/// Smallest usable chunk size, the path plus one payload byte
pub const MIN_CHUNK_SIZE: usize = PATH_LEN + 1;

/// Maximum number of chunks, limited by the single byte `p2` field
pub const MAX_CHUNKS: usize = u8::MAX as usize;

/// Single chunk of a larger payload
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Chunk {
    /// 1-indexed position of this chunk
    pub ordinal: u8,
    /// Total number of chunks
    pub total: u8,
    /// Chunk data
    pub body: Vec<u8>,
}

impl Chunk {
    /// Command header for sending this chunk
    pub fn header(&self, ins: Instruction) -> ApduHeader {
        header(ins, self.ordinal, self.total)
    }

    /// Check whether this is the first chunk
    pub fn is_first(&self) -> bool {
        self.ordinal == 1
    }

    /// Check whether this is the final chunk
    pub fn is_last(&self) -> bool {
        self.ordinal == self.total
    }
}

/// Split a path-prefixed payload into chunks of at most `chunk_size` bytes
pub fn chunks(path: &Path, payload: &[u8], chunk_size: usize) -> Result<Vec<Chunk>, ApduError> {
    if !(MIN_CHUNK_SIZE..=MAX_DATA_LEN).contains(&chunk_size) {
        return Err(ApduError::InvalidLength);
    }

    let n = (PATH_LEN + payload.len() + chunk_size - 1) / chunk_size;
    if n > MAX_CHUNKS {
        return Err(ApduError::InvalidLength);
    }

    let mut v = Vec::with_capacity(n);

    // First chunk carries the path and leading payload bytes
    let first = payload.len().min(chunk_size - PATH_LEN);
    let mut body = Vec::with_capacity(PATH_LEN + first);
    body.extend_from_slice(&path.to_bytes());
    body.extend_from_slice(&payload[..first]);
    v.push(body);

    for c in payload[first..].chunks(chunk_size) {
        v.push(c.to_vec());
    }

    debug_assert_eq!(v.len(), n);

    let total = v.len() as u8;
    let chunks = v
        .into_iter()
        .enumerate()
        .map(|(i, body)| Chunk {
            ordinal: i as u8 + 1,
            total,
            body,
        })
        .collect();

    Ok(chunks)
}
