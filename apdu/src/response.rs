// Copyright (c) 2023-2024 The Spacemesh Ledger Contributors

//! Raw APDU answers and sequential response decoding

use crate::{status::StatusCode, ApduError};

/// Status word length at the end of every answer
pub const STATUS_LEN: usize = 2;

/// Raw device answer, split into data and status word
///
/// ```text
/// +----------------------------+-----+-----+
/// |        DATA (variable)     | SW1 | SW2 |
/// +----------------------------+-----+-----+
/// ```
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct Answer<'a> {
    data: &'a [u8],
    status: u16,
}

impl<'a> Answer<'a> {
    /// Split a raw answer, failing if no status word is present
    pub fn from_bytes(raw: &'a [u8]) -> Result<Self, ApduError> {
        if raw.len() < STATUS_LEN {
            return Err(ApduError::InvalidLength);
        }

        let (data, sw) = raw.split_at(raw.len() - STATUS_LEN);

        Ok(Self {
            data,
            status: u16::from_be_bytes([sw[0], sw[1]]),
        })
    }

    /// Raw status word
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Parsed status word, if known
    pub fn status_code(&self) -> Option<StatusCode> {
        StatusCode::try_from(self.status).ok()
    }

    /// Check for a success status
    pub fn is_ok(&self) -> bool {
        self.status == StatusCode::Ok as u16
    }

    /// Answer data, excluding the status word
    pub fn data(&self) -> &'a [u8] {
        self.data
    }
}

/// Sequential reader over answer data.
///
/// Reads past the end of the buffer fail with [ApduError::InvalidLength]
/// rather than truncating.
#[derive(Clone, Debug)]
pub struct ResponseReader<'a> {
    buff: &'a [u8],
    index: usize,
}

impl<'a> ResponseReader<'a> {
    pub fn new(buff: &'a [u8]) -> Self {
        Self { buff, index: 0 }
    }

    /// Read exactly `n` bytes
    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8], ApduError> {
        if self.remaining() < n {
            return Err(ApduError::InvalidLength);
        }

        let d = &self.buff[self.index..][..n];
        self.index += n;

        Ok(d)
    }

    /// Read a fixed length array
    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N], ApduError> {
        let mut a = [0u8; N];
        a.copy_from_slice(self.read_bytes(N)?);
        Ok(a)
    }

    /// Read a single byte
    pub fn read_u8(&mut self) -> Result<u8, ApduError> {
        Ok(self.read_bytes(1)?[0])
    }

    /// Consume all remaining bytes
    pub fn read_remaining(&mut self) -> &'a [u8] {
        let d = &self.buff[self.index..];
        self.index = self.buff.len();
        d
    }

    /// Number of unread bytes
    pub fn remaining(&self) -> usize {
        self.buff.len() - self.index
    }

    /// Current read position
    pub fn position(&self) -> usize {
        self.index
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn split_answer() {
        let a = Answer::from_bytes(&[0x01, 0x02, 0x90, 0x00]).unwrap();
        assert!(a.is_ok());
        assert_eq!(a.data(), &[0x01, 0x02]);
        assert_eq!(a.status_code(), Some(StatusCode::Ok));

        let a = Answer::from_bytes(&[0x69, 0x85]).unwrap();
        assert!(!a.is_ok());
        assert!(a.data().is_empty());
        assert_eq!(a.status(), 0x6985);

        assert!(Answer::from_bytes(&[0x90]).is_err());
    }

    #[test]
    fn sequential_reads() {
        let d = [1u8, 2, 3, 4, 5, 6];
        let mut r = ResponseReader::new(&d);

        assert_eq!(r.read_u8().unwrap(), 1);
        assert_eq!(r.read_array::<2>().unwrap(), [2, 3]);
        assert_eq!(r.remaining(), 3);

        // Over-length reads fail without consuming data
        assert!(r.read_bytes(4).is_err());
        assert_eq!(r.position(), 3);

        assert_eq!(r.read_remaining(), &[4, 5, 6]);
        assert_eq!(r.remaining(), 0);
        assert!(r.read_remaining().is_empty());
    }
}
