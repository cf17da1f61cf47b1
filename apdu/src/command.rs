// Copyright (c) 2023-2024 The Spacemesh Ledger Contributors

//! Command APDU framing
//!
//! ```text
//! +-----+-----+----+----+----+-------------------+
//! | CLA | INS | P1 | P2 | LC |  DATA (LC bytes)  |
//! +-----+-----+----+----+----+-------------------+
//! ```

use alloc::vec::Vec;

use encdec::{Decode, DecodeOwned, Encode};

use crate::{
    helpers::{put, put_u8},
    ApduError, ApduHeader, Instruction, SPACEMESH_APDU_CLA,
};

/// Maximum command data length (single byte LC)
pub const MAX_DATA_LEN: usize = u8::MAX as usize;

/// Build a Spacemesh [ApduHeader] for the provided instruction
pub fn header(ins: Instruction, p1: u8, p2: u8) -> ApduHeader {
    ApduHeader {
        cla: SPACEMESH_APDU_CLA,
        ins: ins as u8,
        p1,
        p2,
    }
}

/// Command APDU with borrowed data
#[derive(Clone, PartialEq, Debug)]
pub struct Command<'a> {
    pub header: ApduHeader,
    pub data: &'a [u8],
}

impl<'a> Command<'a> {
    pub fn new(header: ApduHeader, data: &'a [u8]) -> Self {
        Self { header, data }
    }

    /// Encode command to a new buffer
    pub fn to_vec(&self) -> Result<Vec<u8>, ApduError> {
        let mut buff = alloc::vec![0u8; self.encode_len()?];
        let n = self.encode(&mut buff)?;
        buff.truncate(n);
        Ok(buff)
    }
}

impl<'a> Encode for Command<'a> {
    type Error = ApduError;

    fn encode_len(&self) -> Result<usize, Self::Error> {
        Ok(4 + 1 + self.data.len())
    }

    fn encode(&self, buff: &mut [u8]) -> Result<usize, Self::Error> {
        if self.data.len() > MAX_DATA_LEN {
            return Err(ApduError::InvalidLength);
        }

        let mut index = 0;

        index += self.header.encode(&mut buff[index..])?;
        index += put_u8(&mut buff[index..], self.data.len() as u8)?;
        index += put(&mut buff[index..], self.data)?;

        Ok(index)
    }
}

impl<'a> Decode<'a> for Command<'a> {
    type Output = Self;
    type Error = ApduError;

    fn decode(buff: &'a [u8]) -> Result<(Self, usize), ApduError> {
        if buff.len() < 5 {
            return Err(ApduError::InvalidLength);
        }

        let (header, mut index) = ApduHeader::decode_owned(buff)?;

        let len = buff[index] as usize;
        index += 1;

        if buff.len() < index + len {
            return Err(ApduError::InvalidLength);
        }

        let data = &buff[index..][..len];
        index += len;

        Ok((Self { header, data }, index))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn command_framing() {
        let data = [0xaa, 0xbb, 0xcc];
        let c = Command::new(header(Instruction::Sign, 1, 3), &data);

        let b = c.to_vec().unwrap();
        assert_eq!(b, [0x45, 0x02, 0x01, 0x03, 0x03, 0xaa, 0xbb, 0xcc]);

        let (d, n) = Command::decode(&b).unwrap();
        assert_eq!(n, b.len());
        assert_eq!(d, c);
    }

    #[test]
    fn command_limits() {
        let data = [0u8; 256];
        let c = Command::new(header(Instruction::Sign, 1, 1), &data);
        assert!(c.to_vec().is_err());

        assert!(Command::decode(&[0x45, 0x02, 0x01, 0x01, 0x04, 0x00]).is_err());
    }
}
