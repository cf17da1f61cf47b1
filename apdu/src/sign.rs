// Copyright (c) 2023-2024 The Spacemesh Ledger Contributors

//! Message signing APDUs

use alloc::vec::Vec;

use encdec::{Decode, Encode};
use num_enum::TryFromPrimitive;
use strum::{Display, EnumIter, EnumString};

use crate::{
    helpers::{put, put_u8},
    response::ResponseReader,
    ApduError,
};

/// Signing domain, identifies the kind of message being signed
#[derive(
    Copy, Clone, PartialEq, Eq, Debug, Display, EnumString, EnumIter, TryFromPrimitive,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
#[repr(u8)]
pub enum Domain {
    Atx = 0,
    Proposal = 1,
    Ballot = 2,
    Hare = 3,
    Poet = 4,
    BeaconFirstMsg = 10,
    BeaconFollowupMsg = 11,
}

/// Message to be signed by the device
///
/// ## Encoding:
/// ```text
/// +---------------------+--------+----------------------+
/// | PREFIX (variable)   | DOMAIN |  MESSAGE (variable)  |
/// +---------------------+--------+----------------------+
/// ```
///
/// Field lengths are not transmitted, the payload is chunked as-is.
#[derive(Clone, PartialEq, Debug)]
pub struct SignPayload<'a> {
    /// Network / genesis prefix
    pub prefix: &'a [u8],
    /// Message domain
    pub domain: Domain,
    /// Message bytes
    pub message: &'a [u8],
}

impl<'a> SignPayload<'a> {
    /// Create a new signing payload
    pub fn new(prefix: &'a [u8], domain: Domain, message: &'a [u8]) -> Self {
        Self {
            prefix,
            domain,
            message,
        }
    }

    /// Compose the payload bytes
    pub fn to_vec(&self) -> Vec<u8> {
        let mut v = Vec::with_capacity(self.prefix.len() + 1 + self.message.len());
        v.extend_from_slice(self.prefix);
        v.push(self.domain as u8);
        v.extend_from_slice(self.message);
        v
    }
}

impl<'a> Encode for SignPayload<'a> {
    type Error = ApduError;

    fn encode_len(&self) -> Result<usize, Self::Error> {
        Ok(self.prefix.len() + 1 + self.message.len())
    }

    fn encode(&self, buff: &mut [u8]) -> Result<usize, Self::Error> {
        if buff.len() < self.encode_len()? {
            return Err(ApduError::InvalidLength);
        }

        let mut index = 0;

        index += put(&mut buff[index..], self.prefix)?;
        index += put_u8(&mut buff[index..], self.domain as u8)?;
        index += put(&mut buff[index..], self.message)?;

        Ok(index)
    }
}

/// Signature response, returned with the final sign chunk
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct SignResp<'a> {
    pub signature: &'a [u8],
}

impl<'a> Decode<'a> for SignResp<'a> {
    type Output = Self;
    type Error = ApduError;

    fn decode(buff: &'a [u8]) -> Result<(Self, usize), ApduError> {
        let mut r = ResponseReader::new(buff);

        let signature = r.read_remaining();
        if signature.is_empty() {
            return Err(ApduError::InvalidLength);
        }

        Ok((Self { signature }, r.position()))
    }
}

#[cfg(test)]
mod test {
    use strum::IntoEnumIterator;

    use super::*;
    use crate::test::encode_checked;

    #[test]
    fn sign_payload_composition() {
        let prefix = [0xde, 0xad];
        let message = [0x01, 0x02, 0x03];

        let p = SignPayload::new(&prefix, Domain::Proposal, &message);
        assert_eq!(p.to_vec(), [0xde, 0xad, 0x01, 0x01, 0x02, 0x03]);

        let mut buff = [0u8; 16];
        let n = encode_checked(&mut buff, &p);
        assert_eq!(&buff[..n], &p.to_vec()[..]);
    }

    #[test]
    fn domain_values() {
        let values: Vec<u8> = Domain::iter().map(|d| d as u8).collect();
        assert_eq!(values, [0, 1, 2, 3, 4, 10, 11]);

        assert_eq!("proposal".parse::<Domain>().unwrap(), Domain::Proposal);
        assert_eq!(
            "BEACON_FOLLOWUP_MSG".parse::<Domain>().unwrap(),
            Domain::BeaconFollowupMsg
        );
    }

    #[test]
    fn sign_resp_requires_data() {
        assert!(SignResp::decode(&[]).is_err());

        let (r, n) = SignResp::decode(&[0xab; 64]).unwrap();
        assert_eq!(r.signature.len(), 64);
        assert_eq!(n, 64);
    }
}
