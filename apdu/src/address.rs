// Copyright (c) 2023-2024 The Spacemesh Ledger Contributors

//! Address APDUs

use encdec::{Decode, Encode};

use crate::{
    command::header, path::Path, response::ResponseReader, AddrDisplay, ApduError, ApduHeader,
    Instruction, PUBKEY_LEN,
};

/// Wallet address request, sent as a single APDU carrying only the path.
///
/// `p1` selects whether the address is displayed on the device, so the
/// header is built per request rather than through [ApduStatic][crate::ApduStatic].
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct AddressReq {
    pub path: Path,
    pub display: AddrDisplay,
}

impl AddressReq {
    /// Create a new [AddressReq] APDU
    pub fn new(path: Path, display: AddrDisplay) -> Self {
        Self { path, display }
    }

    /// Command header for this request
    pub fn header(&self) -> ApduHeader {
        header(Instruction::GetAddr, self.display as u8, 0)
    }
}

impl Encode for AddressReq {
    type Error = ApduError;

    fn encode_len(&self) -> Result<usize, Self::Error> {
        self.path.encode_len()
    }

    fn encode(&self, buff: &mut [u8]) -> Result<usize, Self::Error> {
        self.path.encode(buff)
    }
}

/// Address response, returned by all address instructions
///
/// ## Encoding:
/// ```text
/// +---------------------------+-----------------------------+
/// |   PUBLIC_KEY (32 bytes)   |   ADDRESS (utf8, remainder) |
/// +---------------------------+-----------------------------+
/// ```
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct AddressResp<'a> {
    /// Ed25519 public key for the derivation path
    pub pubkey: [u8; PUBKEY_LEN],
    /// Bech32 account address
    pub address: &'a str,
}

impl<'a> AddressResp<'a> {
    /// Create a new [AddressResp] APDU
    pub fn new(pubkey: [u8; PUBKEY_LEN], address: &'a str) -> Self {
        Self { pubkey, address }
    }
}

impl<'a> Encode for AddressResp<'a> {
    type Error = ApduError;

    fn encode_len(&self) -> Result<usize, Self::Error> {
        Ok(PUBKEY_LEN + self.address.len())
    }

    fn encode(&self, buff: &mut [u8]) -> Result<usize, Self::Error> {
        if buff.len() < self.encode_len()? {
            return Err(ApduError::InvalidLength);
        }

        buff[..PUBKEY_LEN].copy_from_slice(&self.pubkey);
        buff[PUBKEY_LEN..][..self.address.len()].copy_from_slice(self.address.as_bytes());

        Ok(PUBKEY_LEN + self.address.len())
    }
}

impl<'a> Decode<'a> for AddressResp<'a> {
    type Output = Self;
    type Error = ApduError;

    fn decode(buff: &'a [u8]) -> Result<(Self, usize), ApduError> {
        let mut r = ResponseReader::new(buff);

        let pubkey = r.read_array::<PUBKEY_LEN>()?;

        let address = r.read_remaining();
        if address.is_empty() {
            return Err(ApduError::InvalidLength);
        }
        let address = core::str::from_utf8(address).map_err(|_| ApduError::InvalidUtf8)?;

        Ok((Self { pubkey, address }, r.position()))
    }
}
