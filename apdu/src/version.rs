// Copyright (c) 2023-2024 The Spacemesh Ledger Contributors

//! Application version APDUs

use encdec::{Decode, DecodeOwned, Encode};

use crate::{response::ResponseReader, ApduError, ApduStatic, Instruction, SPACEMESH_APDU_CLA};

/// Fetch application version APDU, header via [ApduReq][crate::ApduReq]
#[derive(Copy, Clone, PartialEq, Debug, Default)]
pub struct VersionReq {}

impl ApduStatic for VersionReq {
    const CLA: u8 = SPACEMESH_APDU_CLA;
    const INS: u8 = Instruction::GetVersion as u8;
}

impl Encode for VersionReq {
    type Error = ApduError;

    fn encode_len(&self) -> Result<usize, Self::Error> {
        Ok(0)
    }

    fn encode(&self, _buff: &mut [u8]) -> Result<usize, Self::Error> {
        Ok(0)
    }
}

impl DecodeOwned for VersionReq {
    type Output = Self;

    type Error = ApduError;

    fn decode_owned(_buff: &[u8]) -> Result<(Self::Output, usize), Self::Error> {
        Ok((Self {}, 0))
    }
}

/// Application version response APDU
///
/// ## Encoding
///
/// Short form, single byte version fields:
/// ```text
/// +-----------+-------+-------+-------+--------+-----------------+
/// | TEST_MODE | MAJOR | MINOR | PATCH | LOCKED | TARGET_ID (opt) |
/// +-----------+-------+-------+-------+--------+-----------------+
/// ```
///
/// Long form (12 bytes) uses big-endian `u16` version fields and always
/// carries the 4 byte target id.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct VersionResp {
    pub test_mode: bool,
    pub major: u16,
    pub minor: u16,
    pub patch: u16,
    pub device_locked: bool,
    pub target_id: Option<[u8; 4]>,
}

/// Length of the long form version response
pub const VERSION_LONG_LEN: usize = 12;

impl<'a> Decode<'a> for VersionResp {
    type Output = Self;
    type Error = ApduError;

    fn decode(buff: &'a [u8]) -> Result<(Self, usize), ApduError> {
        let mut r = ResponseReader::new(buff);

        let test_mode = r.read_u8()? != 0;

        let (major, minor, patch) = match buff.len() == VERSION_LONG_LEN {
            true => (
                u16::from_be_bytes(r.read_array()?),
                u16::from_be_bytes(r.read_array()?),
                u16::from_be_bytes(r.read_array()?),
            ),
            false => (
                r.read_u8()? as u16,
                r.read_u8()? as u16,
                r.read_u8()? as u16,
            ),
        };

        let device_locked = r.read_u8()? == 1;

        let target_id = match r.remaining() >= 4 {
            true => Some(r.read_array::<4>()?),
            false => None,
        };

        Ok((
            Self {
                test_mode,
                major,
                minor,
                patch,
                device_locked,
                target_id,
            },
            r.position(),
        ))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::ApduReq;

    #[test]
    fn version_req_header() {
        let h = VersionReq {}.header();
        assert_eq!((h.cla, h.ins, h.p1, h.p2), (0x45, 0x00, 0x00, 0x00));
        assert_eq!(VersionReq {}.encode_len().unwrap(), 0);
    }

    #[test]
    fn version_short_form() {
        let (v, n) = VersionResp::decode(&[0, 1, 2, 3, 0, 0x33, 0x10, 0x00, 0x04]).unwrap();
        assert_eq!(n, 9);
        assert_eq!(
            v,
            VersionResp {
                test_mode: false,
                major: 1,
                minor: 2,
                patch: 3,
                device_locked: false,
                target_id: Some([0x33, 0x10, 0x00, 0x04]),
            }
        );

        let (v, _) = VersionResp::decode(&[1, 0, 9, 1, 1]).unwrap();
        assert!(v.test_mode && v.device_locked);
        assert_eq!(v.target_id, None);
    }

    #[test]
    fn version_long_form() {
        let b = [0, 0x01, 0x00, 0x00, 0x02, 0x00, 0x03, 0, 0x31, 0x10, 0, 0x04];
        let (v, n) = VersionResp::decode(&b).unwrap();
        assert_eq!(n, VERSION_LONG_LEN);
        assert_eq!((v.major, v.minor, v.patch), (256, 2, 3));
    }

    #[test]
    fn version_too_short() {
        assert!(VersionResp::decode(&[0, 1, 2]).is_err());
    }
}
