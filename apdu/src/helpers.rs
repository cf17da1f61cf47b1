// Copyright (c) 2023-2024 The Spacemesh Ledger Contributors

use ledger_proto::ApduError;

/// Copy `d` to the start of `buff`, returning the number of bytes written
pub(crate) fn put(buff: &mut [u8], d: &[u8]) -> Result<usize, ApduError> {
    if buff.len() < d.len() {
        return Err(ApduError::InvalidLength);
    }

    buff[..d.len()].copy_from_slice(d);

    Ok(d.len())
}

/// Write a single byte to the start of `buff`
pub(crate) fn put_u8(buff: &mut [u8], v: u8) -> Result<usize, ApduError> {
    put(buff, &[v])
}
