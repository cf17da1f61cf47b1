// Copyright (c) 2023-2024 The Spacemesh Ledger Contributors

//! Host-side checks for device signatures

use ed25519_dalek::{Signature, VerifyingKey};

use ledger_spacemesh_apdu::{sign::SignPayload, PUBKEY_LEN};

use crate::Error;

/// Verify an ed25519 signature returned by [DeviceHandle::sign][crate::DeviceHandle::sign]
/// over the composed signing payload
pub fn verify_signature(
    pubkey: &[u8; PUBKEY_LEN],
    payload: &SignPayload<'_>,
    signature: &[u8],
) -> Result<(), Error> {
    let key = VerifyingKey::from_bytes(pubkey).map_err(|_| Error::InvalidSignature)?;
    let sig = Signature::from_slice(signature).map_err(|_| Error::InvalidSignature)?;

    key.verify_strict(&payload.to_vec(), &sig)
        .map_err(|_| Error::InvalidSignature)
}
