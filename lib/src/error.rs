// Copyright (c) 2023-2024 The Spacemesh Ledger Contributors

use ledger_spacemesh_apdu::{
    account::{AccountType, SanityError},
    path::PathError,
    status::StatusCode,
    ApduError,
};

use crate::handle::Operation;

/// Ledger Spacemesh API Error Type
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid handle or transport configuration
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Account variant does not match the requested operation
    #[error("Invalid account type (expected: {expected}, actual: {actual})")]
    InvalidAccountType {
        expected: AccountType,
        actual: AccountType,
    },

    /// Account failed local structural checks
    #[error("Account sanity check failed: {0}")]
    SanityCheck(SanityError),

    /// Invalid derivation path
    #[error("Invalid path: {0}")]
    InvalidPath(PathError),

    /// Transport failure, annotated with the running operation
    #[error("Transport error during {operation}: {source}")]
    Transport {
        operation: Operation,
        source: anyhow::Error,
    },

    /// Device returned a non-success status word
    #[error("Device rejected request (status: 0x{status:04x})")]
    DeviceRejected {
        status: u16,
        code: Option<StatusCode>,
    },

    /// Response too short or otherwise undecodable
    #[error("Malformed device response")]
    MalformedResponse,

    /// Request could not be encoded
    #[error("Request encoding failed: {0:?}")]
    Encoding(ApduError),

    /// Signature did not verify against the provided key
    #[error("Invalid signature")]
    InvalidSignature,
}

impl Error {
    /// Build a [Error::DeviceRejected] from a raw status word
    pub fn rejected(status: u16) -> Self {
        Error::DeviceRejected {
            status,
            code: StatusCode::try_from(status).ok(),
        }
    }

    /// Check whether this error is a user rejection on the device
    pub fn is_user_rejection(&self) -> bool {
        matches!(self, Error::DeviceRejected { code: Some(c), .. } if c.is_user_rejection())
    }
}

impl From<SanityError> for Error {
    fn from(e: SanityError) -> Self {
        Error::SanityCheck(e)
    }
}

impl From<PathError> for Error {
    fn from(e: PathError) -> Self {
        Error::InvalidPath(e)
    }
}
