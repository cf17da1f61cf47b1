// Copyright (c) 2023-2024 The Spacemesh Ledger Contributors

//! APDU status words returned by the Spacemesh app

use num_enum::TryFromPrimitive;
use strum::{Display, EnumIter};

/// Known APDU status words
#[derive(Copy, Clone, PartialEq, Eq, Debug, Display, EnumIter, TryFromPrimitive)]
#[repr(u16)]
pub enum StatusCode {
    Ok = 0x9000,
    Busy = 0x9001,
    DeviceLocked = 0x5515,
    ExecutionError = 0x6400,
    WrongLength = 0x6700,
    EmptyBuffer = 0x6982,
    OutputBufferTooSmall = 0x6983,
    DataInvalid = 0x6984,
    ConditionsNotSatisfied = 0x6985,
    TransactionRejected = 0x6986,
    BadKeyHandle = 0x6a80,
    InvalidP1P2 = 0x6b00,
    InsNotSupported = 0x6d00,
    ClaNotSupported = 0x6e00,
    AppNotOpen = 0x6e01,
    UnknownError = 0x6f00,
    SignVerifyError = 0x6f01,
}

impl StatusCode {
    /// Human readable description of the status word
    pub fn description(&self) -> &'static str {
        match self {
            StatusCode::Ok => "No errors",
            StatusCode::Busy => "Device is busy",
            StatusCode::DeviceLocked => "Device is locked",
            StatusCode::ExecutionError => "Execution error",
            StatusCode::WrongLength => "Wrong length",
            StatusCode::EmptyBuffer => "Empty buffer",
            StatusCode::OutputBufferTooSmall => "Output buffer too small",
            StatusCode::DataInvalid => "Data is invalid",
            StatusCode::ConditionsNotSatisfied => "Conditions not satisfied",
            StatusCode::TransactionRejected => "Transaction rejected",
            StatusCode::BadKeyHandle => "Bad key handle",
            StatusCode::InvalidP1P2 => "Invalid P1/P2",
            StatusCode::InsNotSupported => "Instruction not supported",
            StatusCode::ClaNotSupported => "CLA not supported",
            StatusCode::AppNotOpen => "App does not seem to be open",
            StatusCode::UnknownError => "Unknown error",
            StatusCode::SignVerifyError => "Sign / verify error",
        }
    }

    /// Check whether the status indicates the user declined on-device
    pub fn is_user_rejection(&self) -> bool {
        matches!(
            self,
            StatusCode::ConditionsNotSatisfied | StatusCode::TransactionRejected
        )
    }
}

/// Describe a raw status word, falling back for unknown values
pub fn describe(sw: u16) -> &'static str {
    match StatusCode::try_from(sw) {
        Ok(s) => s.description(),
        Err(_) => "Unknown return code",
    }
}

#[cfg(test)]
mod test {
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn status_code_round_trip() {
        for s in StatusCode::iter() {
            assert_eq!(StatusCode::try_from(s as u16).ok(), Some(s));
        }
    }

    #[test]
    fn describe_unknown() {
        assert_eq!(describe(0x6985), "Conditions not satisfied");
        assert_eq!(describe(0x1234), "Unknown return code");
        assert!(StatusCode::TransactionRejected.is_user_rejection());
        assert!(!StatusCode::AppNotOpen.is_user_rejection());
    }
}
