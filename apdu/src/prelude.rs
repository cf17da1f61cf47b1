// Copyright (c) 2023-2024 The Spacemesh Ledger Contributors

//! Prelude to simplify downstream use of APDU objects
//!

pub use crate::{
    account::{
        Account, AccountKeys, AccountPayload, AccountType, Pubkey, SanityError, UnlockSchedule,
        VaultAccount,
    },
    address::{AddressReq, AddressResp},
    chunk::{chunks, Chunk},
    command::{header, Command},
    path::{Path, PathError},
    response::{Answer, ResponseReader},
    sign::{Domain, SignPayload, SignResp},
    status::StatusCode,
    version::{VersionReq, VersionResp},
    AddrDisplay, ApduHeader, ApduReq, Instruction,
};
