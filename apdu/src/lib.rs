// Copyright (c) 2023-2024 The Spacemesh Ledger Contributors

//! Protocol / APDU definitions for Spacemesh app communication
//!
//! This crate provides the host-side encoding of requests to the Spacemesh
//! ledger application and decoding of its responses.
//!
//! Requests that carry structured data (multisig, vesting and vault accounts,
//! signing payloads) are serialized into a single payload, prefixed with the
//! derivation [Path][path::Path] and split into [chunks][chunk::Chunk] of at
//! most [CHUNK_SIZE] bytes. Each chunk is sent as its own APDU with `p1` set
//! to the chunk ordinal and `p2` to the total number of chunks.
//!
//! Responses are the operation data followed by the two byte status word,
//! see [response::Answer].
//!
//! Account schedule fields are big-endian, derivation path components are
//! little-endian (as the base ledger libraries do).

#![no_std]

extern crate alloc;

pub use ledger_proto::{ApduError, ApduHeader, ApduReq, ApduStatic};

pub mod account;
pub mod address;
pub mod chunk;
pub mod command;
pub mod path;
pub mod prelude;
pub mod response;
pub mod sign;
pub mod status;
pub mod version;

mod helpers;

/// Spacemesh APDU Class
pub const SPACEMESH_APDU_CLA: u8 = 0x45;

/// Maximum chunk body length for a single exchange
pub const CHUNK_SIZE: usize = 250;

/// Ed25519 public key length
pub const PUBKEY_LEN: usize = 32;

/// Spacemesh APDU instruction codes
#[derive(Copy, Clone, Debug, PartialEq, Eq, strum::Display)]
#[repr(u8)]
pub enum Instruction {
    /// Fetch application version
    GetVersion = 0x00,

    /// Fetch wallet address and public key
    GetAddr = 0x01,

    /// Sign a domain-tagged message
    Sign = 0x02,

    /// Fetch multisig account address
    GetAddrMultisig = 0x03,

    /// Fetch vesting account address
    GetAddrVesting = 0x04,

    /// Fetch vault account address
    GetAddrVault = 0x05,
}

/// `p1` values for [Instruction::GetAddr]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum AddrDisplay {
    /// Return the address without user interaction
    OnlyRetrieve = 0x00,
    /// Display the address on the device and wait for confirmation
    ShowAddressInDevice = 0x01,
}

impl From<bool> for AddrDisplay {
    fn from(show: bool) -> Self {
        match show {
            true => AddrDisplay::ShowAddressInDevice,
            false => AddrDisplay::OnlyRetrieve,
        }
    }
}
