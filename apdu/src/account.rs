// Copyright (c) 2023-2024 The Spacemesh Ledger Contributors

//! Account definitions and address payload encoding
//!
//! Accounts are checked with [Account::check_sanity] and then serialized
//! once into an [AccountPayload] for the matching address instruction.

use alloc::vec::Vec;
use core::fmt;

use byteorder::{BigEndian, ByteOrder};
use encdec::Encode;
use num_enum::TryFromPrimitive;
use strum::{Display, EnumString};

use crate::{
    helpers::{put, put_u8},
    ApduError, Instruction, PUBKEY_LEN,
};

/// Account type discriminant
#[derive(Copy, Clone, PartialEq, Eq, Debug, Display, EnumString, TryFromPrimitive)]
#[strum(serialize_all = "lowercase")]
#[repr(u8)]
pub enum AccountType {
    Wallet = 1,
    Multisig = 2,
    Vesting = 3,
    Vault = 4,
}

impl AccountType {
    /// Address instruction for this account type
    pub fn instruction(&self) -> Instruction {
        match self {
            AccountType::Wallet => Instruction::GetAddr,
            AccountType::Multisig => Instruction::GetAddrMultisig,
            AccountType::Vesting => Instruction::GetAddrVesting,
            AccountType::Vault => Instruction::GetAddrVault,
        }
    }
}

/// Participant public key with its position in the participant set
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct Pubkey {
    pub index: u8,
    pub key: [u8; PUBKEY_LEN],
}

impl Pubkey {
    pub fn new(index: u8, key: [u8; PUBKEY_LEN]) -> Self {
        Self { index, key }
    }
}

/// Key set shared by all account variants.
///
/// The device contributes its own key, so `pubkeys` may omit exactly one
/// participant index which the device fills in.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct AccountKeys {
    /// Number of signatures required to spend
    pub approvers: u8,
    /// Total number of participants, including the device
    pub participants: u8,
    /// Co-signer keys
    pub pubkeys: Vec<Pubkey>,
}

/// Unlock schedule for vault accounts
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub struct UnlockSchedule {
    pub total_amount: u64,
    pub initial_unlock_amount: u64,
    pub vesting_start: u32,
    pub vesting_end: u32,
}

/// Encoded length of an [UnlockSchedule]
pub const SCHEDULE_LEN: usize = 8 + 8 + 4 + 4;

/// Vault account, owned by a (usually vesting) key set
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct VaultAccount {
    pub owner: AccountKeys,
    pub schedule: UnlockSchedule,
}

/// Spacemesh account variants
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Account {
    Wallet(AccountKeys),
    Multisig(AccountKeys),
    Vesting(AccountKeys),
    Vault(VaultAccount),
}

/// Structural account errors, detected before serialization
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum SanityError {
    /// Approver threshold is zero
    NoApprovers,
    /// Participant count is zero
    NoParticipants,
    /// More approvers than participants
    TooManyApprovers { approvers: u8, participants: u8 },
    /// Key set size does not match the participant count
    ParticipantMismatch { participants: u8, pubkeys: usize },
    /// Pubkey index is not below the participant count
    IndexOutOfRange(u8),
    /// Pubkey index appears more than once
    DuplicateIndex(u8),
    /// Initial unlock exceeds the total amount
    InitialUnlockExceedsTotal,
    /// Vesting ends before it starts
    InvalidVestingPeriod,
}

impl fmt::Display for SanityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SanityError::NoApprovers => write!(f, "approvers must be at least 1"),
            SanityError::NoParticipants => write!(f, "participants must be at least 1"),
            SanityError::TooManyApprovers {
                approvers,
                participants,
            } => write!(
                f,
                "approvers ({}) exceeds participants ({})",
                approvers, participants
            ),
            SanityError::ParticipantMismatch {
                participants,
                pubkeys,
            } => write!(
                f,
                "{} pubkeys provided for {} participants",
                pubkeys, participants
            ),
            SanityError::IndexOutOfRange(i) => write!(f, "pubkey index {} out of range", i),
            SanityError::DuplicateIndex(i) => write!(f, "duplicate pubkey index {}", i),
            SanityError::InitialUnlockExceedsTotal => {
                write!(f, "initial unlock amount exceeds total amount")
            }
            SanityError::InvalidVestingPeriod => write!(f, "vesting end precedes vesting start"),
        }
    }
}

impl AccountKeys {
    /// Create a new key set
    pub fn new(approvers: u8, participants: u8, pubkeys: Vec<Pubkey>) -> Self {
        Self {
            approvers,
            participants,
            pubkeys,
        }
    }

    /// Single signer key set, the device key being the only participant
    pub fn single() -> Self {
        Self::new(1, 1, Vec::new())
    }

    /// Check key set invariants
    pub fn check_sanity(&self) -> Result<(), SanityError> {
        if self.approvers == 0 {
            return Err(SanityError::NoApprovers);
        }
        if self.participants == 0 {
            return Err(SanityError::NoParticipants);
        }
        if self.approvers > self.participants {
            return Err(SanityError::TooManyApprovers {
                approvers: self.approvers,
                participants: self.participants,
            });
        }

        // Either the full set, or all but the device's own key
        let participants = self.participants as usize;
        let n = self.pubkeys.len();
        if n != participants && n + 1 != participants {
            return Err(SanityError::ParticipantMismatch {
                participants: self.participants,
                pubkeys: n,
            });
        }

        let mut seen = [false; 256];
        for k in &self.pubkeys {
            if k.index >= self.participants {
                return Err(SanityError::IndexOutOfRange(k.index));
            }
            if seen[k.index as usize] {
                return Err(SanityError::DuplicateIndex(k.index));
            }
            seen[k.index as usize] = true;
        }

        Ok(())
    }
}

impl UnlockSchedule {
    /// Check schedule invariants
    pub fn check_sanity(&self) -> Result<(), SanityError> {
        if self.initial_unlock_amount > self.total_amount {
            return Err(SanityError::InitialUnlockExceedsTotal);
        }
        if self.vesting_end < self.vesting_start {
            return Err(SanityError::InvalidVestingPeriod);
        }
        Ok(())
    }
}

impl Account {
    /// Fetch the account discriminant
    pub fn account_type(&self) -> AccountType {
        match self {
            Account::Wallet(_) => AccountType::Wallet,
            Account::Multisig(_) => AccountType::Multisig,
            Account::Vesting(_) => AccountType::Vesting,
            Account::Vault(_) => AccountType::Vault,
        }
    }

    /// Fetch the account key set (the owner for vaults)
    pub fn keys(&self) -> &AccountKeys {
        match self {
            Account::Wallet(k) | Account::Multisig(k) | Account::Vesting(k) => k,
            Account::Vault(v) => &v.owner,
        }
    }

    /// Check account invariants, required prior to serialization
    pub fn check_sanity(&self) -> Result<(), SanityError> {
        match self {
            Account::Wallet(k) | Account::Multisig(k) | Account::Vesting(k) => k.check_sanity(),
            Account::Vault(v) => {
                v.owner.check_sanity()?;
                v.schedule.check_sanity()
            }
        }
    }

    /// Serialize the address request payload for this account
    pub fn address_payload(&self, internal_index: u8) -> Result<Vec<u8>, ApduError> {
        let p = AccountPayload::new(internal_index, self);

        let mut buff = alloc::vec![0u8; p.encode_len()?];
        let n = p.encode(&mut buff)?;
        buff.truncate(n);

        Ok(buff)
    }
}

/// Key set encoding
///
/// ```text
/// +-----------+--------------+-------+-------------+-------+-----
/// | APPROVERS | PARTICIPANTS | INDEX | PUBKEY (32) | INDEX | ...
/// +-----------+--------------+-------+-------------+-------+-----
/// ```
impl Encode for AccountKeys {
    type Error = ApduError;

    fn encode_len(&self) -> Result<usize, Self::Error> {
        Ok(2 + self.pubkeys.len() * (1 + PUBKEY_LEN))
    }

    fn encode(&self, buff: &mut [u8]) -> Result<usize, Self::Error> {
        if buff.len() < self.encode_len()? {
            return Err(ApduError::InvalidLength);
        }

        let mut index = 0;

        index += put_u8(&mut buff[index..], self.approvers)?;
        index += put_u8(&mut buff[index..], self.participants)?;

        for k in &self.pubkeys {
            index += put_u8(&mut buff[index..], k.index)?;
            index += put(&mut buff[index..], &k.key)?;
        }

        Ok(index)
    }
}

/// Schedule encoding, all fields big-endian
///
/// ```text
/// +-------------------+---------------------------+
/// | TOTAL_AMOUNT (u64)| INITIAL_UNLOCK_AMOUNT(u64)|
/// +-------------------+---------------------------+
/// | VESTING_START(u32)|  VESTING_END (u32)        |
/// +-------------------+---------------------------+
/// ```
impl Encode for UnlockSchedule {
    type Error = ApduError;

    fn encode_len(&self) -> Result<usize, Self::Error> {
        Ok(SCHEDULE_LEN)
    }

    fn encode(&self, buff: &mut [u8]) -> Result<usize, Self::Error> {
        if buff.len() < SCHEDULE_LEN {
            return Err(ApduError::InvalidLength);
        }

        BigEndian::write_u64(&mut buff[0..], self.total_amount);
        BigEndian::write_u64(&mut buff[8..], self.initial_unlock_amount);
        BigEndian::write_u32(&mut buff[16..], self.vesting_start);
        BigEndian::write_u32(&mut buff[20..], self.vesting_end);

        Ok(SCHEDULE_LEN)
    }
}

/// Address request payload, the data following the path in the first chunk.
///
/// Multisig and vesting accounts encode as
/// `[INTERNAL_INDEX][APPROVERS][PARTICIPANTS][INDEX|PUBKEY]...`,
/// vaults prefix this with the [UnlockSchedule].
#[derive(Clone, PartialEq, Debug)]
pub struct AccountPayload<'a> {
    pub internal_index: u8,
    pub account: &'a Account,
}

impl<'a> AccountPayload<'a> {
    pub fn new(internal_index: u8, account: &'a Account) -> Self {
        Self {
            internal_index,
            account,
        }
    }
}

impl<'a> Encode for AccountPayload<'a> {
    type Error = ApduError;

    fn encode_len(&self) -> Result<usize, Self::Error> {
        let n = match self.account {
            Account::Vault(v) => SCHEDULE_LEN + 1 + v.owner.encode_len()?,
            _ => 1 + self.account.keys().encode_len()?,
        };
        Ok(n)
    }

    fn encode(&self, buff: &mut [u8]) -> Result<usize, Self::Error> {
        let mut index = 0;

        if let Account::Vault(v) = self.account {
            index += v.schedule.encode(&mut buff[index..])?;
        }

        index += put_u8(&mut buff[index..], self.internal_index)?;
        index += self.account.keys().encode(&mut buff[index..])?;

        Ok(index)
    }
}
