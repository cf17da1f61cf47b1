// Copyright (c) 2023-2024 The Spacemesh Ledger Contributors

//! Handle for connected ledger devices
//!
//! This provides methods for interacting with the Spacemesh app
//! and is generic over [Exchange] transports.
//!
//! Operations hold the transport lock for their full duration, so chunks from
//! concurrent operations on a shared handle are never interleaved. Any failed
//! exchange aborts the operation, no further chunks are sent.

use std::{sync::Arc, time::Duration};

use anyhow::anyhow;
use encdec::{Decode, Encode};
use log::debug;
use tokio::sync::Mutex;

use ledger_spacemesh_apdu::{
    account::{Account, AccountType},
    address::{AddressReq, AddressResp},
    chunk::{chunks, MIN_CHUNK_SIZE},
    command::{Command, MAX_DATA_LEN},
    path::Path,
    response::Answer,
    sign::{SignPayload, SignResp},
    version::{VersionReq, VersionResp},
    AddrDisplay, ApduError, ApduHeader, ApduReq, Instruction, CHUNK_SIZE, PUBKEY_LEN,
};

use crate::{transport::Exchange, Error};

/// Device handle configuration
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct DeviceConfig {
    /// Timeout for APDU requests
    pub request_timeout: Duration,
    /// Timeout for requests that may wait on user confirmation
    pub user_timeout: Duration,
    /// Maximum chunk body length
    pub chunk_size: usize,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(2),
            user_timeout: Duration::from_secs(30),
            chunk_size: CHUNK_SIZE,
        }
    }
}

impl DeviceConfig {
    /// Check configuration values are usable
    pub fn validate(&self) -> Result<(), Error> {
        if !(MIN_CHUNK_SIZE..=MAX_DATA_LEN).contains(&self.chunk_size) {
            return Err(Error::Configuration(format!(
                "chunk size {} outside {}..={}",
                self.chunk_size, MIN_CHUNK_SIZE, MAX_DATA_LEN
            )));
        }

        if self.request_timeout.is_zero() || self.user_timeout.is_zero() {
            return Err(Error::Configuration("timeouts must be non-zero".to_string()));
        }

        Ok(())
    }
}

/// Device operations, used to annotate transport errors
#[derive(Copy, Clone, PartialEq, Eq, Debug, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum Operation {
    Version,
    GetAddress,
    GetAddressMultisig,
    GetAddressVesting,
    GetAddressVault,
    Sign,
}

impl From<AccountType> for Operation {
    fn from(t: AccountType) -> Self {
        match t {
            AccountType::Wallet => Operation::GetAddress,
            AccountType::Multisig => Operation::GetAddressMultisig,
            AccountType::Vesting => Operation::GetAddressVesting,
            AccountType::Vault => Operation::GetAddressVault,
        }
    }
}

/// Public key and address returned by address operations
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct AddressInfo {
    pub pubkey: [u8; PUBKEY_LEN],
    pub address: String,
}

impl<'a> From<AddressResp<'a>> for AddressInfo {
    fn from(r: AddressResp<'a>) -> Self {
        Self {
            pubkey: r.pubkey,
            address: r.address.to_string(),
        }
    }
}

/// Spacemesh handle for a connected ledger device.
///
/// This is generic over [Exchange] types to support different
/// underlying transports / providers
pub struct DeviceHandle<T: Exchange> {
    /// Device handle for communication
    t: Arc<Mutex<T>>,
    /// Handle configuration
    config: DeviceConfig,
}

impl<T: Exchange> Clone for DeviceHandle<T> {
    fn clone(&self) -> Self {
        Self {
            t: self.t.clone(),
            config: self.config,
        }
    }
}

/// Create a [DeviceHandle] wrapper with default configuration
impl<T: Exchange> From<T> for DeviceHandle<T> {
    fn from(t: T) -> Self {
        Self {
            t: Arc::new(Mutex::new(t)),
            config: DeviceConfig::default(),
        }
    }
}

impl<T: Exchange + Send> DeviceHandle<T> {
    /// Create a [DeviceHandle] with the provided configuration
    pub fn with_config(t: T, config: DeviceConfig) -> Result<Self, Error> {
        config.validate()?;

        Ok(Self {
            t: Arc::new(Mutex::new(t)),
            config,
        })
    }

    /// Fetch handle configuration
    pub fn config(&self) -> &DeviceConfig {
        &self.config
    }

    /// Fetch the Spacemesh application version
    pub async fn app_version(&self) -> Result<VersionResp, Error> {
        debug!("Requesting app version");

        let req = VersionReq {};
        let cmd = encode_command(req.header(), &req)?;

        let mut t = self.t.lock().await;
        let data = exchange(
            &mut *t,
            Operation::Version,
            &cmd,
            self.config.request_timeout,
        )
        .await?;

        let (v, _) = VersionResp::decode(&data).map_err(|_| Error::MalformedResponse)?;

        debug!("App version: {}.{}.{}", v.major, v.minor, v.patch);

        Ok(v)
    }

    /// Fetch the public key and wallet address for `path`,
    /// optionally displaying the address for confirmation on the device
    pub async fn get_address(&self, path: &Path, show: bool) -> Result<AddressInfo, Error> {
        debug!("Requesting address for path: {} (show: {})", path, show);

        let req = AddressReq::new(*path, AddrDisplay::from(show));
        let cmd = encode_command(req.header(), &req)?;

        let timeout = match show {
            true => self.config.user_timeout,
            false => self.config.request_timeout,
        };

        let mut t = self.t.lock().await;
        let data = exchange(&mut *t, Operation::GetAddress, &cmd, timeout).await?;

        decode_address(&data)
    }

    /// Fetch the address for a multisig account
    pub async fn get_address_multisig(
        &self,
        path: &Path,
        internal_index: u8,
        account: &Account,
    ) -> Result<AddressInfo, Error> {
        self.chunked_address(AccountType::Multisig, path, internal_index, account)
            .await
    }

    /// Fetch the address for a vesting account
    pub async fn get_address_vesting(
        &self,
        path: &Path,
        internal_index: u8,
        account: &Account,
    ) -> Result<AddressInfo, Error> {
        self.chunked_address(AccountType::Vesting, path, internal_index, account)
            .await
    }

    /// Fetch the address for a vault account
    pub async fn get_address_vault(
        &self,
        path: &Path,
        internal_index: u8,
        account: &Account,
    ) -> Result<AddressInfo, Error> {
        self.chunked_address(AccountType::Vault, path, internal_index, account)
            .await
    }

    /// Fetch the address for any account, selecting the instruction by
    /// account type. Wallet accounts use the plain address request
    /// (`internal_index` is unused).
    pub async fn account_address(
        &self,
        path: &Path,
        internal_index: u8,
        account: &Account,
    ) -> Result<AddressInfo, Error> {
        match account {
            Account::Wallet(k) => {
                k.check_sanity()?;
                self.get_address(path, false).await
            }
            Account::Multisig(_) => {
                self.get_address_multisig(path, internal_index, account)
                    .await
            }
            Account::Vesting(_) => {
                self.get_address_vesting(path, internal_index, account)
                    .await
            }
            Account::Vault(_) => self.get_address_vault(path, internal_index, account).await,
        }
    }

    /// Sign a domain-tagged message with the key at `path`,
    /// returning the raw signature
    pub async fn sign(&self, path: &Path, payload: &SignPayload<'_>) -> Result<Vec<u8>, Error> {
        debug!(
            "Requesting signature for path: {} (domain: {}, {} byte message)",
            path,
            payload.domain,
            payload.message.len()
        );

        let data = self
            .send_chunks(Operation::Sign, Instruction::Sign, path, &payload.to_vec())
            .await?;

        let (r, _) = SignResp::decode(&data).map_err(|_| Error::MalformedResponse)?;

        Ok(r.signature.to_vec())
    }

    /// Check account type and sanity, then request an address via chunked exchange
    async fn chunked_address(
        &self,
        expected: AccountType,
        path: &Path,
        internal_index: u8,
        account: &Account,
    ) -> Result<AddressInfo, Error> {
        let actual = account.account_type();
        if actual != expected {
            return Err(Error::InvalidAccountType { expected, actual });
        }

        account.check_sanity()?;

        debug!(
            "Requesting {} address for path: {} (internal index: {})",
            expected, path, internal_index
        );

        let payload = account
            .address_payload(internal_index)
            .map_err(Error::Encoding)?;

        let data = self
            .send_chunks(expected.into(), expected.instruction(), path, &payload)
            .await?;

        decode_address(&data)
    }

    /// Send a path-prefixed payload in order, returning the data from the final answer.
    ///
    /// Intermediate chunks use the request timeout, the final chunk may prompt
    /// the user so uses the user timeout.
    async fn send_chunks(
        &self,
        op: Operation,
        ins: Instruction,
        path: &Path,
        payload: &[u8],
    ) -> Result<Vec<u8>, Error> {
        let chunks = chunks(path, payload, self.config.chunk_size).map_err(Error::Encoding)?;

        let mut t = self.t.lock().await;
        let mut data = Vec::new();

        for c in &chunks {
            debug!(
                "{}: sending chunk {}/{} ({} bytes)",
                op,
                c.ordinal,
                c.total,
                c.body.len()
            );

            let cmd = Command::new(c.header(ins), &c.body)
                .to_vec()
                .map_err(Error::Encoding)?;

            let timeout = match c.is_last() {
                true => self.config.user_timeout,
                false => self.config.request_timeout,
            };

            data = exchange(&mut *t, op, &cmd, timeout).await?;
        }

        Ok(data)
    }
}

/// Encode a single command APDU with an [Encode] body
fn encode_command<E: Encode<Error = ApduError>>(
    header: ApduHeader,
    body: &E,
) -> Result<Vec<u8>, Error> {
    let mut buff = vec![0u8; body.encode_len().map_err(Error::Encoding)?];
    let n = body.encode(&mut buff).map_err(Error::Encoding)?;

    Command::new(header, &buff[..n])
        .to_vec()
        .map_err(Error::Encoding)
}

/// Execute a single exchange, returning answer data on success
async fn exchange<T: Exchange + Send>(
    t: &mut T,
    operation: Operation,
    cmd: &[u8],
    timeout: Duration,
) -> Result<Vec<u8>, Error> {
    debug!("TX: {:02x?}", cmd);

    let raw = t
        .exchange(cmd, timeout)
        .await
        .map_err(|e| Error::Transport {
            operation,
            source: anyhow!("{}", e),
        })?;

    debug!("RX: {:02x?}", raw);

    let answer = Answer::from_bytes(&raw).map_err(|_| Error::MalformedResponse)?;
    if !answer.is_ok() {
        debug!(
            "{}: device returned status 0x{:04x}",
            operation,
            answer.status()
        );
        return Err(Error::rejected(answer.status()));
    }

    Ok(answer.data().to_vec())
}

/// Decode an address answer
fn decode_address(data: &[u8]) -> Result<AddressInfo, Error> {
    let (r, _) = AddressResp::decode(data).map_err(|_| Error::MalformedResponse)?;

    debug!("Address: {} (pubkey: {})", r.address, hex::encode(r.pubkey));

    Ok(r.into())
}
