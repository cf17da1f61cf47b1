// Copyright (c) 2023-2024 The Spacemesh Ledger Contributors

//! Command line utility for interacting with the Ledger Spacemesh App

use std::time::Duration;

use clap::Parser;
use log::{debug, error, info, LevelFilter};

use ledger_spacemesh::{
    apdu::{account::Account, path::Path, sign::Domain, sign::SignPayload, CHUNK_SIZE},
    connect, list_devices, verify_signature, DeviceConfig, DeviceHandle, Error, Exchange, Filter,
    LedgerProvider,
};

mod helpers;
use helpers::*;

/// Ledger command line utility
#[derive(Clone, PartialEq, Debug, Parser)]
struct Options {
    /// Supported transports for ledger discovery
    #[clap(long, value_enum, default_value = "any")]
    target: Filter,

    /// Device index (where more than one device is available)
    #[clap(long, default_value = "0")]
    device_index: usize,

    /// Timeout for APDU requests (seconds)
    #[clap(long, default_value = "2")]
    request_timeout_s: u64,

    /// Timeout for operations requiring user confirmation (seconds)
    #[clap(long, default_value = "30")]
    user_timeout_s: u64,

    /// Maximum chunk size for multi-part requests
    #[clap(long, default_value_t = CHUNK_SIZE)]
    chunk_size: usize,

    /// Subcommand to execute
    #[clap(subcommand)]
    cmd: Actions,

    /// Enable verbose logging
    #[clap(long, default_value = "info")]
    log_level: LevelFilter,
}

#[derive(Clone, PartialEq, Debug, Parser)]
#[non_exhaustive]
enum Actions {
    /// List available devices
    List,

    /// Fetch application version
    Version,

    /// Fetch wallet public key and address
    Address {
        /// Derivation path
        #[clap(long, value_parser = parse_path, default_value = "m/44'/540'/0'/0/0")]
        path: Path,

        /// Display the address on the device for confirmation
        #[clap(long)]
        show: bool,
    },

    /// Fetch the address for a multisig, vesting or vault account
    AccountAddress {
        /// Derivation path
        #[clap(long, value_parser = parse_path, default_value = "m/44'/540'/0'/0/0")]
        path: Path,

        /// Internal index of the device key in the account
        #[clap(long, default_value = "0")]
        internal_index: u8,

        /// JSON account definition file
        #[clap(long)]
        account: String,
    },

    /// Sign a domain-tagged message
    Sign {
        /// Derivation path
        #[clap(long, value_parser = parse_path, default_value = "m/44'/540'/0'/0/0")]
        path: Path,

        /// Signing domain (ATX, PROPOSAL, BALLOT, HARE, POET, ...)
        #[clap(long, value_parser = parse_domain)]
        domain: Domain,

        /// Hex-encoded message prefix
        #[clap(long, default_value = "")]
        prefix: HexData,

        /// Hex-encoded message
        #[clap(long)]
        message: HexData,

        /// Verify the returned signature against the device public key
        #[clap(long)]
        verify: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command line arguments
    let args = Options::parse();

    // Setup logging
    simplelog::SimpleLogger::init(args.log_level, simplelog::Config::default())?;

    let config = DeviceConfig {
        request_timeout: Duration::from_secs(args.request_timeout_s),
        user_timeout: Duration::from_secs(args.user_timeout_s),
        chunk_size: args.chunk_size,
    };
    config.validate()?;

    // Initialise provider
    let mut p = LedgerProvider::init().await;

    debug!("Using transport: {:?}", args.target);

    // List available devices
    let devices = list_devices(&mut p, args.target).await?;
    if devices.is_empty() {
        return Err(anyhow::anyhow!("No devices found"));
    }

    // Handle list command
    if args.cmd == Actions::List {
        info!("Devices:");
        for (i, d) in devices.iter().enumerate() {
            info!("  {}: {:?}", i, d);
        }

        return Ok(());
    }

    // Select device by index
    let info = match devices.get(args.device_index) {
        Some(d) => d.clone(),
        None => {
            return Err(anyhow::anyhow!(
                "Invalid device index: {} (max: {})",
                args.device_index,
                devices.len() - 1
            ))
        }
    };

    debug!("Using device {}: {:?}", args.device_index, info);

    // Connect to device
    let t = match connect(&mut p, info, config).await {
        Ok(v) => v,
        Err(e) => {
            error!("Failed to connect to device {}", args.device_index);
            return Err(e.into());
        }
    };

    // Execute command
    if let Err(e) = execute(t, args.cmd).await {
        if let Some(Error::DeviceRejected { status, .. }) = e.downcast_ref::<Error>() {
            error!(
                "device returned 0x{:04x}: {}",
                status,
                ledger_spacemesh::apdu::status::describe(*status)
            );
        }
        return Err(e);
    }

    Ok(())
}

/// Execute a command with the provided transport
async fn execute<T>(t: DeviceHandle<T>, cmd: Actions) -> anyhow::Result<()>
where
    T: Exchange + Send,
{
    debug!("Executing command: {:?}", cmd);

    match cmd {
        Actions::Version => {
            let v = t.app_version().await?;

            info!("app version: {}.{}.{}", v.major, v.minor, v.patch);
            info!("test mode: {}, device locked: {}", v.test_mode, v.device_locked);
            if let Some(id) = v.target_id {
                info!("target id: {}", hex::encode(id));
            }
        }
        Actions::Address { path, show } => {
            info!("requesting address for path: {}", path);

            let r = t.get_address(&path, show).await?;

            info!("public key: {}", hex::encode(r.pubkey));
            info!("address: {}", r.address);
        }
        Actions::AccountAddress {
            path,
            internal_index,
            account,
        } => {
            debug!("Loading account from '{}'", account);

            let s = tokio::fs::read_to_string(&account).await?;
            let def: AccountDef = serde_json::from_str(&s)?;
            let account = Account::try_from(def)?;

            info!(
                "requesting {} address for path: {}",
                account.account_type(),
                path
            );

            let r = t.account_address(&path, internal_index, &account).await?;

            info!("public key: {}", hex::encode(r.pubkey));
            info!("address: {}", r.address);
        }
        Actions::Sign {
            path,
            domain,
            prefix,
            message,
            verify,
        } => {
            let payload = SignPayload::new(prefix.as_ref(), domain, message.as_ref());

            info!("requesting {} signature for path: {}", domain, path);

            let sig = t.sign(&path, &payload).await?;

            info!("signature: {}", hex::encode(&sig));

            if verify {
                let r = t.get_address(&path, false).await?;
                verify_signature(&r.pubkey, &payload, &sig)?;

                info!("signature verified against {}", hex::encode(r.pubkey));
            }
        }
        Actions::List => unreachable!(),
    }

    Ok(())
}
