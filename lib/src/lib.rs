// Copyright (c) 2023-2024 The Spacemesh Ledger Contributors

//! Ledger Spacemesh API Library (and CLI)
//!
//! [DeviceHandle] implements the Spacemesh app operations (version, address
//! and signing requests) over any [Exchange] transport. Devices are located
//! and connected using [ledger_lib], see [list_devices] and [connect].

pub use ledger_lib::{LedgerHandle, LedgerInfo, LedgerProvider, Transport};

/// Re-export `ledger-spacemesh-apdu` for consumers
pub use ledger_spacemesh_apdu::{self as apdu};

pub mod transport;
pub use transport::{Exchange, LedgerTransport};

mod handle;
pub use handle::{AddressInfo, DeviceConfig, DeviceHandle, Operation};

mod error;
pub use error::Error;

mod verify;
pub use verify::verify_signature;

/// Device discovery filter
#[derive(Copy, Clone, Debug, PartialEq, clap::ValueEnum, strum::Display)]
#[non_exhaustive]
pub enum Filter {
    /// List all devices available using supported transport
    Any,
    /// List only HID devices
    Hid,
    /// List only TCP devices
    Tcp,
}

impl From<Filter> for ledger_lib::Filters {
    fn from(f: Filter) -> Self {
        match f {
            Filter::Any => ledger_lib::Filters::Any,
            Filter::Hid => ledger_lib::Filters::Hid,
            Filter::Tcp => ledger_lib::Filters::Tcp,
        }
    }
}

/// Device handle over a [ledger_lib] connection
pub type GenericHandle = DeviceHandle<LedgerTransport<LedgerHandle>>;

/// List available ledger devices
pub async fn list_devices(p: &mut LedgerProvider, filter: Filter) -> Result<Vec<LedgerInfo>, Error> {
    let devices = p
        .list(filter.into())
        .await
        .map_err(|e| Error::Configuration(format!("device listing failed: {}", e)))?;

    log::debug!("Found {} devices: {:?}", devices.len(), devices);

    Ok(devices)
}

/// Connect to a listed device, returning a configured [GenericHandle]
pub async fn connect(
    p: &mut LedgerProvider,
    info: LedgerInfo,
    config: DeviceConfig,
) -> Result<GenericHandle, Error> {
    // Check configuration prior to connecting
    config.validate()?;

    let d = p
        .connect(info)
        .await
        .map_err(|e| Error::Configuration(format!("device connection failed: {}", e)))?;

    DeviceHandle::with_config(LedgerTransport::new(d), config)
}
