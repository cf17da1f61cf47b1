// Copyright (c) 2023-2024 The Spacemesh Ledger Contributors

//! Raw APDU transport abstraction
//!
//! [DeviceHandle][crate::DeviceHandle] operates over any [Exchange]
//! implementation, moving encoded commands to the device and returning the
//! raw answer (data and status word). Timeouts are enforced by the transport.

use std::{
    fmt::{Debug, Display},
    time::Duration,
};

use async_trait::async_trait;

/// Raw command / answer exchange with a device
#[async_trait]
pub trait Exchange {
    /// Transport error type
    type Error: Display + Debug;

    /// Send an encoded command and await the raw answer
    async fn exchange(&mut self, command: &[u8], timeout: Duration)
        -> Result<Vec<u8>, Self::Error>;
}

/// [Exchange] adaptor for devices provided by [ledger_lib]
#[derive(Debug)]
pub struct LedgerTransport<T>(T);

impl<T: ledger_lib::Exchange> LedgerTransport<T> {
    /// Wrap a connected [ledger_lib] device
    pub fn new(t: T) -> Self {
        Self(t)
    }

    /// Release the underlying device
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T: ledger_lib::Exchange> From<T> for LedgerTransport<T> {
    fn from(t: T) -> Self {
        Self(t)
    }
}

#[async_trait]
impl<T: ledger_lib::Exchange + Send> Exchange for LedgerTransport<T> {
    type Error = ledger_lib::Error;

    async fn exchange(
        &mut self,
        command: &[u8],
        timeout: Duration,
    ) -> Result<Vec<u8>, Self::Error> {
        ledger_lib::Exchange::exchange(&mut self.0, command, timeout).await
    }
}
