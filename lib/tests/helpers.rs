// Copyright (c) 2023-2024 The Spacemesh Ledger Contributors

#![allow(unused)]

use std::{
    collections::VecDeque,
    str::FromStr,
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;
use encdec::Decode;
use log::{debug, LevelFilter};
use simplelog::SimpleLogger;

use ledger_spacemesh::{
    apdu::{command::Command, ApduHeader},
    Exchange,
};

/// Status word for successful responses
pub const SW_OK: [u8; 2] = [0x90, 0x00];

/// Scripted device reply
#[derive(Clone, PartialEq, Debug)]
pub enum Reply {
    /// Data followed by a success status
    Ok(Vec<u8>),
    /// Status word only
    Status(u16),
    /// Raw answer bytes, not framed
    Raw(Vec<u8>),
    /// Transport failure
    Fault(String),
}

impl Reply {
    /// Empty success reply, as returned for intermediate chunks
    pub fn ack() -> Self {
        Reply::Ok(vec![])
    }
}

/// Mock transport error
#[derive(Clone, PartialEq, Debug, thiserror::Error)]
#[error("mock transport fault: {0}")]
pub struct MockError(pub String);

/// Recorded exchange
#[derive(Clone, PartialEq, Debug)]
pub struct Sent {
    pub command: Vec<u8>,
    pub timeout: Duration,
}

impl Sent {
    /// Parse the recorded command APDU
    pub fn parse(&self) -> (ApduHeader, Vec<u8>) {
        let (c, n) = Command::decode(&self.command).expect("invalid command APDU");
        assert_eq!(n, self.command.len(), "trailing command bytes");
        (c.header, c.data.to_vec())
    }
}

/// Mock [Exchange] implementation, returning scripted replies in order
/// and recording every command sent
#[derive(Clone, Debug, Default)]
pub struct MockTransport {
    sent: Arc<Mutex<Vec<Sent>>>,
    replies: Arc<Mutex<VecDeque<Reply>>>,
}

impl MockTransport {
    pub fn new(replies: impl IntoIterator<Item = Reply>) -> Self {
        Self {
            sent: Arc::new(Mutex::new(vec![])),
            replies: Arc::new(Mutex::new(replies.into_iter().collect())),
        }
    }

    /// Fetch commands sent so far
    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }

    /// Number of exchanges executed
    pub fn calls(&self) -> usize {
        self.sent.lock().unwrap().len()
    }

    /// Number of replies not yet consumed
    pub fn pending(&self) -> usize {
        self.replies.lock().unwrap().len()
    }
}

#[async_trait]
impl Exchange for MockTransport {
    type Error = MockError;

    async fn exchange(
        &mut self,
        command: &[u8],
        timeout: Duration,
    ) -> Result<Vec<u8>, Self::Error> {
        self.sent.lock().unwrap().push(Sent {
            command: command.to_vec(),
            timeout,
        });

        let reply = self.replies.lock().unwrap().pop_front();

        debug!("mock: {:02x?} -> {:02x?}", command, reply);

        match reply {
            Some(Reply::Ok(mut d)) => {
                d.extend_from_slice(&SW_OK);
                Ok(d)
            }
            Some(Reply::Status(sw)) => Ok(sw.to_be_bytes().to_vec()),
            Some(Reply::Raw(d)) => Ok(d),
            Some(Reply::Fault(e)) => Err(MockError(e)),
            None => Err(MockError("no scripted reply".to_string())),
        }
    }
}

/// Build an address reply body (public key followed by address)
pub fn address_reply(pubkey: &[u8; 32], address: &str) -> Reply {
    let mut d = pubkey.to_vec();
    d.extend_from_slice(address.as_bytes());
    Reply::Ok(d)
}

/// Acknowledge `n - 1` chunks then return `last`
pub fn chunked_replies(n: usize, last: Reply) -> Vec<Reply> {
    let mut r = vec![Reply::ack(); n.saturating_sub(1)];
    r.push(last);
    r
}

/// Setup logging for tests, level from `LOG_LEVEL` (default: debug)
pub fn setup_logging() {
    let log_level = match std::env::var("LOG_LEVEL").map(|v| LevelFilter::from_str(&v)) {
        Ok(Ok(l)) => l,
        _ => LevelFilter::Debug,
    };

    let _ = SimpleLogger::init(log_level, simplelog::Config::default());
}
