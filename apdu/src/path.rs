// Copyright (c) 2023-2024 The Spacemesh Ledger Contributors

//! BIP-0032 derivation paths as used by the Spacemesh app
//!
//! The app only accepts paths with exactly [PATH_DEPTH] components, each
//! encoded as a little-endian `u32` with the hardened bit set where marked.

use core::{fmt, str::FromStr};

use encdec::{DecodeOwned, Encode};

use crate::{helpers::put, ApduError};

/// Required derivation path depth
pub const PATH_DEPTH: usize = 5;

/// Encoded path length
pub const PATH_LEN: usize = PATH_DEPTH * 4;

/// Hardened derivation flag
pub const HARDENED: u32 = 0x8000_0000;

/// BIP-0044 purpose
pub const PURPOSE: u32 = 44;

/// SLIP-0044 Spacemesh coin type
pub const COIN_TYPE: u32 = 540;

/// Derivation path, validated to [PATH_DEPTH] components on construction
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct Path([u32; PATH_DEPTH]);

/// Path parsing errors
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum PathError {
    /// Path does not have exactly [PATH_DEPTH] components
    InvalidDepth(usize),
    /// Component is not a valid (optionally hardened) index
    InvalidComponent,
    /// Component exceeds the unhardened index range
    IndexOutOfRange,
}

impl fmt::Display for PathError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathError::InvalidDepth(n) => {
                write!(f, "expected {} path components, found {}", PATH_DEPTH, n)
            }
            PathError::InvalidComponent => write!(f, "invalid path component"),
            PathError::IndexOutOfRange => write!(f, "path index out of range"),
        }
    }
}

impl Path {
    /// Create a path from raw (already hardened where required) components
    pub const fn new(components: [u32; PATH_DEPTH]) -> Self {
        Self(components)
    }

    /// Standard Spacemesh path `m/44'/540'/{account}'/{change}/{index}`
    pub const fn spacemesh(account: u32, change: u32, index: u32) -> Self {
        Self([
            PURPOSE | HARDENED,
            COIN_TYPE | HARDENED,
            account | HARDENED,
            change,
            index,
        ])
    }

    /// Create a path from a slice of components, checking depth
    pub fn from_slice(components: &[u32]) -> Result<Self, PathError> {
        let c: [u32; PATH_DEPTH] = components
            .try_into()
            .map_err(|_| PathError::InvalidDepth(components.len()))?;

        Ok(Self(c))
    }

    /// Fetch raw path components
    pub fn components(&self) -> &[u32; PATH_DEPTH] {
        &self.0
    }

    /// Serialize path to its fixed-width encoding
    pub fn to_bytes(&self) -> [u8; PATH_LEN] {
        let mut b = [0u8; PATH_LEN];
        for (i, c) in self.0.iter().enumerate() {
            b[i * 4..][..4].copy_from_slice(&c.to_le_bytes());
        }
        b
    }
}

impl FromStr for Path {
    type Err = PathError;

    /// Parse a path of the form `m/44'/540'/0'/0/0`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let s = s.strip_prefix("m/").unwrap_or(s);

        let mut c = [0u32; PATH_DEPTH];
        let mut n = 0;

        for p in s.split('/') {
            // Count every component so depth errors report the real length
            if n >= PATH_DEPTH {
                n += 1;
                continue;
            }

            let (v, hardened) = match p.strip_suffix('\'').or_else(|| p.strip_suffix('h')) {
                Some(v) => (v, true),
                None => (p, false),
            };

            let v = u32::from_str(v).map_err(|_| PathError::InvalidComponent)?;
            if v & HARDENED != 0 {
                return Err(PathError::IndexOutOfRange);
            }

            c[n] = match hardened {
                true => v | HARDENED,
                false => v,
            };
            n += 1;
        }

        if n != PATH_DEPTH {
            return Err(PathError::InvalidDepth(n));
        }

        Ok(Self(c))
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "m")?;
        for c in self.0 {
            match c & HARDENED != 0 {
                true => write!(f, "/{}'", c & !HARDENED)?,
                false => write!(f, "/{}", c)?,
            }
        }
        Ok(())
    }
}

impl Encode for Path {
    type Error = ApduError;

    fn encode_len(&self) -> Result<usize, Self::Error> {
        Ok(PATH_LEN)
    }

    fn encode(&self, buff: &mut [u8]) -> Result<usize, Self::Error> {
        put(buff, &self.to_bytes())
    }
}

impl DecodeOwned for Path {
    type Output = Self;

    type Error = ApduError;

    fn decode_owned(buff: &[u8]) -> Result<(Self::Output, usize), Self::Error> {
        if buff.len() < PATH_LEN {
            return Err(ApduError::InvalidLength);
        }

        let mut c = [0u32; PATH_DEPTH];
        for (i, v) in c.iter_mut().enumerate() {
            let mut b = [0u8; 4];
            b.copy_from_slice(&buff[i * 4..][..4]);
            *v = u32::from_le_bytes(b);
        }

        Ok((Self(c), PATH_LEN))
    }
}
