// Copyright (c) 2023-2024 The Spacemesh Ledger Contributors

use std::str::FromStr;

use serde::Deserialize;

use ledger_spacemesh::apdu::{
    account::{Account, AccountKeys, AccountType, Pubkey, UnlockSchedule, VaultAccount},
    path::Path,
    sign::Domain,
    PUBKEY_LEN,
};

/// Variable length hex-encoded argument
#[derive(Clone, PartialEq, Debug, Default)]
pub struct HexData(pub Vec<u8>);

impl FromStr for HexData {
    type Err = hex::FromHexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        hex::decode(s.trim_start_matches("0x")).map(HexData)
    }
}

impl AsRef<[u8]> for HexData {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl std::fmt::Display for HexData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", hex::encode(&self.0))
    }
}

/// Parse a derivation path argument
pub fn parse_path(s: &str) -> Result<Path, String> {
    Path::from_str(s).map_err(|e| e.to_string())
}

/// Parse a signing domain argument
pub fn parse_domain(s: &str) -> Result<Domain, String> {
    Domain::from_str(s).map_err(|_| format!("unknown signing domain '{}'", s))
}

/// Participant key in an account definition file
#[derive(Clone, PartialEq, Debug, Deserialize)]
pub struct PubkeyDef {
    pub index: u8,
    /// Hex encoded ed25519 public key
    pub key: String,
}

/// Vault unlock schedule in an account definition file
#[derive(Clone, PartialEq, Debug, Deserialize)]
pub struct ScheduleDef {
    pub total_amount: u64,
    pub initial_unlock_amount: u64,
    pub vesting_start: u32,
    pub vesting_end: u32,
}

/// JSON account definition, for example:
///
/// ```json
/// {
///   "type": "vesting",
///   "approvers": 2,
///   "participants": 2,
///   "pubkeys": [ { "index": 0, "key": "136d3aee..." } ]
/// }
/// ```
#[derive(Clone, PartialEq, Debug, Deserialize)]
pub struct AccountDef {
    #[serde(rename = "type")]
    pub kind: String,
    pub approvers: u8,
    pub participants: u8,
    #[serde(default)]
    pub pubkeys: Vec<PubkeyDef>,
    #[serde(default)]
    pub schedule: Option<ScheduleDef>,
}

impl TryFrom<AccountDef> for Account {
    type Error = anyhow::Error;

    fn try_from(d: AccountDef) -> Result<Self, Self::Error> {
        let kind = AccountType::from_str(&d.kind)
            .map_err(|_| anyhow::anyhow!("unknown account type '{}'", d.kind))?;

        let mut pubkeys = Vec::with_capacity(d.pubkeys.len());
        for p in &d.pubkeys {
            let mut key = [0u8; PUBKEY_LEN];
            hex::decode_to_slice(&p.key, &mut key)
                .map_err(|e| anyhow::anyhow!("invalid key for index {}: {}", p.index, e))?;
            pubkeys.push(Pubkey::new(p.index, key));
        }

        let keys = AccountKeys::new(d.approvers, d.participants, pubkeys);

        let a = match (kind, d.schedule) {
            (AccountType::Wallet, _) => Account::Wallet(keys),
            (AccountType::Multisig, _) => Account::Multisig(keys),
            (AccountType::Vesting, _) => Account::Vesting(keys),
            (AccountType::Vault, Some(s)) => Account::Vault(VaultAccount {
                owner: keys,
                schedule: UnlockSchedule {
                    total_amount: s.total_amount,
                    initial_unlock_amount: s.initial_unlock_amount,
                    vesting_start: s.vesting_start,
                    vesting_end: s.vesting_end,
                },
            }),
            (AccountType::Vault, None) => {
                return Err(anyhow::anyhow!("vault accounts require a schedule"))
            }
        };

        Ok(a)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const KEY: &str = "136d3aee6442288da85f936f7fe6822186f1d3c63c050721c66bcb7a2095655d";

    fn account(json: &str) -> anyhow::Result<Account> {
        let d: AccountDef = serde_json::from_str(json)?;
        Account::try_from(d)
    }

    #[test]
    fn vesting_definition() {
        let json = format!(
            r#"{{ "type": "vesting", "approvers": 2, "participants": 2,
                "pubkeys": [ {{ "index": 0, "key": "{}" }} ] }}"#,
            KEY
        );

        let mut key = [0u8; PUBKEY_LEN];
        hex::decode_to_slice(KEY, &mut key).unwrap();

        assert_eq!(
            account(&json).unwrap(),
            Account::Vesting(AccountKeys::new(2, 2, vec![Pubkey::new(0, key)]))
        );
    }

    #[test]
    fn vault_definition() {
        let json = r#"{ "type": "vault", "approvers": 1, "participants": 1,
            "schedule": { "total_amount": 100, "initial_unlock_amount": 10,
                          "vesting_start": 5, "vesting_end": 50 } }"#;

        let a = account(json).unwrap();
        assert_eq!(
            a,
            Account::Vault(VaultAccount {
                owner: AccountKeys::new(1, 1, vec![]),
                schedule: UnlockSchedule {
                    total_amount: 100,
                    initial_unlock_amount: 10,
                    vesting_start: 5,
                    vesting_end: 50,
                },
            })
        );

        // Schedule is required for vaults
        let json = r#"{ "type": "vault", "approvers": 1, "participants": 1 }"#;
        let e = account(json).unwrap_err();
        assert!(e.to_string().contains("schedule"));
    }

    #[test]
    fn invalid_definitions() {
        let e = account(r#"{ "type": "savings", "approvers": 1, "participants": 1 }"#)
            .unwrap_err();
        assert!(e.to_string().contains("unknown account type 'savings'"));

        // Short key
        let json = r#"{ "type": "multisig", "approvers": 1, "participants": 2,
            "pubkeys": [ { "index": 1, "key": "136d3a" } ] }"#;
        let e = account(json).unwrap_err();
        assert!(e.to_string().contains("invalid key for index 1"));

        // Non-hex key
        let json = format!(
            r#"{{ "type": "multisig", "approvers": 1, "participants": 2,
                "pubkeys": [ {{ "index": 1, "key": "{}" }} ] }}"#,
            "zz".repeat(PUBKEY_LEN)
        );
        assert!(account(&json).is_err());

        // Missing required fields
        assert!(account(r#"{ "type": "wallet" }"#).is_err());
    }

    #[test]
    fn argument_parsers() {
        assert_eq!(
            HexData::from_str("0xaabb").unwrap(),
            HexData(vec![0xaa, 0xbb])
        );
        assert!(HexData::from_str("abc").is_err());

        assert_eq!(parse_path("m/44'/540'/0'/0/1").unwrap(), Path::spacemesh(0, 0, 1));
        assert!(parse_path("m/44'").is_err());

        assert_eq!(parse_domain("ATX").unwrap(), Domain::Atx);
        assert!(parse_domain("nope").is_err());
    }
}
