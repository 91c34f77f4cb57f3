//! Network parameters and build options.
//!
//! `NetworkConfig` holds everything a builder needs to know about a network
//! (IDs, the AVAX asset, default fees, staking minimums). It derives serde
//! so applications can keep it in a JSON file next to their own config.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::nbytes::{Address, Id};
use crate::output::OutputOwners;
use crate::TransactionError;

/// Codec version written in front of every transaction and UTXO.
pub const CODEC_VERSION: u16 = 0;

/// nAVAX per AVAX.
pub const ONE_AVAX: u64 = 1_000_000_000;

/// nAVAX per milliAVAX.
pub const MILLI_AVAX: u64 = ONE_AVAX / 1_000;

/// Largest memo a transaction may carry.
pub const MAX_MEMO_LEN: usize = 256;

/// Delegation fee shares that represent 100%.
pub const DELEGATION_FEE_DENOMINATOR: u32 = 1_000_000;

pub const MAINNET_ID: u32 = 1;
pub const FUJI_ID: u32 = 5;
pub const LOCAL_ID: u32 = 12345;

/// The P-chain ID is all zeros on every network.
pub const PLATFORM_CHAIN_ID: Id = Id::new([0u8; 32]);

const fn hex_nibble(c: u8) -> u8 {
    match c {
        b'0'..=b'9' => c - b'0',
        b'a'..=b'f' => c - b'a' + 10,
        _ => panic!("invalid hex digit"),
    }
}

const fn id_from_hex(s: &str) -> Id {
    let b = s.as_bytes();
    let mut out = [0u8; 32];
    let mut i = 0;
    while i < 32 {
        out[i] = (hex_nibble(b[2 * i]) << 4) | hex_nibble(b[2 * i + 1]);
        i += 1;
    }
    Id::new(out)
}

pub const MAINNET_X_CHAIN_ID: Id =
    id_from_hex("ed5f38341e436e5d46e2bb00b45d62ae97d1b050c64bc634ae10626739e35c4b");
pub const MAINNET_C_CHAIN_ID: Id =
    id_from_hex("0427d4b22a2a78bcddd456742caf91b56badbff985ee19aef14573e7343fd652");
pub const MAINNET_AVAX_ASSET_ID: Id =
    id_from_hex("21e67317cbc4be2aeb00677ad6462778a8f52274b9d605df2591b23027a87dff");

pub const FUJI_X_CHAIN_ID: Id =
    id_from_hex("ab68eb1ee142a05cfe768c36e11f0b596db5a3c6c77aabe665dad9e638ca94f7");
pub const FUJI_C_CHAIN_ID: Id =
    id_from_hex("7fc93d85c6d62c5b2ac0b519c87010ea5294012d1e407030d6acd0021cac10d5");
pub const FUJI_AVAX_ASSET_ID: Id =
    id_from_hex("3d9bdac0ed1d761330cf680efdeb1a42159eb387d6d2950c96f7d28f61bbe2aa");

pub const LOCAL_X_CHAIN_ID: Id =
    id_from_hex("d891ad56056d9c01f18f43f58b5c784ad07a4a49cf3d1f11623804b5cba2c6bf");
pub const LOCAL_C_CHAIN_ID: Id =
    id_from_hex("9d0775f450604bd2fbc49ce0c5c1c6dfeb2dc2acb8c92c26eeae6e6df4502b19");
pub const LOCAL_AVAX_ASSET_ID: Id =
    id_from_hex("dbcf890f77f49b96857648b72b77f9f82937f28a68704af05da0dc12ba53f2db");

/// Parameters of one Avalanche network.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkConfig {
    pub network_id: u32,
    /// Bech32 human readable part, e.g. `avax`.
    pub hrp: String,
    pub x_chain_id: Id,
    pub p_chain_id: Id,
    pub c_chain_id: Id,
    pub avax_asset_id: Id,
    /// Flat fee burned by base, import, export and operation transactions.
    pub tx_fee: u64,
    pub create_asset_tx_fee: u64,
    pub create_subnet_tx_fee: u64,
    pub min_validator_stake: u64,
    pub min_delegator_stake: u64,
    /// Lowest delegation fee a validator may charge, in shares of a million.
    pub min_delegation_fee: u32,
}

impl NetworkConfig {
    pub fn mainnet() -> Self {
        NetworkConfig {
            network_id: MAINNET_ID,
            hrp: "avax".to_string(),
            x_chain_id: MAINNET_X_CHAIN_ID,
            p_chain_id: PLATFORM_CHAIN_ID,
            c_chain_id: MAINNET_C_CHAIN_ID,
            avax_asset_id: MAINNET_AVAX_ASSET_ID,
            tx_fee: MILLI_AVAX,
            create_asset_tx_fee: 10 * MILLI_AVAX,
            create_subnet_tx_fee: ONE_AVAX,
            min_validator_stake: 2_000 * ONE_AVAX,
            min_delegator_stake: 25 * ONE_AVAX,
            min_delegation_fee: 20_000,
        }
    }

    pub fn fuji() -> Self {
        NetworkConfig {
            network_id: FUJI_ID,
            hrp: "fuji".to_string(),
            x_chain_id: FUJI_X_CHAIN_ID,
            p_chain_id: PLATFORM_CHAIN_ID,
            c_chain_id: FUJI_C_CHAIN_ID,
            avax_asset_id: FUJI_AVAX_ASSET_ID,
            tx_fee: MILLI_AVAX,
            create_asset_tx_fee: 10 * MILLI_AVAX,
            create_subnet_tx_fee: 100 * MILLI_AVAX,
            min_validator_stake: ONE_AVAX,
            min_delegator_stake: ONE_AVAX,
            min_delegation_fee: 20_000,
        }
    }

    pub fn local() -> Self {
        NetworkConfig {
            network_id: LOCAL_ID,
            hrp: "local".to_string(),
            x_chain_id: LOCAL_X_CHAIN_ID,
            p_chain_id: PLATFORM_CHAIN_ID,
            c_chain_id: LOCAL_C_CHAIN_ID,
            avax_asset_id: LOCAL_AVAX_ASSET_ID,
            tx_fee: MILLI_AVAX,
            create_asset_tx_fee: 10 * MILLI_AVAX,
            create_subnet_tx_fee: ONE_AVAX,
            min_validator_stake: 2_000 * ONE_AVAX,
            min_delegator_stake: 25 * ONE_AVAX,
            min_delegation_fee: 20_000,
        }
    }

    /// Preset for a well-known network ID.
    pub fn for_network_id(network_id: u32) -> Option<Self> {
        match network_id {
            MAINNET_ID => Some(Self::mainnet()),
            FUJI_ID => Some(Self::fuji()),
            LOCAL_ID => Some(Self::local()),
            _ => None,
        }
    }

    /// Load a config from its JSON form.
    pub fn from_json(s: &str) -> Result<Self, TransactionError> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn to_json(&self) -> Result<String, TransactionError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self::mainnet()
    }
}

/// Current unix time in seconds.
pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Options shared by every `build_*` helper.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BuildOptions {
    /// Memo attached to the transaction, at most `MAX_MEMO_LEN` bytes.
    pub memo: Vec<u8>,
    /// Time at which UTXO locktimes are evaluated.
    pub as_of: u64,
    /// Locktime of the outputs created for the destinations.
    pub locktime: u64,
    /// Threshold of the outputs created for the destinations.
    pub threshold: u32,
    /// Fee to burn instead of the network default.
    pub fee: Option<u64>,
}

impl Default for BuildOptions {
    fn default() -> Self {
        BuildOptions {
            memo: Vec::new(),
            as_of: unix_now(),
            locktime: 0,
            threshold: 1,
            fee: None,
        }
    }
}

impl BuildOptions {
    pub fn with_memo(mut self, memo: &[u8]) -> Self {
        self.memo = memo.to_vec();
        self
    }

    pub fn with_as_of(mut self, as_of: u64) -> Self {
        self.as_of = as_of;
        self
    }

    pub fn with_locktime(mut self, locktime: u64) -> Self {
        self.locktime = locktime;
        self
    }

    pub fn with_threshold(mut self, threshold: u32) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_fee(mut self, fee: u64) -> Self {
        self.fee = Some(fee);
        self
    }

    /// Check that outputs paid to `to` under these options can be spent.
    pub fn check_destinations(&self, to: &[Address]) -> Result<(), TransactionError> {
        OutputOwners::check_spendable(to, self.threshold, "destination")
    }

    /// The fee to burn: the override if set, else `default_fee`.
    pub fn fee_or(&self, default_fee: u64) -> u64 {
        self.fee.unwrap_or(default_fee)
    }
}
