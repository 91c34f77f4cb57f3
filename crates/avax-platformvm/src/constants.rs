//! P-chain codec type IDs.

pub const SECP_INPUT_ID: u32 = 5;
pub const SECP_XFER_OUTPUT_ID: u32 = 7;
pub const SECP_CREDENTIAL_ID: u32 = 9;
/// Signature indices authorizing a subnet change.
pub const SUBNET_AUTH_ID: u32 = 10;
/// Owners without an amount, used for reward and subnet owners.
pub const SECP_OWNER_OUTPUT_ID: u32 = 11;

pub const ADD_VALIDATOR_TX_ID: u32 = 12;
pub const ADD_SUBNET_VALIDATOR_TX_ID: u32 = 13;
pub const ADD_DELEGATOR_TX_ID: u32 = 14;
pub const CREATE_SUBNET_TX_ID: u32 = 16;
pub const IMPORT_TX_ID: u32 = 17;
pub const EXPORT_TX_ID: u32 = 18;

/// Transfer input wrapped with a stakeable locktime.
pub const STAKEABLE_LOCK_IN_ID: u32 = 21;
/// Transfer output wrapped with a stakeable locktime.
pub const STAKEABLE_LOCK_OUT_ID: u32 = 22;
