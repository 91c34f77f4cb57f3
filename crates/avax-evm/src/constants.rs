//! C-chain atomic codec type IDs.

pub const IMPORT_TX_ID: u32 = 0;
pub const EXPORT_TX_ID: u32 = 1;

pub const SECP_INPUT_ID: u32 = 5;
pub const SECP_XFER_OUTPUT_ID: u32 = 7;
pub const SECP_CREDENTIAL_ID: u32 = 9;
