//! X-chain codec type IDs and limits.

/// secp256k1fx transfer input.
pub const SECP_INPUT_ID: u32 = 5;
/// secp256k1fx mint output.
pub const SECP_MINT_OUTPUT_ID: u32 = 6;
/// secp256k1fx transfer output.
pub const SECP_XFER_OUTPUT_ID: u32 = 7;
/// secp256k1fx mint operation.
pub const SECP_MINT_OP_ID: u32 = 8;
/// secp256k1fx credential.
pub const SECP_CREDENTIAL_ID: u32 = 9;
/// nftfx mint output.
pub const NFT_MINT_OUTPUT_ID: u32 = 10;
/// nftfx transfer output.
pub const NFT_XFER_OUTPUT_ID: u32 = 11;
/// nftfx mint operation.
pub const NFT_MINT_OP_ID: u32 = 12;
/// nftfx transfer operation.
pub const NFT_XFER_OP_ID: u32 = 13;
/// nftfx credential.
pub const NFT_CREDENTIAL_ID: u32 = 14;

/// Base transaction.
pub const BASE_TX_ID: u32 = 0;
/// Asset creation.
pub const CREATE_ASSET_TX_ID: u32 = 1;
/// Operations on mint and NFT outputs.
pub const OPERATION_TX_ID: u32 = 2;
/// Import from another chain's shared memory.
pub const IMPORT_TX_ID: u32 = 3;
/// Export to another chain's shared memory.
pub const EXPORT_TX_ID: u32 = 4;

/// Feature extension ID of secp256k1fx initial states.
pub const SECP_FX_ID: u32 = 0;
/// Feature extension ID of nftfx initial states.
pub const NFT_FX_ID: u32 = 1;

/// Largest NFT payload in bytes.
pub const MAX_NFT_PAYLOAD_LEN: usize = 1024;
/// Longest asset name in bytes.
pub const MAX_ASSET_NAME_LEN: usize = 128;
/// Longest asset symbol in bytes.
pub const MAX_ASSET_SYMBOL_LEN: usize = 4;
/// Largest asset denomination.
pub const MAX_DENOMINATION: u8 = 32;
