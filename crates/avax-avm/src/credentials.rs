//! X-chain credentials.

use avax_transaction::credential::{Credential, CredentialKind};
use avax_transaction::TransactionError;

use crate::constants::{NFT_CREDENTIAL_ID, SECP_CREDENTIAL_ID};

/// Signatures authorizing one input or operation.
///
/// Both variants carry the same body; the type ID tells the node which
/// feature extension verifies it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AvmCredential {
    /// secp256k1fx credential (9).
    Secp(Credential),
    /// nftfx credential (14).
    Nft(Credential),
}

impl AvmCredential {
    pub fn type_name(&self) -> &'static str {
        match self {
            AvmCredential::Secp(_) => "SECPCredential",
            AvmCredential::Nft(_) => "NFTCredential",
        }
    }
}

impl CredentialKind for AvmCredential {
    fn type_id(&self) -> u32 {
        match self {
            AvmCredential::Secp(_) => SECP_CREDENTIAL_ID,
            AvmCredential::Nft(_) => NFT_CREDENTIAL_ID,
        }
    }

    fn credential(&self) -> &Credential {
        match self {
            AvmCredential::Secp(c) | AvmCredential::Nft(c) => c,
        }
    }

    fn from_parts(type_id: u32, credential: Credential) -> Result<Self, TransactionError> {
        match type_id {
            SECP_CREDENTIAL_ID => Ok(AvmCredential::Secp(credential)),
            NFT_CREDENTIAL_ID => Ok(AvmCredential::Nft(credential)),
            _ => Err(TransactionError::UnknownType { kind: "credential", type_id }),
        }
    }
}
