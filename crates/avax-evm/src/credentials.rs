//! C-chain credentials.

use avax_transaction::credential::{Credential, CredentialKind};
use avax_transaction::TransactionError;

use crate::constants::SECP_CREDENTIAL_ID;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EvmCredential {
    /// secp256k1fx credential (9).
    Secp(Credential),
}

impl EvmCredential {
    pub fn type_name(&self) -> &'static str {
        match self {
            EvmCredential::Secp(_) => "SECPCredential",
        }
    }
}

impl CredentialKind for EvmCredential {
    fn type_id(&self) -> u32 {
        match self {
            EvmCredential::Secp(_) => SECP_CREDENTIAL_ID,
        }
    }

    fn credential(&self) -> &Credential {
        match self {
            EvmCredential::Secp(c) => c,
        }
    }

    fn from_parts(type_id: u32, credential: Credential) -> Result<Self, TransactionError> {
        match type_id {
            SECP_CREDENTIAL_ID => Ok(EvmCredential::Secp(credential)),
            _ => Err(TransactionError::UnknownType { kind: "credential", type_id }),
        }
    }
}
