//! Credentials: the signatures attached to a signed transaction.
//!
//! Credential `i` authorizes serialized input `i`; signature `j` of a
//! credential belongs to the owner named by the input's `j`th `SigIdx`.

use std::fmt;

use avax_primitives::util::{AvaxReader, AvaxWriter};
use log::trace;

use crate::input::SigIdx;
use crate::keychain::KeyChain;
use crate::nbytes::Signature;
use crate::TransactionError;

/// An ordered list of 65-byte signatures.
///
/// Body: `num_sigs(u32) || signature(65)*`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Credential {
    pub sig_array: Vec<Signature>,
}

impl Credential {
    pub fn new(sig_array: Vec<Signature>) -> Self {
        Credential { sig_array }
    }

    /// Append a signature and return its index.
    pub fn add_signature(&mut self, sig: Signature) -> usize {
        self.sig_array.push(sig);
        self.sig_array.len() - 1
    }

    /// Sign `digest` once per signature slot, in slot order.
    ///
    /// Fails with `UnresolvedSigner` if a slot has no owner address and
    /// with `KeyNotFound` if an owner is missing from the keychain; nothing
    /// is returned in either case.
    pub fn sign(
        digest: &[u8; 32],
        sig_idxs: &[SigIdx],
        keychain: &KeyChain,
    ) -> Result<Self, TransactionError> {
        let mut cred = Credential::default();
        for sig_idx in sig_idxs {
            let signer = sig_idx.signer()?;
            let key = keychain
                .get_key(&signer)
                .ok_or_else(|| TransactionError::KeyNotFound(signer.to_string()))?;
            trace!("signing slot {} with {}", sig_idx.index, signer);
            cred.add_signature(key.sign(digest)?);
        }
        Ok(cred)
    }

    pub fn read_from(reader: &mut AvaxReader) -> Result<Self, TransactionError> {
        let count = reader.read_count(Signature::SIZE).map_err(|e| {
            TransactionError::SerializationError(format!("reading signature count: {}", e))
        })?;
        let mut sig_array = Vec::with_capacity(count);
        for _ in 0..count {
            sig_array.push(Signature::read_from(reader)?);
        }
        Ok(Credential { sig_array })
    }

    pub fn write_to(&self, writer: &mut AvaxWriter) {
        writer.write_u32_be(self.sig_array.len() as u32);
        for sig in &self.sig_array {
            sig.write_to(writer);
        }
    }
}

/// A VM's closed set of credential variants.
pub trait CredentialKind: Clone + fmt::Debug + PartialEq + Sized {
    fn type_id(&self) -> u32;

    /// The signatures carried.
    fn credential(&self) -> &Credential;

    /// Wrap signatures in the variant registered for `type_id`.
    fn from_parts(type_id: u32, credential: Credential) -> Result<Self, TransactionError>;

    fn write_to(&self, writer: &mut AvaxWriter) {
        writer.write_u32_be(self.type_id());
        self.credential().write_to(writer);
    }

    fn read_from(reader: &mut AvaxReader) -> Result<Self, TransactionError> {
        let type_id = reader.read_u32_be().map_err(|e| {
            TransactionError::SerializationError(format!("reading credential type id: {}", e))
        })?;
        let credential = Credential::read_from(reader)?;
        Self::from_parts(type_id, credential)
    }
}
