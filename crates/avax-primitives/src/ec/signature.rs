//! Recoverable ECDSA signature in the 65-byte `r || s || v` layout.
//!
//! Every signature inside an Avalanche credential has this shape: the
//! 32-byte R and S components followed by a one-byte recovery id (0 or 1).
//! Signing uses RFC6979 deterministic nonces and always produces low-S.

use k256::ecdsa::{self, RecoveryId, VerifyingKey};

use crate::ec::private_key::PrivateKey;
use crate::ec::public_key::PublicKey;
use crate::PrimitivesError;

/// Length of a serialized recoverable signature.
pub const SIGNATURE_LEN: usize = 65;

/// An ECDSA signature with R and S components and a recovery id.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Signature {
    /// The R component of the signature (32 bytes, big-endian).
    r: [u8; 32],
    /// The S component of the signature (32 bytes, big-endian).
    s: [u8; 32],
    /// Recovery id, 0 or 1.
    v: u8,
}

impl Signature {
    /// Create a signature from raw components.
    pub fn new(r: [u8; 32], s: [u8; 32], v: u8) -> Self {
        Signature { r, s, v }
    }

    /// Access the R component of the signature.
    pub fn r(&self) -> &[u8; 32] {
        &self.r
    }

    /// Access the S component of the signature.
    pub fn s(&self) -> &[u8; 32] {
        &self.s
    }

    /// Access the recovery id.
    pub fn v(&self) -> u8 {
        self.v
    }

    /// Sign a 32-byte digest with a private key.
    ///
    /// # Arguments
    /// * `digest` - The SHA-256 digest to sign.
    /// * `priv_key` - The signing key.
    ///
    /// # Returns
    /// A low-S signature whose recovery id yields `priv_key`'s public key.
    pub fn sign(digest: &[u8; 32], priv_key: &PrivateKey) -> Result<Self, PrimitivesError> {
        let (sig, recid) = priv_key
            .signing_key()
            .sign_prehash_recoverable(digest)
            .map_err(|e| PrimitivesError::InvalidSignature(format!("signing failed: {}", e)))?;
        let (r_bytes, s_bytes) = sig.split_bytes();
        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        r.copy_from_slice(&r_bytes);
        s.copy_from_slice(&s_bytes);
        Ok(Signature {
            r,
            s,
            v: recid.to_byte(),
        })
    }

    /// Parse a 65-byte `r || s || v` signature.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PrimitivesError> {
        if bytes.len() != SIGNATURE_LEN {
            return Err(PrimitivesError::InvalidLength {
                expected: SIGNATURE_LEN,
                got: bytes.len(),
            });
        }
        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        r.copy_from_slice(&bytes[..32]);
        s.copy_from_slice(&bytes[32..64]);
        let v = bytes[64];
        if v > 1 {
            return Err(PrimitivesError::InvalidSignature(format!(
                "recovery id out of range: {}",
                v
            )));
        }
        Ok(Signature { r, s, v })
    }

    /// Serialize as 65 bytes: `r || s || v`.
    pub fn to_bytes(&self) -> [u8; SIGNATURE_LEN] {
        let mut out = [0u8; SIGNATURE_LEN];
        out[..32].copy_from_slice(&self.r);
        out[32..64].copy_from_slice(&self.s);
        out[64] = self.v;
        out
    }

    /// Recover the public key that produced this signature over `digest`.
    pub fn recover_public_key(&self, digest: &[u8; 32]) -> Result<PublicKey, PrimitivesError> {
        let sig = self.to_k256()?;
        let recid = RecoveryId::from_byte(self.v).ok_or_else(|| {
            PrimitivesError::InvalidSignature(format!("recovery id out of range: {}", self.v))
        })?;
        let vk = VerifyingKey::recover_from_prehash(digest, &sig, recid)
            .map_err(|e| PrimitivesError::InvalidSignature(format!("recovery failed: {}", e)))?;
        Ok(PublicKey::from_k256_verifying_key(&vk))
    }

    /// Verify this signature against a digest and public key.
    pub fn verify(&self, digest: &[u8; 32], pub_key: &PublicKey) -> bool {
        pub_key.verify(digest, self)
    }

    pub(crate) fn to_k256(&self) -> Result<ecdsa::Signature, PrimitivesError> {
        let mut rs = [0u8; 64];
        rs[..32].copy_from_slice(&self.r);
        rs[32..].copy_from_slice(&self.s);
        ecdsa::Signature::from_slice(&rs)
            .map_err(|e| PrimitivesError::InvalidSignature(e.to_string()))
    }
}
