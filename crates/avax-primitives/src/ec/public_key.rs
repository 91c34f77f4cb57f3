//! secp256k1 public key.
//!
//! Supports compressed/uncompressed SEC1 serialization, Avalanche address
//! derivation and signature verification.

use std::fmt;

use k256::ecdsa::signature::hazmat::PrehashVerifier;
use k256::ecdsa::VerifyingKey;
use k256::elliptic_curve::sec1::ToEncodedPoint;

use crate::ec::signature::Signature;
use crate::hash::hash160;
use crate::PrimitivesError;

/// Length of a compressed public key in bytes (prefix + 32 byte x-coordinate).
pub const COMPRESSED_LEN: usize = 33;

/// Length of an uncompressed public key in bytes (prefix + 32 byte x + 32 byte y).
pub const UNCOMPRESSED_LEN: usize = 65;

/// A secp256k1 public key.
#[derive(Clone, Debug)]
pub struct PublicKey {
    /// The underlying k256 verifying key.
    inner: VerifyingKey,
}

impl PublicKey {
    /// Create a PublicKey from raw SEC1 encoded bytes.
    ///
    /// Accepts both compressed (33-byte) and uncompressed (65-byte) formats.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PrimitivesError> {
        if bytes.is_empty() {
            return Err(PrimitivesError::InvalidPublicKey(
                "pubkey bytes are empty".to_string(),
            ));
        }
        let inner = VerifyingKey::from_sec1_bytes(bytes)
            .map_err(|e| PrimitivesError::InvalidPublicKey(e.to_string()))?;
        Ok(PublicKey { inner })
    }

    /// Create a PublicKey from a hex-encoded SEC1 string.
    pub fn from_hex(hex_str: &str) -> Result<Self, PrimitivesError> {
        let bytes = hex::decode(hex_str)?;
        Self::from_bytes(&bytes)
    }

    pub(crate) fn from_k256_verifying_key(vk: &VerifyingKey) -> Self {
        PublicKey { inner: *vk }
    }

    /// Serialize the public key in compressed SEC1 format (33 bytes).
    pub fn to_compressed(&self) -> [u8; COMPRESSED_LEN] {
        let point = self.inner.to_encoded_point(true);
        let mut out = [0u8; COMPRESSED_LEN];
        out.copy_from_slice(point.as_bytes());
        out
    }

    /// Serialize the public key in uncompressed SEC1 format (65 bytes).
    pub fn to_uncompressed(&self) -> [u8; UNCOMPRESSED_LEN] {
        let point = self.inner.to_encoded_point(false);
        let mut out = [0u8; UNCOMPRESSED_LEN];
        out.copy_from_slice(point.as_bytes());
        out
    }

    /// Serialize the public key as a lowercase hex string (compressed format).
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_compressed())
    }

    /// Derive the 20-byte Avalanche address of this key.
    ///
    /// Address = RIPEMD160(SHA256(compressed_pubkey)).
    pub fn address(&self) -> [u8; 20] {
        hash160(&self.to_compressed())
    }

    /// Verify a signature over a 32-byte digest.
    pub fn verify(&self, digest: &[u8; 32], sig: &Signature) -> bool {
        match sig.to_k256() {
            Ok(k256_sig) => self.inner.verify_prehash(digest, &k256_sig).is_ok(),
            Err(_) => false,
        }
    }
}

impl PartialEq for PublicKey {
    fn eq(&self, other: &Self) -> bool {
        self.to_compressed() == other.to_compressed()
    }
}

impl Eq for PublicKey {}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ec::PrivateKey;

    #[test]
    fn test_pubkey_compressed_uncompressed_roundtrip() {
        let pk = PrivateKey::new();
        let pub_key = pk.pub_key();
        let from_compressed = PublicKey::from_bytes(&pub_key.to_compressed()).unwrap();
        let from_uncompressed = PublicKey::from_bytes(&pub_key.to_uncompressed()).unwrap();
        assert_eq!(pub_key, from_compressed);
        assert_eq!(pub_key, from_uncompressed);
        assert_eq!(PublicKey::from_hex(&pub_key.to_hex()).unwrap(), pub_key);
    }

    #[test]
    fn test_pubkey_rejects_garbage() {
        assert!(PublicKey::from_bytes(&[]).is_err());
        assert!(PublicKey::from_bytes(&[0x05; 33]).is_err());
        assert!(PublicKey::from_bytes(&[0x02; 20]).is_err());
        assert!(PublicKey::from_hex("zz").is_err());
    }

    #[test]
    fn test_address_is_hash160_of_compressed_key() {
        let pk = PrivateKey::new();
        let pub_key = pk.pub_key();
        assert_eq!(pub_key.address(), hash160(&pub_key.to_compressed()));
        assert_eq!(pk.address(), pub_key.address());
    }
}
