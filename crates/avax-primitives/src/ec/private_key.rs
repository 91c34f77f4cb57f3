//! secp256k1 private key with Avalanche-specific functionality.
//!
//! Wraps a k256 signing key and adds the `PrivateKey-<cb58>` string form,
//! address derivation and recoverable signing of 32-byte digests.

use std::fmt;
use std::str::FromStr;

use k256::ecdsa::SigningKey;
use rand::rngs::OsRng;

use crate::base58::{cb58_decode_fixed, cb58_encode};
use crate::ec::public_key::PublicKey;
use crate::ec::signature::Signature;
use crate::PrimitivesError;

/// Length of a serialized private key in bytes.
pub const PRIVATE_KEY_BYTES_LEN: usize = 32;

pub use crate::serialization::PRIVATE_KEY_PREFIX;

/// A secp256k1 private key for signing transaction digests.
#[derive(Clone, Debug)]
pub struct PrivateKey {
    /// The underlying k256 signing key.
    inner: SigningKey,
}

impl PrivateKey {
    /// Generate a new random private key using the OS random number generator.
    pub fn new() -> Self {
        PrivateKey {
            inner: SigningKey::random(&mut OsRng),
        }
    }

    /// Create a private key from a raw 32-byte scalar.
    ///
    /// # Arguments
    /// * `bytes` - A 32-byte slice representing the private key scalar.
    ///
    /// # Returns
    /// `Ok(PrivateKey)` if the bytes represent a valid scalar on secp256k1,
    /// or an error if the length is wrong or the scalar is zero/out of range.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PrimitivesError> {
        if bytes.len() != PRIVATE_KEY_BYTES_LEN {
            return Err(PrimitivesError::InvalidLength {
                expected: PRIVATE_KEY_BYTES_LEN,
                got: bytes.len(),
            });
        }
        let inner = SigningKey::from_slice(bytes)
            .map_err(|e| PrimitivesError::InvalidPrivateKey(e.to_string()))?;
        Ok(PrivateKey { inner })
    }

    /// Create a private key from a hexadecimal string.
    pub fn from_hex(hex_str: &str) -> Result<Self, PrimitivesError> {
        if hex_str.is_empty() {
            return Err(PrimitivesError::InvalidPrivateKey(
                "private key hex is empty".to_string(),
            ));
        }
        let bytes = hex::decode(hex_str)?;
        Self::from_bytes(&bytes)
    }

    /// Serialize the private key as a 32-byte big-endian array.
    pub fn to_bytes(&self) -> [u8; PRIVATE_KEY_BYTES_LEN] {
        let mut out = [0u8; PRIVATE_KEY_BYTES_LEN];
        out.copy_from_slice(&self.inner.to_bytes());
        out
    }

    /// Serialize the private key as a lowercase hexadecimal string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }

    /// Derive the corresponding public key.
    pub fn pub_key(&self) -> PublicKey {
        PublicKey::from_k256_verifying_key(self.inner.verifying_key())
    }

    /// The 20-byte address controlled by this key.
    pub fn address(&self) -> [u8; 20] {
        self.pub_key().address()
    }

    /// Sign a 32-byte digest with an RFC6979 deterministic nonce.
    ///
    /// # Returns
    /// A low-S recoverable signature, or an error if signing fails.
    pub fn sign(&self, digest: &[u8; 32]) -> Result<Signature, PrimitivesError> {
        Signature::sign(digest, self)
    }

    /// Access the underlying k256 `SigningKey`.
    pub(crate) fn signing_key(&self) -> &SigningKey {
        &self.inner
    }
}

impl Default for PrivateKey {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for PrivateKey {
    fn eq(&self, other: &Self) -> bool {
        self.to_bytes() == other.to_bytes()
    }
}

impl Eq for PrivateKey {}

impl fmt::Display for PrivateKey {
    /// Render as `PrivateKey-<cb58>`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", PRIVATE_KEY_PREFIX, cb58_encode(&self.to_bytes()))
    }
}

impl FromStr for PrivateKey {
    type Err = PrimitivesError;

    /// Parse the `PrivateKey-<cb58>` form; the prefix is optional.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let body = s.strip_prefix(PRIVATE_KEY_PREFIX).unwrap_or(s);
        let bytes = cb58_decode_fixed(body, PRIVATE_KEY_BYTES_LEN)?;
        Self::from_bytes(&bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY_BYTES: [u8; 32] = [
        0xea, 0xf0, 0x2c, 0xa3, 0x48, 0xc5, 0x24, 0xe6, 0x39, 0x26, 0x55, 0xba, 0x4d, 0x29,
        0x60, 0x3c, 0xd1, 0xa7, 0x34, 0x7d, 0x9d, 0x65, 0xcf, 0xe9, 0x3c, 0xe1, 0xeb, 0xff,
        0xdc, 0xa2, 0x26, 0x94,
    ];

    #[test]
    fn test_priv_keys() {
        let priv_key = PrivateKey::from_bytes(&KEY_BYTES).unwrap();
        let pub_key = priv_key.pub_key();

        let digest = crate::hash::sha256(b"avalanche");
        let sig = priv_key.sign(&digest).unwrap();
        assert!(pub_key.verify(&digest, &sig));

        assert_eq!(priv_key.to_bytes(), KEY_BYTES);
    }

    #[test]
    fn test_private_key_string_roundtrip() {
        let pk = PrivateKey::new();

        let deserialized = PrivateKey::from_bytes(&pk.to_bytes()).unwrap();
        assert_eq!(pk, deserialized);

        let deserialized = PrivateKey::from_hex(&pk.to_hex()).unwrap();
        assert_eq!(pk, deserialized);

        let s = pk.to_string();
        assert!(s.starts_with(PRIVATE_KEY_PREFIX));
        let deserialized: PrivateKey = s.parse().unwrap();
        assert_eq!(pk, deserialized);
    }

    #[test]
    fn test_private_key_rejects_bad_input() {
        assert!(PrivateKey::from_hex("").is_err());
        assert!(PrivateKey::from_bytes(&[1u8; 31]).is_err());
        assert!(PrivateKey::from_bytes(&[0u8; 32]).is_err());

        let mut s = PrivateKey::from_bytes(&KEY_BYTES).unwrap().to_string();
        s.pop();
        assert!(s.parse::<PrivateKey>().is_err());
    }
}
