//! Key pairs and the keychain used to sign transactions.
//!
//! The keychain indexes secp256k1 keys by their 20-byte address so that a
//! `SigIdx` recorded at build time can be resolved to a signing key.

use std::collections::BTreeMap;

use avax_primitives::ec::{PrivateKey, PublicKey};
use log::debug;

use crate::nbytes::{Address, Signature};
use crate::TransactionError;

/// A private key together with its derived address.
#[derive(Clone, Debug, PartialEq)]
pub struct KeyPair {
    private_key: PrivateKey,
    address: Address,
}

impl KeyPair {
    /// Generate a fresh random key pair.
    pub fn generate() -> Self {
        Self::from_private_key(PrivateKey::new())
    }

    pub fn from_private_key(private_key: PrivateKey) -> Self {
        let address = Address::new(private_key.address());
        KeyPair {
            private_key,
            address,
        }
    }

    /// Import a key from `PrivateKey-<cb58>`, bare cb58, or 64 hex characters.
    pub fn import(s: &str) -> Result<Self, TransactionError> {
        let private_key = if s.len() == 64 && s.chars().all(|c| c.is_ascii_hexdigit()) {
            PrivateKey::from_hex(s)?
        } else {
            s.parse::<PrivateKey>()?
        };
        Ok(Self::from_private_key(private_key))
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn public_key(&self) -> PublicKey {
        self.private_key.pub_key()
    }

    pub fn private_key(&self) -> &PrivateKey {
        &self.private_key
    }

    /// `PrivateKey-<cb58>`.
    pub fn private_key_string(&self) -> String {
        self.private_key.to_string()
    }

    /// Sign a 32-byte digest, producing a 65-byte recoverable signature.
    pub fn sign(&self, digest: &[u8; 32]) -> Result<Signature, TransactionError> {
        Ok(self.private_key.sign(digest)?.into())
    }

    /// Whether `sig` over `digest` was made by this key.
    pub fn verify(&self, digest: &[u8; 32], sig: &Signature) -> bool {
        match sig.to_ec() {
            Ok(sig) => self.public_key().verify(digest, &sig),
            Err(_) => false,
        }
    }
}

/// A set of key pairs indexed by address.
#[derive(Clone, Debug)]
pub struct KeyChain {
    hrp: String,
    chain_id: String,
    keys: BTreeMap<Address, KeyPair>,
}

impl KeyChain {
    /// Create an empty keychain rendering addresses as `<chain_id>-<hrp>1...`.
    pub fn new(hrp: &str, chain_id: &str) -> Self {
        KeyChain {
            hrp: hrp.to_string(),
            chain_id: chain_id.to_string(),
            keys: BTreeMap::new(),
        }
    }

    /// Generate a new key and return its address.
    pub fn make_key(&mut self) -> Address {
        self.add_key(KeyPair::generate())
    }

    pub fn add_key(&mut self, key: KeyPair) -> Address {
        let address = key.address();
        debug!("keychain: added {}", address);
        self.keys.insert(address, key);
        address
    }

    /// Import a private key string and return its address.
    pub fn import_key(&mut self, s: &str) -> Result<Address, TransactionError> {
        Ok(self.add_key(KeyPair::import(s)?))
    }

    /// Remove a key; returns whether it was present.
    pub fn remove_key(&mut self, address: &Address) -> bool {
        self.keys.remove(address).is_some()
    }

    pub fn has_key(&self, address: &Address) -> bool {
        self.keys.contains_key(address)
    }

    pub fn get_key(&self, address: &Address) -> Option<&KeyPair> {
        self.keys.get(address)
    }

    /// All addresses, in sorted order.
    pub fn get_addresses(&self) -> Vec<Address> {
        self.keys.keys().copied().collect()
    }

    /// All addresses as chain address strings.
    pub fn get_address_strings(&self) -> Result<Vec<String>, TransactionError> {
        self.keys
            .keys()
            .map(|a| a.to_bech32(&self.chain_id, &self.hrp))
            .collect()
    }

    pub fn hrp(&self) -> &str {
        &self.hrp
    }

    pub fn chain_id(&self) -> &str {
        &self.chain_id
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}
