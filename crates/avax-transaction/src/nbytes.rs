//! Fixed-width byte array value types.
//!
//! Every type here owns exactly `SIZE` bytes and round-trips exactly that
//! many bytes through the codec. `Address` and `NodeId` are 20 bytes,
//! `Id` (asset, transaction, blockchain and subnet IDs) is 32 bytes and
//! `Signature` is the 65-byte recoverable `r || s || v` form.

use std::fmt;
use std::str::FromStr;

use avax_primitives::base58::{cb58_decode_fixed, cb58_encode};
use avax_primitives::ec::{self, PublicKey};
use avax_primitives::serialization::{address_to_string, parse_address, NODE_ID_PREFIX};
use avax_primitives::util::{AvaxReader, AvaxWriter};
use avax_primitives::PrimitivesError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::TransactionError;

macro_rules! fixed_bytes {
    ($(#[$meta:meta])* $name:ident, $len:expr, $what:literal) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(pub [u8; $len]);

        impl $name {
            /// Width of this type in bytes.
            pub const SIZE: usize = $len;

            /// Wrap a byte array.
            pub const fn new(bytes: [u8; $len]) -> Self {
                $name(bytes)
            }

            /// Copy from a slice that must be exactly `SIZE` bytes long.
            pub fn from_bytes(bytes: &[u8]) -> Result<Self, TransactionError> {
                if bytes.len() != $len {
                    return Err(PrimitivesError::InvalidLength {
                        expected: $len,
                        got: bytes.len(),
                    }
                    .into());
                }
                let mut out = [0u8; $len];
                out.copy_from_slice(bytes);
                Ok($name(out))
            }

            /// Copy out the raw bytes.
            pub fn to_bytes(&self) -> [u8; $len] {
                self.0
            }

            /// Borrow the raw bytes.
            pub fn as_bytes(&self) -> &[u8; $len] {
                &self.0
            }

            /// True when every byte is zero.
            pub fn is_zero(&self) -> bool {
                self.0.iter().all(|b| *b == 0)
            }

            /// Read `SIZE` bytes from the reader.
            pub fn read_from(reader: &mut AvaxReader) -> Result<Self, TransactionError> {
                let bytes = reader.read_array::<$len>().map_err(|e| {
                    TransactionError::SerializationError(format!("reading {}: {}", $what, e))
                })?;
                Ok($name(bytes))
            }

            /// Append the raw bytes to the writer.
            pub fn write_to(&self, writer: &mut AvaxWriter) {
                writer.write_bytes(&self.0);
            }
        }

        impl Default for $name {
            fn default() -> Self {
                $name([0u8; $len])
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), hex::encode(self.0))
            }
        }

        impl From<[u8; $len]> for $name {
            fn from(bytes: [u8; $len]) -> Self {
                $name(bytes)
            }
        }

        impl AsRef<[u8]> for $name {
            fn as_ref(&self) -> &[u8] {
                &self.0
            }
        }
    };
}

macro_rules! string_serde {
    ($name:ident) => {
        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(&self.to_string())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                s.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

fixed_bytes!(
    /// A 20-byte address: `ripemd160(sha256(compressed_pubkey))`.
    ///
    /// Addresses order byte-lexicographically; owner lists are kept sorted
    /// by this order.
    Address, 20, "address"
);

fixed_bytes!(
    /// A 32-byte identifier: asset IDs, transaction IDs, blockchain IDs and
    /// subnet IDs.
    Id, 32, "id"
);

fixed_bytes!(
    /// A 20-byte validator node identifier.
    NodeId, 20, "node id"
);

fixed_bytes!(
    /// A 65-byte recoverable secp256k1 signature, `r || s || v`.
    Signature, 65, "signature"
);

string_serde!(Address);
string_serde!(Id);
string_serde!(NodeId);

// ---------------------------------------------------------------------------
// Address
// ---------------------------------------------------------------------------

impl Address {
    /// Derive the address controlled by a public key.
    pub fn from_public_key(pub_key: &PublicKey) -> Self {
        Address(pub_key.address())
    }

    /// Render as a chain address, e.g. `X-avax1...`.
    pub fn to_bech32(&self, chain_id: &str, hrp: &str) -> Result<String, TransactionError> {
        Ok(address_to_string(chain_id, hrp, &self.0)?)
    }

    /// Parse a chain address, returning the chain alias, hrp and address.
    pub fn parse_bech32(s: &str) -> Result<(String, String, Address), TransactionError> {
        let (chain, hrp, bytes) = parse_address(s)?;
        Ok((chain, hrp, Address::from_bytes(&bytes)?))
    }
}

impl fmt::Display for Address {
    /// cb58 of the 20 address bytes.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", cb58_encode(&self.0))
    }
}

impl FromStr for Address {
    type Err = TransactionError;

    /// Accepts only a cb58 string decoding to 20 bytes plus a valid checksum.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Address::from_bytes(&cb58_decode_fixed(s, Self::SIZE)?)
    }
}

// ---------------------------------------------------------------------------
// Id
// ---------------------------------------------------------------------------

impl Id {
    /// Parse 64 hex characters.
    pub fn from_hex(s: &str) -> Result<Self, TransactionError> {
        let bytes = hex::decode(s).map_err(PrimitivesError::from)?;
        Id::from_bytes(&bytes)
    }

    /// Lowercase hex of the 32 bytes.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", cb58_encode(&self.0))
    }
}

impl FromStr for Id {
    type Err = TransactionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Id::from_bytes(&cb58_decode_fixed(s, Self::SIZE)?)
    }
}

// ---------------------------------------------------------------------------
// NodeId
// ---------------------------------------------------------------------------

impl fmt::Display for NodeId {
    /// `NodeID-<cb58>`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", NODE_ID_PREFIX, cb58_encode(&self.0))
    }
}

impl FromStr for NodeId {
    type Err = TransactionError;

    /// Parse `NodeID-<cb58>`; the prefix is optional.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let body = s.strip_prefix(NODE_ID_PREFIX).unwrap_or(s);
        NodeId::from_bytes(&cb58_decode_fixed(body, Self::SIZE)?)
    }
}

// ---------------------------------------------------------------------------
// Signature
// ---------------------------------------------------------------------------

impl Signature {
    /// Convert to the primitives signature for verification or recovery.
    pub fn to_ec(&self) -> Result<ec::Signature, TransactionError> {
        Ok(ec::Signature::from_bytes(&self.0)?)
    }

    /// Recover the address that produced this signature over `digest`.
    pub fn recover_address(&self, digest: &[u8; 32]) -> Result<Address, TransactionError> {
        let pub_key = self.to_ec()?.recover_public_key(digest)?;
        Ok(Address::from_public_key(&pub_key))
    }
}

impl From<ec::Signature> for Signature {
    fn from(sig: ec::Signature) -> Self {
        Signature(sig.to_bytes())
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}
