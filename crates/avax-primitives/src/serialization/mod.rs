//! String encoders and decoders for the JSON serialization form.
//!
//! Every field of a serialized codec object is rendered from its raw bytes
//! with a [`SerializedType`] (how the field is displayed) and a
//! [`SerializedEncoding`] (what the caller asked for). When the encoding is
//! `Display` the field's own display type is used; otherwise the requested
//! encoding overrides it.
//!
//! Decoders reverse the process and enforce the fixed byte width given in
//! [`SerializeArgs::len`]: a value that decodes to the wrong width is an
//! `InvalidLength` error. Decimal strings are the one exception and are left
//! zero-padded up to the requested width.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use bech32::{FromBase32, ToBase32, Variant};
use num_bigint::BigUint;

use crate::base58::{self, cb58_decode, cb58_encode};
use crate::PrimitivesError;

/// Prefix of the string form of a node ID.
pub const NODE_ID_PREFIX: &str = "NodeID-";

/// Prefix of the string form of a private key.
pub const PRIVATE_KEY_PREFIX: &str = "PrivateKey-";

/// How a field is displayed when the caller asks for `Display` encoding.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SerializedType {
    Hex,
    Cb58,
    Base58,
    Base64,
    DecimalString,
    Utf8,
    NodeId,
    Bech32,
    PrivateKey,
}

/// The encoding requested by the caller of `serialize`/`deserialize`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum SerializedEncoding {
    Hex,
    Cb58,
    Base58,
    Base64,
    DecimalString,
    #[default]
    Display,
}

impl SerializedEncoding {
    /// The concrete type an encoding renders with, or `None` for `Display`.
    fn as_type(self) -> Option<SerializedType> {
        match self {
            SerializedEncoding::Hex => Some(SerializedType::Hex),
            SerializedEncoding::Cb58 => Some(SerializedType::Cb58),
            SerializedEncoding::Base58 => Some(SerializedType::Base58),
            SerializedEncoding::Base64 => Some(SerializedType::Base64),
            SerializedEncoding::DecimalString => Some(SerializedType::DecimalString),
            SerializedEncoding::Display => None,
        }
    }

    /// Name used in the `"encoding"` field of a serialized object.
    pub fn as_str(self) -> &'static str {
        match self {
            SerializedEncoding::Hex => "hex",
            SerializedEncoding::Cb58 => "cb58",
            SerializedEncoding::Base58 => "base58",
            SerializedEncoding::Base64 => "base64",
            SerializedEncoding::DecimalString => "decimalString",
            SerializedEncoding::Display => "display",
        }
    }
}

/// Extra parameters for a single field.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SerializeArgs {
    /// Fixed byte width the field must decode to.
    pub len: Option<usize>,
    /// Human readable part for bech32 addresses.
    pub hrp: Option<String>,
    /// Chain alias prefix for bech32 addresses, e.g. `"X"`.
    pub chain_id: Option<String>,
}

impl SerializeArgs {
    /// Arguments for a fixed-width field.
    pub fn fixed(len: usize) -> Self {
        SerializeArgs {
            len: Some(len),
            ..Default::default()
        }
    }

    /// Arguments for a 20-byte bech32 address on `chain_id` with `hrp`.
    pub fn bech32(chain_id: &str, hrp: &str) -> Self {
        SerializeArgs {
            len: Some(20),
            hrp: Some(hrp.to_string()),
            chain_id: Some(chain_id.to_string()),
        }
    }
}

/// Render `bytes` as a string of the given type.
pub fn type_to_string(
    bytes: &[u8],
    ty: SerializedType,
    args: &SerializeArgs,
) -> Result<String, PrimitivesError> {
    Ok(match ty {
        SerializedType::Hex => hex::encode(bytes),
        SerializedType::Cb58 => cb58_encode(bytes),
        SerializedType::Base58 => base58::encode(bytes),
        SerializedType::Base64 => BASE64.encode(bytes),
        SerializedType::DecimalString => BigUint::from_bytes_be(bytes).to_str_radix(10),
        SerializedType::Utf8 => String::from_utf8(bytes.to_vec())
            .map_err(|e| PrimitivesError::InvalidEncoding(format!("invalid utf8: {}", e)))?,
        SerializedType::NodeId => format!("{}{}", NODE_ID_PREFIX, cb58_encode(bytes)),
        SerializedType::PrivateKey => format!("{}{}", PRIVATE_KEY_PREFIX, cb58_encode(bytes)),
        SerializedType::Bech32 => {
            let hrp = args.hrp.as_deref().ok_or_else(|| {
                PrimitivesError::InvalidBech32("missing human readable part".to_string())
            })?;
            let chain = args.chain_id.as_deref().unwrap_or("");
            address_to_string(chain, hrp, bytes)?
        }
    })
}

/// Parse a string of the given type back into bytes.
///
/// The result is checked against `args.len` when one is given.
pub fn string_to_type(
    s: &str,
    ty: SerializedType,
    args: &SerializeArgs,
) -> Result<Vec<u8>, PrimitivesError> {
    let bytes = match ty {
        SerializedType::Hex => hex::decode(s.strip_prefix("0x").unwrap_or(s))?,
        SerializedType::Cb58 => cb58_decode(s)?,
        SerializedType::Base58 => base58::decode(s)?,
        SerializedType::Base64 => BASE64
            .decode(s)
            .map_err(|e| PrimitivesError::InvalidBase64(e.to_string()))?,
        SerializedType::DecimalString => return decimal_to_bytes(s, args.len),
        SerializedType::Utf8 => s.as_bytes().to_vec(),
        SerializedType::NodeId => cb58_decode(s.strip_prefix(NODE_ID_PREFIX).unwrap_or(s))?,
        SerializedType::PrivateKey => {
            cb58_decode(s.strip_prefix(PRIVATE_KEY_PREFIX).unwrap_or(s))?
        }
        SerializedType::Bech32 => {
            let (_, hrp, bytes) = parse_address(s)?;
            if let Some(expected) = args.hrp.as_deref() {
                if hrp != expected {
                    return Err(PrimitivesError::InvalidBech32(format!(
                        "expected hrp {}, got {}",
                        expected, hrp
                    )));
                }
            }
            bytes
        }
    };
    check_len(bytes, args.len)
}

/// Encode `bytes` for a serialized object.
///
/// # Arguments
/// * `bytes` - Raw field value.
/// * `encoding` - Requested encoding; `Display` defers to `display_type`.
/// * `display_type` - The field's own display type.
/// * `args` - Width and bech32 parameters.
pub fn encoder(
    bytes: &[u8],
    encoding: SerializedEncoding,
    display_type: SerializedType,
    args: &SerializeArgs,
) -> Result<String, PrimitivesError> {
    let ty = encoding.as_type().unwrap_or(display_type);
    type_to_string(bytes, ty, args)
}

/// Decode a field previously produced by [`encoder`] with the same arguments.
pub fn decoder(
    s: &str,
    encoding: SerializedEncoding,
    display_type: SerializedType,
    args: &SerializeArgs,
) -> Result<Vec<u8>, PrimitivesError> {
    let ty = encoding.as_type().unwrap_or(display_type);
    string_to_type(s, ty, args)
}

/// Render a 20-byte address as `"<chain>-<hrp>1..."`.
///
/// An empty `chain` yields the bare bech32 string.
pub fn address_to_string(chain: &str, hrp: &str, bytes: &[u8]) -> Result<String, PrimitivesError> {
    let encoded = bech32::encode(hrp, bytes.to_base32(), Variant::Bech32)?;
    if chain.is_empty() {
        Ok(encoded)
    } else {
        Ok(format!("{}-{}", chain, encoded))
    }
}

/// Split a `"<chain>-<hrp>1..."` address into chain alias, hrp and payload.
///
/// The chain alias is optional; a bare bech32 string yields an empty alias.
pub fn parse_address(s: &str) -> Result<(String, String, Vec<u8>), PrimitivesError> {
    let (chain, body) = match s.split_once('-') {
        Some((chain, body)) => (chain.to_string(), body),
        None => (String::new(), s),
    };
    let (hrp, data, variant) = bech32::decode(body)?;
    if variant != Variant::Bech32 {
        return Err(PrimitivesError::InvalidBech32(
            "expected bech32 variant".to_string(),
        ));
    }
    let bytes = Vec::<u8>::from_base32(&data)?;
    if bytes.len() != 20 {
        return Err(PrimitivesError::InvalidLength {
            expected: 20,
            got: bytes.len(),
        });
    }
    Ok((chain, hrp, bytes))
}

fn decimal_to_bytes(s: &str, len: Option<usize>) -> Result<Vec<u8>, PrimitivesError> {
    let value = BigUint::parse_bytes(s.as_bytes(), 10)
        .ok_or_else(|| PrimitivesError::InvalidEncoding(format!("invalid decimal: {}", s)))?;
    let digits = value.to_bytes_be();
    let digits: &[u8] = if digits == [0] { &[] } else { &digits };
    match len {
        None => Ok(if digits.is_empty() { vec![0] } else { digits.to_vec() }),
        Some(len) if digits.len() > len => Err(PrimitivesError::InvalidLength {
            expected: len,
            got: digits.len(),
        }),
        Some(len) => {
            let mut out = vec![0u8; len - digits.len()];
            out.extend_from_slice(digits);
            Ok(out)
        }
    }
}

fn check_len(bytes: Vec<u8>, len: Option<usize>) -> Result<Vec<u8>, PrimitivesError> {
    match len {
        Some(expected) if bytes.len() != expected => Err(PrimitivesError::InvalidLength {
            expected,
            got: bytes.len(),
        }),
        _ => Ok(bytes),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_uses_field_type() {
        let bytes = [0xde, 0xad, 0xbe, 0xef];
        let args = SerializeArgs::fixed(4);
        let s = encoder(&bytes, SerializedEncoding::Display, SerializedType::Hex, &args).unwrap();
        assert_eq!(s, "deadbeef");
        let s = encoder(&bytes, SerializedEncoding::Base64, SerializedType::Hex, &args).unwrap();
        assert_eq!(s, "3q2+7w==");
        assert_eq!(
            decoder(&s, SerializedEncoding::Base64, SerializedType::Hex, &args).unwrap(),
            bytes
        );
    }

    #[test]
    fn test_decimal_string_pads_to_width() {
        let amount = 1_000_000u64.to_be_bytes();
        let args = SerializeArgs::fixed(8);
        let s = encoder(&amount, SerializedEncoding::Display, SerializedType::DecimalString, &args)
            .unwrap();
        assert_eq!(s, "1000000");
        let back = decoder(&s, SerializedEncoding::Display, SerializedType::DecimalString, &args)
            .unwrap();
        assert_eq!(back, amount);

        let zero = decoder("0", SerializedEncoding::Display, SerializedType::DecimalString, &args)
            .unwrap();
        assert_eq!(zero, vec![0u8; 8]);
    }

    #[test]
    fn test_decimal_string_too_wide() {
        let args = SerializeArgs::fixed(4);
        assert!(matches!(
            string_to_type("4294967296", SerializedType::DecimalString, &args),
            Err(PrimitivesError::InvalidLength { expected: 4, got: 5 })
        ));
        assert!(string_to_type("12a", SerializedType::DecimalString, &args).is_err());
    }

    #[test]
    fn test_fixed_width_enforced() {
        let args = SerializeArgs::fixed(32);
        let s = hex::encode([1u8; 31]);
        assert!(matches!(
            string_to_type(&s, SerializedType::Hex, &args),
            Err(PrimitivesError::InvalidLength { expected: 32, got: 31 })
        ));
    }

    #[test]
    fn test_node_id_and_private_key_prefixes() {
        let node = [9u8; 20];
        let s = type_to_string(&node, SerializedType::NodeId, &SerializeArgs::default()).unwrap();
        assert!(s.starts_with(NODE_ID_PREFIX));
        assert_eq!(
            string_to_type(&s, SerializedType::NodeId, &SerializeArgs::fixed(20)).unwrap(),
            node
        );

        let key = [3u8; 32];
        let s = type_to_string(&key, SerializedType::PrivateKey, &SerializeArgs::default()).unwrap();
        assert!(s.starts_with(PRIVATE_KEY_PREFIX));
        assert_eq!(
            string_to_type(&s, SerializedType::PrivateKey, &SerializeArgs::fixed(32)).unwrap(),
            key
        );
    }

    #[test]
    fn test_bech32_address() {
        let addr = [0x3cu8; 20];
        let args = SerializeArgs::bech32("X", "avax");
        let s = type_to_string(&addr, SerializedType::Bech32, &args).unwrap();
        assert!(s.starts_with("X-avax1"));
        assert_eq!(string_to_type(&s, SerializedType::Bech32, &args).unwrap(), addr);

        let (chain, hrp, bytes) = parse_address(&s).unwrap();
        assert_eq!(chain, "X");
        assert_eq!(hrp, "avax");
        assert_eq!(bytes, addr);

        let fuji = SerializeArgs::bech32("X", "fuji");
        assert!(string_to_type(&s, SerializedType::Bech32, &fuji).is_err());
    }

    #[test]
    fn test_utf8() {
        let s = type_to_string(b"memo", SerializedType::Utf8, &SerializeArgs::default()).unwrap();
        assert_eq!(s, "memo");
        assert!(type_to_string(&[0xff, 0xfe], SerializedType::Utf8, &SerializeArgs::default())
            .is_err());
    }
}
