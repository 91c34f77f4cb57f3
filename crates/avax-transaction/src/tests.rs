//! Tests for the avax-transaction crate.
//!
//! Exercises the shared codec, selection and signing through a minimal
//! variant set (secp transfer/mint outputs, transfer input, secp credential
//! and a base transaction) laid out like the X-chain's.

use avax_primitives::hash::sha256;
use avax_primitives::serialization::SerializedEncoding;
use avax_primitives::util::{AvaxReader, AvaxWriter};
use serde_json::Value;

use crate::asset_amount::AssetAmountDestination;
use crate::base_tx::BaseTx;
use crate::credential::{Credential, CredentialKind};
use crate::input::{InputKind, SigIdx, TransferInput, TransferableInput};
use crate::keychain::KeyChain;
use crate::nbytes::{Address, Id};
use crate::output::{MintOutput, OutputKind, OutputOwners, TransferOutput, TransferableOutput};
use crate::serializable::{
    deserialize_credential, extend_object, field, read_type_id, serialize_credential, typed_object, Serializable,
};
use crate::tx::{SigningSlot, Tx, TxKind, UnsignedTx};
use crate::utxo::{AmountInputKind, AmountOutputKind, Utxo, UtxoSet};
use crate::TransactionError;

// -----------------------------------------------------------------------
// A minimal variant set
// -----------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq)]
enum TestOutput {
    Transfer(TransferOutput),
    Mint(MintOutput),
}

impl OutputKind for TestOutput {
    fn type_id(&self) -> u32 {
        match self {
            TestOutput::Mint(_) => 6,
            TestOutput::Transfer(_) => 7,
        }
    }

    fn write_body(&self, writer: &mut AvaxWriter) {
        match self {
            TestOutput::Transfer(o) => o.write_to(writer),
            TestOutput::Mint(o) => o.write_to(writer),
        }
    }

    fn read_body(type_id: u32, reader: &mut AvaxReader) -> Result<Self, TransactionError> {
        match type_id {
            6 => Ok(TestOutput::Mint(MintOutput::read_from(reader)?)),
            7 => Ok(TestOutput::Transfer(TransferOutput::read_from(reader)?)),
            _ => Err(TransactionError::UnknownType { kind: "output", type_id }),
        }
    }

    fn owners(&self) -> &OutputOwners {
        match self {
            TestOutput::Transfer(o) => &o.owners,
            TestOutput::Mint(o) => &o.owners,
        }
    }

    fn amount(&self) -> Option<u64> {
        match self {
            TestOutput::Transfer(o) => Some(o.amount),
            TestOutput::Mint(_) => None,
        }
    }
}

impl AmountOutputKind for TestOutput {
    fn from_transfer(output: TransferOutput) -> Self {
        TestOutput::Transfer(output)
    }

    fn as_transfer(&self) -> Option<&TransferOutput> {
        match self {
            TestOutput::Transfer(o) => Some(o),
            TestOutput::Mint(_) => None,
        }
    }
}

impl Serializable for TestOutput {
    fn serialize(&self, encoding: SerializedEncoding) -> Result<Value, TransactionError> {
        let (name, body) = match self {
            TestOutput::Transfer(o) => ("TransferOutput", o.serialize(encoding)?),
            TestOutput::Mint(o) => ("MintOutput", o.serialize(encoding)?),
        };
        let mut obj = typed_object(name, self.type_id());
        extend_object(&mut obj, body);
        Ok(Value::Object(obj))
    }

    fn deserialize(value: &Value, encoding: SerializedEncoding) -> Result<Self, TransactionError> {
        match read_type_id(value)? {
            6 => Ok(TestOutput::Mint(MintOutput::deserialize(value, encoding)?)),
            7 => Ok(TestOutput::Transfer(TransferOutput::deserialize(value, encoding)?)),
            type_id => Err(TransactionError::UnknownType { kind: "output", type_id }),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
struct TestInput(TransferInput);

impl InputKind for TestInput {
    fn type_id(&self) -> u32 {
        5
    }

    fn write_body(&self, writer: &mut AvaxWriter) {
        self.0.write_to(writer);
    }

    fn read_body(type_id: u32, reader: &mut AvaxReader) -> Result<Self, TransactionError> {
        match type_id {
            5 => Ok(TestInput(TransferInput::read_from(reader)?)),
            _ => Err(TransactionError::UnknownType { kind: "input", type_id }),
        }
    }

    fn sig_idxs(&self) -> &[SigIdx] {
        &self.0.sig_idxs
    }

    fn amount(&self) -> u64 {
        self.0.amount
    }
}

impl AmountInputKind for TestInput {
    fn from_transfer(input: TransferInput) -> Self {
        TestInput(input)
    }
}

impl Serializable for TestInput {
    fn serialize(&self, encoding: SerializedEncoding) -> Result<Value, TransactionError> {
        let mut obj = typed_object("TransferInput", 5);
        extend_object(&mut obj, self.0.serialize(encoding)?);
        Ok(Value::Object(obj))
    }

    fn deserialize(value: &Value, encoding: SerializedEncoding) -> Result<Self, TransactionError> {
        match read_type_id(value)? {
            5 => Ok(TestInput(TransferInput::deserialize(value, encoding)?)),
            type_id => Err(TransactionError::UnknownType { kind: "input", type_id }),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
struct TestCredential(Credential);

impl CredentialKind for TestCredential {
    fn type_id(&self) -> u32 {
        9
    }

    fn credential(&self) -> &Credential {
        &self.0
    }

    fn from_parts(type_id: u32, credential: Credential) -> Result<Self, TransactionError> {
        match type_id {
            9 => Ok(TestCredential(credential)),
            _ => Err(TransactionError::UnknownType { kind: "credential", type_id }),
        }
    }
}

impl Serializable for TestCredential {
    fn serialize(&self, encoding: SerializedEncoding) -> Result<Value, TransactionError> {
        serialize_credential(self, "SECPCredential", encoding)
    }

    fn deserialize(value: &Value, encoding: SerializedEncoding) -> Result<Self, TransactionError> {
        deserialize_credential(value, encoding)
    }
}

#[derive(Clone, Debug, PartialEq)]
struct TestTx(BaseTx<TestInput, TestOutput>);

impl TxKind for TestTx {
    type Credential = TestCredential;

    fn type_id(&self) -> u32 {
        0
    }

    fn type_name(&self) -> &'static str {
        "BaseTx"
    }

    fn write_body(&self, writer: &mut AvaxWriter) {
        self.0.write_to(writer);
    }

    fn read_body(type_id: u32, reader: &mut AvaxReader) -> Result<Self, TransactionError> {
        match type_id {
            0 => Ok(TestTx(BaseTx::read_from(reader)?)),
            _ => Err(TransactionError::UnknownType { kind: "transaction", type_id }),
        }
    }

    fn signing_slots(&self) -> Result<Vec<SigningSlot>, TransactionError> {
        Ok(self.0.signing_slots(9))
    }

    fn input_total(&self, asset_id: &Id) -> u64 {
        self.0.input_total(asset_id)
    }

    fn output_total(&self, asset_id: &Id) -> u64 {
        self.0.output_total(asset_id)
    }
}

impl Serializable for TestTx {
    fn serialize(&self, encoding: SerializedEncoding) -> Result<Value, TransactionError> {
        let mut obj = typed_object(self.type_name(), self.type_id());
        extend_object(&mut obj, self.0.serialize(encoding)?);
        Ok(Value::Object(obj))
    }

    fn deserialize(value: &Value, encoding: SerializedEncoding) -> Result<Self, TransactionError> {
        match read_type_id(value)? {
            0 => Ok(TestTx(BaseTx::deserialize(value, encoding)?)),
            type_id => Err(TransactionError::UnknownType { kind: "transaction", type_id }),
        }
    }
}

// -----------------------------------------------------------------------
// Fixtures
// -----------------------------------------------------------------------

const ASSET: Id = Id::new([0xaa; 32]);
const CHAIN: Id = Id::new([0x22; 32]);

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn addr(b: u8) -> Address {
    Address::new([b; 20])
}

fn transfer_utxo(txid: u8, idx: u32, amount: u64, owners: Vec<Address>, locktime: u64, threshold: u32) -> Utxo<TestOutput> {
    Utxo::new(
        Id::new([txid; 32]),
        idx,
        ASSET,
        TestOutput::Transfer(TransferOutput::new(amount, owners, locktime, threshold)),
    )
}

/// Select from `utxos` and assemble an unsigned base transaction.
fn build(
    utxos: &UtxoSet<TestOutput>,
    amount: u64,
    burn: u64,
    to: Vec<Address>,
    from: Vec<Address>,
    change: Vec<Address>,
) -> Result<UnsignedTx<TestTx>, TransactionError> {
    let mut aad: AssetAmountDestination<TestInput, TestOutput> = AssetAmountDestination::new(to, from, change);
    aad.add_asset_amount(ASSET, amount, burn);
    utxos.get_minimum_spendable(&mut aad, 0, 0, 1)?;
    let (ins, outs) = aad.into_inputs_and_all_outputs();
    Ok(UnsignedTx::new(TestTx(BaseTx::new(1, CHAIN, outs, ins, Vec::new())?)))
}

// -----------------------------------------------------------------------
// Simple transfer
// -----------------------------------------------------------------------

#[test]
fn test_simple_transfer_exact_bytes() {
    let mut utxos = UtxoSet::new();
    utxos.add(transfer_utxo(0x11, 0, 1000, vec![addr(1)], 0, 1), false);

    let unsigned = build(&utxos, 600, 100, vec![addr(2)], vec![addr(1)], vec![addr(3)]).unwrap();

    let out = |amount: &str, owner: &str| {
        format!(
            "{}00000007{}0000000000000000000000010000000{}",
            "aa".repeat(32),
            amount,
            format!("1{}", owner.repeat(20))
        )
    };
    let expected = format!(
        "0000{}{}{}{}{}{}{}{}",
        "00000000",
        "00000001",
        "22".repeat(32),
        "00000002",
        // change (300) sorts before the payment (600)
        out("000000000000012c", "03") + &out("0000000000000258", "02"),
        "00000001",
        format!(
            "{}00000000{}0000000500000000000003e80000000100000000",
            "11".repeat(32),
            "aa".repeat(32)
        ),
        "00000000",
    );
    assert_eq!(hex::encode(unsigned.to_bytes()), expected);

    let parsed = UnsignedTx::<TestTx>::from_bytes(&unsigned.to_bytes()).unwrap();
    assert_eq!(parsed.to_bytes(), unsigned.to_bytes());
    assert_eq!(unsigned.get_burn(&ASSET), 100);
}

#[test]
fn test_sign_and_recover() {
    init_logging();
    let mut kc = KeyChain::new("avax", "X");
    let sender = kc
        .import_key("0101010101010101010101010101010101010101010101010101010101010101")
        .unwrap();

    let mut utxos = UtxoSet::new();
    utxos.add(transfer_utxo(0x11, 0, 1000, vec![sender], 0, 1), false);
    let unsigned = build(&utxos, 600, 100, vec![addr(2)], vec![sender], vec![sender]).unwrap();
    let tx = unsigned.sign(&kc).unwrap();

    assert_eq!(tx.credentials.len(), 1);
    let digest = sha256(&unsigned.to_bytes());
    let sig = &tx.credentials[0].0.sig_array[0];
    assert_eq!(sig.recover_address(&digest).unwrap(), sender);
    assert!(kc.get_key(&sender).unwrap().verify(&digest, sig));
    assert!(tx.verify_signatures().unwrap());

    let bytes = tx.to_bytes();
    assert_eq!(tx.id(), Id::new(sha256(&bytes)));
    // unsigned || 1 credential || type 9 || 1 signature
    assert_eq!(bytes.len(), unsigned.to_bytes().len() + 4 + 4 + 4 + 65);

    let parsed = Tx::<TestTx>::from_bytes(&bytes).unwrap();
    assert_eq!(parsed.to_bytes(), bytes);
    let reparsed: Tx<TestTx> = tx.to_string().parse().unwrap();
    assert_eq!(reparsed.id(), tx.id());
}

#[test]
fn test_signing_is_deterministic() {
    let mut kc = KeyChain::new("avax", "X");
    let sender = kc.make_key();
    let mut utxos = UtxoSet::new();
    utxos.add(transfer_utxo(0x11, 0, 1000, vec![sender], 0, 1), false);
    let unsigned = build(&utxos, 10, 1, vec![addr(2)], vec![sender], vec![sender]).unwrap();
    assert_eq!(unsigned.sign(&kc).unwrap().id(), unsigned.sign(&kc).unwrap().id());
}

// -----------------------------------------------------------------------
// Ordering
// -----------------------------------------------------------------------

#[test]
fn test_ordering_is_independent_of_construction_order() {
    let outs = vec![
        TransferableOutput::new(ASSET, TestOutput::Transfer(TransferOutput::new(9, vec![addr(1)], 0, 1))),
        TransferableOutput::new(Id::new([1; 32]), TestOutput::Transfer(TransferOutput::new(9, vec![addr(1)], 0, 1))),
        TransferableOutput::new(ASSET, TestOutput::Transfer(TransferOutput::new(3, vec![addr(1)], 0, 1))),
    ];
    let ins = vec![
        TransferableInput::new(Id::new([5; 32]), 1, ASSET, TestInput(TransferInput::new(4))),
        TransferableInput::new(Id::new([5; 32]), 0, ASSET, TestInput(TransferInput::new(4))),
        TransferableInput::new(Id::new([2; 32]), 7, ASSET, TestInput(TransferInput::new(4))),
    ];
    let a = BaseTx::new(1, CHAIN, outs.clone(), ins.clone(), Vec::new()).unwrap();
    let mut rev_outs = outs;
    rev_outs.reverse();
    let mut rev_ins = ins;
    rev_ins.reverse();
    let b = BaseTx::new(1, CHAIN, rev_outs, rev_ins, Vec::new()).unwrap();

    let ua = UnsignedTx::new(TestTx(a));
    let ub = UnsignedTx::new(TestTx(b));
    assert_eq!(ua.to_bytes(), ub.to_bytes());
    assert_eq!(ua.transaction.0.ins[0].txid, Id::new([2; 32]));
    assert_eq!(ua.transaction.0.outs[0].asset_id, Id::new([1; 32]));
}

#[test]
fn test_credentials_follow_serialized_input_order() {
    let mut kc = KeyChain::new("avax", "X");
    let a = kc.make_key();
    let b = kc.make_key();
    let mut utxos = UtxoSet::new();
    utxos.add(transfer_utxo(0x30, 0, 500, vec![a], 0, 1), false);
    utxos.add(transfer_utxo(0x10, 0, 500, vec![b], 0, 1), false);

    let unsigned = build(&utxos, 900, 0, vec![addr(9)], vec![a, b], vec![a]).unwrap();
    let tx = unsigned.sign(&kc).unwrap();
    assert_eq!(tx.credentials.len(), 2);

    let digest = unsigned.signing_digest();
    let ins = &unsigned.transaction.0.ins;
    assert_eq!(ins[0].txid, Id::new([0x10; 32]));
    assert_eq!(tx.credentials[0].0.sig_array[0].recover_address(&digest).unwrap(), b);
    assert_eq!(tx.credentials[1].0.sig_array[0].recover_address(&digest).unwrap(), a);
}

// -----------------------------------------------------------------------
// Selection
// -----------------------------------------------------------------------

#[test]
fn test_insufficient_funds() {
    let mut utxos = UtxoSet::new();
    utxos.add(transfer_utxo(0x11, 0, 50, vec![addr(1)], 0, 1), false);
    assert!(matches!(
        build(&utxos, 40, 20, vec![addr(2)], vec![addr(1)], vec![addr(1)]),
        Err(TransactionError::InsufficientFunds(_))
    ));
}

#[test]
fn test_locked_and_foreign_utxos_are_skipped() {
    let mut utxos = UtxoSet::new();
    utxos.add(transfer_utxo(0x01, 0, 1000, vec![addr(1)], 99, 1), false);
    utxos.add(transfer_utxo(0x02, 0, 1000, vec![addr(4)], 0, 1), false);
    utxos.add(
        Utxo::new(Id::new([3; 32]), 0, ASSET, TestOutput::Mint(MintOutput::new(vec![addr(1)], 0, 1))),
        false,
    );
    assert!(build(&utxos, 10, 0, vec![addr(2)], vec![addr(1)], vec![addr(1)]).is_err());

    utxos.add(transfer_utxo(0x05, 0, 20, vec![addr(1)], 0, 1), false);
    let unsigned = build(&utxos, 10, 0, vec![addr(2)], vec![addr(1)], vec![addr(1)]).unwrap();
    assert_eq!(unsigned.transaction.0.ins.len(), 1);
    assert_eq!(unsigned.transaction.0.ins[0].txid, Id::new([5; 32]));
}

#[test]
fn test_multisig_spend() {
    init_logging();
    let mut kc = KeyChain::new("avax", "X");
    let a = kc.make_key();
    let b = kc.make_key();
    let c = addr(0xee);
    let mut utxos = UtxoSet::new();
    utxos.add(transfer_utxo(0x11, 0, 100, vec![a, b, c], 0, 2), false);

    let unsigned = build(&utxos, 100, 0, vec![addr(2)], vec![a, b], vec![a]).unwrap();
    let input = &unsigned.transaction.0.ins[0].input;
    assert_eq!(input.sig_idxs().len(), 2);
    let tx = unsigned.sign(&kc).unwrap();
    assert_eq!(tx.credentials[0].0.sig_array.len(), 2);
    assert!(tx.verify_signatures().unwrap());

    // a single signer cannot meet the threshold
    assert!(build(&utxos, 100, 0, vec![addr(2)], vec![a], vec![a]).is_err());
}

#[test]
fn test_key_not_found() {
    let mut utxos = UtxoSet::new();
    utxos.add(transfer_utxo(0x11, 0, 100, vec![addr(1)], 0, 1), false);
    let unsigned = build(&utxos, 50, 0, vec![addr(2)], vec![addr(1)], vec![addr(1)]).unwrap();
    let kc = KeyChain::new("avax", "X");
    assert!(matches!(unsigned.sign(&kc), Err(TransactionError::KeyNotFound(_))));
}

#[test]
fn test_parsed_tx_equals_signed_tx() {
    let mut kc = KeyChain::new("avax", "X");
    let sender = kc.make_key();
    let mut utxos = UtxoSet::new();
    utxos.add(transfer_utxo(0x11, 0, 1000, vec![sender], 0, 1), false);
    let tx = build(&utxos, 600, 100, vec![addr(2)], vec![sender], vec![sender])
        .unwrap()
        .sign(&kc)
        .unwrap();
    assert!(tx.verify_signatures().unwrap());

    let parsed = Tx::<TestTx>::from_bytes(&tx.to_bytes()).unwrap();
    assert_eq!(parsed, tx);

    // owner addresses do not travel with the bytes
    let slot = &parsed.unsigned.transaction.0.ins[0].input.sig_idxs()[0];
    assert_eq!(slot.source, None);
    assert!(matches!(
        parsed.verify_signatures(),
        Err(TransactionError::UnresolvedSigner { index: 0 })
    ));
    assert!(matches!(
        parsed.unsigned.sign(&kc),
        Err(TransactionError::UnresolvedSigner { index: 0 })
    ));
}

#[test]
fn test_malformed_signature_does_not_verify() {
    let mut kc = KeyChain::new("avax", "X");
    let sender = kc.make_key();
    let mut utxos = UtxoSet::new();
    utxos.add(transfer_utxo(0x11, 0, 1000, vec![sender], 0, 1), false);
    let mut tx = build(&utxos, 600, 100, vec![addr(2)], vec![sender], vec![sender])
        .unwrap()
        .sign(&kc)
        .unwrap();

    tx.credentials[0].0.sig_array[0] = crate::nbytes::Signature::new([0xff; 65]);
    assert!(!tx.verify_signatures().unwrap());

    let other = kc.make_key();
    let digest = tx.unsigned.signing_digest();
    tx.credentials[0].0.sig_array[0] = kc.get_key(&other).unwrap().sign(&digest).unwrap();
    assert!(!tx.verify_signatures().unwrap());
}

#[test]
fn test_large_owner_list_with_empty_memo() {
    let mut kc = KeyChain::new("avax", "X");
    let sender = kc.make_key();
    let owners: Vec<Address> = (0..256u32)
        .map(|i| {
            let mut bytes = [0x5a; 20];
            bytes[..4].copy_from_slice(&i.to_be_bytes());
            Address::new(bytes)
        })
        .collect();
    let mut utxos = UtxoSet::new();
    utxos.add(transfer_utxo(0x11, 0, 1000, vec![sender], 0, 1), false);

    let mut aad: AssetAmountDestination<TestInput, TestOutput> =
        AssetAmountDestination::new(owners.clone(), vec![sender], vec![sender]);
    aad.add_asset_amount(ASSET, 900, 100);
    utxos.get_minimum_spendable(&mut aad, 0, 0, 256).unwrap();
    let (ins, outs) = aad.into_inputs_and_all_outputs();
    let tx = UnsignedTx::new(TestTx(BaseTx::new(1, CHAIN, outs, ins, Vec::new()).unwrap()))
        .sign(&kc)
        .unwrap();

    let parsed = Tx::<TestTx>::from_bytes(&tx.to_bytes()).unwrap();
    assert_eq!(parsed, tx);
    let base = &parsed.unsigned.transaction.0;
    assert!(base.memo.is_empty());
    assert_eq!(base.outs.len(), 1);
    assert_eq!(base.outs[0].output.owners().addresses().len(), 256);
    assert_eq!(base.outs[0].output.owners().threshold, 256);
}

#[test]
fn test_unspendable_destinations_and_change() {
    let mut utxos = UtxoSet::new();
    utxos.add(transfer_utxo(0x11, 0, 1000, vec![addr(1)], 0, 1), false);

    assert!(matches!(
        build(&utxos, 600, 100, vec![addr(2)], vec![addr(1)], vec![]),
        Err(TransactionError::InvalidTransaction(msg)) if msg == "no change addresses"
    ));
    assert!(matches!(
        build(&utxos, 600, 100, vec![], vec![addr(1)], vec![addr(1)]),
        Err(TransactionError::InvalidTransaction(_))
    ));
    // no change, so no change addresses are needed
    assert!(build(&utxos, 900, 100, vec![addr(2)], vec![addr(1)], vec![]).is_ok());
    // burn-only spending needs neither list
    assert!(build(&utxos, 0, 1000, vec![], vec![addr(1)], vec![]).is_ok());
}

// -----------------------------------------------------------------------
// Decoding errors
// -----------------------------------------------------------------------

#[test]
fn test_unknown_output_type() {
    let out = TransferableOutput::new(ASSET, TestOutput::Transfer(TransferOutput::new(1, vec![addr(1)], 0, 1)));
    let mut bytes = out.to_bytes();
    bytes[32..36].copy_from_slice(&99u32.to_be_bytes());
    assert!(matches!(
        TransferableOutput::<TestOutput>::from_bytes(&bytes),
        Err(TransactionError::UnknownType { kind: "output", type_id: 99 })
    ));
}

#[test]
fn test_unknown_codec_and_tx_type() {
    let mut utxos = UtxoSet::new();
    utxos.add(transfer_utxo(0x11, 0, 100, vec![addr(1)], 0, 1), false);
    let bytes = build(&utxos, 50, 0, vec![addr(2)], vec![addr(1)], vec![addr(1)])
        .unwrap()
        .to_bytes();

    let mut bad_codec = bytes.clone();
    bad_codec[1] = 1;
    assert!(matches!(
        UnsignedTx::<TestTx>::from_bytes(&bad_codec),
        Err(TransactionError::UnknownType { kind: "codec", type_id: 1 })
    ));

    let mut bad_type = bytes;
    bad_type[5] = 42;
    assert!(matches!(
        UnsignedTx::<TestTx>::from_bytes(&bad_type),
        Err(TransactionError::UnknownType { kind: "transaction", type_id: 42 })
    ));
}

#[test]
fn test_truncated_and_trailing_bytes() {
    let mut utxos = UtxoSet::new();
    utxos.add(transfer_utxo(0x11, 0, 100, vec![addr(1)], 0, 1), false);
    let bytes = build(&utxos, 50, 0, vec![addr(2)], vec![addr(1)], vec![addr(1)])
        .unwrap()
        .to_bytes();
    assert!(UnsignedTx::<TestTx>::from_bytes(&bytes[..bytes.len() - 1]).is_err());
    let mut extra = bytes;
    extra.push(0);
    assert!(matches!(
        UnsignedTx::<TestTx>::from_bytes(&extra),
        Err(TransactionError::SerializationError(_))
    ));
}

#[test]
fn test_memo_limit() {
    let ok = BaseTx::<TestInput, TestOutput>::new(1, CHAIN, vec![], vec![], vec![0; 256]);
    assert!(ok.is_ok());
    let too_long = BaseTx::<TestInput, TestOutput>::new(1, CHAIN, vec![], vec![], vec![0; 257]);
    assert!(matches!(too_long, Err(TransactionError::InvalidTransaction(_))));
}

// -----------------------------------------------------------------------
// Fees
// -----------------------------------------------------------------------

#[test]
fn test_goose_egg_on_transaction() {
    let big = 20 * crate::constants::ONE_AVAX;
    let mut utxos = UtxoSet::new();
    utxos.add(transfer_utxo(0x11, 0, big + 100, vec![addr(1)], 0, 1), false);

    let reasonable = build(&utxos, big, 100, vec![addr(2)], vec![addr(1)], vec![addr(1)]).unwrap();
    assert!(reasonable.check_goose_egg(&ASSET, None).is_ok());

    let wasteful = build(&utxos, 100, big, vec![addr(2)], vec![addr(1)], vec![addr(1)]).unwrap();
    assert!(matches!(
        wasteful.check_goose_egg(&ASSET, None),
        Err(TransactionError::GooseEgg { fee, output_total: 100 }) if fee == big
    ));
    assert!(wasteful.check_goose_egg(&ASSET, Some(big)).is_ok());
}

// -----------------------------------------------------------------------
// UTXO set
// -----------------------------------------------------------------------

#[test]
fn test_utxo_set_indexing() {
    let mut set = UtxoSet::new();
    let u1 = transfer_utxo(1, 0, 10, vec![addr(1)], 0, 1);
    let u2 = transfer_utxo(2, 0, 20, vec![addr(1), addr(2)], 0, 1);
    let u3 = transfer_utxo(3, 0, 30, vec![addr(3)], 50, 1);
    assert_eq!(set.add_array(vec![u1.clone(), u2.clone(), u3.clone()], false), 3);
    assert!(!set.add(u1.clone(), false));
    assert!(set.add(u1.clone(), true));
    assert_eq!(set.len(), 3);

    assert_eq!(set.get_utxo_ids(&[addr(2)]), vec![u2.utxo_id()]);
    assert_eq!(set.get_addresses(), vec![addr(1), addr(2), addr(3)]);
    assert_eq!(set.get_asset_ids(None), vec![ASSET]);
    assert_eq!(set.get_balance(&[addr(1)], &ASSET, 0), 30);
    assert_eq!(set.get_balance(&[addr(3)], &ASSET, 0), 0);
    assert_eq!(set.get_balance(&[addr(3)], &ASSET, 50), 30);

    assert_eq!(set.remove(&u2.utxo_id()), Some(u2));
    assert!(set.get_utxo_ids(&[addr(2)]).is_empty());
    assert!(set.remove(&missing_utxo_id()).is_none());
}

fn missing_utxo_id() -> String {
    transfer_utxo(0x77, 9, 1, vec![addr(1)], 0, 1).utxo_id()
}

#[test]
fn test_utxo_set_algebra() {
    let u1 = transfer_utxo(1, 0, 10, vec![addr(1)], 0, 1);
    let u2 = transfer_utxo(2, 0, 20, vec![addr(1)], 0, 1);
    let u3 = transfer_utxo(3, 0, 30, vec![addr(1)], 0, 1);
    let mut a = UtxoSet::new();
    a.add_array(vec![u1.clone(), u2.clone()], false);
    let mut b = UtxoSet::new();
    b.add_array(vec![u2.clone(), u3.clone()], false);

    assert_eq!(a.union(&b).len(), 3);
    assert_eq!(a.intersection(&b).get_all_utxo_ids(), vec![u2.utxo_id()]);
    assert_eq!(a.difference(&b).get_all_utxo_ids(), vec![u1.utxo_id()]);
}

#[test]
fn test_utxo_string_roundtrip() {
    let utxo = transfer_utxo(0x42, 3, 77, vec![addr(8)], 0, 1);
    let s = utxo.to_string();
    let mut set = UtxoSet::<TestOutput>::new();
    assert!(set.add_str(&s, false).unwrap());
    assert_eq!(set.get_utxo(&utxo.utxo_id()), Some(&utxo));
    assert!(set.add_str("notcb58!", false).is_err());
}

// -----------------------------------------------------------------------
// JSON form
// -----------------------------------------------------------------------

#[test]
fn test_signed_tx_json_roundtrip() {
    let mut kc = KeyChain::new("avax", "X");
    let sender = kc.make_key();
    let mut utxos = UtxoSet::new();
    utxos.add(transfer_utxo(0x11, 0, 1000, vec![sender], 0, 1), false);
    let tx = build(&utxos, 600, 100, vec![addr(2)], vec![sender], vec![sender])
        .unwrap()
        .sign(&kc)
        .unwrap();

    for enc in [SerializedEncoding::Display, SerializedEncoding::Hex] {
        let json = tx.serialize(enc).unwrap();
        let unsigned = field(&json, "unsignedTx").unwrap();
        assert_eq!(field(unsigned, "transaction").unwrap()["_typeName"], "BaseTx");
        let back = Tx::<TestTx>::deserialize(&json, enc).unwrap();
        assert_eq!(back.to_bytes(), tx.to_bytes());
    }
}

#[test]
fn test_json_unknown_type_id() {
    let obj = typed_object("Bogus", 31);
    assert!(matches!(
        TestOutput::deserialize(&Value::Object(obj), SerializedEncoding::Display),
        Err(TransactionError::UnknownType { kind: "output", type_id: 31 })
    ));
}
