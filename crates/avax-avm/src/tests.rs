//! Tests for the avax-avm crate.
//!
//! End-to-end builds over a UTXO set: selection, serialization, signing
//! and the JSON form of each X-chain transaction variant.

use avax_primitives::serialization::SerializedEncoding;
use avax_transaction::constants::{MILLI_AVAX, ONE_AVAX};
use avax_transaction::input::SigIdx;
use avax_transaction::output::{MintOutput, OutputKind, OutputOwners, TransferOutput};
use avax_transaction::tx::TxKind;
use avax_transaction::{Address, BuildOptions, Id, KeyChain, NetworkConfig, Serializable, TransactionError};

use crate::builder::{AvmBuilder, CreateAssetParams};
use crate::constants::*;
use crate::credentials::AvmCredential;
use crate::operations::{NftTransferOperation, Operation, TransferableOperation, UtxoId};
use crate::outputs::{AvmOutput, NftTransferOutput};
use crate::tx::{InitialState, OperationTx, Transaction};
use crate::{Tx, UnsignedTx, Utxo, UtxoSet};

const TOKEN: Id = Id::new([0x77; 32]);

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn net() -> NetworkConfig {
    NetworkConfig::local()
}

fn opts() -> BuildOptions {
    BuildOptions::default().with_as_of(1_000)
}

fn transfer(txid: u8, asset: Id, amount: u64, owner: Address) -> Utxo {
    Utxo::new(
        Id::new([txid; 32]),
        0,
        asset,
        AvmOutput::SecpTransfer(TransferOutput::new(amount, vec![owner], 0, 1)),
    )
}

struct Wallet {
    kc: KeyChain,
    addr: Address,
    utxos: UtxoSet,
}

fn wallet(avax: u64) -> Wallet {
    let mut kc = KeyChain::new("local", "X");
    let addr = kc.make_key();
    let mut utxos = UtxoSet::new();
    utxos.add(transfer(1, net().avax_asset_id, avax, addr), false);
    Wallet { kc, addr, utxos }
}

fn reparse(tx: &Tx) -> Tx {
    let parsed = Tx::from_bytes(&tx.to_bytes()).unwrap();
    assert_eq!(&parsed, tx);
    parsed
}

// -----------------------------------------------------------------------
// BaseTx
// -----------------------------------------------------------------------

#[test]
fn test_base_tx_avax_transfer() {
    init_logging();
    let w = wallet(10 * ONE_AVAX);
    let to = Address::new([0x42; 20]);
    let unsigned = w
        .utxos
        .build_base_tx(&net(), net().avax_asset_id, ONE_AVAX, &[to], &[w.addr], &[w.addr], &opts())
        .unwrap();

    let base = unsigned.transaction.base();
    assert_eq!(base.network_id, net().network_id);
    assert_eq!(base.blockchain_id, net().x_chain_id);
    assert_eq!(base.ins.len(), 1);
    assert_eq!(base.outs.len(), 2);
    assert_eq!(unsigned.get_burn(&net().avax_asset_id), MILLI_AVAX);
    let paid: Vec<u64> = base
        .outs
        .iter()
        .filter(|o| o.output.owners().addresses() == [to])
        .filter_map(|o| o.output.amount())
        .collect();
    assert_eq!(paid, vec![ONE_AVAX]);

    let tx = unsigned.sign(&w.kc).unwrap();
    assert!(tx.verify_signatures().unwrap());
    assert!(matches!(tx.credentials[0], AvmCredential::Secp(_)));
    let parsed = reparse(&tx);
    assert_eq!(parsed.id(), tx.id());
}

#[test]
fn test_base_tx_other_asset_pays_fee_in_avax() {
    let mut w = wallet(ONE_AVAX);
    w.utxos.add(transfer(2, TOKEN, 500, w.addr), false);
    let to = Address::new([0x42; 20]);
    let unsigned = w
        .utxos
        .build_base_tx(&net(), TOKEN, 200, &[to], &[w.addr], &[w.addr], &opts())
        .unwrap();
    let base = unsigned.transaction.base();
    assert_eq!(base.ins.len(), 2);
    assert_eq!(unsigned.get_burn(&TOKEN), 0);
    assert_eq!(unsigned.get_burn(&net().avax_asset_id), MILLI_AVAX);
    assert_eq!(base.output_total(&TOKEN), 500);

    let tx = unsigned.sign(&w.kc).unwrap();
    assert_eq!(tx.credentials.len(), 2);
    assert!(tx.verify_signatures().unwrap());
}

#[test]
fn test_base_tx_validation() {
    let w = wallet(ONE_AVAX);
    let to = Address::new([0x42; 20]);
    let two_of_one = opts().with_threshold(2);
    assert!(matches!(
        w.utxos
            .build_base_tx(&net(), TOKEN, 1, &[to], &[w.addr], &[w.addr], &two_of_one),
        Err(TransactionError::InvalidTransaction(_))
    ));
    assert!(matches!(
        w.utxos
            .build_base_tx(&net(), net().avax_asset_id, 2 * ONE_AVAX, &[to], &[w.addr], &[w.addr], &opts()),
        Err(TransactionError::InsufficientFunds(_))
    ));
    let long_memo = opts().with_memo(&[0u8; 300]);
    assert!(matches!(
        w.utxos
            .build_base_tx(&net(), net().avax_asset_id, 1, &[to], &[w.addr], &[w.addr], &long_memo),
        Err(TransactionError::InvalidTransaction(_))
    ));
}

#[test]
fn test_goose_egg_rejects_oversized_fee() {
    let w = wallet(100 * ONE_AVAX);
    let to = Address::new([0x42; 20]);
    let greedy = opts().with_fee(60 * ONE_AVAX);
    assert!(matches!(
        w.utxos
            .build_base_tx(&net(), net().avax_asset_id, 1, &[to], &[w.addr], &[w.addr], &greedy),
        Err(TransactionError::GooseEgg { .. })
    ));
}

// -----------------------------------------------------------------------
// Import / export
// -----------------------------------------------------------------------

#[test]
fn test_import_pays_fee_from_imported_avax() {
    init_logging();
    let w = wallet(ONE_AVAX);
    let source = net().p_chain_id;
    let atomics = vec![transfer(9, net().avax_asset_id, 5 * MILLI_AVAX, w.addr)];
    let unsigned = w
        .utxos
        .build_import_tx(&net(), &atomics, source, &[w.addr], &[w.addr], &[w.addr], &opts())
        .unwrap();

    let Transaction::Import(import) = &unsigned.transaction else {
        panic!("expected an import tx");
    };
    assert_eq!(import.source_chain, source);
    assert_eq!(import.import_ins.len(), 1);
    assert!(import.base.ins.is_empty());
    assert_eq!(import.base.output_total(&net().avax_asset_id), 4 * MILLI_AVAX);
    assert_eq!(unsigned.get_burn(&net().avax_asset_id), MILLI_AVAX);

    let tx = unsigned.sign(&w.kc).unwrap();
    assert_eq!(tx.credentials.len(), 1);
    assert!(tx.verify_signatures().unwrap());
    reparse(&tx);
}

#[test]
fn test_import_of_other_asset_spends_local_fee() {
    let w = wallet(ONE_AVAX);
    let atomics = vec![transfer(9, TOKEN, 40, w.addr)];
    let unsigned = w
        .utxos
        .build_import_tx(&net(), &atomics, net().c_chain_id, &[w.addr], &[w.addr], &[w.addr], &opts())
        .unwrap();
    let Transaction::Import(import) = &unsigned.transaction else {
        panic!("expected an import tx");
    };
    assert_eq!(import.base.ins.len(), 1);
    assert_eq!(import.base.output_total(&TOKEN), 40);

    // base input first, then the imported one
    let slots = unsigned.transaction.signing_slots().unwrap();
    assert_eq!(slots.len(), 2);
    let tx = unsigned.sign(&w.kc).unwrap();
    assert!(tx.verify_signatures().unwrap());
}

#[test]
fn test_import_without_atomics() {
    let w = wallet(ONE_AVAX);
    let foreign = vec![transfer(9, TOKEN, 40, Address::new([5; 20]))];
    assert!(matches!(
        w.utxos
            .build_import_tx(&net(), &foreign, net().c_chain_id, &[w.addr], &[w.addr], &[w.addr], &opts()),
        Err(TransactionError::InsufficientFunds(_))
    ));
    assert!(matches!(
        w.utxos
            .build_import_tx(&net(), &foreign, net().x_chain_id, &[w.addr], &[w.addr], &[w.addr], &opts()),
        Err(TransactionError::InvalidTransaction(_))
    ));
}

#[test]
fn test_export_splits_export_and_change() {
    let w = wallet(ONE_AVAX);
    let to = Address::new([0x42; 20]);
    let unsigned = w
        .utxos
        .build_export_tx(
            &net(),
            net().avax_asset_id,
            100 * MILLI_AVAX,
            net().p_chain_id,
            &[to],
            &[w.addr],
            &[w.addr],
            &opts(),
        )
        .unwrap();
    let Transaction::Export(export) = &unsigned.transaction else {
        panic!("expected an export tx");
    };
    assert_eq!(export.export_outs.len(), 1);
    assert_eq!(export.export_outs[0].output.amount(), Some(100 * MILLI_AVAX));
    assert_eq!(export.base.output_total(&net().avax_asset_id), ONE_AVAX - 101 * MILLI_AVAX);
    assert_eq!(unsigned.get_burn(&net().avax_asset_id), MILLI_AVAX);

    assert!(w
        .utxos
        .build_export_tx(&net(), net().avax_asset_id, 1, net().x_chain_id, &[to], &[w.addr], &[w.addr], &opts())
        .is_err());
}

// -----------------------------------------------------------------------
// CreateAssetTx
// -----------------------------------------------------------------------

fn asset_params(symbol: &str) -> CreateAssetParams {
    let minter = Address::new([3; 20]);
    CreateAssetParams {
        name: "Test Token".to_string(),
        symbol: symbol.to_string(),
        denomination: 9,
        initial_states: vec![InitialState::new(
            SECP_FX_ID,
            vec![
                AvmOutput::SecpTransfer(TransferOutput::new(1_000, vec![minter], 0, 1)),
                AvmOutput::SecpMint(MintOutput::new(vec![minter], 0, 1)),
            ],
        )],
    }
}

#[test]
fn test_create_asset_tx() {
    let w = wallet(ONE_AVAX);
    let unsigned = w
        .utxos
        .build_create_asset_tx(&net(), &asset_params("TT"), &[w.addr], &[w.addr], &opts())
        .unwrap();
    assert_eq!(unsigned.transaction.type_id(), CREATE_ASSET_TX_ID);
    assert_eq!(unsigned.get_burn(&net().avax_asset_id), net().create_asset_tx_fee);

    let bytes = unsigned.to_bytes();
    let parsed = UnsignedTx::from_bytes(&bytes).unwrap();
    let Transaction::CreateAsset(tx) = &parsed.transaction else {
        panic!("expected a create asset tx");
    };
    assert_eq!(tx.name, "Test Token");
    assert_eq!(tx.symbol, "TT");
    assert_eq!(tx.denomination, 9);
    assert_eq!(tx.initial_states[0].outputs.len(), 2);
    assert_eq!(parsed.to_bytes(), bytes);
}

#[test]
fn test_create_asset_validation() {
    let w = wallet(ONE_AVAX);
    for params in [
        asset_params("TOOLONG"),
        asset_params(""),
        CreateAssetParams {
            denomination: 33,
            ..asset_params("TT")
        },
        CreateAssetParams {
            name: String::new(),
            ..asset_params("TT")
        },
    ] {
        assert!(matches!(
            w.utxos.build_create_asset_tx(&net(), &params, &[w.addr], &[w.addr], &opts()),
            Err(TransactionError::InvalidTransaction(_))
        ));
    }
}

// -----------------------------------------------------------------------
// OperationTx
// -----------------------------------------------------------------------

#[test]
fn test_secp_mint_tx() {
    let mut w = wallet(ONE_AVAX);
    let mint_utxo = Utxo::new(
        Id::new([8; 32]),
        1,
        TOKEN,
        AvmOutput::SecpMint(MintOutput::new(vec![w.addr], 0, 1)),
    );
    let mint_id = mint_utxo.utxo_id();
    w.utxos.add(mint_utxo, false);

    let holder = Address::new([0x42; 20]);
    let unsigned = w
        .utxos
        .build_secp_mint_tx(
            &net(),
            &mint_id,
            MintOutput::new(vec![w.addr], 0, 1),
            TransferOutput::new(5_000, vec![holder], 0, 1),
            &[w.addr],
            &[w.addr],
            &opts(),
        )
        .unwrap();
    let Transaction::Operation(op_tx) = &unsigned.transaction else {
        panic!("expected an operation tx");
    };
    assert_eq!(op_tx.ops.len(), 1);
    assert_eq!(op_tx.ops[0].asset_id, TOKEN);
    assert_eq!(op_tx.ops[0].utxo_ids, vec![UtxoId::new(Id::new([8; 32]), 1)]);
    assert_eq!(op_tx.ops[0].operation.sig_idxs(), &[SigIdx::new(0, w.addr)]);

    let tx = unsigned.sign(&w.kc).unwrap();
    assert_eq!(tx.credentials.len(), 2);
    assert!(matches!(tx.credentials[1], AvmCredential::Secp(_)));
    assert!(tx.verify_signatures().unwrap());
    reparse(&tx);
}

#[test]
fn test_secp_mint_rejects_bad_utxo() {
    let w = wallet(ONE_AVAX);
    let transfer_id = w.utxos.get_all_utxo_ids()[0].clone();
    let mint = || MintOutput::new(vec![w.addr], 0, 1);
    let out = || TransferOutput::new(1, vec![w.addr], 0, 1);
    assert!(matches!(
        w.utxos
            .build_secp_mint_tx(&net(), &transfer_id, mint(), out(), &[w.addr], &[w.addr], &opts()),
        Err(TransactionError::InvalidTransaction(_))
    ));
    assert!(matches!(
        w.utxos
            .build_secp_mint_tx(&net(), "missing", mint(), out(), &[w.addr], &[w.addr], &opts()),
        Err(TransactionError::InvalidTransaction(_))
    ));
}

#[test]
fn test_nft_transfer_signs_with_nft_credential() {
    let w = wallet(ONE_AVAX);
    let op = TransferableOperation::new(
        TOKEN,
        vec![UtxoId::new(Id::new([6; 32]), 0)],
        Operation::NftTransfer(NftTransferOperation {
            sig_idxs: vec![SigIdx::new(0, w.addr)],
            output: NftTransferOutput::new(
                1,
                b"art".to_vec(),
                OutputOwners::new(vec![Address::new([0x42; 20])], 0, 1),
            )
            .unwrap(),
        }),
    );
    let base = avax_transaction::BaseTx::new(net().network_id, net().x_chain_id, vec![], vec![], vec![]).unwrap();
    let unsigned = UnsignedTx::new(Transaction::Operation(OperationTx::new(base, vec![op])));
    let tx = unsigned.sign(&w.kc).unwrap();
    assert_eq!(tx.credentials.len(), 1);
    assert!(matches!(tx.credentials[0], AvmCredential::Nft(_)));
    assert!(tx.verify_signatures().unwrap());
    reparse(&tx);
}

// -----------------------------------------------------------------------
// Codec edges and JSON form
// -----------------------------------------------------------------------

#[test]
fn test_unknown_transaction_type() {
    let w = wallet(ONE_AVAX);
    let unsigned = w
        .utxos
        .build_base_tx(&net(), net().avax_asset_id, 1, &[w.addr], &[w.addr], &[w.addr], &opts())
        .unwrap();
    let mut bytes = unsigned.to_bytes();
    bytes[5] = 0x20;
    assert!(matches!(
        UnsignedTx::from_bytes(&bytes),
        Err(TransactionError::UnknownType { kind: "transaction", type_id: 0x20 })
    ));
}

#[test]
fn test_json_roundtrip_of_each_variant() {
    let mut w = wallet(10 * ONE_AVAX);
    let mint_utxo = Utxo::new(
        Id::new([8; 32]),
        0,
        TOKEN,
        AvmOutput::SecpMint(MintOutput::new(vec![w.addr], 0, 1)),
    );
    let mint_id = mint_utxo.utxo_id();
    w.utxos.add(mint_utxo, false);
    let to = [Address::new([0x42; 20])];
    let from = [w.addr];

    let built = vec![
        w.utxos
            .build_base_tx(&net(), net().avax_asset_id, 5, &to, &from, &from, &opts().with_memo(b"memo"))
            .unwrap(),
        w.utxos
            .build_create_asset_tx(&net(), &asset_params("TT"), &from, &from, &opts())
            .unwrap(),
        w.utxos
            .build_secp_mint_tx(
                &net(),
                &mint_id,
                MintOutput::new(vec![w.addr], 0, 1),
                TransferOutput::new(1, to.to_vec(), 0, 1),
                &from,
                &from,
                &opts(),
            )
            .unwrap(),
        w.utxos
            .build_export_tx(&net(), net().avax_asset_id, 5, net().p_chain_id, &to, &from, &from, &opts())
            .unwrap(),
        w.utxos
            .build_import_tx(
                &net(),
                &[transfer(9, TOKEN, 3, w.addr)],
                net().c_chain_id,
                &from,
                &from,
                &from,
                &opts(),
            )
            .unwrap(),
    ];
    for unsigned in built {
        let tx = unsigned.sign(&w.kc).unwrap();
        for enc in [SerializedEncoding::Display, SerializedEncoding::Hex] {
            let json = tx.serialize(enc).unwrap();
            let back = Tx::deserialize(&json, enc).unwrap();
            assert_eq!(back.to_bytes(), tx.to_bytes(), "{}", unsigned.transaction.type_name());
        }
    }
}
