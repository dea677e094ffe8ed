//! Criterion benchmarks for spt-ledger block passes.
//!
//! Covers: connect of an issuance-heavy block and connect/disconnect of an
//! allocation-send block against an in-memory store.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use spt_core::address::witness_script;
use spt_core::balance_store::MemoryBalanceStore;
use spt_core::constants::{TX_VERSION_ALLOCATION_SEND, TX_VERSION_ASSET_ACTIVATE};
use spt_core::payload::{encode_allocation, encode_asset, op_return_script};
use spt_core::traits::BalanceStore;
use spt_core::types::{
    AddressDescriptor, AllocationEvent, AllocationReceiver, AssetEvent, BlockData, Hash256, TxData,
    WitnessAddress,
};
use spt_ledger::Reconciler;

fn addr(i: u32) -> WitnessAddress {
    let mut program = vec![0u8; 20];
    program[..4].copy_from_slice(&i.to_le_bytes());
    WitnessAddress::new(0, program)
}

fn txid(i: u32) -> Hash256 {
    let mut bytes = [0u8; 32];
    bytes[..4].copy_from_slice(&i.to_le_bytes());
    Hash256(bytes)
}

/// `n` issuance transactions, one per owner.
fn issuance_block(n: u32) -> BlockData {
    let transactions = (0..n)
        .map(|i| {
            let event = AssetEvent { guid: 1, owner: addr(i), amount: 1_000_000, transfer_to: WitnessAddress::none() };
            TxData {
                txid: txid(i),
                version: TX_VERSION_ASSET_ACTIVATE,
                outputs: vec![AddressDescriptor::from(op_return_script(&encode_asset(&event)))],
            }
        })
        .collect();
    BlockData { height: 1, transactions }
}

/// `n` allocation sends from owner `i` to ten receivers each.
fn send_block(n: u32) -> BlockData {
    let transactions = (0..n)
        .map(|i| {
            let receivers = (0..10)
                .map(|j| AllocationReceiver { address: addr(10_000 + i * 10 + j), amount: 100 })
                .collect();
            let event = AllocationEvent { guid: 1, sender: addr(i), receivers };
            TxData {
                txid: txid(n + i),
                version: TX_VERSION_ALLOCATION_SEND,
                outputs: vec![
                    AddressDescriptor::from(op_return_script(&encode_allocation(&event))),
                    AddressDescriptor::from(witness_script(&addr(i))),
                ],
            }
        })
        .collect();
    BlockData { height: 2, transactions }
}

fn bench_connect_issuance(c: &mut Criterion) {
    let reconciler = Reconciler::default();
    let store = MemoryBalanceStore::new();
    let block = issuance_block(1000);

    c.bench_function("connect_issuance_1000_txs", |b| {
        b.iter(|| reconciler.connect_block(&store, black_box(&block)))
    });
}

fn bench_allocation_roundtrip(c: &mut Criterion) {
    let reconciler = Reconciler::default();
    let mut store = MemoryBalanceStore::new();
    let issued = reconciler.connect_block(&store, &issuance_block(200)).unwrap();
    store.commit(issued.balances).unwrap();
    let block = send_block(200);

    c.bench_function("connect_allocation_200_txs", |b| {
        b.iter(|| reconciler.connect_block(&store, black_box(&block)))
    });

    let sent = reconciler.connect_block(&store, &block).unwrap();
    store.commit(sent.balances).unwrap();
    c.bench_function("disconnect_allocation_200_txs", |b| {
        b.iter(|| reconciler.disconnect_block(&store, black_box(&block)))
    });
}

criterion_group!(benches, bench_connect_issuance, bench_allocation_roundtrip);
criterion_main!(benches);
