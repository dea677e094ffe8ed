//! Shared test helpers for scenario and property tests.

use std::collections::HashMap;

use spt_core::address::witness_script;
use spt_core::balance_store::MemoryBalanceStore;
use spt_core::payload::{encode_allocation, encode_asset, op_return_script};
use spt_core::traits::BalanceStore;
use spt_core::types::*;
use spt_ledger::{PassSummary, Reconciler};

/// Version-0 witness address from a seed byte.
pub fn addr(seed: u8) -> WitnessAddress {
    WitnessAddress::new(0, vec![seed; 20])
}

/// Balance key of [`addr`].
pub fn desc(seed: u8) -> AddressDescriptor {
    AddressDescriptor::from(witness_script(&addr(seed)))
}

pub fn txid(seed: u8) -> Hash256 {
    Hash256([seed; 32])
}

/// Payload script issuing `amount` of `guid` to `owner`.
pub fn issue_script(guid: AssetGuid, owner: u8, amount: u64) -> AddressDescriptor {
    let event = AssetEvent { guid, owner: addr(owner), amount, transfer_to: WitnessAddress::none() };
    AddressDescriptor::from(op_return_script(&encode_asset(&event)))
}

/// Payload script handing `guid` from `owner` to `to`.
pub fn transfer_script(guid: AssetGuid, owner: u8, to: u8) -> AddressDescriptor {
    let event = AssetEvent { guid, owner: addr(owner), amount: 0, transfer_to: addr(to) };
    AddressDescriptor::from(op_return_script(&encode_asset(&event)))
}

/// Payload script for an allocation event.
pub fn allocation_script(event: &AllocationEvent) -> AddressDescriptor {
    AddressDescriptor::from(op_return_script(&encode_allocation(event)))
}

/// Allocation event from seed bytes.
pub fn allocation(guid: AssetGuid, sender: u8, receivers: &[(u8, u64)]) -> AllocationEvent {
    AllocationEvent {
        guid,
        sender: addr(sender),
        receivers: receivers
            .iter()
            .map(|&(seed, amount)| AllocationReceiver { address: addr(seed), amount })
            .collect(),
    }
}

pub fn make_tx(seed: u8, version: i32, outputs: Vec<AddressDescriptor>) -> TxData {
    TxData { txid: txid(seed), version, outputs }
}

pub fn make_block(height: u64, transactions: Vec<TxData>) -> BlockData {
    BlockData { height, transactions }
}

/// In-memory store seeded with `(seed, balance)` records.
pub fn seeded_store(records: Vec<(u8, AddrBalance)>) -> MemoryBalanceStore {
    let mut store = MemoryBalanceStore::new();
    for (seed, balance) in records {
        store.insert(desc(seed), balance);
    }
    store
}

/// Connect `block` and commit the result.
pub fn connect_and_commit<S: BalanceStore>(
    reconciler: &Reconciler,
    store: &mut S,
    block: &BlockData,
) -> PassSummary {
    let outcome = reconciler.connect_block(&*store, block).unwrap();
    store.commit(outcome.balances).unwrap();
    outcome.summary
}

/// Disconnect `block` and commit the result.
pub fn disconnect_and_commit<S: BalanceStore>(
    reconciler: &Reconciler,
    store: &mut S,
    block: &BlockData,
) -> PassSummary {
    let outcome = reconciler.disconnect_block(&*store, block).unwrap();
    store.commit(outcome.balances).unwrap();
    outcome.summary
}

/// Whether `after` matches `before` for every address, treating a record
/// absent from `before` as equal to an empty record.
pub fn restored(
    before: &HashMap<AddressDescriptor, AddrBalance>,
    after: &HashMap<AddressDescriptor, AddrBalance>,
) -> bool {
    after.iter().all(|(d, b)| match before.get(d) {
        Some(prev) => prev == b,
        None => b.is_empty(),
    }) && before.keys().all(|d| after.contains_key(d))
}
