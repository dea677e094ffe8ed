//! Connect/disconnect passes against the RocksDB balance store.

use spt_core::constants::*;
use spt_core::traits::BalanceStore;
use spt_core::types::*;
use spt_ledger::Reconciler;
use spt_store::RocksBalanceStore;
use spt_tests::helpers::*;

fn temp_store() -> (RocksBalanceStore, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let store = RocksBalanceStore::open(dir.path().join("balances")).unwrap();
    (store, dir)
}

fn load(store: &RocksBalanceStore, seed: u8) -> Option<AddrBalance> {
    store.get_balance(&desc(seed), BalanceDetail::AssetsIndexed).unwrap()
}

#[test]
fn issue_send_and_rollback_persist() {
    let (mut store, _dir) = temp_store();
    let r = Reconciler::default();
    let issue = make_block(1, vec![make_tx(1, TX_VERSION_ASSET_ACTIVATE, vec![issue_script(7, 1, 1000)])]);
    let send = make_block(2, vec![make_tx(
        2,
        TX_VERSION_ASSET_SEND,
        vec![allocation_script(&allocation(7, 1, &[(2, 300), (3, 200)]))],
    )]);

    connect_and_commit(&r, &mut store, &issue);
    connect_and_commit(&r, &mut store, &send);
    assert_eq!(store.commit_count().unwrap(), 2);
    assert_eq!(store.balance_count().unwrap(), 3);

    let a = load(&store, 1).unwrap();
    assert_eq!(a.balance(Pool::Unallocated, 7), 500);
    assert_eq!(a.sent(Pool::Unallocated, 7), 500);
    assert_eq!(a.txs, 2);
    assert_eq!(load(&store, 2).unwrap().balance(Pool::Allocated, 7), 300);

    disconnect_and_commit(&r, &mut store, &send);
    let a = load(&store, 1).unwrap();
    assert_eq!(a, AddrBalance::new().with_txs(1).with_balance(Pool::Unallocated, 7, 1000));
    assert!(load(&store, 3).unwrap().is_empty());
}

#[test]
fn summary_reads_skip_asset_maps() {
    let (mut store, _dir) = temp_store();
    let block = make_block(1, vec![make_tx(1, TX_VERSION_ASSET_ACTIVATE, vec![issue_script(7, 1, 5)])]);
    connect_and_commit(&Reconciler::default(), &mut store, &block);
    let s = store.get_balance(&desc(1), BalanceDetail::Summary).unwrap().unwrap();
    assert_eq!(s, AddrBalance::new().with_txs(1));
}

#[test]
fn aborted_pass_leaves_store_untouched() {
    let (store, _dir) = temp_store();
    let block = make_block(1, vec![make_tx(
        1,
        TX_VERSION_ALLOCATION_SEND,
        vec![allocation_script(&allocation(7, 1, &[(2, 1)]))],
    )]);
    assert!(Reconciler::default().disconnect_block(&store, &block).is_err());
    assert_eq!(store.commit_count().unwrap(), 0);
    assert_eq!(store.balance_count().unwrap(), 0);
}
