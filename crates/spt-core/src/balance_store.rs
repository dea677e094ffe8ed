//! In-memory balance store.
//!
//! [`MemoryBalanceStore`] keeps records in a `HashMap` with no persistence.
//! It is the store used by engine tests; the indexer uses RocksDB
//! (spt-store).

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::StoreError;
use crate::traits::BalanceStore;
use crate::types::{AddrBalance, AddressDescriptor, BalanceDetail};

/// `HashMap`-backed [`BalanceStore`] that counts reads.
#[derive(Debug, Default)]
pub struct MemoryBalanceStore {
    balances: HashMap<AddressDescriptor, AddrBalance>,
    reads: AtomicU64,
    commits: u64,
}

impl MemoryBalanceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a record directly, bypassing a pass.
    pub fn insert(&mut self, descriptor: AddressDescriptor, balance: AddrBalance) {
        self.balances.insert(descriptor, balance);
    }

    /// Stored record for `descriptor`, if any.
    pub fn get(&self, descriptor: &AddressDescriptor) -> Option<&AddrBalance> {
        self.balances.get(descriptor)
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.balances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.balances.is_empty()
    }

    /// Number of `get_balance` calls served.
    pub fn reads(&self) -> u64 {
        self.reads.load(Ordering::Relaxed)
    }

    /// Number of commits applied.
    pub fn commits(&self) -> u64 {
        self.commits
    }

    /// Snapshot of every stored record.
    pub fn snapshot(&self) -> HashMap<AddressDescriptor, AddrBalance> {
        self.balances.clone()
    }
}

impl BalanceStore for MemoryBalanceStore {
    fn get_balance(
        &self,
        descriptor: &AddressDescriptor,
        detail: BalanceDetail,
    ) -> Result<Option<AddrBalance>, StoreError> {
        self.reads.fetch_add(1, Ordering::Relaxed);
        Ok(self.balances.get(descriptor).map(|b| match detail {
            BalanceDetail::Summary => b.summary(),
            BalanceDetail::AssetsIndexed => b.clone(),
        }))
    }

    fn commit(&mut self, balances: HashMap<AddressDescriptor, AddrBalance>) -> Result<(), StoreError> {
        self.balances.extend(balances);
        self.commits += 1;
        Ok(())
    }
}
