//! Block-scoped balance cache.
//!
//! Records are promoted from the [`BalanceStore`] on first reference and
//! mutated in place for the rest of the pass. The caller drains the cache
//! and commits it once the pass finishes.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use spt_core::error::StoreError;
use spt_core::traits::BalanceStore;
use spt_core::types::{AddrBalance, AddressDescriptor, BalanceDetail};

/// Per-pass cache of balance records with hit/miss accounting.
#[derive(Debug, Default)]
pub struct BalancesCache {
    balances: HashMap<AddressDescriptor, AddrBalance>,
    hits: u64,
    misses: u64,
}

impl BalancesCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make sure `descriptor` is cached if the store knows it.
    ///
    /// Returns `false` when neither the cache nor the store has a record.
    /// Nothing is inserted in that case.
    pub fn promote(
        &mut self,
        store: &dyn BalanceStore,
        descriptor: &AddressDescriptor,
    ) -> Result<bool, StoreError> {
        if self.balances.contains_key(descriptor) {
            self.hits += 1;
            return Ok(true);
        }
        self.misses += 1;
        match store.get_balance(descriptor, BalanceDetail::AssetsIndexed)? {
            Some(balance) => {
                self.balances.insert(descriptor.clone(), balance);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Cached record for `descriptor`, loading it from the store or creating
    /// a zero record on first reference.
    pub fn fetch_or_create(
        &mut self,
        store: &dyn BalanceStore,
        descriptor: &AddressDescriptor,
    ) -> Result<&mut AddrBalance, StoreError> {
        match self.balances.entry(descriptor.clone()) {
            Entry::Occupied(entry) => {
                self.hits += 1;
                Ok(entry.into_mut())
            }
            Entry::Vacant(entry) => {
                self.misses += 1;
                let balance = store
                    .get_balance(descriptor, BalanceDetail::AssetsIndexed)?
                    .unwrap_or_default();
                Ok(entry.insert(balance))
            }
        }
    }

    /// Mutable cached record, inserting a zero record if absent.
    ///
    /// Does not consult the store or move the counters; callers promote
    /// first.
    pub fn entry_mut(&mut self, descriptor: &AddressDescriptor) -> &mut AddrBalance {
        self.balances.entry(descriptor.clone()).or_default()
    }

    pub fn get(&self, descriptor: &AddressDescriptor) -> Option<&AddrBalance> {
        self.balances.get(descriptor)
    }

    pub fn contains(&self, descriptor: &AddressDescriptor) -> bool {
        self.balances.contains_key(descriptor)
    }

    pub fn len(&self) -> usize {
        self.balances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.balances.is_empty()
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }

    /// Drop every record for which `keep` returns `false`.
    pub fn retain(&mut self, mut keep: impl FnMut(&AddressDescriptor, &AddrBalance) -> bool) {
        self.balances.retain(|d, b| keep(d, b));
    }

    /// Consume the cache, yielding every record for commit.
    pub fn into_balances(self) -> HashMap<AddressDescriptor, AddrBalance> {
        self.balances
    }
}
