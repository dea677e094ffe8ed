//! Block pass context.
//!
//! [`PassContext`] owns everything that lives for exactly one block pass:
//! the balance cache, the visitation ledger, and the running statistics.
//! It is created per block and handed to the reconcilers as `&mut`.

use std::collections::HashSet;

use spt_core::error::{ReconcileError, StoreError};
use spt_core::traits::BalanceStore;
use spt_core::types::{AddrBalance, AddressDescriptor, Amount, AssetGuid, Bucket, Direction, Visit};
use tracing::warn;

use crate::cache::BalancesCache;
use crate::clamp;
use crate::visitation::VisitationLedger;

/// Counters accumulated while a pass runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassStats {
    pub outputs_seen: u64,
    pub effects_applied: u64,
    pub effects_skipped: u64,
    /// Debits and `Txs` decrements that were floored at zero.
    pub clamps: u64,
}

/// Mutable state of a single connect or disconnect pass.
pub struct PassContext<'a> {
    direction: Direction,
    store: &'a dyn BalanceStore,
    cache: BalancesCache,
    visits: VisitationLedger,
    /// Disconnect records created with no stored counterpart.
    placeholders: HashSet<AddressDescriptor>,
    stats: PassStats,
}

impl<'a> PassContext<'a> {
    pub fn new(direction: Direction, store: &'a dyn BalanceStore) -> Self {
        Self {
            direction,
            store,
            cache: BalancesCache::new(),
            visits: VisitationLedger::new(),
            placeholders: HashSet::new(),
            stats: PassStats::default(),
        }
    }

    pub fn connect(store: &'a dyn BalanceStore) -> Self {
        Self::new(Direction::Connect, store)
    }

    pub fn disconnect(store: &'a dyn BalanceStore) -> Self {
        Self::new(Direction::Disconnect, store)
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Fail unless this pass runs in `direction`.
    pub fn expect_direction(&self, direction: Direction) -> Result<(), ReconcileError> {
        if self.direction == direction {
            Ok(())
        } else {
            Err(ReconcileError::DirectionMismatch { expected: self.direction, got: direction })
        }
    }

    /// Register a touch of `descriptor` by `visit`, loading its record.
    ///
    /// Connect: the record is fetched or created and `Txs` goes up by one on
    /// the first touch this pass. Always returns `true`.
    ///
    /// Disconnect: the record is only promoted if it exists. `Txs` goes down
    /// by one on the first touch, floored at zero. Returns `false` when the
    /// address has no stored record; nothing is created in that case, and a
    /// [placeholder](Self::placeholder_mut) never counts as stored.
    pub fn visit(&mut self, descriptor: &AddressDescriptor, visit: Visit) -> Result<bool, StoreError> {
        match self.direction {
            Direction::Connect => {
                let balance = self.cache.fetch_or_create(self.store, descriptor)?;
                if self.visits.mark(descriptor, visit) {
                    balance.txs = balance.txs.saturating_add(1);
                }
                Ok(true)
            }
            Direction::Disconnect => {
                let known = self.cache.promote(self.store, descriptor)?
                    && !self.placeholders.contains(descriptor);
                let first = self.visits.mark(descriptor, visit);
                if known && first {
                    let balance = self.cache.entry_mut(descriptor);
                    match balance.txs.checked_sub(1) {
                        Some(txs) => balance.txs = txs,
                        None => {
                            self.stats.clamps += 1;
                            warn!(address = %descriptor, "tx counter already zero, left at zero");
                        }
                    }
                }
                Ok(known)
            }
        }
    }

    /// The cached record for `descriptor`, created zeroed if absent.
    ///
    /// Call [`visit`](Self::visit) first so the stored record is loaded.
    pub fn balance_mut(&mut self, descriptor: &AddressDescriptor) -> &mut AddrBalance {
        self.cache.entry_mut(descriptor)
    }

    /// Zero record for an address [`visit`](Self::visit) reported unknown.
    ///
    /// Later visits this pass still report the address unknown. Placeholders
    /// left empty are dropped from the commit set.
    pub fn placeholder_mut(&mut self, descriptor: &AddressDescriptor) -> &mut AddrBalance {
        if !self.cache.contains(descriptor) {
            self.placeholders.insert(descriptor.clone());
        }
        self.cache.entry_mut(descriptor)
    }

    pub fn is_placeholder(&self, descriptor: &AddressDescriptor) -> bool {
        self.placeholders.contains(descriptor)
    }

    pub fn balance(&self, descriptor: &AddressDescriptor) -> Option<&AddrBalance> {
        self.cache.get(descriptor)
    }

    /// Count and report a clamped debit.
    pub fn record_clamp(&mut self, address: &str, bucket: Bucket, guid: AssetGuid, shortfall: Amount) {
        self.stats.clamps += 1;
        clamp::report(address, bucket, guid, shortfall);
    }

    pub fn stats(&self) -> &PassStats {
        &self.stats
    }

    pub fn stats_mut(&mut self) -> &mut PassStats {
        &mut self.stats
    }

    pub fn cache(&self) -> &BalancesCache {
        &self.cache
    }

    pub fn visits(&self) -> &VisitationLedger {
        &self.visits
    }

    /// Tear the context down once the pass is over.
    pub fn into_parts(mut self) -> (BalancesCache, VisitationLedger, PassStats) {
        let placeholders = &self.placeholders;
        self.cache.retain(|d, b| !(placeholders.contains(d) && b.is_empty()));
        (self.cache, self.visits, self.stats)
    }
}
