//! Block pass driver.
//!
//! Runs the dispatcher over every output of a block in one [`PassContext`].
//! Disconnect walks the outputs in exact reverse order of connect.
//!
//! Error policy per output:
//! - fatal errors ([`ReconcileError::is_fatal`]) abort the pass; the caller
//!   must discard it and commit nothing
//! - any other error skips that output's effect and the pass continues

use std::collections::HashMap;

use serde::Serialize;
use spt_core::error::ReconcileError;
use spt_core::traits::BalanceStore;
use spt_core::types::{AddrBalance, AddressDescriptor, BlockData, Direction, Visit};
use tracing::{debug, error, info, trace};

use crate::context::PassContext;
use crate::dispatch::Outcome;
use crate::engine::Reconciler;

/// Statistics for a finished pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PassSummary {
    pub height: u64,
    pub direction: Direction,
    pub outputs_seen: u64,
    pub effects_applied: u64,
    pub effects_skipped: u64,
    pub clamps: u64,
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub addresses_touched: usize,
}

/// Result of a pass: its summary and every record to commit.
#[derive(Debug)]
pub struct PassOutcome {
    pub summary: PassSummary,
    pub balances: HashMap<AddressDescriptor, AddrBalance>,
}

impl Reconciler {
    /// Apply every asset payload in `block`.
    pub fn connect_block(
        &self,
        store: &dyn BalanceStore,
        block: &BlockData,
    ) -> Result<PassOutcome, ReconcileError> {
        self.run_pass(Direction::Connect, store, block)
    }

    /// Reverse every asset payload in `block`.
    pub fn disconnect_block(
        &self,
        store: &dyn BalanceStore,
        block: &BlockData,
    ) -> Result<PassOutcome, ReconcileError> {
        self.run_pass(Direction::Disconnect, store, block)
    }

    fn run_pass(
        &self,
        direction: Direction,
        store: &dyn BalanceStore,
        block: &BlockData,
    ) -> Result<PassOutcome, ReconcileError> {
        let mut ctx = PassContext::new(direction, store);

        let mut outputs: Vec<_> = block
            .transactions
            .iter()
            .flat_map(|tx| {
                tx.outputs.iter().enumerate().map(move |(vout, script)| {
                    let visit = Visit { txid: tx.txid, vout: vout as u32 };
                    (tx.version, visit, script)
                })
            })
            .collect();
        if direction == Direction::Disconnect {
            outputs.reverse();
        }

        for (version, visit, script) in outputs {
            ctx.stats_mut().outputs_seen += 1;
            let result = match direction {
                Direction::Connect => self.connect_output(&mut ctx, script, version, visit),
                Direction::Disconnect => self.disconnect_output(&mut ctx, script, version, visit),
            };
            match result {
                Ok(Outcome::Applied) => ctx.stats_mut().effects_applied += 1,
                Ok(Outcome::NoPayload | Outcome::Ignored) => {}
                Err(e) if e.is_fatal() => {
                    error!(
                        height = block.height,
                        %direction,
                        txid = %visit.txid,
                        vout = visit.vout,
                        error = %e,
                        "block pass aborted"
                    );
                    return Err(e);
                }
                Err(e) => {
                    ctx.stats_mut().effects_skipped += 1;
                    if e.is_silent() {
                        trace!(txid = %visit.txid, vout = visit.vout, error = %e, "output skipped");
                    } else {
                        debug!(txid = %visit.txid, vout = visit.vout, error = %e, "output skipped");
                    }
                }
            }
        }

        let (cache, visits, stats) = ctx.into_parts();
        let summary = PassSummary {
            height: block.height,
            direction,
            outputs_seen: stats.outputs_seen,
            effects_applied: stats.effects_applied,
            effects_skipped: stats.effects_skipped,
            clamps: stats.clamps,
            cache_hits: cache.hits(),
            cache_misses: cache.misses(),
            addresses_touched: visits.len(),
        };
        info!(
            height = summary.height,
            %direction,
            applied = summary.effects_applied,
            skipped = summary.effects_skipped,
            clamps = summary.clamps,
            addresses = summary.addresses_touched,
            "block pass complete"
        );
        Ok(PassOutcome { summary, balances: cache.into_balances() })
    }
}
