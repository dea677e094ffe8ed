//! # spt-ledger — Asset balance reconciliation engine.
//!
//! Applies the asset payloads of a block to per-address balance records
//! ("connect") and reverses them on rollback ("disconnect"):
//! - **Asset outputs**: issuance credits the owner's unallocated pool;
//!   an ownership transfer moves that whole pool to the new owner.
//! - **Allocation outputs**: receivers are credited in their allocated pool
//!   and the sender is debited from the pool chosen by the tx subtype.
//! - **Underflow clamp**: debits never take a balance below zero.
//! - **Tx counter**: each address's `txs` moves by one per block pass, no
//!   matter how many outputs touch it.
//!
//! A pass runs in a [`PassContext`]; [`Reconciler::connect_block`] and
//! [`Reconciler::disconnect_block`] drive one over a whole block and hand
//! back the records to commit.

pub mod allocation;
pub mod asset;
pub mod cache;
pub mod clamp;
pub mod context;
pub mod dispatch;
pub mod engine;
pub mod pass;
pub mod visitation;

#[cfg(test)]
mod test_support;

pub use cache::BalancesCache;
pub use context::{PassContext, PassStats};
pub use dispatch::Outcome;
pub use engine::Reconciler;
pub use pass::{PassOutcome, PassSummary};
pub use visitation::VisitationLedger;
