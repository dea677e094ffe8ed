//! Allocation output and input reconciler.
//!
//! An allocation event credits each receiver's allocated pool and debits the
//! sender by the sum of resolved receiver amounts. The debit pool is chosen
//! by the transaction subtype: asset sends draw on the unallocated supply,
//! every other allocation subtype on allocated balances. The matching sent
//! tracker records the requested amount so disconnect can restore it.

use spt_core::error::ReconcileError;
use spt_core::types::{AddressDescriptor, AddressRole, Amount, AssetGuid, Bucket, Pool, Visit};
use tracing::warn;

use crate::clamp;
use crate::context::PassContext;
use crate::engine::Reconciler;

const ALLOCATED: Bucket = Bucket::Balance(Pool::Allocated);

impl Reconciler {
    /// Credit every resolvable receiver, then debit the sender.
    ///
    /// The sender is resolved first: if it fails, no receiver is credited.
    /// An unresolvable receiver is skipped and excluded from the total.
    pub fn connect_allocation_output(
        &self,
        ctx: &mut PassContext<'_>,
        pool: Pool,
        payload: &[u8],
        visit: Visit,
    ) -> Result<(), ReconcileError> {
        let event = self
            .codec
            .decode_allocation(payload)
            .inspect_err(|e| warn!(error = %e, "allocation payload rejected"))?;
        let guid = event.guid;
        let sender = self.resolve(&event.sender, AddressRole::AllocationSender, guid)?;

        let mut total: Amount = 0;
        for receiver in &event.receivers {
            let Ok(address) = self.resolve(&receiver.address, AddressRole::AllocationReceiver, guid) else {
                continue;
            };
            let amount = Amount::from(receiver.amount);
            ctx.visit(&address, visit)?;
            ctx.balance_mut(&address).credit(ALLOCATED, guid, amount);
            total = total.saturating_add(amount);
        }
        self.connect_allocation_input(ctx, pool, guid, total, &sender, visit)
    }

    /// Debit `total` from the sender's `pool` and add it to the sent tracker.
    ///
    /// The debit clamps at zero; the tracker always records the full total.
    pub fn connect_allocation_input(
        &self,
        ctx: &mut PassContext<'_>,
        pool: Pool,
        guid: AssetGuid,
        total: Amount,
        sender: &AddressDescriptor,
        visit: Visit,
    ) -> Result<(), ReconcileError> {
        ctx.visit(sender, visit)?;
        let balance = ctx.balance_mut(sender);
        let shortfall = clamp::debit(balance, Bucket::Balance(pool), guid, total);
        balance.credit(Bucket::Sent(pool), guid, total);
        if let Some(shortfall) = shortfall {
            ctx.record_clamp(&self.describe(sender), Bucket::Balance(pool), guid, shortfall);
        }
        Ok(())
    }

    /// Debit every resolvable receiver, then restore the sender.
    ///
    /// A receiver with no stored record is reported and its debit skipped,
    /// but its amount still counts toward the sender's restore. Connect
    /// debited the sender by every resolved receiver, so the restore must
    /// equal that debit even when a receiver record is gone; leaving the
    /// amount out would strand it in the sender's sent tracker.
    pub fn disconnect_allocation_output(
        &self,
        ctx: &mut PassContext<'_>,
        pool: Pool,
        payload: &[u8],
        visit: Visit,
    ) -> Result<(), ReconcileError> {
        let event = self
            .codec
            .decode_allocation(payload)
            .inspect_err(|e| warn!(error = %e, "allocation payload rejected"))?;
        let guid = event.guid;
        let sender = self.resolve(&event.sender, AddressRole::AllocationSender, guid)?;

        let mut total: Amount = 0;
        for receiver in &event.receivers {
            let Ok(address) = self.resolve(&receiver.address, AddressRole::AllocationReceiver, guid) else {
                continue;
            };
            let amount = Amount::from(receiver.amount);
            total = total.saturating_add(amount);
            if !ctx.visit(&address, visit)? {
                warn!(address = %self.describe(&address), guid, "receiver balance not found, debit skipped");
                continue;
            }
            if let Some(shortfall) = clamp::debit(ctx.balance_mut(&address), ALLOCATED, guid, amount) {
                ctx.record_clamp(&self.describe(&address), ALLOCATED, guid, shortfall);
            }
        }
        self.disconnect_allocation_input(ctx, pool, guid, total, &sender, visit)
    }

    /// Credit `total` back to the sender's `pool` and unwind the sent tracker.
    ///
    /// The sender must have a record; its absence aborts the pass.
    pub fn disconnect_allocation_input(
        &self,
        ctx: &mut PassContext<'_>,
        pool: Pool,
        guid: AssetGuid,
        total: Amount,
        sender: &AddressDescriptor,
        visit: Visit,
    ) -> Result<(), ReconcileError> {
        if !ctx.visit(sender, visit)? {
            return Err(ReconcileError::MissingSenderBalance { address: self.describe(sender), guid });
        }
        let balance = ctx.balance_mut(sender);
        balance.credit(Bucket::Balance(pool), guid, total);
        if let Some(shortfall) = clamp::debit(balance, Bucket::Sent(pool), guid, total) {
            ctx.record_clamp(&self.describe(sender), Bucket::Sent(pool), guid, shortfall);
        }
        Ok(())
    }
}
