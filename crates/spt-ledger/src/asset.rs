//! Asset output reconciler.
//!
//! Asset events either add issued supply to the owner's unallocated pool or
//! hand the whole unallocated pool of the asset to a new owner.

use spt_core::error::ReconcileError;
use spt_core::types::{Amount, AddressRole, Bucket, Pool, Visit};
use tracing::{debug, warn};

use crate::clamp;
use crate::context::PassContext;
use crate::engine::Reconciler;

const UNALLOCATED: Bucket = Bucket::Balance(Pool::Unallocated);

impl Reconciler {
    /// Apply an asset event carried by an output being connected.
    ///
    /// Every address is resolved before any balance is touched.
    pub fn connect_asset_output(
        &self,
        ctx: &mut PassContext<'_>,
        payload: &[u8],
        visit: Visit,
    ) -> Result<(), ReconcileError> {
        let event = self
            .codec
            .decode_asset(payload)
            .inspect_err(|e| warn!(error = %e, "asset payload rejected"))?;
        let guid = event.guid;
        let owner = self.resolve(&event.owner, AddressRole::AssetOwner, guid)?;
        let target = event
            .transfer_target()
            .map(|to| self.resolve(to, AddressRole::AssetTransferee, guid))
            .transpose()?;

        ctx.visit(&owner, visit)?;
        match target {
            Some(target) => {
                ctx.visit(&target, visit)?;
                if target != owner {
                    let value = ctx.balance_mut(&owner).take(UNALLOCATED, guid);
                    ctx.balance_mut(&target).set(UNALLOCATED, guid, value);
                    debug!(guid, from = %owner, to = %target, amount = %value, "asset ownership transferred");
                }
            }
            None => {
                ctx.balance_mut(&owner).credit(UNALLOCATED, guid, Amount::from(event.amount));
            }
        }
        Ok(())
    }

    /// Reverse an asset event carried by an output being disconnected.
    ///
    /// An address with no stored record is reported and then handled as a
    /// placeholder zero record, so the rest of the event still reverses.
    pub fn disconnect_asset_output(
        &self,
        ctx: &mut PassContext<'_>,
        payload: &[u8],
        visit: Visit,
    ) -> Result<(), ReconcileError> {
        let event = self
            .codec
            .decode_asset(payload)
            .inspect_err(|e| warn!(error = %e, "asset payload rejected"))?;
        let guid = event.guid;
        let owner = self.resolve(&event.owner, AddressRole::AssetOwner, guid)?;
        let target = event
            .transfer_target()
            .map(|to| self.resolve(to, AddressRole::AssetTransferee, guid))
            .transpose()?;

        if !ctx.visit(&owner, visit)? {
            warn!(address = %self.describe(&owner), guid, "asset owner balance not found");
            ctx.placeholder_mut(&owner);
        }
        match target {
            Some(target) => {
                if !ctx.visit(&target, visit)? {
                    warn!(address = %self.describe(&target), guid, "asset transferee balance not found");
                    ctx.placeholder_mut(&target);
                }
                if target != owner {
                    let value = ctx.balance_mut(&target).take(UNALLOCATED, guid);
                    ctx.balance_mut(&owner).set(UNALLOCATED, guid, value);
                }
            }
            None => {
                let amount = Amount::from(event.amount);
                if let Some(shortfall) = clamp::debit(ctx.balance_mut(&owner), UNALLOCATED, guid, amount) {
                    ctx.record_clamp(&self.describe(&owner), UNALLOCATED, guid, shortfall);
                }
            }
        }
        Ok(())
    }
}
