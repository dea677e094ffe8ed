//! Output dispatcher: routes an output's payload to the right reconciler.

use spt_core::error::ReconcileError;
use spt_core::types::{AddressDescriptor, Direction, PayloadKind, Visit};
use tracing::trace;

use crate::context::PassContext;
use crate::engine::Reconciler;

/// What the dispatcher did with an output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// A reconciler applied the payload.
    Applied,
    /// The output carries no payload.
    NoPayload,
    /// The output carries data but the transaction is not an asset subtype.
    Ignored,
}

impl Reconciler {
    /// Apply the asset payload of an output being connected, if any.
    pub fn connect_output(
        &self,
        ctx: &mut PassContext<'_>,
        script: &AddressDescriptor,
        version: i32,
        visit: Visit,
    ) -> Result<Outcome, ReconcileError> {
        self.dispatch(ctx, Direction::Connect, script, version, visit)
    }

    /// Reverse the asset payload of an output being disconnected, if any.
    pub fn disconnect_output(
        &self,
        ctx: &mut PassContext<'_>,
        script: &AddressDescriptor,
        version: i32,
        visit: Visit,
    ) -> Result<Outcome, ReconcileError> {
        self.dispatch(ctx, Direction::Disconnect, script, version, visit)
    }

    fn dispatch(
        &self,
        ctx: &mut PassContext<'_>,
        direction: Direction,
        script: &AddressDescriptor,
        version: i32,
        visit: Visit,
    ) -> Result<Outcome, ReconcileError> {
        ctx.expect_direction(direction)?;
        let Some(payload) = self.codec.extract_payload(script.as_bytes()) else {
            return Ok(Outcome::NoPayload);
        };
        let subtype = self.classifier.classify(version);
        trace!(?subtype, %direction, txid = %visit.txid, vout = visit.vout, "dispatching payload");
        match (subtype.kind(), direction) {
            (PayloadKind::Asset, Direction::Connect) => self.connect_asset_output(ctx, payload, visit)?,
            (PayloadKind::Asset, Direction::Disconnect) => {
                self.disconnect_asset_output(ctx, payload, visit)?
            }
            (PayloadKind::Allocation(pool), Direction::Connect) => {
                self.connect_allocation_output(ctx, pool, payload, visit)?
            }
            (PayloadKind::Allocation(pool), Direction::Disconnect) => {
                self.disconnect_allocation_output(ctx, pool, payload, visit)?
            }
            (PayloadKind::None, _) => return Ok(Outcome::Ignored),
        }
        Ok(Outcome::Applied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{allocation_event, asset_event, desc, visit};
    use spt_core::balance_store::MemoryBalanceStore;
    use spt_core::constants::{TX_VERSION_ALLOCATION_SEND, TX_VERSION_ASSET_ACTIVATE, TX_VERSION_ASSET_SEND};
    use spt_core::payload::{encode_allocation, encode_asset, op_return_script};
    use spt_core::types::{AddrBalance, Pool};

    fn script(payload: Vec<u8>) -> AddressDescriptor {
        AddressDescriptor::from(op_return_script(&payload))
    }

    #[test]
    fn plain_output_is_noop() {
        let store = MemoryBalanceStore::new();
        let mut ctx = PassContext::connect(&store);
        let outcome = Reconciler::default()
            .connect_output(&mut ctx, &desc(1), TX_VERSION_ASSET_SEND, visit(0))
            .unwrap();
        assert_eq!(outcome, Outcome::NoPayload);
        assert!(ctx.cache().is_empty());
    }

    #[test]
    fn data_on_plain_tx_is_ignored() {
        let store = MemoryBalanceStore::new();
        let mut ctx = PassContext::connect(&store);
        let s = script(encode_asset(&asset_event(7, 1, 5, None)));
        let outcome = Reconciler::default().connect_output(&mut ctx, &s, 2, visit(0)).unwrap();
        assert_eq!(outcome, Outcome::Ignored);
        assert!(ctx.cache().is_empty());
    }

    #[test]
    fn asset_version_routes_to_asset_reconciler() {
        let store = MemoryBalanceStore::new();
        let mut ctx = PassContext::connect(&store);
        let s = script(encode_asset(&asset_event(7, 1, 5, None)));
        let outcome = Reconciler::default()
            .connect_output(&mut ctx, &s, TX_VERSION_ASSET_ACTIVATE, visit(0))
            .unwrap();
        assert_eq!(outcome, Outcome::Applied);
        assert_eq!(ctx.balance(&desc(1)).unwrap().balance(Pool::Unallocated, 7), 5);
    }

    #[test]
    fn asset_send_selects_unallocated_pool() {
        let mut store = MemoryBalanceStore::new();
        store.insert(desc(1), AddrBalance::new().with_balance(Pool::Unallocated, 7, 10));
        let mut ctx = PassContext::connect(&store);
        let s = script(encode_allocation(&allocation_event(7, 1, &[(2, 4)])));
        Reconciler::default()
            .connect_output(&mut ctx, &s, TX_VERSION_ASSET_SEND, visit(0))
            .unwrap();
        assert_eq!(ctx.balance(&desc(1)).unwrap().balance(Pool::Unallocated, 7), 6);
    }

    #[test]
    fn allocation_send_selects_allocated_pool() {
        let mut store = MemoryBalanceStore::new();
        store.insert(desc(1), AddrBalance::new().with_balance(Pool::Allocated, 7, 10));
        let mut ctx = PassContext::connect(&store);
        let s = script(encode_allocation(&allocation_event(7, 1, &[(2, 4)])));
        Reconciler::default()
            .connect_output(&mut ctx, &s, TX_VERSION_ALLOCATION_SEND, visit(0))
            .unwrap();
        assert_eq!(ctx.balance(&desc(1)).unwrap().balance(Pool::Allocated, 7), 6);
    }

    #[test]
    fn wrong_direction_is_rejected() {
        let store = MemoryBalanceStore::new();
        let mut ctx = PassContext::connect(&store);
        let err = Reconciler::default()
            .disconnect_output(&mut ctx, &desc(1), TX_VERSION_ASSET_SEND, visit(0))
            .unwrap_err();
        assert!(matches!(err, ReconcileError::DirectionMismatch { .. }));
        assert!(err.is_fatal());
    }

    #[test]
    fn decode_errors_propagate() {
        let store = MemoryBalanceStore::new();
        let mut ctx = PassContext::connect(&store);
        let s = script(vec![0xff, 0xff, 0xff]);
        let err = Reconciler::default()
            .connect_output(&mut ctx, &s, TX_VERSION_ALLOCATION_SEND, visit(0))
            .unwrap_err();
        assert!(matches!(err, ReconcileError::Decode(_)));
    }
}
