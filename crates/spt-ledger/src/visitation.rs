//! Per-pass visitation ledger.
//!
//! Records every `(txid, vout)` that touched an address during one block
//! pass. The first touch is what moves `Txs`; later touches only append.

use std::collections::HashMap;

use spt_core::types::{AddressDescriptor, Visit};

/// Map of address descriptor to every output that touched it this pass.
#[derive(Debug, Default, Clone)]
pub struct VisitationLedger {
    touches: HashMap<AddressDescriptor, Vec<Visit>>,
}

impl VisitationLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a touch and report whether it is the first one this pass.
    pub fn mark(&mut self, descriptor: &AddressDescriptor, visit: Visit) -> bool {
        match self.touches.get_mut(descriptor) {
            Some(visits) => {
                visits.push(visit);
                false
            }
            None => {
                self.touches.insert(descriptor.clone(), vec![visit]);
                true
            }
        }
    }

    pub fn is_visited(&self, descriptor: &AddressDescriptor) -> bool {
        self.touches.contains_key(descriptor)
    }

    /// Every touch recorded for `descriptor`, in order.
    pub fn touches(&self, descriptor: &AddressDescriptor) -> &[Visit] {
        self.touches.get(descriptor).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of distinct addresses touched.
    pub fn len(&self) -> usize {
        self.touches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.touches.is_empty()
    }
}
