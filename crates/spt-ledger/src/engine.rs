//! Reconciliation engine.
//!
//! [`Reconciler`] holds the collaborators shared across passes: address
//! resolution, payload decoding, and version classification. Per-block state
//! lives in [`PassContext`](crate::context::PassContext). The reconcilers
//! themselves are implemented in `asset`, `allocation`, and `dispatch`.

use std::fmt;
use std::sync::Arc;

use spt_core::address::WitnessResolver;
use spt_core::constants::MAX_ADDR_DESC_LEN;
use spt_core::error::{ReconcileError, ResolveError};
use spt_core::payload::BincodePayloadCodec;
use spt_core::traits::{AddressResolver, PayloadCodec, TxClassifier, VersionClassifier};
use spt_core::types::{AddressDescriptor, AddressRole, AssetGuid, WitnessAddress};
use tracing::warn;

/// Applies asset payloads to a block pass.
pub struct Reconciler {
    pub(crate) resolver: Arc<dyn AddressResolver>,
    pub(crate) codec: Arc<dyn PayloadCodec>,
    pub(crate) classifier: Arc<dyn TxClassifier>,
}

impl fmt::Debug for Reconciler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reconciler").finish_non_exhaustive()
    }
}

impl Reconciler {
    pub fn new(
        resolver: Arc<dyn AddressResolver>,
        codec: Arc<dyn PayloadCodec>,
        classifier: Arc<dyn TxClassifier>,
    ) -> Self {
        Self { resolver, codec, classifier }
    }

    /// Witness resolution for `hrp`, bincode payloads, built-in version table.
    pub fn with_hrp(hrp: &str) -> Self {
        Self::new(
            Arc::new(WitnessResolver::new(hrp)),
            Arc::new(BincodePayloadCodec),
            Arc::new(VersionClassifier),
        )
    }

    pub fn resolver(&self) -> &dyn AddressResolver {
        self.resolver.as_ref()
    }

    /// Resolve a payload address into a balance key.
    ///
    /// Descriptors that are empty or longer than [`MAX_ADDR_DESC_LEN`] are
    /// rejected. Every failure except [`ResolveError::Missing`] is warned.
    pub(crate) fn resolve(
        &self,
        address: &WitnessAddress,
        role: AddressRole,
        guid: AssetGuid,
    ) -> Result<AddressDescriptor, ReconcileError> {
        let result = self.resolver.resolve(address).and_then(|descriptor| {
            if descriptor.is_empty() {
                Err(ResolveError::Invalid("empty descriptor".into()))
            } else if descriptor.len() > MAX_ADDR_DESC_LEN {
                Err(ResolveError::Oversized { len: descriptor.len(), max: MAX_ADDR_DESC_LEN })
            } else {
                Ok(descriptor)
            }
        });
        result.map_err(|source| {
            if source != ResolveError::Missing {
                warn!(%role, guid, error = %source, "address resolution failed");
            }
            ReconcileError::Resolve { role, guid, source }
        })
    }

    pub(crate) fn describe(&self, descriptor: &AddressDescriptor) -> String {
        self.resolver.describe(descriptor)
    }
}

impl Default for Reconciler {
    fn default() -> Self {
        Self::new(
            Arc::new(WitnessResolver::default()),
            Arc::new(BincodePayloadCodec),
            Arc::new(VersionClassifier),
        )
    }
}
