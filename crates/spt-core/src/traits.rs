//! Collaborator interfaces consumed by the reconciliation engine.
//!
//! - [`BalanceStore`] — persistent per-address balances (spt-store implements)
//! - [`AddressResolver`] — payload address to descriptor mapping
//! - [`PayloadCodec`] — payload extraction and decoding
//! - [`TxClassifier`] — transaction version to [`TxSubtype`]

use std::collections::HashMap;

use crate::error::{DecodeError, ResolveError, StoreError};
use crate::types::{
    AddrBalance, AddressDescriptor, AllocationEvent, AssetEvent, BalanceDetail, TxSubtype,
    WitnessAddress,
};

/// Persistent balance records keyed by address descriptor.
pub trait BalanceStore: Send + Sync {
    /// Load the balance record for `descriptor`. Returns `None` if the
    /// address has never been indexed.
    fn get_balance(
        &self,
        descriptor: &AddressDescriptor,
        detail: BalanceDetail,
    ) -> Result<Option<AddrBalance>, StoreError>;

    /// Persist every record produced by a finished pass.
    fn commit(&mut self, balances: HashMap<AddressDescriptor, AddrBalance>) -> Result<(), StoreError>;
}

/// Maps payload addresses to the descriptors balances are keyed by.
pub trait AddressResolver: Send + Sync {
    /// Resolve an address. [`ResolveError::Missing`] means the payload
    /// names no address at all.
    fn resolve(&self, address: &WitnessAddress) -> Result<AddressDescriptor, ResolveError>;

    /// Human-readable form of a descriptor, for diagnostics only.
    fn describe(&self, descriptor: &AddressDescriptor) -> String;
}

/// Extracts and decodes the asset payload embedded in an output script.
pub trait PayloadCodec: Send + Sync {
    /// Payload bytes carried by `script`, or `None` if it carries none.
    fn extract_payload<'a>(&self, script: &'a [u8]) -> Option<&'a [u8]>;

    fn decode_asset(&self, payload: &[u8]) -> Result<AssetEvent, DecodeError>;

    fn decode_allocation(&self, payload: &[u8]) -> Result<AllocationEvent, DecodeError>;
}

/// Resolves a transaction version to its asset-layer subtype.
pub trait TxClassifier: Send + Sync {
    fn classify(&self, version: i32) -> TxSubtype;
}

/// Classifier using the built-in version table.
#[derive(Debug, Clone, Copy, Default)]
pub struct VersionClassifier;

impl TxClassifier for VersionClassifier {
    fn classify(&self, version: i32) -> TxSubtype {
        TxSubtype::from_version(version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{TX_VERSION_ALLOCATION_LOCK, TX_VERSION_ASSET_TRANSFER};

    #[test]
    fn version_classifier_uses_table() {
        let c = VersionClassifier;
        assert_eq!(c.classify(TX_VERSION_ASSET_TRANSFER), TxSubtype::AssetTransfer);
        assert_eq!(c.classify(TX_VERSION_ALLOCATION_LOCK), TxSubtype::AllocationLock);
        assert_eq!(c.classify(2), TxSubtype::Unknown);
    }

    #[test]
    fn classifier_is_object_safe() {
        let c: Box<dyn TxClassifier> = Box::new(VersionClassifier);
        assert_eq!(c.classify(1), TxSubtype::Unknown);
    }
}
