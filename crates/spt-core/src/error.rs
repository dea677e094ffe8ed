//! Error types for the SPT asset index.
use thiserror::Error;

use crate::types::{AddressRole, AssetGuid, Direction};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("empty payload")] Empty,
    #[error("malformed payload: {0}")] Malformed(String),
    #[error("trailing bytes: consumed {consumed} of {len}")] TrailingBytes { consumed: usize, len: usize },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("address missing")] Missing,
    #[error("invalid address: {0}")] Invalid(String),
    #[error("oversized descriptor: {len} > {max}")] Oversized { len: usize, max: usize },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
    #[error("invalid HRP")] InvalidHrp,
    #[error("invalid length")] InvalidLength,
    #[error("invalid checksum")] InvalidChecksum,
    #[error("invalid character: {0}")] InvalidCharacter(char),
    #[error("invalid witness version: {0}")] InvalidVersion(u8),
    #[error("invalid padding bits")] InvalidPadding,
    #[error("missing separator")] MissingSeparator,
    #[error("mixed case")] MixedCase,
    #[error("not a witness program")] NotWitnessProgram,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("backend: {0}")] Backend(String),
    #[error("codec: {0}")] Codec(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReconcileError {
    #[error(transparent)] Decode(#[from] DecodeError),
    #[error("{role} for asset {guid}: {source}")] Resolve { role: AddressRole, guid: AssetGuid, source: ResolveError },
    #[error(transparent)] Store(#[from] StoreError),
    #[error("sender balance not found for asset {guid} at {address}")] MissingSenderBalance { address: String, guid: AssetGuid },
    #[error("pass direction mismatch: expected {expected}, got {got}")] DirectionMismatch { expected: Direction, got: Direction },
}

impl ReconcileError {
    /// Whether the error must abort the whole block pass.
    ///
    /// Decode and resolution failures only abort the current output's effect.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::Store(_) | Self::MissingSenderBalance { .. } | Self::DirectionMismatch { .. }
        )
    }

    /// Whether the error is an expected condition that should not be logged
    /// above trace level (an output whose address is legitimately absent).
    pub fn is_silent(&self) -> bool {
        matches!(self, Self::Resolve { source: ResolveError::Missing, .. })
    }
}

#[derive(Error, Debug)]
pub enum SptError {
    #[error(transparent)] Decode(#[from] DecodeError),
    #[error(transparent)] Resolve(#[from] ResolveError),
    #[error(transparent)] Address(#[from] AddressError),
    #[error(transparent)] Store(#[from] StoreError),
    #[error(transparent)] Reconcile(#[from] ReconcileError),
    #[error("config: {0}")] Config(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_errors_are_fatal() {
        let err = ReconcileError::from(StoreError::Backend("io".into()));
        assert!(err.is_fatal());
        assert!(!err.is_silent());
    }

    #[test]
    fn missing_sender_is_fatal() {
        let err = ReconcileError::MissingSenderBalance { address: "a".into(), guid: 7 };
        assert!(err.is_fatal());
    }

    #[test]
    fn decode_errors_skip_the_effect() {
        let err = ReconcileError::from(DecodeError::Empty);
        assert!(!err.is_fatal());
        assert!(!err.is_silent());
    }

    #[test]
    fn missing_address_is_silent() {
        let err = ReconcileError::Resolve {
            role: AddressRole::AssetOwner,
            guid: 1,
            source: ResolveError::Missing,
        };
        assert!(!err.is_fatal());
        assert!(err.is_silent());
    }

    #[test]
    fn invalid_address_is_not_silent() {
        let err = ReconcileError::Resolve {
            role: AddressRole::AllocationSender,
            guid: 1,
            source: ResolveError::Invalid("bad".into()),
        };
        assert!(!err.is_silent());
        assert_eq!(err.to_string(), "allocation sender for asset 1: invalid address: bad");
    }
}
