//! Core index types: descriptors, payload events, per-address balances.
//!
//! Asset amounts are [`Amount`] (`u128`). Payloads carry `u64` values which
//! widen losslessly; balances can never be negative, so a debit that would
//! go below zero is clamped by the reconciler instead of being stored.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

use crate::constants::{
    TX_VERSION_ALLOCATION_BURN_TO_BRIDGE, TX_VERSION_ALLOCATION_BURN_TO_NATIVE,
    TX_VERSION_ALLOCATION_LOCK, TX_VERSION_ALLOCATION_MINT, TX_VERSION_ALLOCATION_SEND,
    TX_VERSION_ASSET_ACTIVATE, TX_VERSION_ASSET_SEND, TX_VERSION_ASSET_TRANSFER,
    TX_VERSION_ASSET_UPDATE, TX_VERSION_NATIVE_BURN_TO_ALLOCATION,
};

/// Asset identifier.
pub type AssetGuid = u32;

/// Asset amount in base units.
pub type Amount = u128;

/// A 32-byte hash value, used for transaction IDs.
///
/// Serializes as a lowercase hex string in human-readable formats.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default,
    bincode::Encode, bincode::Decode,
)]
pub struct Hash256(pub [u8; 32]);

impl Hash256 {
    /// The zero hash.
    pub const ZERO: Self = Self([0u8; 32]);

    /// Return the underlying bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Parse from a 64-character hex string.
    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(s, &mut bytes)?;
        Ok(Self(bytes))
    }
}

impl fmt::Display for Hash256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl From<[u8; 32]> for Hash256 {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl Serialize for Hash256 {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Hash256 {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// Opaque address descriptor: the output script an address pays to.
///
/// Used as the key of every balance record. Serializes as hex.
#[derive(
    Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default, bincode::Encode, bincode::Decode,
)]
pub struct AddressDescriptor(pub Vec<u8>);

impl AddressDescriptor {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        hex::decode(s).map(Self)
    }
}

impl fmt::Display for AddressDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(&self.0))
    }
}

impl fmt::Debug for AddressDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AddressDescriptor({self})")
    }
}

impl From<Vec<u8>> for AddressDescriptor {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl Serialize for AddressDescriptor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for AddressDescriptor {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// A witness address as carried inside asset payloads.
///
/// An empty program means the payload names no address.
#[derive(
    Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash, Default,
    bincode::Encode, bincode::Decode,
)]
pub struct WitnessAddress {
    /// Witness version (0..=16).
    pub version: u8,
    /// Witness program bytes.
    pub program: Vec<u8>,
}

impl WitnessAddress {
    pub fn new(version: u8, program: impl Into<Vec<u8>>) -> Self {
        Self { version, program: program.into() }
    }

    /// The "no address" value.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.program.is_empty()
    }
}

/// Single-asset issuance, update, or ownership-transfer event.
#[derive(
    Serialize, Deserialize, Clone, Debug, PartialEq, Eq, bincode::Encode, bincode::Decode,
)]
pub struct AssetEvent {
    pub guid: AssetGuid,
    /// Current owner of the asset's unallocated supply.
    pub owner: WitnessAddress,
    /// Units added to the owner's unallocated supply (ignored on transfer).
    pub amount: u64,
    /// New owner, empty when the event is not an ownership transfer.
    pub transfer_to: WitnessAddress,
}

impl AssetEvent {
    /// The transfer target, if this event hands the asset to a new owner.
    pub fn transfer_target(&self) -> Option<&WitnessAddress> {
        (!self.transfer_to.is_empty()).then_some(&self.transfer_to)
    }
}

/// One receiver of an allocation transfer.
#[derive(
    Serialize, Deserialize, Clone, Debug, PartialEq, Eq, bincode::Encode, bincode::Decode,
)]
pub struct AllocationReceiver {
    pub address: WitnessAddress,
    pub amount: u64,
}

/// Multi-receiver allocation transfer of a single asset.
#[derive(
    Serialize, Deserialize, Clone, Debug, PartialEq, Eq, bincode::Encode, bincode::Decode,
)]
pub struct AllocationEvent {
    pub guid: AssetGuid,
    pub sender: WitnessAddress,
    pub receivers: Vec<AllocationReceiver>,
}

/// The two parallel balance pools kept per asset.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Pool {
    /// Issued supply not yet split into allocations.
    Unallocated,
    /// Supply assigned to specific holders.
    Allocated,
}

/// A per-asset amount map inside an [`AddrBalance`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Bucket {
    /// Current balance in the pool.
    Balance(Pool),
    /// Running total sent out of the pool, kept for exact reversal.
    Sent(Pool),
}

impl Bucket {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Balance(Pool::Unallocated) => "unallocated",
            Self::Balance(Pool::Allocated) => "allocated",
            Self::Sent(Pool::Unallocated) => "sent_unallocated",
            Self::Sent(Pool::Allocated) => "sent_allocated",
        }
    }
}

/// Per-address asset ledger.
///
/// Maps never hold zero entries: writing zero removes the key, so two
/// balances holding the same amounts always compare equal.
#[derive(
    Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq,
    bincode::Encode, bincode::Decode,
)]
pub struct AddrBalance {
    /// Number of block passes that touched this address.
    pub txs: u32,
    unallocated: BTreeMap<AssetGuid, Amount>,
    allocated: BTreeMap<AssetGuid, Amount>,
    sent_unallocated: BTreeMap<AssetGuid, Amount>,
    sent_allocated: BTreeMap<AssetGuid, Amount>,
}

impl AddrBalance {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style helper setting a pool balance.
    pub fn with_balance(mut self, pool: Pool, guid: AssetGuid, amount: Amount) -> Self {
        self.set(Bucket::Balance(pool), guid, amount);
        self
    }

    /// Builder-style helper setting the tx counter.
    pub fn with_txs(mut self, txs: u32) -> Self {
        self.txs = txs;
        self
    }

    fn map(&self, bucket: Bucket) -> &BTreeMap<AssetGuid, Amount> {
        match bucket {
            Bucket::Balance(Pool::Unallocated) => &self.unallocated,
            Bucket::Balance(Pool::Allocated) => &self.allocated,
            Bucket::Sent(Pool::Unallocated) => &self.sent_unallocated,
            Bucket::Sent(Pool::Allocated) => &self.sent_allocated,
        }
    }

    fn map_mut(&mut self, bucket: Bucket) -> &mut BTreeMap<AssetGuid, Amount> {
        match bucket {
            Bucket::Balance(Pool::Unallocated) => &mut self.unallocated,
            Bucket::Balance(Pool::Allocated) => &mut self.allocated,
            Bucket::Sent(Pool::Unallocated) => &mut self.sent_unallocated,
            Bucket::Sent(Pool::Allocated) => &mut self.sent_allocated,
        }
    }

    /// Amount held in `bucket` for `guid` (zero when absent).
    pub fn get(&self, bucket: Bucket, guid: AssetGuid) -> Amount {
        self.map(bucket).get(&guid).copied().unwrap_or(0)
    }

    /// Shorthand for `get(Bucket::Balance(pool), guid)`.
    pub fn balance(&self, pool: Pool, guid: AssetGuid) -> Amount {
        self.get(Bucket::Balance(pool), guid)
    }

    /// Shorthand for `get(Bucket::Sent(pool), guid)`.
    pub fn sent(&self, pool: Pool, guid: AssetGuid) -> Amount {
        self.get(Bucket::Sent(pool), guid)
    }

    /// Overwrite the amount for `guid`. Zero removes the entry.
    pub fn set(&mut self, bucket: Bucket, guid: AssetGuid, amount: Amount) {
        let map = self.map_mut(bucket);
        if amount == 0 {
            map.remove(&guid);
        } else {
            map.insert(guid, amount);
        }
    }

    /// Add `amount` to the entry for `guid`, saturating at `Amount::MAX`.
    pub fn credit(&mut self, bucket: Bucket, guid: AssetGuid, amount: Amount) {
        let current = self.get(bucket, guid);
        self.set(bucket, guid, current.saturating_add(amount));
    }

    /// Remove and return the entry for `guid`.
    pub fn take(&mut self, bucket: Bucket, guid: AssetGuid) -> Amount {
        self.map_mut(bucket).remove(&guid).unwrap_or(0)
    }

    /// Iterate the non-zero entries of a bucket in guid order.
    pub fn entries(&self, bucket: Bucket) -> impl Iterator<Item = (AssetGuid, Amount)> + '_ {
        self.map(bucket).iter().map(|(g, a)| (*g, *a))
    }

    /// Drop the asset maps, keeping only the tx counter.
    pub fn summary(&self) -> Self {
        Self { txs: self.txs, ..Self::default() }
    }

    /// Whether the record holds no counter and no amounts.
    pub fn is_empty(&self) -> bool {
        self.txs == 0
            && self.unallocated.is_empty()
            && self.allocated.is_empty()
            && self.sent_unallocated.is_empty()
            && self.sent_allocated.is_empty()
    }
}

/// How much of a stored balance record to load.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum BalanceDetail {
    /// Only the tx counter.
    Summary,
    /// The full record including per-asset maps.
    #[default]
    AssetsIndexed,
}

/// Which payload shape an output carries, and for allocations which pool
/// the sender is debited from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PayloadKind {
    Asset,
    Allocation(Pool),
    None,
}

/// Asset-layer transaction subtype, resolved once from the version field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TxSubtype {
    AssetActivate,
    AssetUpdate,
    AssetTransfer,
    AssetSend,
    AllocationSend,
    AllocationMint,
    AllocationBurn,
    NativeBurnToAllocation,
    AllocationLock,
    Unknown,
}

impl TxSubtype {
    /// Classify a transaction version.
    pub fn from_version(version: i32) -> Self {
        match version {
            TX_VERSION_ASSET_ACTIVATE => Self::AssetActivate,
            TX_VERSION_ASSET_UPDATE => Self::AssetUpdate,
            TX_VERSION_ASSET_TRANSFER => Self::AssetTransfer,
            TX_VERSION_ASSET_SEND => Self::AssetSend,
            TX_VERSION_ALLOCATION_SEND => Self::AllocationSend,
            TX_VERSION_ALLOCATION_MINT => Self::AllocationMint,
            TX_VERSION_ALLOCATION_BURN_TO_NATIVE | TX_VERSION_ALLOCATION_BURN_TO_BRIDGE => {
                Self::AllocationBurn
            }
            TX_VERSION_NATIVE_BURN_TO_ALLOCATION => Self::NativeBurnToAllocation,
            TX_VERSION_ALLOCATION_LOCK => Self::AllocationLock,
            _ => Self::Unknown,
        }
    }

    /// Payload shape and debit pool for this subtype.
    ///
    /// Asset sends use the allocation payload but move units out of the
    /// owner's unallocated supply.
    pub fn kind(&self) -> PayloadKind {
        match self {
            Self::AssetActivate | Self::AssetUpdate | Self::AssetTransfer => PayloadKind::Asset,
            Self::AssetSend => PayloadKind::Allocation(Pool::Unallocated),
            Self::AllocationSend
            | Self::AllocationMint
            | Self::AllocationBurn
            | Self::NativeBurnToAllocation
            | Self::AllocationLock => PayloadKind::Allocation(Pool::Allocated),
            Self::Unknown => PayloadKind::None,
        }
    }
}

/// Direction of a block pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Connect,
    Disconnect,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connect => f.write_str("connect"),
            Self::Disconnect => f.write_str("disconnect"),
        }
    }
}

/// The part an address plays in a payload, for diagnostics.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AddressRole {
    AssetOwner,
    AssetTransferee,
    AllocationSender,
    AllocationReceiver,
}

impl fmt::Display for AddressRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::AssetOwner => "asset owner",
            Self::AssetTransferee => "asset transferee",
            Self::AllocationSender => "allocation sender",
            Self::AllocationReceiver => "allocation receiver",
        };
        f.write_str(s)
    }
}

/// The transaction output currently being reconciled.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Visit {
    pub txid: Hash256,
    pub vout: u32,
}

/// A transaction as seen by the asset index: version plus output scripts.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct TxData {
    pub txid: Hash256,
    pub version: i32,
    pub outputs: Vec<AddressDescriptor>,
}

/// A block as seen by the asset index.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct BlockData {
    pub height: u64,
    pub transactions: Vec<TxData>,
}
