//! Asset-layer constants: transaction versions and descriptor limits.

/// Maximum length in bytes of an address descriptor accepted by the index.
pub const MAX_ADDR_DESC_LEN: usize = 1024;

/// Default human-readable prefix used when describing witness addresses.
pub const DEFAULT_ADDRESS_HRP: &str = "sys";

// --- Transaction versions carrying an asset payload ---
//
// The asset layer tags transactions through the version field. Anything
// outside this range is a plain transfer with no asset effect.

/// Burn allocated units back to the native coin.
pub const TX_VERSION_ALLOCATION_BURN_TO_NATIVE: i32 = 0x7400;
/// Burn native coin into an allocation.
pub const TX_VERSION_NATIVE_BURN_TO_ALLOCATION: i32 = 0x7401;
/// Register a new asset.
pub const TX_VERSION_ASSET_ACTIVATE: i32 = 0x7402;
/// Update an asset's supply or metadata.
pub const TX_VERSION_ASSET_UPDATE: i32 = 0x7403;
/// Hand ownership of an asset to a new address.
pub const TX_VERSION_ASSET_TRANSFER: i32 = 0x7404;
/// Send units out of the owner's unallocated supply.
pub const TX_VERSION_ASSET_SEND: i32 = 0x7405;
/// Mint allocated units from a bridge proof.
pub const TX_VERSION_ALLOCATION_MINT: i32 = 0x7406;
/// Burn allocated units toward a bridged chain.
pub const TX_VERSION_ALLOCATION_BURN_TO_BRIDGE: i32 = 0x7407;
/// Move allocated units between holders.
pub const TX_VERSION_ALLOCATION_SEND: i32 = 0x7408;
/// Lock allocated units.
pub const TX_VERSION_ALLOCATION_LOCK: i32 = 0x7409;

// --- Script opcodes used by payload and witness scripts ---

pub const OP_0: u8 = 0x00;
pub const OP_PUSHDATA1: u8 = 0x4c;
pub const OP_PUSHDATA2: u8 = 0x4d;
pub const OP_PUSHDATA4: u8 = 0x4e;
pub const OP_1: u8 = 0x51;
pub const OP_16: u8 = 0x60;
pub const OP_RETURN: u8 = 0x6a;

/// Largest data length that can be pushed with a single-byte opcode.
pub const MAX_DIRECT_PUSH: usize = 0x4b;

/// Highest witness program version.
pub const MAX_WITNESS_VERSION: u8 = 16;
/// Witness program length bounds (BIP-141).
pub const MIN_WITNESS_PROGRAM_LEN: usize = 2;
pub const MAX_WITNESS_PROGRAM_LEN: usize = 40;
