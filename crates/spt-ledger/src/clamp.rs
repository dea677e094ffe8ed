//! Underflow clamp shared by every debit path.
//!
//! A debit larger than the stored amount floors the entry at zero and
//! reports the shortfall; it never fails the pass. Reversing a clamped debit
//! later restores more than was there. That drift is logged, not corrected.

use spt_core::types::{AddrBalance, Amount, AssetGuid, Bucket};
use tracing::warn;

/// Subtract `amount` from `current`, flooring at zero.
///
/// Returns the new value and the shortfall if the subtraction clamped.
pub fn clamp_sub(current: Amount, amount: Amount) -> (Amount, Option<Amount>) {
    match current.checked_sub(amount) {
        Some(value) => (value, None),
        None => (0, Some(amount - current)),
    }
}

/// Debit `amount` from one bucket of `balance`, clamping at zero.
///
/// Returns the shortfall if the debit clamped; the caller reports it.
pub fn debit(
    balance: &mut AddrBalance,
    bucket: Bucket,
    guid: AssetGuid,
    amount: Amount,
) -> Option<Amount> {
    let (value, shortfall) = clamp_sub(balance.get(bucket, guid), amount);
    balance.set(bucket, guid, value);
    shortfall
}

/// Emit the diagnostic for a clamped debit.
pub fn report(address: &str, bucket: Bucket, guid: AssetGuid, shortfall: Amount) {
    warn!(
        address,
        guid,
        bucket = bucket.label(),
        shortfall = %shortfall,
        "balance would go negative, reset to zero"
    );
}
