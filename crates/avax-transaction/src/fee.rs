//! Burn accounting and the Goose Egg fee guard.

use log::warn;

use crate::constants::ONE_AVAX;
use crate::TransactionError;

/// A fee at or below this is always accepted.
pub const GOOSE_EGG_FEE_LIMIT: u64 = 10 * ONE_AVAX;

/// Value destroyed: inputs minus outputs, floored at zero.
pub fn get_burn(input_total: u64, output_total: u64) -> u64 {
    input_total.saturating_sub(output_total)
}

/// Accept a fee if it is at most `GOOSE_EGG_FEE_LIMIT` or at most the
/// value being moved; otherwise fail with `GooseEgg`.
pub fn check_goose_egg(fee: u64, output_total: u64) -> Result<(), TransactionError> {
    if fee <= GOOSE_EGG_FEE_LIMIT || fee <= output_total {
        return Ok(());
    }
    warn!("goose egg: fee {} exceeds output total {}", fee, output_total);
    Err(TransactionError::GooseEgg { fee, output_total })
}
