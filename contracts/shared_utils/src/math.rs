//! Checked arithmetic over token amounts.
//!
//! All amounts are `i128` in the payment token's smallest unit. Every helper
//! returns `None` on overflow so callers can surface a typed error instead of
//! trapping.

/// Denominator for basis-point rates: 10_000 bp = 100%.
pub const BASIS_POINT_DENOMINATOR: i128 = 10_000;

pub struct SafeMath;

impl SafeMath {
    pub fn add(a: i128, b: i128) -> Option<i128> {
        a.checked_add(b)
    }

    pub fn sub(a: i128, b: i128) -> Option<i128> {
        a.checked_sub(b)
    }

    pub fn mul(a: i128, b: i128) -> Option<i128> {
        a.checked_mul(b)
    }

    /// Portion of `amount` described by `rate_bps` basis points, rounded down.
    pub fn basis_points(amount: i128, rate_bps: u32) -> Option<i128> {
        amount
            .checked_mul(rate_bps as i128)?
            .checked_div(BASIS_POINT_DENOMINATOR)
    }
}
