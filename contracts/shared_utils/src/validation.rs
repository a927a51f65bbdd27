//! Input validation predicates shared by the registry contracts.

pub const MIN_RATING: u32 = 1;
pub const MAX_RATING: u32 = 5;

/// Commission rates are expressed in basis points and may not exceed 100%.
pub const MAX_COMMISSION_RATE_BPS: u32 = 10_000;

pub struct Validation;

impl Validation {
    pub fn is_valid_rating(rating: u32) -> bool {
        (MIN_RATING..=MAX_RATING).contains(&rating)
    }

    pub fn is_valid_commission_rate(rate_bps: u32) -> bool {
        rate_bps <= MAX_COMMISSION_RATE_BPS
    }

    pub fn is_positive(amount: i128) -> bool {
        amount > 0
    }
}
