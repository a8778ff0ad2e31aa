use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

/// Rounds a money value to cents, halves away from zero.
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Per-installment payment for a debt.
///
/// With no installments left the whole amount is due at once.
pub fn installment_amount(amount: Decimal, installments: i64) -> Decimal {
    if installments <= 0 {
        return round_money(amount);
    }
    round_money(amount / Decimal::from(installments))
}

/// Number of installments needed to repay `amount` with a fixed `quota`.
///
/// Returns `None` for a non-positive quota, or when the count does not fit.
pub fn installments_for_quota(amount: Decimal, quota: Decimal) -> Option<i64> {
    if quota <= Decimal::ZERO {
        return None;
    }
    amount
        .checked_div(quota)?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str_exact(s).unwrap()
    }

    #[test]
    fn divides_amount_by_installments() {
        assert_eq!(installment_amount(dec("1200.00"), 12), dec("100"));
        assert_eq!(installment_amount(dec("100"), 3), dec("33.33"));
        assert_eq!(installment_amount(dec("200"), 3), dec("66.67"));
    }

    #[test]
    fn zero_installments_means_whole_amount() {
        assert_eq!(installment_amount(dec("45.50"), 0), dec("45.50"));
    }

    #[test]
    fn rounds_half_away_from_zero() {
        assert_eq!(round_money(dec("0.125")), dec("0.13"));
        assert_eq!(round_money(dec("2.675")), dec("2.68"));
    }

    #[test]
    fn derives_installments_from_quota() {
        assert_eq!(installments_for_quota(dec("1200"), dec("100")), Some(12));
        assert_eq!(installments_for_quota(dec("1000"), dec("300")), Some(3));
        assert_eq!(installments_for_quota(dec("1000"), dec("400")), Some(3));
        assert_eq!(installments_for_quota(dec("1000"), Decimal::ZERO), None);
    }

    #[test]
    fn huge_amount_with_tiny_quota_has_no_count() {
        assert_eq!(installments_for_quota(dec("1000000000000000000000000000"), dec("0.01")), None);
        assert_eq!(installments_for_quota(Decimal::MAX, dec("0.5")), None);
        // fits a Decimal but not an i64
        assert_eq!(installments_for_quota(dec("100000000000000000000"), dec("1")), None);
    }
}
