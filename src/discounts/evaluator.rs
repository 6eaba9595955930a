use chrono::{DateTime, Utc};

use crate::discounts::{Discount, DiscountType};

/// Result of evaluating a discount against an order subtotal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiscountOutcome {
    pub applicable: bool,
    pub amount_cents: i64,
}

impl DiscountOutcome {
    pub const NOT_APPLICABLE: DiscountOutcome = DiscountOutcome {
        applicable: false,
        amount_cents: 0,
    };
}

/// Pure discount evaluation
pub struct DiscountEvaluator;

impl DiscountEvaluator {
    /// Evaluate a discount against the current time and an order subtotal.
    ///
    /// A discount is applicable iff it is active, inside its validity
    /// window, under its usage limit, and the subtotal meets the minimum
    /// order amount. An inapplicable discount yields amount 0: order
    /// creation proceeds without it rather than failing.
    ///
    /// Amounts: `percentage` is `round(subtotal * value / 100)` (half-up)
    /// with `value` clamped to 100, further clamped to `max_discount_cents`
    /// when set; `fixed` is clamped to the subtotal. Either way a discount
    /// can never drive the total negative.
    pub fn evaluate(
        discount: &Discount,
        now: DateTime<Utc>,
        subtotal_cents: i64,
    ) -> DiscountOutcome {
        if !discount.is_active {
            return DiscountOutcome::NOT_APPLICABLE;
        }
        if let Some(starts_at) = discount.starts_at {
            if starts_at > now {
                return DiscountOutcome::NOT_APPLICABLE;
            }
        }
        if let Some(expires_at) = discount.expires_at {
            if expires_at < now {
                return DiscountOutcome::NOT_APPLICABLE;
            }
        }
        if let Some(usage_limit) = discount.usage_limit {
            if discount.used_count >= usage_limit {
                return DiscountOutcome::NOT_APPLICABLE;
            }
        }
        if let Some(min_order_cents) = discount.min_order_cents {
            if subtotal_cents < min_order_cents {
                return DiscountOutcome::NOT_APPLICABLE;
            }
        }

        let amount_cents = match discount.discount_type {
            DiscountType::Percentage => {
                // Integer percent, clamped to 0-100 so a malformed row can
                // neither overflow the multiplication nor exceed the
                // subtotal. Round half-up in minor units.
                let percent = discount.value.min(100);
                let raw = (subtotal_cents * percent + 50) / 100;
                match discount.max_discount_cents {
                    Some(cap) => raw.min(cap),
                    None => raw,
                }
            }
            DiscountType::Fixed => discount.value.min(subtotal_cents),
        };

        DiscountOutcome {
            applicable: true,
            amount_cents,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use uuid::Uuid;

    fn base_discount(discount_type: DiscountType, value: i64) -> Discount {
        Discount {
            id: Uuid::new_v4(),
            tenant_id: Uuid::new_v4(),
            code: "SAVE".to_string(),
            discount_type,
            value,
            min_order_cents: None,
            max_discount_cents: None,
            usage_limit: None,
            used_count: 0,
            starts_at: None,
            expires_at: None,
            is_active: true,
        }
    }

    #[test]
    fn test_percentage_discount_basic() {
        let discount = base_discount(DiscountType::Percentage, 20);
        let outcome = DiscountEvaluator::evaluate(&discount, Utc::now(), 4500);
        assert!(outcome.applicable);
        assert_eq!(outcome.amount_cents, 900);
    }

    #[test]
    fn test_percentage_discount_is_clamped_to_cap() {
        let mut discount = base_discount(DiscountType::Percentage, 20);
        discount.max_discount_cents = Some(500);
        let outcome = DiscountEvaluator::evaluate(&discount, Utc::now(), 4500);
        assert_eq!(outcome.amount_cents, 500);
    }

    #[test]
    fn test_percentage_rounding_is_half_up() {
        // 15% of 1010 = 151.5, rounds to 152
        let discount = base_discount(DiscountType::Percentage, 15);
        let outcome = DiscountEvaluator::evaluate(&discount, Utc::now(), 1010);
        assert_eq!(outcome.amount_cents, 152);
    }

    #[test]
    fn test_percentage_above_100_is_clamped_to_subtotal() {
        let discount = base_discount(DiscountType::Percentage, 200);
        let outcome = DiscountEvaluator::evaluate(&discount, Utc::now(), 1000);
        assert!(outcome.applicable);
        assert_eq!(outcome.amount_cents, 1000);
    }

    #[test]
    fn test_percentage_with_huge_value_does_not_overflow() {
        let discount = base_discount(DiscountType::Percentage, 4_000_000_000_000_000_000);
        let outcome = DiscountEvaluator::evaluate(&discount, Utc::now(), 1000);
        assert_eq!(outcome.amount_cents, 1000);
    }

    #[test]
    fn test_fixed_discount_basic() {
        let discount = base_discount(DiscountType::Fixed, 300);
        let outcome = DiscountEvaluator::evaluate(&discount, Utc::now(), 4500);
        assert_eq!(outcome.amount_cents, 300);
    }

    #[test]
    fn test_fixed_discount_never_exceeds_subtotal() {
        let discount = base_discount(DiscountType::Fixed, 10_000);
        let outcome = DiscountEvaluator::evaluate(&discount, Utc::now(), 4500);
        assert_eq!(outcome.amount_cents, 4500);
    }

    #[test]
    fn test_inactive_discount_is_not_applicable() {
        let mut discount = base_discount(DiscountType::Fixed, 300);
        discount.is_active = false;
        let outcome = DiscountEvaluator::evaluate(&discount, Utc::now(), 4500);
        assert_eq!(outcome, DiscountOutcome::NOT_APPLICABLE);
    }

    #[test]
    fn test_not_yet_started_discount_is_not_applicable() {
        let mut discount = base_discount(DiscountType::Fixed, 300);
        discount.starts_at = Some(Utc::now() + Duration::hours(1));
        let outcome = DiscountEvaluator::evaluate(&discount, Utc::now(), 4500);
        assert!(!outcome.applicable);
    }

    #[test]
    fn test_expired_discount_is_not_applicable() {
        let mut discount = base_discount(DiscountType::Fixed, 300);
        discount.expires_at = Some(Utc::now() - Duration::hours(1));
        let outcome = DiscountEvaluator::evaluate(&discount, Utc::now(), 4500);
        assert!(!outcome.applicable);
    }

    #[test]
    fn test_window_boundaries_are_inclusive() {
        let now = Utc::now();
        let mut discount = base_discount(DiscountType::Fixed, 300);
        discount.starts_at = Some(now);
        discount.expires_at = Some(now);
        let outcome = DiscountEvaluator::evaluate(&discount, now, 4500);
        assert!(outcome.applicable);
    }

    #[test]
    fn test_exhausted_usage_limit_is_not_applicable() {
        let mut discount = base_discount(DiscountType::Fixed, 300);
        discount.usage_limit = Some(5);
        discount.used_count = 5;
        let outcome = DiscountEvaluator::evaluate(&discount, Utc::now(), 4500);
        assert!(!outcome.applicable);
    }

    #[test]
    fn test_usage_below_limit_is_applicable() {
        let mut discount = base_discount(DiscountType::Fixed, 300);
        discount.usage_limit = Some(5);
        discount.used_count = 4;
        let outcome = DiscountEvaluator::evaluate(&discount, Utc::now(), 4500);
        assert!(outcome.applicable);
    }

    #[test]
    fn test_subtotal_below_minimum_is_not_applicable() {
        let mut discount = base_discount(DiscountType::Percentage, 10);
        discount.min_order_cents = Some(5000);
        let outcome = DiscountEvaluator::evaluate(&discount, Utc::now(), 4500);
        assert!(!outcome.applicable);
    }

    #[test]
    fn test_subtotal_at_minimum_is_applicable() {
        let mut discount = base_discount(DiscountType::Percentage, 10);
        discount.min_order_cents = Some(4500);
        let outcome = DiscountEvaluator::evaluate(&discount, Utc::now(), 4500);
        assert!(outcome.applicable);
    }
}
