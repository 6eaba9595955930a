use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Discount type: percentage of subtotal or fixed amount off
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum DiscountType {
    Percentage,
    Fixed,
}

impl DiscountType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiscountType::Percentage => "percentage",
            DiscountType::Fixed => "fixed",
        }
    }
}

impl std::fmt::Display for DiscountType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Domain model representing a discount code
///
/// `code` is stored uppercase and is unique per tenant. For `percentage`,
/// `value` is an integer percent (0-100); for `fixed`, `value` is an amount
/// in minor currency units. `used_count` must never exceed `usage_limit`
/// when the latter is set.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Discount {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub code: String,
    pub discount_type: DiscountType,
    pub value: i64,
    pub min_order_cents: Option<i64>,
    pub max_discount_cents: Option<i64>,
    pub usage_limit: Option<i64>,
    pub used_count: i64,
    pub starts_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
    pub is_active: bool,
}
