// Discount data access used inside the order-creation transaction

use sqlx::PgConnection;
use uuid::Uuid;

use crate::discounts::Discount;
use crate::tenants::TenantScope;

pub struct DiscountsRepository;

impl DiscountsRepository {
    /// Look up a discount by code for this tenant, taking a row lock.
    ///
    /// The code is normalized to uppercase before matching. The lock makes
    /// evaluate-then-increment atomic with respect to concurrent orders
    /// using the same code, so `used_count` can never overshoot its limit.
    pub async fn find_by_code_for_update(
        conn: &mut PgConnection,
        scope: &TenantScope,
        code: &str,
    ) -> Result<Option<Discount>, sqlx::Error> {
        sqlx::query_as::<_, Discount>(
            r#"
            SELECT id, tenant_id, code, discount_type, value, min_order_cents,
                   max_discount_cents, usage_limit, used_count, starts_at,
                   expires_at, is_active
            FROM discounts
            WHERE tenant_id = $1 AND code = $2
            FOR UPDATE
            "#,
        )
        .bind(scope.tenant_id())
        .bind(code.trim().to_uppercase())
        .fetch_optional(conn)
        .await
    }

    /// Consume one use of a discount.
    ///
    /// Guarded against the usage limit even under the row lock; returns the
    /// number of rows affected so the caller can detect an increment that
    /// lost to the limit.
    pub async fn increment_usage(
        conn: &mut PgConnection,
        discount_id: Uuid,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE discounts
            SET used_count = used_count + 1
            WHERE id = $1
              AND (usage_limit IS NULL OR used_count < usage_limit)
            "#,
        )
        .bind(discount_id)
        .execute(conn)
        .await?;

        Ok(result.rows_affected())
    }
}
