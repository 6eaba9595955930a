use sqlx::PgPool;
use uuid::Uuid;

use crate::orders::models::{Order, OrderItem, OrderStatus, OrderSummary};
use crate::tenants::TenantScope;

/// Filter and paging parameters for order listings. Values arrive here
/// already validated and clamped by the service.
#[derive(Debug, Clone)]
pub struct OrderListParams {
    pub status: Option<OrderStatus>,
    pub customer_id: Option<Uuid>,
    pub limit: i64,
    pub offset: i64,
}

#[derive(Clone)]
pub struct OrdersRepository {
    pool: PgPool,
}

impl OrdersRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Fetch one order by id, scoped to the tenant. Every lookup predicates
    /// on `(id, tenant_id)` so an order id from another tenant behaves
    /// exactly like a nonexistent one.
    pub async fn find_by_id(
        &self,
        scope: &TenantScope,
        order_id: Uuid,
    ) -> Result<Option<Order>, sqlx::Error> {
        sqlx::query_as::<_, Order>(
            r#"
            SELECT id, tenant_id, customer_id, order_number, status, payment_status,
                   subtotal_cents, tax_cents, shipping_cents, discount_cents, total_cents,
                   shipping_address, billing_address, currency, created_at, updated_at
            FROM orders
            WHERE id = $1 AND tenant_id = $2
            "#,
        )
        .bind(order_id)
        .bind(scope.tenant_id())
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn items_for(&self, order_id: Uuid) -> Result<Vec<OrderItem>, sqlx::Error> {
        sqlx::query_as::<_, OrderItem>(
            r#"
            SELECT id, order_id, product_id, variant_id, quantity,
                   unit_price_cents, total_price_cents
            FROM order_items
            WHERE order_id = $1
            ORDER BY id
            "#,
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await
    }

    /// Count orders matching the filters, for pagination metadata.
    pub async fn count(
        &self,
        scope: &TenantScope,
        params: &OrderListParams,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM orders
            WHERE tenant_id = $1
              AND ($2::text IS NULL OR status = $2)
              AND ($3::uuid IS NULL OR customer_id = $3)
            "#,
        )
        .bind(scope.tenant_id())
        .bind(params.status.map(|s| s.as_str().to_string()))
        .bind(params.customer_id)
        .fetch_one(&self.pool)
        .await
    }

    /// List order summaries, newest first, with per-order item counts.
    pub async fn list(
        &self,
        scope: &TenantScope,
        params: &OrderListParams,
    ) -> Result<Vec<OrderSummary>, sqlx::Error> {
        sqlx::query_as::<_, OrderSummary>(
            r#"
            SELECT o.id, o.customer_id, o.order_number, o.status, o.payment_status,
                   o.total_cents, o.currency, o.created_at,
                   COUNT(oi.id) AS item_count
            FROM orders o
            LEFT JOIN order_items oi ON oi.order_id = o.id
            WHERE o.tenant_id = $1
              AND ($2::text IS NULL OR o.status = $2)
              AND ($3::uuid IS NULL OR o.customer_id = $3)
            GROUP BY o.id
            ORDER BY o.created_at DESC
            LIMIT $4 OFFSET $5
            "#,
        )
        .bind(scope.tenant_id())
        .bind(params.status.map(|s| s.as_str().to_string()))
        .bind(params.customer_id)
        .bind(params.limit)
        .bind(params.offset)
        .fetch_all(&self.pool)
        .await
    }

    /// Compare-and-set status update. The `status = $4` predicate makes the
    /// transition atomic: a concurrent update that moved the order away from
    /// the expected status yields zero rows instead of a lost update.
    pub async fn update_status(
        &self,
        scope: &TenantScope,
        order_id: Uuid,
        from: OrderStatus,
        to: OrderStatus,
    ) -> Result<Option<Order>, sqlx::Error> {
        sqlx::query_as::<_, Order>(
            r#"
            UPDATE orders
            SET status = $3, updated_at = NOW()
            WHERE id = $1 AND tenant_id = $2 AND status = $4
            RETURNING id, tenant_id, customer_id, order_number, status, payment_status,
                      subtotal_cents, tax_cents, shipping_cents, discount_cents, total_cents,
                      shipping_address, billing_address, currency, created_at, updated_at
            "#,
        )
        .bind(order_id)
        .bind(scope.tenant_id())
        .bind(to.as_str())
        .bind(from.as_str())
        .fetch_optional(&self.pool)
        .await
    }

    /// Cancel an order, but only while it has not progressed past
    /// `confirmed`. The status predicate enforces the rule in the same
    /// statement that applies it, so a racing fulfillment update can never
    /// slip a cancellation through.
    pub async fn cancel(
        &self,
        scope: &TenantScope,
        order_id: Uuid,
    ) -> Result<Option<Order>, sqlx::Error> {
        sqlx::query_as::<_, Order>(
            r#"
            UPDATE orders
            SET status = 'cancelled', updated_at = NOW()
            WHERE id = $1 AND tenant_id = $2 AND status IN ('pending', 'confirmed')
            RETURNING id, tenant_id, customer_id, order_number, status, payment_status,
                      subtotal_cents, tax_cents, shipping_cents, discount_cents, total_cents,
                      shipping_address, billing_address, currency, created_at, updated_at
            "#,
        )
        .bind(order_id)
        .bind(scope.tenant_id())
        .fetch_optional(&self.pool)
        .await
    }
}
