// Cart data access used inside the order-creation transaction
// All methods take the transaction's connection so they participate in the
// caller's atomic unit, and bind the tenant scope as an explicit predicate.

use sqlx::PgConnection;
use uuid::Uuid;

use crate::carts::{Cart, CartItem};
use crate::tenants::TenantScope;

pub struct CartsRepository;

impl CartsRepository {
    /// Load a cart for this tenant with a row lock.
    ///
    /// The lock serializes concurrent conversions of the same cart; the
    /// tenant predicate means a cart id belonging to another tenant is
    /// indistinguishable from a missing cart.
    pub async fn find_for_update(
        conn: &mut PgConnection,
        scope: &TenantScope,
        cart_id: Uuid,
    ) -> Result<Option<Cart>, sqlx::Error> {
        sqlx::query_as::<_, Cart>(
            r#"
            SELECT id, tenant_id, currency, status, created_at, updated_at
            FROM carts
            WHERE id = $1 AND tenant_id = $2
            FOR UPDATE
            "#,
        )
        .bind(cart_id)
        .bind(scope.tenant_id())
        .fetch_optional(conn)
        .await
    }

    /// Load the cart's items in insertion order.
    pub async fn items(
        conn: &mut PgConnection,
        cart_id: Uuid,
    ) -> Result<Vec<CartItem>, sqlx::Error> {
        sqlx::query_as::<_, CartItem>(
            r#"
            SELECT id, cart_id, product_id, variant_id, quantity, unit_price_cents
            FROM cart_items
            WHERE cart_id = $1
            ORDER BY created_at, id
            "#,
        )
        .bind(cart_id)
        .fetch_all(conn)
        .await
    }

    /// Flip an open cart to `converted`.
    ///
    /// The update is conditioned on the current status; returns the number
    /// of rows affected so the caller can detect a cart that was converted
    /// or abandoned under its feet and abort the transaction.
    pub async fn mark_converted(
        conn: &mut PgConnection,
        scope: &TenantScope,
        cart_id: Uuid,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE carts
            SET status = 'converted', updated_at = NOW()
            WHERE id = $1 AND tenant_id = $2 AND status = 'open'
            "#,
        )
        .bind(cart_id)
        .bind(scope.tenant_id())
        .execute(conn)
        .await?;

        Ok(result.rows_affected())
    }
}
