// The order transaction engine
// Converts an open cart into an immutable, monotonically-numbered order
// inside a single database transaction.

use chrono::Utc;
use sqlx::types::Json;
use sqlx::PgPool;
use tracing::{debug, info};

use crate::carts::{CartStatus, CartsRepository};
use crate::discounts::{DiscountEvaluator, DiscountsRepository};
use crate::orders::{CreateOrderRequest, Order, OrderError, OrderItem};
use crate::tenants::TenantScope;

/// Tax charged on every order, as a percentage of the subtotal.
pub const TAX_RATE_PERCENT: i64 = 18;

/// Flat shipping charge in minor units. Rate selection belongs to an
/// external collaborator; this engine only records the policy value.
pub const SHIPPING_FLAT_CENTS: i64 = 0;

/// Tax on a subtotal, rounded half-up in minor units.
pub fn tax_for(subtotal_cents: i64) -> i64 {
    (subtotal_cents * TAX_RATE_PERCENT + 50) / 100
}

/// `total = max(0, subtotal + tax + shipping - discount)`
pub fn total_for(subtotal_cents: i64, tax_cents: i64, shipping_cents: i64, discount_cents: i64) -> i64 {
    (subtotal_cents + tax_cents + shipping_cents - discount_cents).max(0)
}

/// Engine that converts carts into orders atomically.
#[derive(Clone)]
pub struct OrderTransactionEngine {
    pool: PgPool,
}

impl OrderTransactionEngine {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create an order from an open cart.
    ///
    /// Everything runs inside one transaction: cart load (row-locked),
    /// amount computation, discount evaluation and usage increment (both
    /// under the discount's row lock), order-number assignment from the
    /// tenant's counter, order + item inserts, and the cart's transition to
    /// `converted`. Any failure rolls back every step; there is no state in
    /// which a partially-created order or a wrongly-converted cart
    /// survives.
    ///
    /// Order items snapshot the cart's unit prices at this instant; later
    /// product price changes never alter a placed order.
    pub async fn create_order(
        &self,
        scope: &TenantScope,
        request: &CreateOrderRequest,
    ) -> Result<(Order, Vec<OrderItem>), OrderError> {
        let mut tx = self.pool.begin().await?;

        // 1. Cart, locked for this tenant.
        let cart = CartsRepository::find_for_update(&mut tx, scope, request.cart_id)
            .await?
            .ok_or(OrderError::CartNotFound)?;
        if cart.status != CartStatus::Open {
            return Err(OrderError::CartAlreadyConverted);
        }

        let cart_items = CartsRepository::items(&mut tx, cart.id).await?;
        if cart_items.is_empty() {
            return Err(OrderError::CartEmpty);
        }

        // 2. Subtotal from the snapshotted unit prices.
        let subtotal_cents: i64 = cart_items
            .iter()
            .map(|item| item.unit_price_cents * i64::from(item.quantity))
            .sum();

        // 3. Discount, fail-open: an unknown, inapplicable or just-exhausted
        // code degrades to no discount rather than failing the order.
        let discount_cents = match &request.discount_code {
            Some(code) => {
                self.consume_discount(&mut tx, scope, code, subtotal_cents)
                    .await?
            }
            None => 0,
        };

        // 4. Tax, shipping and total.
        let (tax_cents, shipping_cents, total_cents) =
            compute_amounts(subtotal_cents, discount_cents);

        // 5. Order number from the tenant's counter. The row lock taken by
        // this UPDATE serializes concurrent order creation per tenant, so
        // two transactions can never observe the same "next" number,
        // independent of the configured isolation level.
        let order_number: i64 = sqlx::query_scalar(
            r#"
            UPDATE tenants
            SET next_order_number = next_order_number + 1
            WHERE id = $1
            RETURNING next_order_number
            "#,
        )
        .bind(scope.tenant_id())
        .fetch_one(&mut *tx)
        .await?;

        // 6. Insert the order.
        let billing_address = request
            .billing_address
            .clone()
            .unwrap_or_else(|| request.shipping_address.clone());

        let order = sqlx::query_as::<_, Order>(
            r#"
            INSERT INTO orders (
                tenant_id, customer_id, order_number, status, payment_status,
                subtotal_cents, tax_cents, shipping_cents, discount_cents, total_cents,
                shipping_address, billing_address, currency
            )
            VALUES ($1, $2, $3, 'pending', 'pending', $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING id, tenant_id, customer_id, order_number, status, payment_status,
                      subtotal_cents, tax_cents, shipping_cents, discount_cents, total_cents,
                      shipping_address, billing_address, currency, created_at, updated_at
            "#,
        )
        .bind(scope.tenant_id())
        .bind(request.customer_id)
        .bind(order_number)
        .bind(subtotal_cents)
        .bind(tax_cents)
        .bind(shipping_cents)
        .bind(discount_cents)
        .bind(total_cents)
        .bind(Json(request.shipping_address.clone()))
        .bind(Json(billing_address))
        .bind(&cart.currency)
        .fetch_one(&mut *tx)
        .await?;

        // 7. Snapshot the cart lines as immutable order items.
        let mut order_items = Vec::with_capacity(cart_items.len());
        for cart_item in &cart_items {
            let total_price_cents = cart_item.unit_price_cents * i64::from(cart_item.quantity);
            let order_item = sqlx::query_as::<_, OrderItem>(
                r#"
                INSERT INTO order_items (
                    order_id, product_id, variant_id, quantity,
                    unit_price_cents, total_price_cents
                )
                VALUES ($1, $2, $3, $4, $5, $6)
                RETURNING id, order_id, product_id, variant_id, quantity,
                          unit_price_cents, total_price_cents
                "#,
            )
            .bind(order.id)
            .bind(cart_item.product_id)
            .bind(cart_item.variant_id)
            .bind(cart_item.quantity)
            .bind(cart_item.unit_price_cents)
            .bind(total_price_cents)
            .fetch_one(&mut *tx)
            .await?;
            order_items.push(order_item);
        }

        // 8. Convert the cart. Zero rows means it was converted or abandoned
        // by a concurrent request despite the row lock; abort rather than
        // create a second order from the same cart.
        let converted = CartsRepository::mark_converted(&mut tx, scope, cart.id).await?;
        if converted == 0 {
            return Err(OrderError::TransactionConflict);
        }

        tx.commit().await?;

        info!(
            "Created order {} (number {}) for tenant {} from cart {}",
            order.id,
            order.order_number,
            scope.tenant_id(),
            cart.id
        );
        Ok((order, order_items))
    }

    /// Evaluate and consume a discount code inside the transaction.
    ///
    /// Returns the discount amount in minor units, or 0 if the code does
    /// not exist for this tenant, is not applicable, or its last use was
    /// taken by the usage-limit guard.
    async fn consume_discount(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        scope: &TenantScope,
        code: &str,
        subtotal_cents: i64,
    ) -> Result<i64, OrderError> {
        let Some(discount) = DiscountsRepository::find_by_code_for_update(tx, scope, code).await?
        else {
            debug!("Discount code not found for tenant; proceeding without discount");
            return Ok(0);
        };

        let outcome = DiscountEvaluator::evaluate(&discount, Utc::now(), subtotal_cents);
        if !outcome.applicable {
            debug!(
                "Discount {} not applicable; proceeding without discount",
                discount.id
            );
            return Ok(0);
        }

        let updated = DiscountsRepository::increment_usage(tx, discount.id).await?;
        if updated == 0 {
            debug!(
                "Discount {} usage limit reached; proceeding without discount",
                discount.id
            );
            return Ok(0);
        }

        Ok(outcome.amount_cents)
    }
}

/// Tax, shipping and total for a subtotal and an applied discount. The
/// engine and its tests share this so the amount invariant lives in one
/// place.
pub fn compute_amounts(subtotal_cents: i64, discount_cents: i64) -> (i64, i64, i64) {
    let tax_cents = tax_for(subtotal_cents);
    let shipping_cents = SHIPPING_FLAT_CENTS;
    let total_cents = total_for(subtotal_cents, tax_cents, shipping_cents, discount_cents);
    (tax_cents, shipping_cents, total_cents)
}
