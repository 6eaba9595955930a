use tracing::{debug, info};
use uuid::Uuid;

use crate::auth::AuthenticatedUser;
use crate::orders::engine::OrderTransactionEngine;
use crate::orders::models::{
    CreateOrderRequest, OrderListResponse, OrderResponse, OrderStatus, UpdateStatusRequest,
};
use crate::orders::repository::{OrderListParams, OrdersRepository};
use crate::orders::{OrderError, StatusMachine};
use crate::tenants::{
    AuthorizationGuard, MembershipsRepository, TenantRole, TenantScope, TenantsRepository,
};

const DEFAULT_PAGE_SIZE: i64 = 20;
const MAX_PAGE_SIZE: i64 = 100;

/// Roles allowed to create and read orders.
const STAFF_ROLES: &[TenantRole] = &[TenantRole::Owner, TenantRole::Admin, TenantRole::Member];
/// Roles allowed to drive status transitions.
const MANAGER_ROLES: &[TenantRole] = &[TenantRole::Owner, TenantRole::Admin];

/// Raw, unvalidated listing filters as they arrive from the query string.
#[derive(Debug, Clone, Default, serde::Deserialize, utoipa::IntoParams)]
pub struct OrderListQuery {
    pub status: Option<String>,
    pub customer_id: Option<Uuid>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// Orchestrates order operations: resolves the tenant, authorizes the
/// caller into a [`TenantScope`], then delegates to the engine or the
/// repository. Handlers never touch the data layer directly.
#[derive(Clone)]
pub struct OrderService {
    tenants: TenantsRepository,
    memberships: MembershipsRepository,
    engine: OrderTransactionEngine,
    orders: OrdersRepository,
}

impl OrderService {
    pub fn new(
        tenants: TenantsRepository,
        memberships: MembershipsRepository,
        engine: OrderTransactionEngine,
        orders: OrdersRepository,
    ) -> Self {
        Self {
            tenants,
            memberships,
            engine,
            orders,
        }
    }

    /// Resolve the tenant by slug and authorize the caller, yielding the
    /// scope every downstream query is keyed by.
    async fn scope_for(
        &self,
        slug: &str,
        caller: Option<&AuthenticatedUser>,
        accepted: &[TenantRole],
    ) -> Result<TenantScope, OrderError> {
        let tenant = self.tenants.resolve(slug).await?;
        let membership = match caller {
            Some(user) => {
                self.memberships
                    .resolve_membership(tenant.id, user.user_id)
                    .await?
            }
            None => None,
        };
        let scope = AuthorizationGuard::authorize(&tenant, caller, membership, accepted)?;
        Ok(scope)
    }

    pub async fn create_order(
        &self,
        slug: &str,
        caller: Option<&AuthenticatedUser>,
        request: &CreateOrderRequest,
    ) -> Result<OrderResponse, OrderError> {
        let scope = self.scope_for(slug, caller, STAFF_ROLES).await?;
        let (order, items) = self.engine.create_order(&scope, request).await?;
        Ok(OrderResponse::from_parts(order, items))
    }

    pub async fn get_order(
        &self,
        slug: &str,
        caller: Option<&AuthenticatedUser>,
        order_id: Uuid,
    ) -> Result<OrderResponse, OrderError> {
        let scope = self.scope_for(slug, caller, STAFF_ROLES).await?;
        let order = self
            .orders
            .find_by_id(&scope, order_id)
            .await?
            .ok_or(OrderError::NotFound)?;
        let items = self.orders.items_for(order.id).await?;
        Ok(OrderResponse::from_parts(order, items))
    }

    pub async fn list_orders(
        &self,
        slug: &str,
        caller: Option<&AuthenticatedUser>,
        query: &OrderListQuery,
    ) -> Result<OrderListResponse, OrderError> {
        let scope = self.scope_for(slug, caller, STAFF_ROLES).await?;

        let status = match &query.status {
            Some(raw) => Some(OrderStatus::from_str(raw).map_err(OrderError::ValidationError)?),
            None => None,
        };
        let page = query.page.unwrap_or(1).max(1);
        let limit = query
            .limit
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE);
        let params = OrderListParams {
            status,
            customer_id: query.customer_id,
            limit,
            offset: (page - 1) * limit,
        };

        let total = self.orders.count(&scope, &params).await?;
        let orders = self.orders.list(&scope, &params).await?;
        let total_pages = (total + limit - 1) / limit;

        debug!(
            "Listed {} of {} orders for tenant {} (page {})",
            orders.len(),
            total,
            scope.tenant_id(),
            page
        );
        Ok(OrderListResponse {
            orders,
            total,
            page,
            limit,
            total_pages,
        })
    }

    /// Apply a status transition.
    ///
    /// Validation and application both re-check the current status: the
    /// state machine decides whether the move is legal, and the repository
    /// applies it with a compare-and-set (cancellation carries its
    /// from-status condition inside the statement itself). A request that
    /// names the order's current status is a no-op success.
    pub async fn update_status(
        &self,
        slug: &str,
        caller: Option<&AuthenticatedUser>,
        order_id: Uuid,
        request: &UpdateStatusRequest,
    ) -> Result<OrderResponse, OrderError> {
        let scope = self.scope_for(slug, caller, MANAGER_ROLES).await?;
        let order = self
            .orders
            .find_by_id(&scope, order_id)
            .await?
            .ok_or(OrderError::NotFound)?;
        let target = request.status;

        if order.status == target {
            let items = self.orders.items_for(order.id).await?;
            return Ok(OrderResponse::from_parts(order, items));
        }

        let updated = if target == OrderStatus::Cancelled {
            if !StatusMachine::is_valid_transition(order.status, target) {
                return Err(OrderError::InvalidTransition(format!(
                    "Invalid status transition from {} to {}",
                    order.status, target
                )));
            }
            // Zero rows here means a concurrent update advanced the order
            // past the cancellable window after we read it.
            self.orders
                .cancel(&scope, order.id)
                .await?
                .ok_or(OrderError::TransactionConflict)?
        } else {
            let to = StatusMachine::transition(order.status, target)
                .map_err(OrderError::InvalidTransition)?;
            self.orders
                .update_status(&scope, order.id, order.status, to)
                .await?
                .ok_or(OrderError::TransactionConflict)?
        };

        info!(
            "Order {} moved from {} to {} in tenant {}",
            updated.id,
            order.status,
            updated.status,
            scope.tenant_id()
        );
        let items = self.orders.items_for(updated.id).await?;
        Ok(OrderResponse::from_parts(updated, items))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_size_defaults_and_clamps() {
        let query = OrderListQuery::default();
        assert_eq!(query.limit.unwrap_or(DEFAULT_PAGE_SIZE), 20);
        assert_eq!(500i64.clamp(1, MAX_PAGE_SIZE), 100);
        assert_eq!(0i64.clamp(1, MAX_PAGE_SIZE), 1);
    }

    #[test]
    fn test_total_pages_is_ceiling() {
        let pages = |total: i64, limit: i64| (total + limit - 1) / limit;
        assert_eq!(pages(0, 20), 0);
        assert_eq!(pages(1, 20), 1);
        assert_eq!(pages(20, 20), 1);
        assert_eq!(pages(21, 20), 2);
    }
}
