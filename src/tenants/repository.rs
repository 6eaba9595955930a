use sqlx::PgPool;
use uuid::Uuid;

use crate::tenants::{Membership, Tenant, TenantError, TenantRole};

/// Repository for tenant lookups (the TenantResolver)
#[derive(Clone)]
pub struct TenantsRepository {
    pool: PgPool,
}

impl TenantsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Resolve a tenant by its slug. Pure lookup, no side effects.
    pub async fn find_by_slug(&self, slug: &str) -> Result<Option<Tenant>, TenantError> {
        let tenant = sqlx::query_as::<_, Tenant>(
            r#"
            SELECT id, slug, name, owner_user_id, currency, next_order_number, created_at
            FROM tenants
            WHERE slug = $1
            "#,
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;

        Ok(tenant)
    }

    /// Resolve a tenant by slug, mapping absence to `TenantNotFound`.
    pub async fn resolve(&self, slug: &str) -> Result<Tenant, TenantError> {
        self.find_by_slug(slug)
            .await?
            .ok_or_else(|| TenantError::TenantNotFound(slug.to_string()))
    }
}

/// Repository for membership lookups
#[derive(Clone)]
pub struct MembershipsRepository {
    pool: PgPool,
}

impl MembershipsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Resolve the caller's role within a tenant, if any.
    ///
    /// The authorization guard consumes this: `None` means the user has no
    /// membership at all, which is distinct from holding an insufficient role.
    pub async fn resolve_membership(
        &self,
        tenant_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<TenantRole>, TenantError> {
        let membership = sqlx::query_as::<_, Membership>(
            r#"
            SELECT tenant_id, user_id, role, created_at
            FROM memberships
            WHERE tenant_id = $1 AND user_id = $2
            "#,
        )
        .bind(tenant_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(membership.map(|m| m.role))
    }
}
