// Role-based authorization gate for tenant-scoped operations
// Runs after tenant resolution and before any tenant data is touched.

use tracing::{debug, error, warn};

use crate::auth::AuthenticatedUser;
use crate::tenants::{Tenant, TenantError, TenantRole, TenantScope};

/// Decides whether a caller may act on a tenant.
///
/// The guard is pure over its inputs: the membership row is resolved by the
/// repository beforehand and passed in, so the decision logic is testable
/// without a database. On success it returns the [`TenantScope`] that all
/// subsequent data access for this request must be bound to.
pub struct AuthorizationGuard;

impl AuthorizationGuard {
    /// Authorize a caller against the accepted role set for an operation.
    ///
    /// # Rules
    /// - No caller identity → `Unauthorized` (401)
    /// - Caller has no membership for this tenant → `Forbidden` (403)
    /// - Caller's role is not in the accepted set → `Forbidden` (403)
    pub fn authorize(
        tenant: &Tenant,
        caller: Option<&AuthenticatedUser>,
        membership: Option<TenantRole>,
        accepted: &[TenantRole],
    ) -> Result<TenantScope, TenantError> {
        let caller = caller.ok_or(TenantError::Unauthorized)?;

        let role = membership.ok_or_else(|| {
            warn!(
                "User {} has no membership in tenant {}",
                caller.user_id, tenant.slug
            );
            TenantError::Forbidden("You are not a member of this store".to_string())
        })?;

        if !accepted.contains(&role) {
            warn!(
                "User {} with role '{}' denied on tenant {} (accepted: {:?})",
                caller.user_id, role, tenant.slug, accepted
            );
            return Err(TenantError::Forbidden(format!(
                "Role '{}' is not permitted to perform this operation",
                role
            )));
        }

        debug!(
            "Authorized user {} with role '{}' on tenant {}",
            caller.user_id, role, tenant.slug
        );
        Ok(TenantScope::new(tenant.id))
    }

    /// Authorize an ownership-specific (danger-zone) operation.
    ///
    /// Ownership is tenant-record truth: in addition to the membership role,
    /// the caller's id must equal `tenant.owner_user_id`. A membership row
    /// claiming `owner` for a different user is a data-integrity bug and is
    /// logged as an invariant violation, never silently reconciled.
    pub fn authorize_owner(
        tenant: &Tenant,
        caller: Option<&AuthenticatedUser>,
        membership: Option<TenantRole>,
    ) -> Result<TenantScope, TenantError> {
        let scope = Self::authorize(tenant, caller, membership, &[TenantRole::Owner])?;

        // authorize() already established caller is Some.
        let caller = caller.ok_or(TenantError::Unauthorized)?;
        if caller.user_id != tenant.owner_user_id {
            error!(
                "Ownership invariant violation: membership says user {} owns tenant {} \
                 but tenant record names {}",
                caller.user_id, tenant.id, tenant.owner_user_id
            );
            return Err(TenantError::Forbidden(
                "Only the store owner may perform this operation".to_string(),
            ));
        }

        Ok(scope)
    }
}
