use uuid::Uuid;

/// Request-scoped tenant isolation boundary.
///
/// A `TenantScope` is the proof that authorization succeeded for one tenant
/// within one request. It can only be constructed by the
/// [`AuthorizationGuard`](crate::tenants::guard::AuthorizationGuard), and
/// every tenant-scoped repository method takes a `&TenantScope`, so data
/// access without an established boundary does not compile. The scope is a
/// plain value owned by the request handler: it is created right after
/// authorization, dropped on every exit path at request end, and is never
/// stored in shared state or read across requests.
#[derive(Debug)]
#[must_use = "a TenantScope that is never used means tenant data was authorized but not accessed"]
pub struct TenantScope {
    tenant_id: Uuid,
}

impl TenantScope {
    /// Crate-private: only the authorization guard creates scopes.
    pub(crate) fn new(tenant_id: Uuid) -> Self {
        Self { tenant_id }
    }

    /// The tenant this request is confined to.
    pub fn tenant_id(&self) -> Uuid {
        self.tenant_id
    }
}
