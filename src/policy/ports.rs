use crate::{
    policy::{
        error::{PolicyFault, PoolManagerError},
        types::{PolicyArgs, PolicyOutput, PostEntitlementDirective},
    },
    types::{Consumer, Product},
};

/// Pluggable business policy. Must answer `NotConfigured` for operations it does not
/// define, never an empty result.
pub trait PolicyEvaluator: Send + Sync {
    fn invoke(&self, operation: &str, args: &PolicyArgs) -> Result<PolicyOutput, PolicyFault>;
}

/// Read-only product lookup. Shared implementations synchronize internally.
pub trait ProductCatalog: Send + Sync {
    fn product_by_id(&self, product_id: &str) -> Option<Product>;
}

/// Applies post-entitlement bookkeeping on behalf of the enforcer.
pub trait PoolManager: Send + Sync {
    fn apply_directive(
        &self,
        consumer: &Consumer,
        directive: &PostEntitlementDirective,
    ) -> Result<(), PoolManagerError>;
}
