pub mod catalog;
pub mod error;
pub mod native;
pub mod noop;
pub mod ports;
pub mod projection;
pub mod types;

pub use catalog::InMemoryProductCatalog;
pub use error::{PolicyFault, PoolManagerError};
pub use native::{NativePolicy, NativePolicyConfig};
pub use noop::{NoopPoolManager, UnconfiguredPolicy};
pub use ports::{PolicyEvaluator, PoolManager, ProductCatalog};
pub use projection::{ReadOnlyConsumer, ReadOnlyEntitlement, ReadOnlyPool, ReadOnlyProduct};
pub use types::{
    POST_ENTITLEMENT, PRODUCT_ATTRIBUTE_SEPARATOR, PolicyArgs, PolicyOutput, PoolSelection,
    PostEntitlementArgs, PostEntitlementDirective, RulesLog, SELECT_POOLS, SelectPoolsArgs,
};
