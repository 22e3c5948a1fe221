use crate::types::Consumer;

pub const CORES: &str = "cores";
pub const RAM: &str = "ram";
pub const INSTANCE_MULTIPLIER: &str = "instance_multiplier";
pub const DERIVED_PRODUCT: &str = "derived_product";

#[derive(Debug, Clone, Default)]
pub struct CapabilityChecker;

impl CapabilityChecker {
    /// Exact, case-sensitive membership test against the declared capability set.
    pub fn has_capability(consumer: &Consumer, name: &str) -> bool {
        consumer.capabilities.contains(name)
    }
}
