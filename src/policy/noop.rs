use crate::{
    policy::{
        error::{PolicyFault, PoolManagerError},
        ports::{PolicyEvaluator, PoolManager},
        types::{PolicyArgs, PolicyOutput, PostEntitlementDirective},
    },
    types::Consumer,
};

/// Evaluator with no registered operations.
#[derive(Debug, Clone, Default)]
pub struct UnconfiguredPolicy;

impl PolicyEvaluator for UnconfiguredPolicy {
    fn invoke(&self, _operation: &str, _args: &PolicyArgs) -> Result<PolicyOutput, PolicyFault> {
        Ok(PolicyOutput::NotConfigured)
    }
}

#[derive(Debug, Clone, Default)]
pub struct NoopPoolManager;

impl PoolManager for NoopPoolManager {
    fn apply_directive(
        &self,
        _consumer: &Consumer,
        _directive: &PostEntitlementDirective,
    ) -> Result<(), PoolManagerError> {
        Ok(())
    }
}
