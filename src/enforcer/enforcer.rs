use std::{collections::BTreeMap, sync::Arc};

use crate::{
    enforcer::{
        error::{EnforcerError, invalid_directive, invalid_policy_output, policy_fault},
        rules::{self, RuleContext},
        severity,
        types::{CallerType, FailedDirective, PostEntitlementReport, ValidationResult},
    },
    policy::{
        POST_ENTITLEMENT, PolicyArgs, PolicyEvaluator, PolicyOutput, PoolManager,
        PostEntitlementArgs, PostEntitlementDirective, ReadOnlyConsumer, ReadOnlyEntitlement,
        ReadOnlyPool, RulesLog,
    },
    types::{Consumer, Entitlement, Pool, PoolId, PoolQuantity, UNLIMITED_QUANTITY},
};

/// Pre- and post-entitlement hooks around a grant.
pub struct Enforcer {
    policy: Arc<dyn PolicyEvaluator>,
}

impl Enforcer {
    pub fn new(policy: Arc<dyn PolicyEvaluator>) -> Self {
        Self { policy }
    }

    /// Runs every rule against one pool/quantity request.
    ///
    /// A rule never prevents another from running, so the result lists every finding at once.
    /// Whether a caller-sensitive finding blocks depends on `caller`.
    pub fn pre_entitlement(
        &self,
        consumer: &Consumer,
        pool: &Pool,
        quantity: u32,
        caller: CallerType,
    ) -> ValidationResult {
        let context = RuleContext {
            consumer,
            pool,
            quantity,
        };
        let result = severity::classify_findings(rules::evaluate(&context), caller);

        tracing::debug!(
            target: "enforcer",
            consumer_id = %consumer.id,
            pool_id = %pool.id,
            quantity,
            caller = %caller,
            errors = result.errors().len(),
            warnings = result.warnings().len(),
            "pre_entitlement_evaluated"
        );
        result
    }

    pub fn pre_entitlement_default(
        &self,
        consumer: &Consumer,
        pool: &Pool,
        quantity: u32,
    ) -> ValidationResult {
        self.pre_entitlement(consumer, pool, quantity, CallerType::default())
    }

    /// Validates several requests; a pool listed twice keeps the merged findings.
    pub fn pre_entitlement_batch(
        &self,
        consumer: &Consumer,
        requests: &[PoolQuantity],
        caller: CallerType,
    ) -> BTreeMap<PoolId, ValidationResult> {
        let mut results: BTreeMap<PoolId, ValidationResult> = BTreeMap::new();
        for request in requests {
            let result =
                self.pre_entitlement(consumer, request.pool(), request.quantity(), caller);
            results
                .entry(request.pool().id.clone())
                .or_default()
                .merge(result);
        }
        results
    }

    /// Listing view: validates each pool for one unit and drops blocked pools unless `show_all`.
    pub fn filter_pools<'a>(
        &self,
        consumer: &Consumer,
        pools: &'a [Pool],
        show_all: bool,
    ) -> Vec<(&'a Pool, ValidationResult)> {
        pools
            .iter()
            .map(|pool| {
                let result = self.pre_entitlement(consumer, pool, 1, CallerType::ListPools);
                (pool, result)
            })
            .filter(|(_, result)| show_all || result.is_successful())
            .collect()
    }

    /// Runs the policy's post-grant hook and applies the directives it returns.
    ///
    /// Nothing is applied unless every directive refers to the granted entitlements or the
    /// supplied stack sub-pools. Faults are reported to the caller; the grant itself is not
    /// rolled back here.
    pub fn post_entitlement(
        &self,
        pool_manager: &dyn PoolManager,
        consumer: &Consumer,
        entitlements: &BTreeMap<String, Entitlement>,
        sub_pools_for_stack_ids: &BTreeMap<String, Pool>,
        success: bool,
        pool_quantities: &BTreeMap<String, PoolQuantity>,
    ) -> Result<PostEntitlementReport, EnforcerError> {
        let args = PolicyArgs::PostEntitlement(PostEntitlementArgs {
            consumer: ReadOnlyConsumer::new(consumer, None),
            entitlements: entitlements
                .iter()
                .map(|(id, entitlement)| (id.clone(), ReadOnlyEntitlement::from(entitlement)))
                .collect(),
            sub_pools_for_stack_ids: sub_pools_for_stack_ids
                .iter()
                .map(|(stack_id, pool)| (stack_id.clone(), ReadOnlyPool::from(pool)))
                .collect(),
            success,
            pool_quantities: pool_quantities
                .iter()
                .map(|(pool_id, pool_quantity)| (pool_id.clone(), pool_quantity.quantity()))
                .collect(),
            log: RulesLog,
        });

        let output = self.policy.invoke(POST_ENTITLEMENT, &args).map_err(|fault| {
            tracing::warn!(
                target: "enforcer",
                consumer_id = %consumer.id,
                error = %fault,
                "post_entitlement_fault"
            );
            policy_fault(format!("{POST_ENTITLEMENT} failed: {fault}"))
        })?;

        let directives = match output {
            PolicyOutput::NotConfigured => {
                tracing::debug!(
                    target: "enforcer",
                    operation = POST_ENTITLEMENT,
                    "post_entitlement_not_configured"
                );
                return Ok(PostEntitlementReport::default());
            }
            PolicyOutput::Directives { directives } => directives,
            PolicyOutput::Selection { .. } => {
                return Err(invalid_policy_output(format!(
                    "{POST_ENTITLEMENT} returned a pool selection instead of directives"
                )));
            }
        };

        for directive in &directives {
            validate_directive(directive, entitlements, sub_pools_for_stack_ids)?;
        }

        let mut report = PostEntitlementReport {
            policy_configured: true,
            ..PostEntitlementReport::default()
        };

        for directive in directives {
            if consumer.is_manifest()
                && matches!(directive, PostEntitlementDirective::CreateBonusPool { .. })
            {
                tracing::debug!(
                    target: "enforcer",
                    consumer_id = %consumer.id,
                    directive = ?directive,
                    "bonus_pool_skipped_for_manifest"
                );
                report.skipped.push(directive);
                continue;
            }

            match pool_manager.apply_directive(consumer, &directive) {
                Ok(()) => report.applied.push(directive),
                Err(error) => {
                    tracing::warn!(
                        target: "enforcer",
                        consumer_id = %consumer.id,
                        directive = ?directive,
                        error = %error,
                        "post_entitlement_directive_failed"
                    );
                    report.failed.push(FailedDirective {
                        directive,
                        error: error.to_string(),
                    });
                }
            }
        }

        tracing::info!(
            target: "enforcer",
            consumer_id = %consumer.id,
            applied = report.applied.len(),
            skipped = report.skipped.len(),
            failed = report.failed.len(),
            "post_entitlement_completed"
        );
        Ok(report)
    }
}

fn validate_directive(
    directive: &PostEntitlementDirective,
    entitlements: &BTreeMap<String, Entitlement>,
    sub_pools_for_stack_ids: &BTreeMap<String, Pool>,
) -> Result<(), EnforcerError> {
    match directive {
        PostEntitlementDirective::UpdateSubPoolQuantity {
            stack_id,
            pool_id,
            quantity,
        } => {
            let sub_pool = sub_pools_for_stack_ids.get(stack_id).ok_or_else(|| {
                invalid_directive(format!("no sub-pool is known for stack '{stack_id}'"))
            })?;
            if sub_pool.id != *pool_id {
                return Err(invalid_directive(format!(
                    "pool '{pool_id}' is not the sub-pool of stack '{stack_id}'"
                )));
            }
            if *quantity < 0 {
                return Err(invalid_directive(format!(
                    "sub-pool '{pool_id}' cannot take negative quantity {quantity}"
                )));
            }
        }
        PostEntitlementDirective::CreateBonusPool {
            source_pool_id,
            quantity,
        } => {
            let granted = entitlements
                .values()
                .any(|entitlement| entitlement.pool.id == *source_pool_id);
            if !granted {
                return Err(invalid_directive(format!(
                    "bonus pool source '{source_pool_id}' is not among the granted entitlements"
                )));
            }
            if *quantity <= 0 && *quantity != UNLIMITED_QUANTITY {
                return Err(invalid_directive(format!(
                    "bonus pool from '{source_pool_id}' has invalid quantity {quantity}"
                )));
            }
        }
    }
    Ok(())
}
