use std::{
    collections::{BTreeMap, BTreeSet},
    sync::Arc,
};

use crate::{
    autobind::{
        error::{AllocationError, invalid_policy_output, no_eligible_pools, no_selection},
        filter::PoolCandidateFilter,
    },
    policy::{
        PRODUCT_ATTRIBUTE_SEPARATOR, PolicyArgs, PolicyEvaluator, PolicyOutput, PoolSelection,
        ReadOnlyConsumer, ReadOnlyPool, ReadOnlyProduct, RulesLog, SELECT_POOLS, SelectPoolsArgs,
    },
    types::{ComplianceStatus, Consumer, Pool, PoolQuantity},
};

pub struct AutobindSelector {
    filter: PoolCandidateFilter,
    policy: Arc<dyn PolicyEvaluator>,
}

impl AutobindSelector {
    pub fn new(filter: PoolCandidateFilter, policy: Arc<dyn PolicyEvaluator>) -> Self {
        Self { filter, policy }
    }

    /// Picks pools (and quantities) covering the consumer's installed products.
    ///
    /// Fails when no pool survives filtering, when a configured policy selects nothing, or
    /// when the policy faults. Only an unconfigured policy falls back to taking every
    /// filtered pool once.
    pub fn select_best_pools(
        &self,
        consumer: &Consumer,
        product_ids: &[String],
        pools: &[Pool],
        compliance: &ComplianceStatus,
        service_level_override: Option<&str>,
        exempt_levels: &BTreeSet<String>,
    ) -> Result<Vec<PoolQuantity>, AllocationError> {
        let filtered = self.filter.filter(consumer, pools);
        if filtered.is_empty() {
            return Err(no_eligible_pools(format!(
                "no entitlements for products: [{}]",
                product_ids.join(", ")
            )));
        }

        tracing::debug!(
            target: "autobind",
            consumer_id = %consumer.id,
            products = ?product_ids,
            candidates = filtered.len(),
            filtered_for_content = pools.len() - filtered.len(),
            "selecting_best_pools"
        );

        let args = PolicyArgs::SelectPools(SelectPoolsArgs {
            consumer: ReadOnlyConsumer::new(consumer, service_level_override),
            pools: ReadOnlyPool::from_pools(filtered.iter().copied()),
            products: product_ids
                .iter()
                .map(|product_id| ReadOnlyProduct::placeholder(product_id))
                .collect(),
            attribute_separator: PRODUCT_ATTRIBUTE_SEPARATOR.to_string(),
            log: RulesLog,
            compliance: compliance.clone(),
            exempt_levels: exempt_levels.clone(),
        });

        let output = self.policy.invoke(SELECT_POOLS, &args).map_err(|fault| {
            tracing::warn!(
                target: "autobind",
                consumer_id = %consumer.id,
                error = %fault,
                "select_pools_fault"
            );
            AllocationError::policy_fault(fault)
        })?;

        match output {
            PolicyOutput::NotConfigured => {
                tracing::warn!(
                    target: "autobind",
                    operation = SELECT_POOLS,
                    "select_pools_not_configured_using_default"
                );
                Ok(default_selection(&filtered))
            }
            PolicyOutput::Selection { selections } => {
                resolve_selections(product_ids, &filtered, selections)
            }
            PolicyOutput::Directives { .. } => Err(invalid_policy_output(format!(
                "{SELECT_POOLS} returned post-entitlement directives instead of a pool mapping"
            ))),
        }
    }
}

fn default_selection(filtered: &[&Pool]) -> Vec<PoolQuantity> {
    filtered
        .iter()
        .filter_map(|pool| PoolQuantity::new((*pool).clone(), 1))
        .collect()
}

fn resolve_selections(
    product_ids: &[String],
    filtered: &[&Pool],
    selections: Option<Vec<PoolSelection>>,
) -> Result<Vec<PoolQuantity>, AllocationError> {
    let selections = selections
        .filter(|selections| !selections.is_empty())
        .ok_or_else(|| {
            no_selection(format!(
                "rule did not select a pool for products: [{}]",
                product_ids.join(", ")
            ))
        })?;

    let candidates: BTreeMap<&str, &Pool> = filtered
        .iter()
        .map(|pool| (pool.id.as_str(), *pool))
        .collect();
    let mut seen = BTreeSet::new();
    let mut best_pools = Vec::with_capacity(selections.len());

    for selection in selections {
        if !seen.insert(selection.pool_id.clone()) {
            return Err(invalid_policy_output(format!(
                "pool '{}' was selected more than once",
                selection.pool_id
            )));
        }

        let Some(pool) = candidates.get(selection.pool_id.as_str()) else {
            tracing::debug!(
                target: "autobind",
                pool_id = %selection.pool_id,
                "selected_pool_not_a_candidate"
            );
            continue;
        };

        let pool_quantity = u32::try_from(selection.quantity)
            .ok()
            .and_then(|quantity| PoolQuantity::new((*pool).clone(), quantity))
            .ok_or_else(|| {
                invalid_policy_output(format!(
                    "pool '{}' was selected with invalid quantity {}",
                    selection.pool_id, selection.quantity
                ))
            })?;

        tracing::debug!(
            target: "autobind",
            pool_id = %pool.id,
            quantity = pool_quantity.quantity(),
            "best_pool_selected"
        );
        best_pools.push(pool_quantity);
    }

    if best_pools.is_empty() {
        return Err(no_selection(format!(
            "rule selected no candidate pool for products: [{}]",
            product_ids.join(", ")
        )));
    }

    Ok(best_pools)
}
