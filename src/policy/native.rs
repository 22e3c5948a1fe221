use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::{
    policy::{
        error::PolicyFault,
        ports::PolicyEvaluator,
        projection::{ReadOnlyConsumer, ReadOnlyPool},
        types::{
            POST_ENTITLEMENT, PolicyArgs, PolicyOutput, PoolSelection, PostEntitlementArgs,
            PostEntitlementDirective, SELECT_POOLS, SelectPoolsArgs,
        },
    },
    types::{UNLIMITED_QUANTITY, attributes, facts},
};

fn default_skip_covered_products() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativePolicyConfig {
    #[serde(default = "default_skip_covered_products")]
    pub skip_covered_products: bool,
}

impl Default for NativePolicyConfig {
    fn default() -> Self {
        Self {
            skip_covered_products: default_skip_covered_products(),
        }
    }
}

/// In-process policy covering `select_pools` and `post_entitlement`.
#[derive(Debug, Clone, Default)]
pub struct NativePolicy {
    config: NativePolicyConfig,
}

impl NativePolicy {
    pub fn new(config: NativePolicyConfig) -> Self {
        Self { config }
    }

    fn select_pools(&self, args: &SelectPoolsArgs) -> Vec<PoolSelection> {
        let mut uncovered: Vec<&str> = Vec::new();
        for product in &args.products {
            let id = product.id.as_str();
            if self.config.skip_covered_products && args.compliance.is_covered(id) {
                continue;
            }
            if !uncovered.contains(&id) {
                uncovered.push(id);
            }
        }
        if uncovered.is_empty() {
            args.log
                .debug("all installed products are already covered; nothing to select");
            return Vec::new();
        }

        let is_exempt = |level: &str| {
            args.exempt_levels
                .iter()
                .chain(args.compliance.exempt_service_levels.iter())
                .any(|exempt| exempt.eq_ignore_ascii_case(level))
        };

        let candidates: Vec<(usize, &ReadOnlyPool)> = args
            .pools
            .iter()
            .enumerate()
            .filter(|(_, pool)| service_level_matches(&args.consumer, pool, &is_exempt))
            .filter(|(_, pool)| {
                architecture_matches(&args.consumer, pool, &args.attribute_separator)
            })
            .filter(|(_, pool)| pool.available() != Some(0))
            .collect();

        let mut used: BTreeSet<&str> = BTreeSet::new();
        let mut selections = Vec::new();

        while !uncovered.is_empty() {
            let best = candidates
                .iter()
                .filter(|(_, pool)| !used.contains(pool.id.as_str()))
                .map(|(index, pool)| {
                    let coverage = uncovered.iter().filter(|id| pool.provides(id)).count();
                    (coverage, *index, *pool)
                })
                .filter(|(coverage, _, _)| *coverage > 0)
                .min_by(|lhs, rhs| {
                    rhs.0
                        .cmp(&lhs.0)
                        .then(lhs.2.end_date.cmp(&rhs.2.end_date))
                        .then(lhs.1.cmp(&rhs.1))
                });

            let Some((_, _, pool)) = best else {
                break;
            };

            used.insert(pool.id.as_str());
            uncovered.retain(|id| !pool.provides(id));
            let quantity = quantity_for(&args.consumer, pool);
            args.log.debug(&format!(
                "selected pool '{}' with quantity {}",
                pool.id, quantity
            ));
            selections.push(PoolSelection {
                pool_id: pool.id.clone(),
                quantity,
            });
        }

        if !uncovered.is_empty() {
            args.log.info(&format!(
                "no eligible pool provides products: {}",
                uncovered.join(", ")
            ));
        }

        selections
    }

    fn post_entitlement(&self, args: &PostEntitlementArgs) -> Vec<PostEntitlementDirective> {
        let mut directives = Vec::new();
        let mut stacked: BTreeMap<&str, i64> = BTreeMap::new();

        for entitlement in args.entitlements.values() {
            let pool = &entitlement.pool;
            let quantity = i64::from(entitlement.quantity);

            if let Some(stack_id) = pool.product_attribute(attributes::STACKING_ID) {
                let total = stacked.entry(stack_id).or_default();
                *total = total.saturating_add(quantity);
            }

            if args.consumer.is_manifest() || is_derived(pool) {
                continue;
            }
            let Some(virt_limit) = pool
                .attribute(attributes::VIRT_LIMIT)
                .or_else(|| pool.product_attribute(attributes::VIRT_LIMIT))
            else {
                continue;
            };

            let bonus_quantity = if virt_limit.eq_ignore_ascii_case("unlimited") {
                Some(UNLIMITED_QUANTITY)
            } else {
                virt_limit
                    .parse::<i64>()
                    .ok()
                    .filter(|limit| *limit > 0)
                    .map(|limit| limit.saturating_mul(quantity))
            };

            match bonus_quantity {
                Some(bonus_quantity) => directives.push(PostEntitlementDirective::CreateBonusPool {
                    source_pool_id: pool.id.clone(),
                    quantity: bonus_quantity,
                }),
                None => args.log.warn(&format!(
                    "pool '{}' has unusable virt_limit '{}'",
                    pool.id, virt_limit
                )),
            }
        }

        for (stack_id, quantity) in stacked {
            if let Some(sub_pool) = args.sub_pools_for_stack_ids.get(stack_id) {
                directives.push(PostEntitlementDirective::UpdateSubPoolQuantity {
                    stack_id: stack_id.to_string(),
                    pool_id: sub_pool.id.clone(),
                    quantity,
                });
            }
        }

        directives
    }
}

impl PolicyEvaluator for NativePolicy {
    fn invoke(&self, operation: &str, args: &PolicyArgs) -> Result<PolicyOutput, PolicyFault> {
        match (operation, args) {
            (SELECT_POOLS, PolicyArgs::SelectPools(args)) => Ok(PolicyOutput::Selection {
                selections: Some(self.select_pools(args)),
            }),
            (POST_ENTITLEMENT, PolicyArgs::PostEntitlement(args)) => {
                Ok(PolicyOutput::Directives {
                    directives: self.post_entitlement(args),
                })
            }
            (SELECT_POOLS | POST_ENTITLEMENT, _) => Err(PolicyFault::unsupported_arguments(
                operation,
                "argument snapshot belongs to a different operation",
            )),
            _ => Ok(PolicyOutput::NotConfigured),
        }
    }
}

fn is_derived(pool: &ReadOnlyPool) -> bool {
    pool.attribute(attributes::DERIVED_POOL)
        .is_some_and(|value| value.eq_ignore_ascii_case("true"))
}

fn service_level_matches(
    consumer: &ReadOnlyConsumer,
    pool: &ReadOnlyPool,
    is_exempt: &impl Fn(&str) -> bool,
) -> bool {
    let wanted = consumer.service_level.trim();
    if wanted.is_empty() || is_exempt(wanted) {
        return true;
    }
    match pool.product_attribute(attributes::SUPPORT_LEVEL) {
        Some(offered) => offered.eq_ignore_ascii_case(wanted) || is_exempt(offered),
        None => false,
    }
}

fn architecture_matches(
    consumer: &ReadOnlyConsumer,
    pool: &ReadOnlyPool,
    separator: &str,
) -> bool {
    let Some(supported) = pool.product_attribute(attributes::ARCH) else {
        return true;
    };
    let Some(arch) = consumer.fact(facts::ARCHITECTURE).map(str::trim) else {
        return true;
    };

    supported
        .split(separator)
        .map(str::trim)
        .any(|candidate| {
            candidate.eq_ignore_ascii_case("ALL") || candidate.eq_ignore_ascii_case(arch)
        })
}

fn quantity_for(consumer: &ReadOnlyConsumer, pool: &ReadOnlyPool) -> i64 {
    let stackable = pool.product_attribute(attributes::STACKING_ID).is_some();
    let sockets_per_entitlement = pool
        .product_attribute(attributes::SOCKETS)
        .and_then(|value| value.parse::<i64>().ok())
        .filter(|sockets| *sockets > 0);
    let consumer_sockets = consumer
        .fact(facts::CPU_SOCKETS)
        .and_then(|value| value.trim().parse::<i64>().ok())
        .filter(|sockets| *sockets > 0);

    let needed = match (stackable, sockets_per_entitlement, consumer_sockets) {
        (true, Some(per_entitlement), Some(sockets)) => {
            sockets / per_entitlement + i64::from(sockets % per_entitlement != 0)
        }
        _ => 1,
    };

    match pool.available() {
        Some(available) => needed.min(available).max(1),
        None => needed,
    }
}
