use std::{
    collections::{BTreeMap, BTreeSet},
    fs,
    path::Path,
    sync::Arc,
};

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

use crate::{
    autobind::{AllocationError, AutobindSelector, PoolCandidateFilter},
    config::Config,
    enforcer::{CallerType, Enforcer, ValidationResult},
    policy::InMemoryProductCatalog,
    types::{ComplianceStatus, Consumer, Pool, PoolId, PoolQuantity, Product, ProductId},
};

/// Requested grant in a `validate` scenario.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioRequest {
    pub pool_id: PoolId,
    pub quantity: u32,
}

/// Self-contained input for one selector or enforcer run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    pub consumer: Consumer,
    #[serde(default)]
    pub installed_products: Vec<ProductId>,
    #[serde(default)]
    pub pools: Vec<Pool>,
    #[serde(default)]
    pub products: Vec<Product>,
    #[serde(default)]
    pub compliance: ComplianceStatus,
    #[serde(default)]
    pub service_level_override: Option<String>,
    #[serde(default)]
    pub exempt_levels: BTreeSet<String>,
    #[serde(default)]
    pub requests: Vec<ScenarioRequest>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SelectOutcome {
    Selected { pools: Vec<PoolQuantity> },
    Failed { error: AllocationError },
}

#[derive(Debug, Serialize)]
pub struct RequestOutcome {
    pub pool_id: PoolId,
    pub quantity: u32,
    pub successful: bool,
    pub result: ValidationResult,
}

impl Scenario {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read scenario {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("failed to parse scenario {}", path.display()))
    }

    pub fn select(&self, config: &Config) -> SelectOutcome {
        let catalog = Arc::new(InMemoryProductCatalog::new(self.products.iter().cloned()));
        let filter = PoolCandidateFilter::new(catalog)
            .with_content_limit(config.autobind.v1_content_limit);
        let selector = AutobindSelector::new(filter, config.policy.build_evaluator());

        match selector.select_best_pools(
            &self.consumer,
            &self.installed_products,
            &self.pools,
            &self.compliance,
            self.service_level_override.as_deref(),
            &self.exempt_levels,
        ) {
            Ok(pools) => SelectOutcome::Selected { pools },
            Err(error) => SelectOutcome::Failed { error },
        }
    }

    pub fn validate(&self, config: &Config, caller: CallerType) -> Result<Vec<RequestOutcome>> {
        let pools: BTreeMap<&str, &Pool> = self
            .pools
            .iter()
            .map(|pool| (pool.id.as_str(), pool))
            .collect();
        let enforcer = Enforcer::new(config.policy.build_evaluator());

        self.requests
            .iter()
            .map(|request| {
                let pool = pools.get(request.pool_id.as_str()).ok_or_else(|| {
                    anyhow!("scenario requests unknown pool '{}'", request.pool_id)
                })?;
                let result =
                    enforcer.pre_entitlement(&self.consumer, pool, request.quantity, caller);
                Ok(RequestOutcome {
                    pool_id: request.pool_id.clone(),
                    quantity: request.quantity,
                    successful: result.is_successful(),
                    result,
                })
            })
            .collect()
    }
}
