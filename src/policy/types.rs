use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::{
    policy::projection::{ReadOnlyConsumer, ReadOnlyEntitlement, ReadOnlyPool, ReadOnlyProduct},
    types::{ComplianceStatus, PoolId},
};

pub const SELECT_POOLS: &str = "select_pools";
pub const POST_ENTITLEMENT: &str = "post_entitlement";

/// Separator policies use to split multi-valued product attributes such as `arch`.
pub const PRODUCT_ATTRIBUTE_SEPARATOR: &str = ",";

/// Log sink handed to policy code. Events land under the `rules` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct RulesLog;

impl RulesLog {
    pub fn debug(&self, message: &str) {
        tracing::debug!(target: "rules", message = %message, "policy_log");
    }

    pub fn info(&self, message: &str) {
        tracing::info!(target: "rules", message = %message, "policy_log");
    }

    pub fn warn(&self, message: &str) {
        tracing::warn!(target: "rules", message = %message, "policy_log");
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SelectPoolsArgs {
    pub consumer: ReadOnlyConsumer,
    pub pools: Vec<ReadOnlyPool>,
    pub products: Vec<ReadOnlyProduct>,
    pub attribute_separator: String,
    #[serde(skip)]
    pub log: RulesLog,
    pub compliance: ComplianceStatus,
    pub exempt_levels: BTreeSet<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PostEntitlementArgs {
    pub consumer: ReadOnlyConsumer,
    pub entitlements: BTreeMap<String, ReadOnlyEntitlement>,
    pub sub_pools_for_stack_ids: BTreeMap<String, ReadOnlyPool>,
    pub success: bool,
    pub pool_quantities: BTreeMap<String, u32>,
    #[serde(skip)]
    pub log: RulesLog,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "operation", rename_all = "snake_case")]
pub enum PolicyArgs {
    SelectPools(SelectPoolsArgs),
    PostEntitlement(PostEntitlementArgs),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolSelection {
    pub pool_id: PoolId,
    pub quantity: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PostEntitlementDirective {
    UpdateSubPoolQuantity {
        stack_id: String,
        pool_id: PoolId,
        quantity: i64,
    },
    CreateBonusPool {
        source_pool_id: PoolId,
        quantity: i64,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PolicyOutput {
    /// The operation is not registered with the evaluator.
    NotConfigured,
    /// Ordered pool-to-quantity mapping. `None` means the policy ran but produced nothing.
    Selection { selections: Option<Vec<PoolSelection>> },
    Directives { directives: Vec<PostEntitlementDirective> },
}
