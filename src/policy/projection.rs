use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use time::OffsetDateTime;

use crate::types::{
    Consumer, ConsumerId, ConsumerType, Entitlement, EntitlementId, Pool, PoolId, ProductId,
    UNLIMITED_QUANTITY,
};

/// Immutable consumer view handed to policy code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReadOnlyConsumer {
    pub id: ConsumerId,
    #[serde(rename = "type")]
    pub consumer_type: ConsumerType,
    pub facts: BTreeMap<String, String>,
    pub capabilities: BTreeSet<String>,
    /// Effective level: the caller's override when given, else the consumer's own.
    pub service_level: String,
}

impl ReadOnlyConsumer {
    pub fn new(consumer: &Consumer, service_level_override: Option<&str>) -> Self {
        let service_level = service_level_override
            .map(str::trim)
            .filter(|level| !level.is_empty())
            .or(consumer.service_level.as_deref())
            .unwrap_or_default()
            .to_string();

        Self {
            id: consumer.id.clone(),
            consumer_type: consumer.consumer_type,
            facts: consumer.facts.clone(),
            capabilities: consumer.capabilities.clone(),
            service_level,
        }
    }

    pub fn fact(&self, name: &str) -> Option<&str> {
        self.facts.get(name).map(String::as_str)
    }

    pub fn is_manifest(&self) -> bool {
        self.consumer_type.is_manifest()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReadOnlyPool {
    pub id: PoolId,
    pub product_id: ProductId,
    pub derived_product_id: Option<ProductId>,
    pub quantity: i64,
    pub consumed: i64,
    pub attributes: BTreeMap<String, String>,
    pub product_attributes: BTreeMap<String, String>,
    pub provided_product_ids: Vec<ProductId>,
    #[serde(with = "time::serde::rfc3339")]
    pub start_date: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub end_date: OffsetDateTime,
}

impl ReadOnlyPool {
    pub fn from_pools<'a>(pools: impl IntoIterator<Item = &'a Pool>) -> Vec<Self> {
        pools.into_iter().map(Self::from).collect()
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .get(name)
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
    }

    pub fn product_attribute(&self, name: &str) -> Option<&str> {
        self.product_attributes
            .get(name)
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
    }

    pub fn provides(&self, product_id: &str) -> bool {
        self.product_id == product_id || self.provided_product_ids.iter().any(|id| id == product_id)
    }

    pub fn available(&self) -> Option<i64> {
        if self.quantity == UNLIMITED_QUANTITY {
            return None;
        }
        Some(self.quantity.saturating_sub(self.consumed).max(0))
    }
}

impl From<&Pool> for ReadOnlyPool {
    fn from(pool: &Pool) -> Self {
        Self {
            id: pool.id.clone(),
            product_id: pool.product_id.clone(),
            derived_product_id: pool.derived_product_id.clone(),
            quantity: pool.quantity,
            consumed: pool.consumed,
            attributes: pool.attributes.clone(),
            product_attributes: pool.product_attributes.clone(),
            provided_product_ids: pool.provided_product_ids().map(str::to_string).collect(),
            start_date: pool.start_date,
            end_date: pool.end_date,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReadOnlyProduct {
    pub id: ProductId,
    pub name: String,
    pub attributes: BTreeMap<String, String>,
}

impl ReadOnlyProduct {
    /// ID-only stand-in; selection policies only ever read the id.
    pub fn placeholder(product_id: &str) -> Self {
        Self {
            id: product_id.to_string(),
            name: product_id.to_string(),
            attributes: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReadOnlyEntitlement {
    pub id: EntitlementId,
    pub pool: ReadOnlyPool,
    pub quantity: u32,
}

impl From<&Entitlement> for ReadOnlyEntitlement {
    fn from(entitlement: &Entitlement) -> Self {
        Self {
            id: entitlement.id.clone(),
            pool: ReadOnlyPool::from(&entitlement.pool),
            quantity: entitlement.quantity,
        }
    }
}
