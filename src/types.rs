use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

pub type ConsumerId = String;
pub type PoolId = String;
pub type ProductId = String;
pub type EntitlementId = String;

/// Attribute names read from pools and products.
pub mod attributes {
    pub const CORES: &str = "cores";
    pub const RAM: &str = "ram";
    pub const SOCKETS: &str = "sockets";
    pub const INSTANCE_MULTIPLIER: &str = "instance_multiplier";
    pub const VIRT_ONLY: &str = "virt_only";
    pub const PHYSICAL_ONLY: &str = "physical_only";
    pub const DERIVED_POOL: &str = "pool_derived";
    pub const REQUIRES_HOST: &str = "requires_host";
    pub const STACKING_ID: &str = "stacking_id";
    pub const ARCH: &str = "arch";
    pub const SUPPORT_LEVEL: &str = "support_level";
    pub const VIRT_LIMIT: &str = "virt_limit";
}

/// Consumer fact keys.
pub mod facts {
    pub const CERTIFICATE_VERSION: &str = "system.certificate_version";
    pub const CPU_SOCKETS: &str = "cpu.cpu_socket(s)";
    pub const ARCHITECTURE: &str = "uname.machine";
    pub const IS_GUEST: &str = "virt.is_guest";
}

pub const UNLIMITED_QUANTITY: i64 = -1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsumerType {
    Manifest,
    System,
    Hypervisor,
}

impl ConsumerType {
    pub fn is_manifest(self) -> bool {
        matches!(self, Self::Manifest)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Consumer {
    pub id: ConsumerId,
    #[serde(rename = "type")]
    pub consumer_type: ConsumerType,
    #[serde(default)]
    pub facts: BTreeMap<String, String>,
    #[serde(default)]
    pub capabilities: BTreeSet<String>,
    #[serde(default)]
    pub service_level: Option<String>,
}

impl Consumer {
    pub fn new(id: impl Into<String>, consumer_type: ConsumerType) -> Self {
        Self {
            id: id.into(),
            consumer_type,
            facts: BTreeMap::new(),
            capabilities: BTreeSet::new(),
            service_level: None,
        }
    }

    pub fn fact(&self, name: &str) -> Option<&str> {
        self.facts.get(name).map(String::as_str)
    }

    pub fn is_manifest(&self) -> bool {
        self.consumer_type.is_manifest()
    }

    pub fn is_guest(&self) -> bool {
        self.fact(facts::IS_GUEST)
            .is_some_and(|value| value.trim().eq_ignore_ascii_case("true"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
    #[serde(default)]
    pub content: BTreeSet<String>,
}

impl Product {
    pub fn content_count(&self) -> usize {
        self.content.len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvidedProduct {
    pub product_id: ProductId,
    #[serde(default)]
    pub product_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pool {
    pub id: PoolId,
    pub product_id: ProductId,
    #[serde(default)]
    pub derived_product_id: Option<ProductId>,
    pub quantity: i64,
    #[serde(default)]
    pub consumed: i64,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
    #[serde(default)]
    pub product_attributes: BTreeMap<String, String>,
    #[serde(default)]
    pub provided_products: Vec<ProvidedProduct>,
    #[serde(with = "time::serde::rfc3339")]
    pub start_date: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub end_date: OffsetDateTime,
}

impl Pool {
    pub fn is_unlimited(&self) -> bool {
        self.quantity == UNLIMITED_QUANTITY
    }

    /// Remaining capacity, `None` for unlimited pools.
    pub fn available(&self) -> Option<i64> {
        if self.is_unlimited() {
            return None;
        }
        Some(self.quantity.saturating_sub(self.consumed).max(0))
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        non_blank(self.attributes.get(name))
    }

    pub fn product_attribute(&self, name: &str) -> Option<&str> {
        non_blank(self.product_attributes.get(name))
    }

    /// True when the pool or its product sets `name` to "true".
    pub fn flag(&self, name: &str) -> bool {
        is_true(self.attribute(name)) || is_true(self.product_attribute(name))
    }

    pub fn is_virt_only(&self) -> bool {
        self.flag(attributes::VIRT_ONLY)
    }

    pub fn is_physical_only(&self) -> bool {
        self.flag(attributes::PHYSICAL_ONLY)
    }

    pub fn is_derived_pool(&self) -> bool {
        is_true(self.attribute(attributes::DERIVED_POOL))
    }

    pub fn requires_host(&self) -> bool {
        self.attribute(attributes::REQUIRES_HOST).is_some()
    }

    pub fn has_derived_product(&self) -> bool {
        self.derived_product_id
            .as_deref()
            .is_some_and(|id| !id.trim().is_empty())
    }

    pub fn stacking_id(&self) -> Option<&str> {
        self.product_attribute(attributes::STACKING_ID)
    }

    pub fn provided_product_ids(&self) -> impl Iterator<Item = &str> {
        self.provided_products
            .iter()
            .map(|provided| provided.product_id.as_str())
    }

    pub fn provides(&self, product_id: &str) -> bool {
        self.product_id == product_id || self.provided_product_ids().any(|id| id == product_id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoverageState {
    Covered,
    Partial,
    Uncovered,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ComplianceStatus {
    #[serde(default)]
    pub products: BTreeMap<ProductId, CoverageState>,
    #[serde(default)]
    pub exempt_service_levels: BTreeSet<String>,
}

impl ComplianceStatus {
    pub fn coverage(&self, product_id: &str) -> CoverageState {
        self.products
            .get(product_id)
            .copied()
            .unwrap_or(CoverageState::Uncovered)
    }

    pub fn is_covered(&self, product_id: &str) -> bool {
        self.coverage(product_id) == CoverageState::Covered
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entitlement {
    pub id: EntitlementId,
    pub consumer_id: ConsumerId,
    pub pool: Pool,
    pub quantity: u32,
}

/// A pool paired with the quantity to draw from it. Quantity is always positive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PoolQuantity {
    pool: Pool,
    quantity: u32,
}

impl PoolQuantity {
    pub fn new(pool: Pool, quantity: u32) -> Option<Self> {
        (quantity > 0).then_some(Self { pool, quantity })
    }

    pub fn pool(&self) -> &Pool {
        &self.pool
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }
}

fn non_blank(value: Option<&String>) -> Option<&str> {
    value.map(|text| text.trim()).filter(|text| !text.is_empty())
}

fn is_true(value: Option<&str>) -> bool {
    value.is_some_and(|text| text.eq_ignore_ascii_case("true") || text == "1")
}
