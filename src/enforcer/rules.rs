use crate::{
    capability::{self, CapabilityChecker},
    policy::PRODUCT_ATTRIBUTE_SEPARATOR,
    types::{Consumer, Pool, attributes, facts},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RuleId {
    CoresCapability,
    RamCapability,
    InstanceCapability,
    DerivedProductCapability,
    ManifestVirtRestriction,
    QuantityAvailable,
    SocketCoverage,
    ArchitectureMismatch,
    VirtOnly,
    PhysicalOnly,
    InstanceQuantityMismatch,
}

impl RuleId {
    /// Key suffix appended to the severity prefix, or `None` for keys that never vary.
    fn key_stem(self) -> Option<&'static str> {
        match self {
            Self::CoresCapability => Some("cores.unsupported.by.consumer"),
            Self::RamCapability => Some("ram.unsupported.by.consumer"),
            Self::InstanceCapability => Some("instance.unsupported.by.consumer"),
            Self::DerivedProductCapability => Some("derivedproduct.unsupported.by.consumer"),
            Self::ManifestVirtRestriction => None,
            Self::QuantityAvailable => Some("no.entitlements.available"),
            Self::SocketCoverage => Some("unsupported.number.of.sockets"),
            Self::ArchitectureMismatch => Some("architecture.mismatch"),
            Self::VirtOnly => Some("virt.only"),
            Self::PhysicalOnly => Some("physical.only"),
            Self::InstanceQuantityMismatch => Some("quantity.mismatch"),
        }
    }

    pub fn resource_key(self, key_prefix: &str) -> String {
        match self.key_stem() {
            Some(stem) => format!("{key_prefix}.{stem}"),
            None => "pool.not.available.to.manifest.consumers".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleFinding {
    pub rule: RuleId,
    pub params: Vec<String>,
}

impl RuleFinding {
    fn new(rule: RuleId, pool: &Pool) -> Self {
        Self {
            rule,
            params: vec![pool.id.clone()],
        }
    }
}

pub struct RuleContext<'a> {
    pub consumer: &'a Consumer,
    pub pool: &'a Pool,
    pub quantity: u32,
}

type Check = fn(&RuleContext<'_>) -> Option<RuleFinding>;

const CATALOG: &[Check] = &[
    check_socket_coverage,
    check_cores_capability,
    check_ram_capability,
    check_instance_capability,
    check_derived_product_capability,
    check_architecture,
    check_virt_only,
    check_physical_only,
    check_instance_quantity,
    check_manifest_virt_restriction,
    check_quantity_available,
];

/// Runs every check; no check can short-circuit another.
pub fn evaluate(context: &RuleContext<'_>) -> Vec<RuleFinding> {
    CATALOG.iter().filter_map(|check| check(context)).collect()
}

fn missing_capability(
    context: &RuleContext<'_>,
    product_attribute: &str,
    capability: &str,
    rule: RuleId,
) -> Option<RuleFinding> {
    let declared = context.pool.product_attribute(product_attribute).is_some();
    (declared && !CapabilityChecker::has_capability(context.consumer, capability))
        .then(|| RuleFinding::new(rule, context.pool))
}

fn check_cores_capability(context: &RuleContext<'_>) -> Option<RuleFinding> {
    missing_capability(
        context,
        attributes::CORES,
        capability::CORES,
        RuleId::CoresCapability,
    )
}

fn check_ram_capability(context: &RuleContext<'_>) -> Option<RuleFinding> {
    missing_capability(context, attributes::RAM, capability::RAM, RuleId::RamCapability)
}

fn check_instance_capability(context: &RuleContext<'_>) -> Option<RuleFinding> {
    missing_capability(
        context,
        attributes::INSTANCE_MULTIPLIER,
        capability::INSTANCE_MULTIPLIER,
        RuleId::InstanceCapability,
    )
}

fn check_derived_product_capability(context: &RuleContext<'_>) -> Option<RuleFinding> {
    (context.pool.has_derived_product()
        && !CapabilityChecker::has_capability(context.consumer, capability::DERIVED_PRODUCT))
    .then(|| RuleFinding::new(RuleId::DerivedProductCapability, context.pool))
}

fn check_manifest_virt_restriction(context: &RuleContext<'_>) -> Option<RuleFinding> {
    let pool = context.pool;
    (context.consumer.is_manifest()
        && pool.is_virt_only()
        && (pool.is_derived_pool() || pool.requires_host()))
    .then(|| RuleFinding::new(RuleId::ManifestVirtRestriction, pool))
}

fn check_quantity_available(context: &RuleContext<'_>) -> Option<RuleFinding> {
    let pool = context.pool;
    if pool.is_unlimited() {
        return None;
    }
    let remaining = pool.quantity.saturating_sub(pool.consumed);
    (i64::from(context.quantity) > remaining).then(|| RuleFinding {
        rule: RuleId::QuantityAvailable,
        params: vec![
            pool.id.clone(),
            context.quantity.to_string(),
            remaining.to_string(),
        ],
    })
}

fn check_socket_coverage(context: &RuleContext<'_>) -> Option<RuleFinding> {
    if context.consumer.is_manifest() {
        return None;
    }
    let pool = context.pool;
    let sockets = parse_positive(pool.product_attribute(attributes::SOCKETS))?;
    let consumer_sockets = parse_positive(context.consumer.fact(facts::CPU_SOCKETS))?;

    let covered = match pool.stacking_id() {
        Some(_) => sockets.saturating_mul(u64::from(context.quantity)),
        None => sockets,
    };
    (consumer_sockets > covered).then(|| RuleFinding {
        rule: RuleId::SocketCoverage,
        params: vec![
            pool.id.clone(),
            consumer_sockets.to_string(),
            covered.to_string(),
        ],
    })
}

fn check_architecture(context: &RuleContext<'_>) -> Option<RuleFinding> {
    if context.consumer.is_manifest() {
        return None;
    }
    let supported = context.pool.product_attribute(attributes::ARCH)?;
    let arch = context.consumer.fact(facts::ARCHITECTURE)?.trim();

    let matches = supported
        .split(PRODUCT_ATTRIBUTE_SEPARATOR)
        .map(str::trim)
        .any(|candidate| {
            candidate.eq_ignore_ascii_case("ALL") || candidate.eq_ignore_ascii_case(arch)
        });
    (!matches).then(|| RuleFinding {
        rule: RuleId::ArchitectureMismatch,
        params: vec![context.pool.id.clone(), arch.to_string()],
    })
}

fn check_virt_only(context: &RuleContext<'_>) -> Option<RuleFinding> {
    let consumer = context.consumer;
    (!consumer.is_manifest() && context.pool.is_virt_only() && !consumer.is_guest())
        .then(|| RuleFinding::new(RuleId::VirtOnly, context.pool))
}

fn check_physical_only(context: &RuleContext<'_>) -> Option<RuleFinding> {
    let consumer = context.consumer;
    (!consumer.is_manifest() && context.pool.is_physical_only() && consumer.is_guest())
        .then(|| RuleFinding::new(RuleId::PhysicalOnly, context.pool))
}

fn check_instance_quantity(context: &RuleContext<'_>) -> Option<RuleFinding> {
    let consumer = context.consumer;
    if consumer.is_manifest() || consumer.is_guest() {
        return None;
    }
    let multiplier =
        parse_positive(context.pool.product_attribute(attributes::INSTANCE_MULTIPLIER))?;

    (u64::from(context.quantity) % multiplier != 0).then(|| RuleFinding {
        rule: RuleId::InstanceQuantityMismatch,
        params: vec![
            context.pool.id.clone(),
            context.quantity.to_string(),
            multiplier.to_string(),
        ],
    })
}

fn parse_positive(value: Option<&str>) -> Option<u64> {
    value
        .and_then(|text| text.trim().parse::<u64>().ok())
        .filter(|number| *number > 0)
}
