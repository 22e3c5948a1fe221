mod catalog;
mod native;

use std::collections::{BTreeMap, BTreeSet};

use entitler::{
    policy::{
        PRODUCT_ATTRIBUTE_SEPARATOR, PolicyArgs, ReadOnlyConsumer, ReadOnlyPool, ReadOnlyProduct,
        RulesLog, SelectPoolsArgs,
    },
    types::{ComplianceStatus, Consumer, ConsumerType, Pool, ProvidedProduct},
};
use time::{OffsetDateTime, macros::datetime};

pub fn consumer() -> Consumer {
    let mut consumer = Consumer::new("consumer-1", ConsumerType::System);
    consumer
        .facts
        .insert("system.certificate_version".to_string(), "3.2".to_string());
    consumer
}

pub fn pool(id: &str, provided: &[&str], end_date: OffsetDateTime) -> Pool {
    Pool {
        id: id.to_string(),
        product_id: format!("mkt-{id}"),
        derived_product_id: None,
        quantity: 10,
        consumed: 0,
        attributes: BTreeMap::new(),
        product_attributes: BTreeMap::new(),
        provided_products: provided
            .iter()
            .map(|product_id| ProvidedProduct {
                product_id: product_id.to_string(),
                product_name: String::new(),
            })
            .collect(),
        start_date: datetime!(2026-01-01 0:00 UTC),
        end_date,
    }
}

pub fn year_end() -> OffsetDateTime {
    datetime!(2026-12-31 0:00 UTC)
}

pub fn with_product_attribute(mut pool: Pool, key: &str, value: &str) -> Pool {
    pool.product_attributes
        .insert(key.to_string(), value.to_string());
    pool
}

pub fn select_args(
    consumer: &Consumer,
    pools: &[Pool],
    products: &[&str],
    compliance: ComplianceStatus,
    service_level_override: Option<&str>,
) -> PolicyArgs {
    PolicyArgs::SelectPools(SelectPoolsArgs {
        consumer: ReadOnlyConsumer::new(consumer, service_level_override),
        pools: ReadOnlyPool::from_pools(pools),
        products: products
            .iter()
            .map(|product_id| ReadOnlyProduct::placeholder(product_id))
            .collect(),
        attribute_separator: PRODUCT_ATTRIBUTE_SEPARATOR.to_string(),
        log: RulesLog,
        compliance,
        exempt_levels: BTreeSet::new(),
    })
}
