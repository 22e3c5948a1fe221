use std::{collections::BTreeSet, sync::Arc};

use crate::{
    policy::ProductCatalog,
    types::{Consumer, Pool, facts},
};

/// Most content sets a version 1 entitlement certificate can carry.
pub const V1_CONTENT_LIMIT: usize = 185;

/// Drops pools whose provided content would not fit a V1 certificate, for consumers that
/// cannot read anything newer.
pub struct PoolCandidateFilter {
    catalog: Arc<dyn ProductCatalog>,
    content_limit: usize,
}

impl PoolCandidateFilter {
    pub fn new(catalog: Arc<dyn ProductCatalog>) -> Self {
        Self {
            catalog,
            content_limit: V1_CONTENT_LIMIT,
        }
    }

    pub fn with_content_limit(mut self, content_limit: usize) -> Self {
        self.content_limit = content_limit;
        self
    }

    pub fn content_limit(&self) -> usize {
        self.content_limit
    }

    pub fn requires_v1_filtering(consumer: &Consumer) -> bool {
        match consumer.fact(facts::CERTIFICATE_VERSION) {
            None => true,
            Some(version) => version.starts_with("1."),
        }
    }

    pub fn filter<'a>(&self, consumer: &Consumer, pools: &'a [Pool]) -> Vec<&'a Pool> {
        if !Self::requires_v1_filtering(consumer) {
            return pools.iter().collect();
        }

        pools
            .iter()
            .filter(|pool| {
                let content = self.provided_content_count(pool);
                if content > self.content_limit {
                    tracing::debug!(
                        target: "autobind",
                        pool_id = %pool.id,
                        content,
                        limit = self.content_limit,
                        "pool_excluded_for_v1_content"
                    );
                    return false;
                }
                true
            })
            .collect()
    }

    fn provided_content_count(&self, pool: &Pool) -> usize {
        let product_ids: BTreeSet<&str> = pool.provided_product_ids().collect();
        product_ids
            .into_iter()
            .map(|product_id| match self.catalog.product_by_id(product_id) {
                Some(product) => product.content_count(),
                None => {
                    tracing::warn!(
                        target: "autobind",
                        pool_id = %pool.id,
                        product_id = %product_id,
                        "provided_product_missing_from_catalog"
                    );
                    0
                }
            })
            .sum()
    }
}
