mod filter;

use std::sync::{Arc, Mutex};

use entitler::{
    autobind::{AutobindSelector, PoolCandidateFilter},
    policy::{InMemoryProductCatalog, PolicyArgs, PolicyEvaluator, PolicyFault, PolicyOutput},
    types::{Consumer, ConsumerType, Pool, Product, ProvidedProduct, facts},
};
use time::macros::datetime;

pub fn consumer(certificate_version: Option<&str>) -> Consumer {
    let mut consumer = Consumer::new("consumer-1", ConsumerType::System);
    if let Some(version) = certificate_version {
        consumer
            .facts
            .insert(facts::CERTIFICATE_VERSION.to_string(), version.to_string());
    }
    consumer
}

pub fn product(id: &str, content_sets: usize) -> Product {
    Product {
        id: id.to_string(),
        name: format!("product-{id}"),
        attributes: Default::default(),
        content: (0..content_sets)
            .map(|index| format!("{id}-content-{index}"))
            .collect(),
    }
}

pub fn pool(id: &str, product_id: &str, provided: &[&str]) -> Pool {
    Pool {
        id: id.to_string(),
        product_id: product_id.to_string(),
        derived_product_id: None,
        quantity: 10,
        consumed: 0,
        attributes: Default::default(),
        product_attributes: Default::default(),
        provided_products: provided
            .iter()
            .map(|product_id| ProvidedProduct {
                product_id: product_id.to_string(),
                product_name: format!("product-{product_id}"),
            })
            .collect(),
        start_date: datetime!(2026-01-01 0:00 UTC),
        end_date: datetime!(2027-01-01 0:00 UTC),
    }
}

pub fn content_filter(products: Vec<Product>) -> PoolCandidateFilter {
    PoolCandidateFilter::new(Arc::new(InMemoryProductCatalog::from(products)))
}

/// Evaluator that answers every call with the same scripted output and records its inputs.
pub struct ScriptedPolicy {
    output: Result<PolicyOutput, PolicyFault>,
    calls: Mutex<Vec<(String, PolicyArgs)>>,
}

impl ScriptedPolicy {
    pub fn new(output: Result<PolicyOutput, PolicyFault>) -> Arc<Self> {
        Arc::new(Self {
            output,
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> Vec<(String, PolicyArgs)> {
        self.calls.lock().expect("calls lock should not be poisoned").clone()
    }
}

impl PolicyEvaluator for ScriptedPolicy {
    fn invoke(&self, operation: &str, args: &PolicyArgs) -> Result<PolicyOutput, PolicyFault> {
        self.calls
            .lock()
            .expect("calls lock should not be poisoned")
            .push((operation.to_string(), args.clone()));
        self.output.clone()
    }
}

pub fn selector_with(products: Vec<Product>, policy: Arc<ScriptedPolicy>) -> AutobindSelector {
    AutobindSelector::new(content_filter(products), policy)
}
