use std::collections::BTreeMap;

use crate::{
    policy::ports::ProductCatalog,
    types::{Product, ProductId},
};

#[derive(Debug, Clone, Default)]
pub struct InMemoryProductCatalog {
    products_by_id: BTreeMap<ProductId, Product>,
}

impl InMemoryProductCatalog {
    pub fn new(products: impl IntoIterator<Item = Product>) -> Self {
        let mut products_by_id = BTreeMap::new();
        for product in products {
            products_by_id.insert(product.id.clone(), product);
        }
        Self { products_by_id }
    }

    pub fn len(&self) -> usize {
        self.products_by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products_by_id.is_empty()
    }
}

impl From<Vec<Product>> for InMemoryProductCatalog {
    fn from(value: Vec<Product>) -> Self {
        Self::new(value)
    }
}

impl ProductCatalog for InMemoryProductCatalog {
    fn product_by_id(&self, product_id: &str) -> Option<Product> {
        self.products_by_id.get(product_id).cloned()
    }
}
