use std::collections::BTreeSet;

use entitler::{
    policy::{InMemoryProductCatalog, ProductCatalog},
    types::Product,
};

fn product(id: &str, content: &[&str]) -> Product {
    Product {
        id: id.to_string(),
        name: format!("product-{id}"),
        attributes: Default::default(),
        content: content.iter().map(|label| label.to_string()).collect::<BTreeSet<_>>(),
    }
}

#[test]
fn given_known_product_then_lookup_returns_a_copy() {
    let catalog = InMemoryProductCatalog::new(vec![
        product("prod-a", &["repo-1", "repo-2"]),
        product("prod-b", &[]),
    ]);

    assert_eq!(catalog.len(), 2);
    let found = catalog
        .product_by_id("prod-a")
        .expect("prod-a should be in the catalog");
    assert_eq!(found.content_count(), 2);
    assert!(catalog.product_by_id("prod-missing").is_none());
}

#[test]
fn given_empty_catalog_then_it_reports_empty() {
    let catalog = InMemoryProductCatalog::from(Vec::new());
    assert!(catalog.is_empty());
}
