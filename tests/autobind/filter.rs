use entitler::{autobind::PoolCandidateFilter, types::facts};

use super::{consumer, content_filter, pool, product};

fn pool_ids<'a>(pools: &[&'a entitler::types::Pool]) -> Vec<&'a str> {
    pools.iter().map(|pool| pool.id.as_str()).collect()
}

#[test]
fn given_v1_consumer_when_pool_content_exceeds_limit_then_pool_is_excluded() {
    let filter = content_filter(vec![product("big", 186), product("small", 10)]);
    let pools = vec![
        pool("p-big", "mkt-1", &["big"]),
        pool("p-small", "mkt-2", &["small"]),
    ];

    let filtered = filter.filter(&consumer(Some("1.0")), &pools);

    assert_eq!(pool_ids(&filtered), vec!["p-small"]);
}

#[test]
fn given_v1_consumer_when_content_equals_limit_then_pool_is_kept() {
    let filter = content_filter(vec![product("a", 100), product("b", 85)]);
    let pools = vec![pool("p-edge", "mkt-1", &["a", "b"])];

    let filtered = filter.filter(&consumer(Some("1.2")), &pools);

    assert_eq!(pool_ids(&filtered), vec!["p-edge"]);
}

#[test]
fn given_missing_certificate_fact_then_consumer_is_treated_as_v1() {
    let subject = consumer(None);
    assert!(PoolCandidateFilter::requires_v1_filtering(&subject));

    let filter = content_filter(vec![product("big", 200)]);
    let pools = vec![pool("p-big", "mkt-1", &["big"])];
    assert!(filter.filter(&subject, &pools).is_empty());
}

#[test]
fn given_v3_consumer_then_every_pool_passes_in_order() {
    let filter = content_filter(vec![product("big", 5_000)]);
    let pools = vec![
        pool("p-2", "mkt-2", &["big"]),
        pool("p-1", "mkt-1", &["big"]),
    ];

    let subject = consumer(Some("3.2"));
    assert!(!PoolCandidateFilter::requires_v1_filtering(&subject));
    assert_eq!(pool_ids(&filter.filter(&subject, &pools)), vec!["p-2", "p-1"]);
}

#[test]
fn given_version_without_v1_prefix_then_no_filtering_happens() {
    let mut subject = consumer(None);
    subject
        .facts
        .insert(facts::CERTIFICATE_VERSION.to_string(), "10.1".to_string());
    assert!(!PoolCandidateFilter::requires_v1_filtering(&subject));
}

#[test]
fn given_duplicate_provided_products_then_content_is_counted_once() {
    let filter = content_filter(vec![product("dup", 100)]);
    let pools = vec![pool("p-dup", "mkt-1", &["dup", "dup"])];

    let filtered = filter.filter(&consumer(Some("1.0")), &pools);

    assert_eq!(pool_ids(&filtered), vec!["p-dup"]);
}

#[test]
fn given_provided_product_missing_from_catalog_then_it_contributes_no_content() {
    let filter = content_filter(vec![product("known", 185)]);
    let pools = vec![pool("p-1", "mkt-1", &["known", "unknown"])];

    let filtered = filter.filter(&consumer(Some("1.0")), &pools);

    assert_eq!(pool_ids(&filtered), vec!["p-1"]);
}

#[test]
fn given_custom_limit_then_filter_uses_it() {
    let filter = content_filter(vec![product("mid", 50)]).with_content_limit(40);
    assert_eq!(filter.content_limit(), 40);

    let pools = vec![pool("p-mid", "mkt-1", &["mid"])];
    assert!(filter.filter(&consumer(Some("1.0")), &pools).is_empty());
}
