use std::{
    collections::{BTreeMap, BTreeSet},
    sync::Arc,
};

use entitler::{
    autobind::{AllocationErrorKind, AutobindSelector, PoolCandidateFilter},
    enforcer::{CallerType, Enforcer},
    policy::{
        InMemoryProductCatalog, NativePolicy, NativePolicyConfig, POST_ENTITLEMENT, PolicyArgs,
        PolicyEvaluator, PolicyFault, PolicyOutput, PoolSelection, PostEntitlementArgs,
        PostEntitlementDirective, ReadOnlyConsumer, ReadOnlyEntitlement, RulesLog, SELECT_POOLS,
    },
    types::{ComplianceStatus, ConsumerType, CoverageState, Entitlement, attributes, facts},
};
use time::macros::datetime;

use super::{consumer, pool, select_args, with_product_attribute, year_end};

fn selections(output: PolicyOutput) -> Vec<(String, i64)> {
    match output {
        PolicyOutput::Selection {
            selections: Some(selections),
        } => selections
            .into_iter()
            .map(|PoolSelection { pool_id, quantity }| (pool_id, quantity))
            .collect(),
        other => panic!("expected a selection, got {other:?}"),
    }
}

fn pair(pool_id: &str, quantity: i64) -> (String, i64) {
    (pool_id.to_string(), quantity)
}

#[test]
fn given_unknown_operation_then_not_configured() {
    let args = select_args(&consumer(), &[], &[], ComplianceStatus::default(), None);

    let output = NativePolicy::default()
        .invoke("pre_entitlement_hook", &args)
        .expect("unknown operation should not fault");

    assert_eq!(output, PolicyOutput::NotConfigured);
}

#[test]
fn given_arguments_for_other_operation_then_fault() {
    let args = select_args(&consumer(), &[], &[], ComplianceStatus::default(), None);

    let fault = NativePolicy::default()
        .invoke(POST_ENTITLEMENT, &args)
        .expect_err("mismatched arguments should fault");

    assert!(matches!(fault, PolicyFault::UnsupportedArguments { .. }));
}

#[test]
fn given_overlapping_pools_then_widest_coverage_is_picked_first() {
    let pools = vec![
        pool("p-a", &["prod-a"], year_end()),
        pool("p-ab", &["prod-a", "prod-b"], year_end()),
        pool("p-c", &["prod-c"], year_end()),
    ];
    let args = select_args(
        &consumer(),
        &pools,
        &["prod-a", "prod-b", "prod-c"],
        ComplianceStatus::default(),
        None,
    );

    let output = NativePolicy::default()
        .invoke(SELECT_POOLS, &args)
        .expect("selection should succeed");

    assert_eq!(selections(output), vec![pair("p-ab", 1), pair("p-c", 1)]);
}

#[test]
fn given_equal_coverage_then_earliest_ending_pool_wins() {
    let pools = vec![
        pool("p-late", &["prod-a"], datetime!(2028-01-01 0:00 UTC)),
        pool("p-early", &["prod-a"], datetime!(2026-06-01 0:00 UTC)),
    ];
    let args = select_args(
        &consumer(),
        &pools,
        &["prod-a"],
        ComplianceStatus::default(),
        None,
    );

    let output = NativePolicy::default()
        .invoke(SELECT_POOLS, &args)
        .expect("selection should succeed");

    assert_eq!(selections(output), vec![pair("p-early", 1)]);
}

#[test]
fn given_covered_products_then_they_are_not_targeted() {
    let pools = vec![
        pool("p-a", &["prod-a"], year_end()),
        pool("p-b", &["prod-b"], year_end()),
    ];
    let compliance = ComplianceStatus {
        products: BTreeMap::from([("prod-a".to_string(), CoverageState::Covered)]),
        exempt_service_levels: BTreeSet::new(),
    };
    let args = select_args(&consumer(), &pools, &["prod-a", "prod-b"], compliance, None);

    let skipping = NativePolicy::default()
        .invoke(SELECT_POOLS, &args)
        .expect("selection should succeed");
    assert_eq!(selections(skipping), vec![pair("p-b", 1)]);

    let exhaustive = NativePolicy::new(NativePolicyConfig {
        skip_covered_products: false,
    })
    .invoke(SELECT_POOLS, &args)
    .expect("selection should succeed");
    assert_eq!(
        selections(exhaustive),
        vec![pair("p-a", 1), pair("p-b", 1)]
    );
}

#[test]
fn given_service_level_override_then_matching_pool_is_preferred() {
    let premium = with_product_attribute(
        pool("p-premium", &["prod-a"], datetime!(2028-01-01 0:00 UTC)),
        attributes::SUPPORT_LEVEL,
        "Premium",
    );
    let standard = with_product_attribute(
        pool("p-standard", &["prod-a"], year_end()),
        attributes::SUPPORT_LEVEL,
        "Standard",
    );
    let pools = vec![standard, premium];
    let mut subject = consumer();
    subject.service_level = Some("Standard".to_string());

    let args = select_args(
        &subject,
        &pools,
        &["prod-a"],
        ComplianceStatus::default(),
        Some("premium"),
    );
    let output = NativePolicy::default()
        .invoke(SELECT_POOLS, &args)
        .expect("selection should succeed");

    assert_eq!(selections(output), vec![pair("p-premium", 1)]);
}

#[test]
fn given_exhausted_or_wrong_arch_pools_then_they_are_never_selected() {
    let mut exhausted = pool("p-empty", &["prod-a"], year_end());
    exhausted.consumed = 10;
    let ppc = with_product_attribute(
        pool("p-ppc", &["prod-a"], year_end()),
        attributes::ARCH,
        "ppc64",
    );
    let mut subject = consumer();
    subject
        .facts
        .insert(facts::ARCHITECTURE.to_string(), "x86_64".to_string());

    let args = select_args(
        &subject,
        &[exhausted, ppc],
        &["prod-a"],
        ComplianceStatus::default(),
        None,
    );
    let output = NativePolicy::default()
        .invoke(SELECT_POOLS, &args)
        .expect("selection should succeed");

    assert!(selections(output).is_empty());
}

#[test]
fn given_stackable_socket_pool_then_quantity_covers_consumer_sockets() {
    let mut stacked = with_product_attribute(
        pool("p-stack", &["prod-a"], year_end()),
        attributes::SOCKETS,
        "2",
    );
    stacked = with_product_attribute(stacked, attributes::STACKING_ID, "stack-1");
    let mut subject = consumer();
    subject
        .facts
        .insert(facts::CPU_SOCKETS.to_string(), "6".to_string());

    let args = select_args(
        &subject,
        &[stacked],
        &["prod-a"],
        ComplianceStatus::default(),
        None,
    );
    let output = NativePolicy::default()
        .invoke(SELECT_POOLS, &args)
        .expect("selection should succeed");

    assert_eq!(selections(output), vec![pair("p-stack", 3)]);
}

#[test]
fn given_virt_limits_then_bonus_quantity_follows_limit_and_consumer_type() {
    let subject = consumer();
    let unlimited = with_product_attribute(
        pool("p-unl", &[], year_end()),
        attributes::VIRT_LIMIT,
        "unlimited",
    );
    let mut derived = with_product_attribute(
        pool("p-derived", &[], year_end()),
        attributes::VIRT_LIMIT,
        "4",
    );
    derived
        .attributes
        .insert(attributes::DERIVED_POOL.to_string(), "true".to_string());

    let entitlements: BTreeMap<String, ReadOnlyEntitlement> = [
        ("ent-1", unlimited),
        ("ent-2", derived),
    ]
    .into_iter()
    .map(|(id, pool)| {
        let entitlement = Entitlement {
            id: id.to_string(),
            consumer_id: subject.id.clone(),
            pool,
            quantity: 2,
        };
        (id.to_string(), ReadOnlyEntitlement::from(&entitlement))
    })
    .collect();

    let post_args = |consumer: &entitler::types::Consumer| {
        PolicyArgs::PostEntitlement(PostEntitlementArgs {
            consumer: ReadOnlyConsumer::new(consumer, None),
            entitlements: entitlements.clone(),
            sub_pools_for_stack_ids: BTreeMap::new(),
            success: true,
            pool_quantities: BTreeMap::new(),
            log: RulesLog,
        })
    };

    let output = NativePolicy::default()
        .invoke(POST_ENTITLEMENT, &post_args(&subject))
        .expect("post entitlement should succeed");
    assert_eq!(
        output,
        PolicyOutput::Directives {
            directives: vec![PostEntitlementDirective::CreateBonusPool {
                source_pool_id: "p-unl".to_string(),
                quantity: -1,
            }],
        }
    );

    let distributor = entitler::types::Consumer::new("manifest-1", ConsumerType::Manifest);
    let output = NativePolicy::default()
        .invoke(POST_ENTITLEMENT, &post_args(&distributor))
        .expect("post entitlement should succeed");
    assert_eq!(output, PolicyOutput::Directives { directives: Vec::new() });
}

#[test]
fn given_native_policy_then_best_pools_pass_best_pools_validation() {
    let pools = vec![
        pool("p-a", &["prod-a"], year_end()),
        pool("p-b", &["prod-b"], year_end()),
    ];
    let catalog = Arc::new(InMemoryProductCatalog::new(Vec::new()));
    let selector = AutobindSelector::new(
        PoolCandidateFilter::new(catalog),
        Arc::new(NativePolicy::default()),
    );
    let subject = consumer();

    let best = selector
        .select_best_pools(
            &subject,
            &["prod-a".to_string(), "prod-b".to_string()],
            &pools,
            &ComplianceStatus::default(),
            None,
            &BTreeSet::new(),
        )
        .expect("native selection should succeed");

    let enforcer = Enforcer::new(Arc::new(NativePolicy::default()));
    let results = enforcer.pre_entitlement_batch(&subject, &best, CallerType::BestPools);
    assert_eq!(results.len(), 2);
    assert!(results.values().all(|result| result.is_successful()));
}

#[test]
fn given_everything_covered_then_selector_reports_no_selection() {
    let pools = vec![pool("p-a", &["prod-a"], year_end())];
    let compliance = ComplianceStatus {
        products: BTreeMap::from([("prod-a".to_string(), CoverageState::Covered)]),
        exempt_service_levels: BTreeSet::new(),
    };
    let selector = AutobindSelector::new(
        PoolCandidateFilter::new(Arc::new(InMemoryProductCatalog::new(Vec::new()))),
        Arc::new(NativePolicy::default()),
    );

    let err = selector
        .select_best_pools(
            &consumer(),
            &["prod-a".to_string()],
            &pools,
            &compliance,
            None,
            &BTreeSet::new(),
        )
        .expect_err("nothing to cover should yield no selection");

    assert_eq!(err.kind, AllocationErrorKind::NoSelection);
}
