use serde::{Deserialize, Serialize};

use crate::enforcer::{
    rules::{RuleFinding, RuleId},
    types::{CallerType, ValidationResult},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Error,
    Warning,
}

impl Severity {
    pub fn key_prefix(self) -> &'static str {
        match self {
            Self::Error => "rulefailed",
            Self::Warning => "rulewarning",
        }
    }
}

/// Severity of a finding, keyed by rule and caller context.
pub fn classify(rule: RuleId, caller: CallerType) -> Severity {
    use RuleId::*;

    match (rule, caller) {
        (
            CoresCapability
            | RamCapability
            | InstanceCapability
            | DerivedProductCapability
            | InstanceQuantityMismatch,
            CallerType::ListPools,
        ) => Severity::Warning,
        (
            CoresCapability
            | RamCapability
            | InstanceCapability
            | DerivedProductCapability
            | InstanceQuantityMismatch,
            CallerType::Bind | CallerType::BestPools | CallerType::Unknown,
        ) => Severity::Error,
        (ManifestVirtRestriction | QuantityAvailable | VirtOnly | PhysicalOnly, _) => {
            Severity::Error
        }
        (SocketCoverage | ArchitectureMismatch, _) => Severity::Warning,
    }
}

/// Turns raw findings into a result, preserving finding order within each list.
pub fn classify_findings(findings: Vec<RuleFinding>, caller: CallerType) -> ValidationResult {
    let mut result = ValidationResult::default();
    for finding in findings {
        let severity = classify(finding.rule, caller);
        let resource_key = finding.rule.resource_key(severity.key_prefix());
        match severity {
            Severity::Error => result.add_error(resource_key, finding.params),
            Severity::Warning => result.add_warning(resource_key, finding.params),
        }
    }
    result
}
