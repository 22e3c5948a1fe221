#[allow(clippy::module_inception)]
pub mod enforcer;
pub mod error;
pub mod rules;
pub mod severity;
pub mod types;

pub use enforcer::Enforcer;
pub use error::{EnforcerError, EnforcerErrorKind};
pub use rules::{RuleFinding, RuleId};
pub use severity::Severity;
pub use types::{
    CallerType, FailedDirective, PostEntitlementReport, ValidationError, ValidationResult,
    ValidationWarning,
};
