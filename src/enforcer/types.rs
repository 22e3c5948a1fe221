use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::policy::PostEntitlementDirective;

/// Context a validation runs in; decides whether caller-sensitive findings block.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum CallerType {
    Bind,
    ListPools,
    BestPools,
    #[default]
    Unknown,
}

impl CallerType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Bind => "bind",
            Self::ListPools => "list_pools",
            Self::BestPools => "best_pools",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for CallerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CallerType {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "bind" => Ok(Self::Bind),
            "list_pools" => Ok(Self::ListPools),
            "best_pools" => Ok(Self::BestPools),
            "unknown" => Ok(Self::Unknown),
            other => Err(format!(
                "unknown caller type '{other}': expected bind, list_pools, best_pools or unknown"
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    pub resource_key: String,
    #[serde(default)]
    pub params: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationWarning {
    pub resource_key: String,
    #[serde(default)]
    pub params: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ValidationResult {
    errors: Vec<ValidationError>,
    warnings: Vec<ValidationWarning>,
}

impl ValidationResult {
    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    pub fn warnings(&self) -> &[ValidationWarning] {
        &self.warnings
    }

    pub fn is_successful(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn add_error(&mut self, resource_key: impl Into<String>, params: Vec<String>) {
        self.errors.push(ValidationError {
            resource_key: resource_key.into(),
            params,
        });
    }

    pub fn add_warning(&mut self, resource_key: impl Into<String>, params: Vec<String>) {
        self.warnings.push(ValidationWarning {
            resource_key: resource_key.into(),
            params,
        });
    }

    pub fn merge(&mut self, other: ValidationResult) {
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
    }

    pub fn error_keys(&self) -> Vec<&str> {
        self.errors
            .iter()
            .map(|error| error.resource_key.as_str())
            .collect()
    }

    pub fn warning_keys(&self) -> Vec<&str> {
        self.warnings
            .iter()
            .map(|warning| warning.resource_key.as_str())
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedDirective {
    pub directive: PostEntitlementDirective,
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct PostEntitlementReport {
    pub policy_configured: bool,
    pub applied: Vec<PostEntitlementDirective>,
    pub skipped: Vec<PostEntitlementDirective>,
    pub failed: Vec<FailedDirective>,
}
