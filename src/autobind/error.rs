use std::fmt;

use serde::{Deserialize, Serialize};

use crate::policy::PolicyFault;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AllocationErrorKind {
    NoEligiblePools,
    NoSelection,
    InvalidPolicyOutput,
    PolicyFault,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AllocationError {
    pub kind: AllocationErrorKind,
    pub message: String,
    #[serde(skip)]
    fault: Option<PolicyFault>,
}

impl AllocationError {
    pub fn new(kind: AllocationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            fault: None,
        }
    }

    pub fn policy_fault(fault: PolicyFault) -> Self {
        Self {
            kind: AllocationErrorKind::PolicyFault,
            message: format!("pool selection policy failed: {fault}"),
            fault: Some(fault),
        }
    }

    pub fn fault(&self) -> Option<&PolicyFault> {
        self.fault.as_ref()
    }
}

impl fmt::Display for AllocationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for AllocationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.fault
            .as_ref()
            .map(|fault| fault as &(dyn std::error::Error + 'static))
    }
}

pub fn no_eligible_pools(message: impl Into<String>) -> AllocationError {
    AllocationError::new(AllocationErrorKind::NoEligiblePools, message)
}

pub fn no_selection(message: impl Into<String>) -> AllocationError {
    AllocationError::new(AllocationErrorKind::NoSelection, message)
}

pub fn invalid_policy_output(message: impl Into<String>) -> AllocationError {
    AllocationError::new(AllocationErrorKind::InvalidPolicyOutput, message)
}
