use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnforcerErrorKind {
    PolicyFault,
    InvalidPolicyOutput,
    InvalidDirective,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnforcerError {
    pub kind: EnforcerErrorKind,
    pub message: String,
}

impl EnforcerError {
    pub fn new(kind: EnforcerErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for EnforcerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for EnforcerError {}

pub fn policy_fault(message: impl Into<String>) -> EnforcerError {
    EnforcerError::new(EnforcerErrorKind::PolicyFault, message)
}

pub fn invalid_policy_output(message: impl Into<String>) -> EnforcerError {
    EnforcerError::new(EnforcerErrorKind::InvalidPolicyOutput, message)
}

pub fn invalid_directive(message: impl Into<String>) -> EnforcerError {
    EnforcerError::new(EnforcerErrorKind::InvalidDirective, message)
}
