use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolicyFault {
    #[error("policy operation '{operation}' failed: {message}")]
    Execution { operation: String, message: String },
    #[error("policy operation '{operation}' received arguments it cannot handle: {message}")]
    UnsupportedArguments { operation: String, message: String },
}

impl PolicyFault {
    pub fn execution(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Execution {
            operation: operation.into(),
            message: message.into(),
        }
    }

    pub fn unsupported_arguments(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::UnsupportedArguments {
            operation: operation.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PoolManagerError {
    #[error("pool '{pool_id}' is unknown to the pool manager")]
    PoolNotFound { pool_id: String },
}
