//! Error types for the bean container and the session instance store.

use crate::sync::CallbackSlot;
use thiserror::Error;

/// Instance store errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Operation `{operation}` is not supported by the {strategy} instance store")]
    Unsupported {
        strategy: &'static str,
        operation: &'static str,
    },

    #[error("Session '{session}' has been invalidated")]
    SessionInvalidated { session: String },
}

impl StoreError {
    pub(crate) fn unsupported(strategy: &'static str, operation: &'static str) -> Self {
        StoreError::Unsupported {
            strategy,
            operation,
        }
    }
}

/// Errors raised while callbacks fire around a transaction boundary
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("{slot} callback failed: {reason}")]
    CallbackFailed { slot: CallbackSlot, reason: String },

    #[error("Bean instance is not of type {expected}")]
    InstanceMismatch { expected: &'static str },
}

/// Deployment-time errors
#[derive(Debug, Error)]
pub enum AssemblyError {
    #[error("Bean '{bean}' has no method named '{method}' (referenced for {slot})")]
    UnknownMethod {
        bean: String,
        method: String,
        slot: CallbackSlot,
    },

    #[error("Bean '{bean}' method '{method}' is a business method and cannot be a {slot} callback")]
    BusinessMethodAsCallback {
        bean: String,
        method: String,
        slot: CallbackSlot,
    },

    #[error("Duplicate bean name: {0}")]
    DuplicateBean(String),

    #[error("Duplicate interceptor name: {0}")]
    DuplicateInterceptor(String),

    #[error("Interceptor binding references unknown bean: {0}")]
    UnknownBean(String),

    #[error("Interceptor binding references unknown interceptor: {0}")]
    UnknownInterceptor(String),

    #[error("No bean bound under name: {0}")]
    NameNotFound(String),
}

/// Business-method invocation errors
#[derive(Debug, Error)]
pub enum InvocationError {
    #[error("Bean '{bean}' has no business method '{method}'")]
    NoSuchMethod { bean: String, method: String },

    #[error("Business method '{method}' failed: {reason}")]
    BusinessFailed { method: String, reason: String },

    #[error("Transaction synchronization failed: {0}")]
    Synchronization(#[from] SyncError),
}

/// Top-level errors surfaced by the CLI and configuration layer
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Assembly error: {0}")]
    Assembly(#[from] AssemblyError),

    #[error("Invocation error: {0}")]
    Invocation(#[from] InvocationError),

    #[error("Verification failed: {0}")]
    VerificationFailed(String),
}

impl From<config::ConfigError> for ApiError {
    fn from(err: config::ConfigError) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}
