//! # Error Handling
//!
//! This module defines the centralized error type for the `mu` library. It
//! uses `thiserror` to describe every failure the stack workflows can surface,
//! grouped roughly as:
//!
//! - **Resolution errors**: a named entity (environment, service) could not be
//!   found in the loaded configuration.
//! - **Provider errors**: a call to the stack provider failed. These are always
//!   wrapped with the stack name and the operation that failed.
//! - **Terminal failures**: the provider reported that a stack settled in a
//!   failed state after an upsert or delete.
//! - **Ambient errors**: configuration parsing, git revision discovery, I/O and
//!   serialization.
//!
//! Workflows never aggregate errors. The first error returned by an executor is
//! handed back to the caller unchanged.

use std::time::Duration;
use thiserror::Error;

use crate::stack::StackStatus;

/// Main error type for mu operations
#[derive(Error, Debug)]
pub enum Error {
    /// The requested environment is not declared in the configuration.
    #[error("Unable to find environment named '{name}' in configuration")]
    EnvironmentNotFound { name: String },

    /// A service workflow was started without a service name and the
    /// configuration does not declare one.
    #[error("Service name not provided and not present in configuration")]
    ServiceNotConfigured,

    /// An executor ran before the step that resolves its input.
    #[error("Workflow has no resolved {what}")]
    Unresolved { what: String },

    /// A call to the stack provider failed.
    #[error("Stack {operation} failed for '{stack}': {message}")]
    StackOperation {
        stack: String,
        operation: String,
        message: String,
    },

    /// The stack reached a terminal state that is not a success.
    #[error("Stack '{stack}' ended in {status}{}", reason.as_ref().map(|r| format!(": {}", r)).unwrap_or_default())]
    StackFailed {
        stack: String,
        status: StackStatus,
        reason: Option<String>,
    },

    /// A stack whose outputs are required does not exist.
    #[error("Stack '{stack}' does not exist")]
    StackMissing { stack: String },

    /// No machine image matched the lookup pattern.
    #[error("No image found matching pattern '{pattern}'")]
    ImageNotFound { pattern: String },

    /// Polling for a terminal status gave up.
    #[error("Timed out after {}s waiting for stack '{stack}' to settle", waited.as_secs())]
    AwaitTimeout { stack: String, waited: Duration },

    /// An error occurred while parsing the `mu.yml` configuration file.
    #[error("Configuration parsing error: {message}{}", hint.as_ref().map(|h| format!("\n  hint: {}", h)).unwrap_or_default())]
    ConfigParse {
        message: String,
        /// Optional hint for how to fix the configuration issue
        hint: Option<String>,
    },

    /// A name cannot be used as part of a stack name.
    #[error("Invalid {kind} name '{name}': must start with a letter and contain only {allowed}")]
    InvalidName {
        kind: String,
        name: String,
        /// The characters the name may contain after its first letter
        allowed: &'static str,
    },

    /// The source revision could not be determined.
    #[error("Unable to determine git revision from {path}: {message}")]
    GitRevision { path: String, message: String },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A YAML parsing error, wrapped from `serde_yaml::Error`.
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A JSON error, wrapped from `serde_json::Error`.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A glob pattern error, wrapped from `glob::PatternError`.
    #[error("Glob pattern error: {0}")]
    Glob(#[from] glob::PatternError),
}

impl Error {
    /// Wrap a provider failure with the stack it was acting on.
    pub fn stack_operation(
        stack: impl Into<String>,
        operation: impl Into<String>,
        message: impl ToString,
    ) -> Self {
        Error::StackOperation {
            stack: stack.into(),
            operation: operation.into(),
            message: message.to_string(),
        }
    }

    /// Attach stack context to a provider error unless it already names one.
    pub fn for_stack(self, stack: &str, operation: &str) -> Self {
        match self {
            Error::StackOperation { .. }
            | Error::StackFailed { .. }
            | Error::StackMissing { .. }
            | Error::AwaitTimeout { .. } => self,
            other => Error::stack_operation(stack, operation, other),
        }
    }
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
