//! Error types for the reconciliation engine

use std::path::PathBuf;
use thiserror::Error;

/// stderr fragments the AWS CLI prints when a queried resource is absent
pub const NOT_FOUND_SIGNATURES: &[&str] = &[
    "ResourceNotFoundException",
    "ClusterNotFoundException",
    "ServiceNotFoundException",
    "LoadBalancerNotFound",
    "TargetGroupNotFound",
    "DBInstanceNotFound",
    "DBClusterNotFoundFault",
    "InvalidVpcID.NotFound",
    "does not exist",
];

/// Why a run context stopped
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextError {
    #[error("context cancelled")]
    Cancelled,

    #[error("context deadline exceeded")]
    DeadlineExceeded,
}

/// Failure of a single external command
#[derive(Error, Debug)]
pub enum CommandError {
    #[error("failed to start {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error(
        "{command} failed (exit code {}): {}",
        .code.map_or_else(|| "none".to_string(), |c| c.to_string()),
        .stderr.trim()
    )]
    Exited {
        command: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("{command} returned unexpected output: {output:?}")]
    InvalidOutput { command: String, output: String },

    #[error(transparent)]
    Context(#[from] ContextError),
}

impl CommandError {
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            CommandError::Exited { code, .. } => *code,
            _ => None,
        }
    }

    /// Whether the command reported that the queried resource does not exist
    pub fn is_not_found(&self) -> bool {
        match self {
            CommandError::Exited { stderr, .. } => NOT_FOUND_SIGNATURES
                .iter()
                .any(|signature| stderr.contains(signature)),
            _ => false,
        }
    }

    pub fn context_error(&self) -> Option<ContextError> {
        match self {
            CommandError::Context(e) => Some(*e),
            _ => None,
        }
    }
}

/// Errors that end a verification run
#[derive(Error, Debug)]
pub enum VerifyError {
    #[error("verification aborted: {0}")]
    Context(#[from] ContextError),

    #[error("failed to fetch {resource} for environment '{environment}': {source}")]
    Resource {
        resource: String,
        environment: String,
        #[source]
        source: CommandError,
    },

    #[error("failed to read declared state for environment '{environment}': {source}")]
    DeclaredState {
        environment: String,
        #[source]
        source: CommandError,
    },

    #[error("failed to read state file {}: {source}", .path.display())]
    StateFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("plan check failed for environment '{environment}': {source}")]
    Plan {
        environment: String,
        #[source]
        source: CommandError,
    },

    #[error("invalid configuration: {0}")]
    Config(#[from] driftcheck_config::ConfigError),
}

impl VerifyError {
    /// Wrap a live-query failure, keeping context errors unwrapped
    pub fn resource(
        resource: impl Into<String>,
        environment: impl Into<String>,
        source: CommandError,
    ) -> Self {
        match source {
            CommandError::Context(e) => VerifyError::Context(e),
            source => VerifyError::Resource {
                resource: resource.into(),
                environment: environment.into(),
                source,
            },
        }
    }

    pub fn context_error(&self) -> Option<ContextError> {
        match self {
            VerifyError::Context(e) => Some(*e),
            VerifyError::Resource { source, .. }
            | VerifyError::DeclaredState { source, .. }
            | VerifyError::Plan { source, .. } => source.context_error(),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, VerifyError>;
