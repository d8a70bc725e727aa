//! driftcheck reconciliation engine
//!
//! Compares the resources declared in Terraform state against the resources
//! actually running in an AWS environment.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │                 driftcheck CLI                   │
//! │              (driftcheck verify)                 │
//! └─────────────────┬───────────────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────────────┐
//! │                driftcheck-core                   │
//! │  ┌──────────────────────────────────────────┐   │
//! │  │               Verifier                    │   │
//! │  │  live → declared → compare → plan         │   │
//! │  └──────────────────────────────────────────┘   │
//! │  ┌──────────────┐  ┌──────────────┐            │
//! │  │ LiveResource │  │  StateTree   │            │
//! │  │   Fetcher    │  │  Extractor   │            │
//! │  └──────┬───────┘  └──────┬───────┘            │
//! └─────────┼─────────────────┼─────────────────────┘
//!           │                 │
//! ┌─────────▼───────┐ ┌───────▼─────────┐
//! │     aws CLI     │ │  terraform CLI  │
//! └─────────────────┘ └─────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use driftcheck_core::{ProcessExecutor, RunContext, VerificationOptions, Verifier};
//! use std::sync::Arc;
//!
//! let options = VerificationOptions::new("staging");
//! let ctx = RunContext::with_timeout(options.timeout);
//! let report = Verifier::new(Arc::new(ProcessExecutor::new()))
//!     .run(&ctx, &options)
//!     .await;
//! std::process::exit(report.exit_code);
//! ```

pub mod aws;
pub mod compare;
pub mod context;
pub mod declared;
pub mod error;
pub mod executor;
pub mod extractor;
pub mod fetcher;
pub mod model;
pub mod options;
pub mod orchestrator;

#[cfg(test)]
pub(crate) mod testing;

// Re-exports
pub use compare::{ComparisonRow, ROW_COUNT, all_match, compare};
pub use context::RunContext;
pub use declared::DeclaredStateSource;
pub use error::{CommandError, ContextError, Result, VerifyError};
pub use executor::{CommandExecutor, ContextAdapter, ContextCommandExecutor, ProcessExecutor};
pub use extractor::StateTreeExtractor;
pub use fetcher::LiveResourceFetcher;
pub use model::{
    CoreKind, KNOWN_SUFFIXES, ResourceCounts, SERVICE_GROUPS, ServiceMetric, ServiceResourceCounts,
};
pub use options::{DEFAULT_TIMEOUT, VerificationOptions};
pub use orchestrator::{
    EXIT_DRIFT, EXIT_FAILURE, EXIT_OK, Outcome, Phase, VerificationReport, Verifier,
};
