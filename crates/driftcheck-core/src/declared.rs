//! Declared state source
//!
//! Reads the Terraform state either from a file or from `terraform show -json`
//! and hands it to the extractor.

use crate::context::RunContext;
use crate::error::{Result, VerifyError};
use crate::executor::ContextCommandExecutor;
use crate::extractor::StateTreeExtractor;
use crate::model::ResourceCounts;
use crate::options::VerificationOptions;
use std::path::Path;
use std::sync::Arc;

pub const TERRAFORM: &str = "terraform";

pub(crate) fn chdir_arg(dir: &Path) -> String {
    format!("-chdir={}", dir.display())
}

pub struct DeclaredStateSource {
    executor: Arc<dyn ContextCommandExecutor>,
}

impl DeclaredStateSource {
    pub fn new(executor: Arc<dyn ContextCommandExecutor>) -> Self {
        Self { executor }
    }

    pub async fn fetch(
        &self,
        ctx: &RunContext,
        options: &VerificationOptions,
    ) -> Result<ResourceCounts> {
        let text = match &options.state_file {
            Some(path) => {
                tracing::debug!("Reading declared state from {}", path.display());
                ctx.check()?;
                tokio::fs::read_to_string(path)
                    .await
                    .map_err(|source| VerifyError::StateFile {
                        path: path.clone(),
                        source,
                    })?
            }
            None => self.show(ctx, options).await?,
        };

        let counts = StateTreeExtractor::new(options.suffix.clone()).extract_str(&text);
        tracing::debug!("Declared counts: {:?}", counts);
        Ok(counts)
    }

    async fn show(&self, ctx: &RunContext, options: &VerificationOptions) -> Result<String> {
        let args = vec![
            chdir_arg(&options.terraform_dir),
            "show".to_string(),
            "-json".to_string(),
            "-no-color".to_string(),
        ];

        self.executor
            .execute_with_context(ctx, TERRAFORM, &args)
            .await
            .map_err(|source| match source.context_error() {
                Some(e) => VerifyError::Context(e),
                None => VerifyError::DeclaredState {
                    environment: options.environment.clone(),
                    source,
                },
            })
    }
}
