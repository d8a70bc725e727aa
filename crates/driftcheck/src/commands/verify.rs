use crate::output::{self, OutputFormat};
use colored::Colorize;
use driftcheck_config::{ConfigProvider, FileConfig, LayeredConfig};
use driftcheck_core::{EXIT_FAILURE, ProcessExecutor, RunContext, VerificationOptions, Verifier};
use std::path::PathBuf;
use std::sync::Arc;

/// Flags of `driftcheck verify`
#[derive(Debug, Default)]
pub struct VerifyArgs {
    pub environment: Option<String>,
    pub suffix: Option<String>,
    pub skip_plan: bool,
    pub ignore_resource_errors: bool,
    pub timeout: Option<u64>,
    pub terraform_dir: Option<PathBuf>,
    pub state_file: Option<PathBuf>,
    pub format: OutputFormat,
}

impl VerifyArgs {
    /// Flags given on the command line, as the top config layer
    ///
    /// Boolean flags only ever switch a setting on.
    fn overrides(&self) -> FileConfig {
        let mut layer = FileConfig::new();
        if let Some(environment) = &self.environment {
            layer.set("environment", environment.as_str());
        }
        if let Some(suffix) = &self.suffix {
            layer.set("suffix", suffix.as_str());
        }
        if self.skip_plan {
            layer.set("skip_plan", "true");
        }
        if self.ignore_resource_errors {
            layer.set("ignore_resource_errors", "true");
        }
        if let Some(secs) = self.timeout {
            layer.set("timeout_secs", secs.to_string());
        }
        if let Some(dir) = &self.terraform_dir {
            layer.set("terraform_dir", dir.display().to_string());
        }
        if let Some(path) = &self.state_file {
            layer.set("state_file", path.display().to_string());
        }
        layer
    }

    /// Merge the flags over the environment and config file
    fn layered(&self, base: LayeredConfig) -> LayeredConfig {
        LayeredConfig::new()
            .with_layer(self.overrides())
            .with_layer(base)
    }
}

pub async fn handle(args: VerifyArgs) -> anyhow::Result<i32> {
    let config = args.layered(driftcheck_config::load_default()?);

    if config.get("environment").is_none() {
        print_missing_environment();
        return Ok(EXIT_FAILURE);
    }

    let options = VerificationOptions::from_config(&config)?;
    tracing::debug!("Verification options: {:?}", options);

    if args.format == OutputFormat::Table {
        println!(
            "{} {}",
            "Verifying environment".blue(),
            options.environment.cyan().bold()
        );
        println!();
    }

    let ctx = RunContext::with_timeout(options.timeout);
    let token = ctx.token().clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, cancelling verification");
            token.cancel();
        }
    });

    let verifier = Verifier::new(Arc::new(ProcessExecutor::new()));
    let report = verifier.run(&ctx, &options).await;

    output::render(&report, args.format)?;
    Ok(report.exit_code)
}

fn print_missing_environment() {
    eprintln!("{} No environment given.", "Error:".red().bold());
    eprintln!();
    eprintln!("{}", "Hint: pass the environment in one of these ways:".yellow());
    eprintln!("  driftcheck verify <env>                   e.g. driftcheck verify prod");
    eprintln!("  driftcheck verify -e <env>                e.g. driftcheck verify -e prod");
    eprintln!("  DRIFTCHECK_ENV=<env> driftcheck verify    e.g. DRIFTCHECK_ENV=prod driftcheck verify");
    eprintln!("  environment: <env> in driftcheck.yaml");
}
