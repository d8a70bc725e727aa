mod commands;
mod output;

use clap::{Parser, Subcommand};
use output::OutputFormat;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "driftcheck")]
#[command(
    about = "Check that a Terraform-managed AWS environment matches its declared state",
    long_about = None
)]
struct Cli {
    /// Increase log verbosity (-v: info, -vv: debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare live resource counts against the Terraform state
    Verify {
        /// Environment name (dev, stg, prod)
        environment: Option<String>,
        /// Environment name (-e/--env flag, DRIFTCHECK_ENV variable)
        #[arg(
            short = 'e',
            long = "env",
            env = "DRIFTCHECK_ENV",
            conflicts_with = "environment",
            hide = true
        )]
        env_flag: Option<String>,
        /// Deployment suffix appended to resource names (e.g. -blue)
        #[arg(long)]
        suffix: Option<String>,
        /// Skip the `terraform plan` check
        #[arg(long)]
        skip_plan: bool,
        /// Treat missing resources as zero instead of failing
        #[arg(long)]
        ignore_resource_errors: bool,
        /// Overall time limit in seconds
        #[arg(long, value_name = "SECS")]
        timeout: Option<u64>,
        /// Directory holding the Terraform configuration
        #[arg(long, value_name = "DIR")]
        terraform_dir: Option<PathBuf>,
        /// Read the declared state from a `terraform show -json` dump
        #[arg(long, value_name = "FILE")]
        state_file: Option<PathBuf>,
        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },
    /// Show version information
    Version,
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Version => {
            println!("driftcheck {}", env!("CARGO_PKG_VERSION"));
        }
        Commands::Verify {
            environment,
            env_flag,
            suffix,
            skip_plan,
            ignore_resource_errors,
            timeout,
            terraform_dir,
            state_file,
            format,
        } => {
            let args = commands::verify::VerifyArgs {
                environment: environment.or(env_flag),
                suffix,
                skip_plan,
                ignore_resource_errors,
                timeout,
                terraform_dir,
                state_file,
                format,
            };
            let exit_code = commands::verify::handle(args).await?;
            std::process::exit(exit_code);
        }
    }

    Ok(())
}
