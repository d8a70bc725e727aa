//! External command execution
//!
//! Every live query, the declared-state read and the plan check go through
//! these traits, so tests can substitute scripted executors.

use crate::context::RunContext;
use crate::error::CommandError;
use async_trait::async_trait;
use std::process::{Output, Stdio};
use tokio::process::Command;

/// Runs a command to completion and returns its stdout
#[async_trait]
pub trait CommandExecutor: Send + Sync {
    async fn execute(&self, command: &str, args: &[String]) -> Result<String, CommandError>;
}

/// Runs a command bound to a [`RunContext`]
///
/// Implementations return the context's error as soon as it is cancelled or
/// expires, instead of waiting for the command to finish.
#[async_trait]
pub trait ContextCommandExecutor: Send + Sync {
    async fn execute_with_context(
        &self,
        ctx: &RunContext,
        command: &str,
        args: &[String],
    ) -> Result<String, CommandError>;
}

/// Executor backed by real child processes
#[derive(Debug, Clone, Default)]
pub struct ProcessExecutor;

impl ProcessExecutor {
    pub fn new() -> Self {
        Self
    }

    fn build(&self, command: &str, args: &[String]) -> Command {
        let mut cmd = Command::new(command);
        cmd.args(args);
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());
        // Dropping the output future on cancellation kills the child
        cmd.kill_on_drop(true);

        tracing::debug!("Running: {} {}", command, args.join(" "));
        cmd
    }
}

fn collect(command: &str, output: Output) -> Result<String, CommandError> {
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(CommandError::Exited {
            command: command.to_string(),
            code: output.status.code(),
            stderr: stderr.to_string(),
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).to_string())
}

#[async_trait]
impl CommandExecutor for ProcessExecutor {
    async fn execute(&self, command: &str, args: &[String]) -> Result<String, CommandError> {
        let output = self
            .build(command, args)
            .output()
            .await
            .map_err(|source| CommandError::Spawn {
                command: command.to_string(),
                source,
            })?;

        collect(command, output)
    }
}

#[async_trait]
impl ContextCommandExecutor for ProcessExecutor {
    async fn execute_with_context(
        &self,
        ctx: &RunContext,
        command: &str,
        args: &[String],
    ) -> Result<String, CommandError> {
        ctx.check()?;

        let mut cmd = self.build(command, args);
        let result = tokio::select! {
            biased;
            e = ctx.done() => {
                tracing::debug!("{} interrupted: {}", command, e);
                return Err(e.into());
            }
            output = cmd.output() => output,
        };

        let output = result.map_err(|source| CommandError::Spawn {
            command: command.to_string(),
            source,
        })?;

        match collect(command, output) {
            // A failure racing the deadline is reported as the deadline
            Err(e) => Err(ctx.err().map(CommandError::from).unwrap_or(e)),
            ok => ok,
        }
    }
}

/// Upgrades a plain [`CommandExecutor`] into a [`ContextCommandExecutor`]
///
/// The context is checked once before dispatch. A cancellation or deadline
/// arriving while the command runs is not observed until it returns.
#[derive(Debug, Clone)]
pub struct ContextAdapter<E> {
    inner: E,
}

impl<E: CommandExecutor> ContextAdapter<E> {
    pub fn new(inner: E) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<E: CommandExecutor> ContextCommandExecutor for ContextAdapter<E> {
    async fn execute_with_context(
        &self,
        ctx: &RunContext,
        command: &str,
        args: &[String],
    ) -> Result<String, CommandError> {
        ctx.check()?;
        self.inner.execute(command, args).await
    }
}
