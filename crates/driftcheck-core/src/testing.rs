//! Scripted executor for unit tests

use crate::context::RunContext;
use crate::error::CommandError;
use crate::executor::ContextCommandExecutor;
use crate::model::SERVICE_GROUPS;
use async_trait::async_trait;
use serde_json::{Value, json};
use std::sync::Mutex;
use std::time::Duration;

#[derive(Debug, Clone)]
pub enum Reply {
    Ok(String),
    Fail { code: i32, stderr: String },
    /// Waits until the context stops and returns its error
    Hang,
    /// Sleeps without watching the context, then fails
    SlowFail(Duration),
    /// Cancels the context, then succeeds
    CancelThen(String),
}

impl Reply {
    pub fn ok(stdout: &str) -> Self {
        Reply::Ok(stdout.to_string())
    }

    pub fn not_found(what: &str) -> Self {
        Reply::Fail {
            code: 254,
            stderr: format!(
                "An error occurred ({}) when calling the operation: not found",
                what
            ),
        }
    }

    pub fn fail(code: i32, stderr: &str) -> Self {
        Reply::Fail {
            code,
            stderr: stderr.to_string(),
        }
    }
}

/// Replies to commands whose rendered command line contains a pattern
///
/// Rules are checked in insertion order; unmatched commands fail.
#[derive(Default)]
pub struct ScriptedExecutor {
    rules: Vec<(String, Reply)>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(mut self, pattern: &str, reply: Reply) -> Self {
        self.rules.push((pattern.to_string(), reply));
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn called(&self, pattern: &str) -> bool {
        self.calls().iter().any(|c| c.contains(pattern))
    }
}

#[async_trait]
impl ContextCommandExecutor for ScriptedExecutor {
    async fn execute_with_context(
        &self,
        ctx: &RunContext,
        command: &str,
        args: &[String],
    ) -> Result<String, CommandError> {
        ctx.check()?;

        let line = std::iter::once(command.to_string())
            .chain(args.iter().cloned())
            .collect::<Vec<_>>()
            .join(" ");
        self.calls.lock().unwrap().push(line.clone());

        let reply = self
            .rules
            .iter()
            .find(|(pattern, _)| line.contains(pattern.as_str()))
            .map(|(_, reply)| reply.clone())
            .unwrap_or_else(|| Reply::fail(1, &format!("unexpected command: {}", line)));

        match reply {
            Reply::Ok(stdout) => Ok(stdout),
            Reply::Fail { code, stderr } => Err(CommandError::Exited {
                command: command.to_string(),
                code: Some(code),
                stderr,
            }),
            Reply::Hang => Err(ctx.done().await.into()),
            Reply::CancelThen(stdout) => {
                ctx.cancel();
                Ok(stdout)
            }
            Reply::SlowFail(delay) => {
                tokio::time::sleep(delay).await;
                Err(CommandError::Exited {
                    command: command.to_string(),
                    code: Some(1),
                    stderr: "connection reset".to_string(),
                })
            }
        }
    }
}

/// Executor answering every live query of a healthy environment with `count`
pub fn uniform_environment(count: i64) -> ScriptedExecutor {
    ScriptedExecutor::new().on("aws ", Reply::Ok(format!("{}\n", count)))
}

/// `terraform show -json` output with `core` = [network, database, cluster]
/// resources and `per_service` of each service resource in every group
pub fn state_document(core: [usize; 3], per_service: usize) -> String {
    let mut root = Vec::new();
    for (resource_type, count) in ["aws_vpc", "aws_db_instance", "aws_ecs_cluster"]
        .iter()
        .zip(core)
    {
        for i in 0..count {
            root.push(resource(resource_type, &format!("{}.r{}", resource_type, i)));
        }
    }

    let children: Vec<Value> = SERVICE_GROUPS
        .iter()
        .map(|group| {
            let mut resources = Vec::new();
            for resource_type in ["aws_ecs_service", "aws_lb", "aws_lb_target_group"] {
                for i in 0..per_service {
                    let address = format!("module.{}.{}.r{}", group, resource_type, i);
                    resources.push(resource(resource_type, &address));
                }
            }
            json!({ "address": format!("module.{}", group), "resources": resources })
        })
        .collect();

    json!({
        "format_version": "1.0",
        "values": { "root_module": { "resources": root, "child_modules": children } }
    })
    .to_string()
}

fn resource(resource_type: &str, address: &str) -> Value {
    json!({
        "type": resource_type,
        "address": address,
        "values": { "id": format!("id-{}", address) }
    })
}
