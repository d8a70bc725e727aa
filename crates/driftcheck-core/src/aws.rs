//! aws CLI wrapper
//!
//! Each query asks the CLI for a JMESPath `length(...)` with text output, so
//! every response is a single integer.

use crate::context::RunContext;
use crate::error::CommandError;
use crate::executor::ContextCommandExecutor;
use std::sync::Arc;

const AWS: &str = "aws";

pub fn cluster_name(environment: &str) -> String {
    format!("{}-shared-cluster", environment)
}

pub fn service_name(environment: &str, group: &str, suffix: &str) -> String {
    format!("{}-{}{}", environment, group, suffix)
}

pub fn load_balancer_name(environment: &str, group: &str, suffix: &str) -> String {
    format!("{}-alb", service_name(environment, group, suffix))
}

pub fn target_group_name(environment: &str, group: &str, suffix: &str) -> String {
    format!("{}-tg", service_name(environment, group, suffix))
}

/// aws CLI wrapper issuing count queries
#[derive(Clone)]
pub struct AwsCli {
    executor: Arc<dyn ContextCommandExecutor>,
}

impl AwsCli {
    pub fn new(executor: Arc<dyn ContextCommandExecutor>) -> Self {
        Self { executor }
    }

    /// Run an aws command and parse its output as a count
    async fn run_count(&self, ctx: &RunContext, args: &[&str]) -> Result<i64, CommandError> {
        let mut owned: Vec<String> = args.iter().map(|a| a.to_string()).collect();
        owned.extend(["--output".to_string(), "text".to_string()]);

        let output = self.executor.execute_with_context(ctx, AWS, &owned).await?;
        parse_count(&output)
    }

    /// VPCs tagged with the environment
    pub async fn count_networks(
        &self,
        ctx: &RunContext,
        environment: &str,
    ) -> Result<i64, CommandError> {
        let filter = format!("Name=tag:Environment,Values={}", environment);
        self.run_count(
            ctx,
            &[
                "ec2",
                "describe-vpcs",
                "--filters",
                &filter,
                "--query",
                "length(Vpcs)",
            ],
        )
        .await
    }

    /// RDS instances whose identifier starts with the environment name
    pub async fn count_databases(
        &self,
        ctx: &RunContext,
        environment: &str,
    ) -> Result<i64, CommandError> {
        let query = format!(
            "length(DBInstances[?starts_with(DBInstanceIdentifier, '{}-')])",
            environment
        );
        self.run_count(ctx, &["rds", "describe-db-instances", "--query", &query])
            .await
    }

    /// Active ECS clusters with the given name
    pub async fn count_clusters(
        &self,
        ctx: &RunContext,
        cluster: &str,
    ) -> Result<i64, CommandError> {
        self.run_count(
            ctx,
            &[
                "ecs",
                "describe-clusters",
                "--clusters",
                cluster,
                "--query",
                "length(clusters[?status=='ACTIVE'])",
            ],
        )
        .await
    }

    /// Active ECS services with the given name in a cluster
    pub async fn count_services(
        &self,
        ctx: &RunContext,
        cluster: &str,
        service: &str,
    ) -> Result<i64, CommandError> {
        self.run_count(
            ctx,
            &[
                "ecs",
                "describe-services",
                "--cluster",
                cluster,
                "--services",
                service,
                "--query",
                "length(services[?status=='ACTIVE'])",
            ],
        )
        .await
    }

    pub async fn count_load_balancers(
        &self,
        ctx: &RunContext,
        name: &str,
    ) -> Result<i64, CommandError> {
        self.run_count(
            ctx,
            &[
                "elbv2",
                "describe-load-balancers",
                "--names",
                name,
                "--query",
                "length(LoadBalancers)",
            ],
        )
        .await
    }

    pub async fn count_target_groups(
        &self,
        ctx: &RunContext,
        name: &str,
    ) -> Result<i64, CommandError> {
        self.run_count(
            ctx,
            &[
                "elbv2",
                "describe-target-groups",
                "--names",
                name,
                "--query",
                "length(TargetGroups)",
            ],
        )
        .await
    }
}

fn parse_count(output: &str) -> Result<i64, CommandError> {
    output
        .trim()
        .parse::<i64>()
        .map_err(|_| CommandError::InvalidOutput {
            command: AWS.to_string(),
            output: output.to_string(),
        })
}
