//! Live resource fetching
//!
//! Queries run in dependency order: network, then database and cluster,
//! then the service groups hosted on the cluster.

use crate::aws::{self, AwsCli};
use crate::context::RunContext;
use crate::error::{CommandError, Result, VerifyError};
use crate::executor::ContextCommandExecutor;
use crate::model::{CoreKind, ResourceCounts, SERVICE_GROUPS, ServiceResourceCounts};
use crate::options::VerificationOptions;
use std::sync::Arc;

/// Fetches live resource counts for an environment
pub struct LiveResourceFetcher {
    aws: AwsCli,
}

impl LiveResourceFetcher {
    pub fn new(executor: Arc<dyn ContextCommandExecutor>) -> Self {
        Self {
            aws: AwsCli::new(executor),
        }
    }

    pub async fn fetch(
        &self,
        ctx: &RunContext,
        options: &VerificationOptions,
    ) -> Result<ResourceCounts> {
        let env = options.environment.as_str();
        let mut counts = ResourceCounts::new();

        let network = settle(options, "network", self.aws.count_networks(ctx, env).await)?;
        counts.set_core(CoreKind::Network, network.unwrap_or(0));
        if network.is_none() {
            tracing::warn!("Network unavailable, skipping database and cluster queries");
            return Ok(counts);
        }

        let database = settle(options, "database", self.aws.count_databases(ctx, env).await)?;
        counts.set_core(CoreKind::Database, database.unwrap_or(0));

        let cluster_name = aws::cluster_name(env);
        let cluster = settle(
            options,
            "cluster",
            self.aws.count_clusters(ctx, &cluster_name).await,
        )?;
        counts.set_core(CoreKind::Cluster, cluster.unwrap_or(0));

        match cluster {
            Some(n) if n > 0 => {}
            _ => {
                tracing::debug!("No active cluster {}, skipping service groups", cluster_name);
                return Ok(counts);
            }
        }

        for group in SERVICE_GROUPS {
            if let Some(service) = self.fetch_group(ctx, options, &cluster_name, group).await? {
                counts.services.insert(group.to_string(), service);
            }
        }

        tracing::debug!("Fetched live counts: {:?}", counts);
        Ok(counts)
    }

    /// `None` when one of the group's resources was missing and ignored
    async fn fetch_group(
        &self,
        ctx: &RunContext,
        options: &VerificationOptions,
        cluster: &str,
        group: &str,
    ) -> Result<Option<ServiceResourceCounts>> {
        let env = options.environment.as_str();
        let suffix = options.suffix_str();

        let service = aws::service_name(env, group, suffix);
        let Some(instances) = settle(
            options,
            &service,
            self.aws.count_services(ctx, cluster, &service).await,
        )?
        else {
            return Ok(None);
        };

        let alb = aws::load_balancer_name(env, group, suffix);
        let Some(load_balancers) =
            settle(options, &alb, self.aws.count_load_balancers(ctx, &alb).await)?
        else {
            return Ok(None);
        };

        let tg = aws::target_group_name(env, group, suffix);
        let Some(target_groups) =
            settle(options, &tg, self.aws.count_target_groups(ctx, &tg).await)?
        else {
            return Ok(None);
        };

        Ok(Some(ServiceResourceCounts {
            instances,
            load_balancers,
            target_groups,
        }))
    }
}

/// Apply the partial-failure policy to one query result
///
/// `Ok(None)` means a not-found error was ignored: the count is zero and
/// anything depending on the resource is skipped.
fn settle(
    options: &VerificationOptions,
    resource: &str,
    result: std::result::Result<i64, CommandError>,
) -> Result<Option<i64>> {
    match result {
        Ok(count) => Ok(Some(count)),
        Err(e) if options.ignore_resource_errors && e.is_not_found() => {
            tracing::warn!(
                "{} not found in environment '{}', counting as 0: {}",
                resource,
                options.environment,
                e
            );
            Ok(None)
        }
        Err(e) => Err(VerifyError::resource(resource, &options.environment, e)),
    }
}
