//! Resource count model shared by both sides of a comparison

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Service groups in reporting order
pub const SERVICE_GROUPS: [&str; 3] = ["api", "graphql", "grpc"];

/// Suffixes used by past parallel deployments of a service group
pub const KNOWN_SUFFIXES: [&str; 4] = ["-blue", "-green", "-v2", "-canary"];

/// Infrastructure shared by the whole environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoreKind {
    Network,
    Database,
    Cluster,
}

impl CoreKind {
    pub const ALL: [CoreKind; 3] = [CoreKind::Network, CoreKind::Database, CoreKind::Cluster];

    /// Classify a Terraform resource type
    pub fn from_resource_type(resource_type: &str) -> Option<Self> {
        match resource_type {
            "aws_vpc" => Some(CoreKind::Network),
            "aws_db_instance" | "aws_rds_cluster" => Some(CoreKind::Database),
            "aws_ecs_cluster" => Some(CoreKind::Cluster),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CoreKind::Network => "network",
            CoreKind::Database => "database",
            CoreKind::Cluster => "cluster",
        }
    }
}

impl std::fmt::Display for CoreKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The three resources making up one service group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceMetric {
    Instances,
    LoadBalancers,
    TargetGroups,
}

impl ServiceMetric {
    pub const ALL: [ServiceMetric; 3] = [
        ServiceMetric::Instances,
        ServiceMetric::LoadBalancers,
        ServiceMetric::TargetGroups,
    ];

    pub fn from_resource_type(resource_type: &str) -> Option<Self> {
        match resource_type {
            "aws_ecs_service" => Some(ServiceMetric::Instances),
            "aws_lb" | "aws_alb" => Some(ServiceMetric::LoadBalancers),
            "aws_lb_target_group" | "aws_alb_target_group" => Some(ServiceMetric::TargetGroups),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceMetric::Instances => "service-instances",
            ServiceMetric::LoadBalancers => "load-balancers",
            ServiceMetric::TargetGroups => "target-groups",
        }
    }
}

impl std::fmt::Display for ServiceMetric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Counts for one service group
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceResourceCounts {
    pub instances: i64,
    pub load_balancers: i64,
    pub target_groups: i64,
}

impl ServiceResourceCounts {
    pub fn get(&self, metric: ServiceMetric) -> i64 {
        match metric {
            ServiceMetric::Instances => self.instances,
            ServiceMetric::LoadBalancers => self.load_balancers,
            ServiceMetric::TargetGroups => self.target_groups,
        }
    }

    pub fn increment(&mut self, metric: ServiceMetric) {
        match metric {
            ServiceMetric::Instances => self.instances += 1,
            ServiceMetric::LoadBalancers => self.load_balancers += 1,
            ServiceMetric::TargetGroups => self.target_groups += 1,
        }
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::default()
    }
}

/// Per-type resource counts for one side of the comparison
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceCounts {
    pub core: BTreeMap<CoreKind, i64>,
    pub services: BTreeMap<String, ServiceResourceCounts>,
}

impl Default for ResourceCounts {
    fn default() -> Self {
        Self {
            core: CoreKind::ALL.iter().map(|kind| (*kind, 0)).collect(),
            services: BTreeMap::new(),
        }
    }
}

impl ResourceCounts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn core(&self, kind: CoreKind) -> i64 {
        self.core.get(&kind).copied().unwrap_or(0)
    }

    pub fn set_core(&mut self, kind: CoreKind, count: i64) {
        self.core.insert(kind, count);
    }

    pub fn increment_core(&mut self, kind: CoreKind) {
        *self.core.entry(kind).or_insert(0) += 1;
    }

    /// Counts for a group, the zero record when the group is absent
    pub fn service(&self, group: &str) -> ServiceResourceCounts {
        self.services.get(group).copied().unwrap_or_default()
    }

    pub fn service_mut(&mut self, group: &str) -> &mut ServiceResourceCounts {
        self.services.entry(group.to_string()).or_default()
    }

    /// True when every core and service count is zero
    pub fn is_empty(&self) -> bool {
        self.core.values().all(|count| *count == 0)
            && self.services.values().all(ServiceResourceCounts::is_zero)
    }
}
