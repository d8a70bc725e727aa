//! Count comparison

use crate::model::{CoreKind, ResourceCounts, SERVICE_GROUPS, ServiceMetric};
use serde::{Deserialize, Serialize};

/// One compared count
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparisonRow {
    pub label: String,
    pub live: i64,
    pub declared: i64,
    pub is_match: bool,
}

impl ComparisonRow {
    pub fn new(label: impl Into<String>, live: i64, declared: i64) -> Self {
        Self {
            label: label.into(),
            live,
            declared,
            is_match: live == declared,
        }
    }
}

/// Number of rows [`compare`] always returns
pub const ROW_COUNT: usize = CoreKind::ALL.len() + SERVICE_GROUPS.len() * ServiceMetric::ALL.len();

/// Compare live against declared counts
///
/// Rows come in a fixed order: core kinds, then every known service group
/// with its three metrics. A group missing on either side counts as zero.
pub fn compare(live: &ResourceCounts, declared: &ResourceCounts) -> Vec<ComparisonRow> {
    let mut rows = Vec::with_capacity(ROW_COUNT);

    for kind in CoreKind::ALL {
        rows.push(ComparisonRow::new(
            kind.as_str(),
            live.core(kind),
            declared.core(kind),
        ));
    }

    for group in SERVICE_GROUPS {
        let live_group = live.service(group);
        let declared_group = declared.service(group);
        for metric in ServiceMetric::ALL {
            rows.push(ComparisonRow::new(
                format!("{}/{}", group, metric),
                live_group.get(metric),
                declared_group.get(metric),
            ));
        }
    }

    rows
}

pub fn all_match(rows: &[ComparisonRow]) -> bool {
    rows.iter().all(|row| row.is_match)
}
