//! Student load metrics derived from the per-student credit rows.

use std::collections::BTreeMap;

use crate::models::{StudentLoadMetrics, StudentLoadRow};

/// Students below this many enrolled credits count as under-loaded.
pub const FULL_TIME_CREDITS: i64 = 12;

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub fn student_load_metrics(rows: &[StudentLoadRow]) -> StudentLoadMetrics {
    if rows.is_empty() {
        return StudentLoadMetrics {
            average_credits: 0.0,
            under_loaded_count: 0,
            distribution_percent: BTreeMap::new(),
        };
    }

    let total = rows.len() as f64;
    let sum: i64 = rows.iter().map(|r| r.total_credits).sum();

    let mut counts: BTreeMap<i64, usize> = BTreeMap::new();
    for row in rows {
        *counts.entry(row.total_credits).or_default() += 1;
    }

    StudentLoadMetrics {
        average_credits: round2(sum as f64 / total),
        under_loaded_count: rows
            .iter()
            .filter(|r| r.total_credits < FULL_TIME_CREDITS)
            .count(),
        distribution_percent: counts
            .into_iter()
            .map(|(credits, n)| (credits, round2(n as f64 * 100.0 / total)))
            .collect(),
    }
}
