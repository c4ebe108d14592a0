//! Top-N ranking of frequency tables.

use crate::aggregate::FrequencyTable;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedEntry {
    pub key: String,
    pub count: u64,
    /// Share of the table's total, 0-100
    pub percentage: f64,
}

/// The `limit` highest counts, descending. Ties are ordered by key so the
/// result never depends on table iteration order.
pub fn top_n(table: &FrequencyTable, limit: usize) -> Vec<RankedEntry> {
    let total = table.total();
    let mut entries: Vec<(&str, u64)> = table.iter().collect();
    entries.sort_unstable_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    entries
        .into_iter()
        .take(limit)
        .map(|(key, count)| RankedEntry {
            key: key.to_string(),
            count,
            percentage: percentage(count, total),
        })
        .collect()
}

#[inline]
pub fn percentage(count: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64 * 100.0
    }
}
