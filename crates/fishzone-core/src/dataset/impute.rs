//! Load-time imputation and rank helpers.

use std::collections::BTreeMap;

/// Median of the given values. Even counts average the two middle values.
/// Returns None for an empty slice.
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// Fill missing entries of `column` with the median of the same column within
/// the row's group. Rows without a group key are left untouched, as are groups
/// with no observed value.
pub fn fill_group_median(column: &mut [Option<f64>], groups: &[Option<&str>]) {
    debug_assert_eq!(column.len(), groups.len());

    let mut observed: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    for (value, group) in column.iter().zip(groups) {
        if let (Some(v), Some(g)) = (value, group) {
            observed.entry(g).or_default().push(*v);
        }
    }
    let medians: BTreeMap<&str, f64> = observed
        .into_iter()
        .filter_map(|(g, vals)| median(&vals).map(|m| (g, m)))
        .collect();

    for (value, group) in column.iter_mut().zip(groups) {
        if value.is_none() {
            if let Some(m) = group.and_then(|g| medians.get(g)) {
                *value = Some(*m);
            }
        }
    }
}

/// Max-method rank of each value divided by `values.len()`.
///
/// Tied values all take the highest rank of their tie group. Missing values
/// stay missing but still count towards the denominator.
pub fn max_rank_fraction(values: &[Option<f64>]) -> Vec<Option<f64>> {
    let n = values.len() as f64;
    let mut sorted: Vec<f64> = values.iter().flatten().copied().collect();
    sorted.sort_by(f64::total_cmp);
    values
        .iter()
        .map(|v| {
            v.map(|x| {
                let rank = sorted.partition_point(|&s| s <= x);
                rank as f64 / n
            })
        })
        .collect()
}
