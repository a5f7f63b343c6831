//! Column transformer: standardised numerics, one-hot categoricals,
//! booleans passed through as 0/1.

use std::collections::BTreeSet;

use crate::dataset::schema::{N_BOOLEAN, N_CATEGORICAL, N_NUMERIC};
use crate::dataset::FeatureRow;

#[derive(Debug, Clone, PartialEq)]
pub struct Preprocessor {
    means: [f64; N_NUMERIC],
    scales: [f64; N_NUMERIC],
    /// Sorted category vocabulary per categorical column.
    vocabularies: Vec<Vec<String>>,
}

impl Preprocessor {
    /// Learn scaling parameters and vocabularies from the training rows.
    ///
    /// Scale is the population standard deviation; a constant column scales
    /// by 1. Missing numeric values are ignored here and encoded as the mean
    /// (0 after scaling) by `transform`.
    pub fn fit<'a>(rows: impl IntoIterator<Item = &'a FeatureRow> + Clone) -> Self {
        let mut means = [0.0f64; N_NUMERIC];
        let mut scales = [1.0f64; N_NUMERIC];

        for col in 0..N_NUMERIC {
            let vals: Vec<f64> = rows.clone().into_iter().filter_map(|r| r.numeric[col]).collect();
            if vals.is_empty() {
                continue;
            }
            let n = vals.len() as f64;
            let mean = vals.iter().sum::<f64>() / n;
            let var = vals.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
            let std = var.sqrt();
            means[col] = mean;
            scales[col] = if std > 0.0 { std } else { 1.0 };
        }

        let vocabularies = (0..N_CATEGORICAL)
            .map(|col| {
                rows.clone()
                    .into_iter()
                    .map(|r| r.categorical[col].clone())
                    .collect::<BTreeSet<String>>()
                    .into_iter()
                    .collect()
            })
            .collect();

        Self { means, scales, vocabularies }
    }

    /// Width of the encoded vector.
    pub fn n_outputs(&self) -> usize {
        N_NUMERIC + self.vocabularies.iter().map(Vec::len).sum::<usize>() + N_BOOLEAN
    }

    /// Encode one row. Categories never seen at fit time encode as all zeros.
    pub fn transform(&self, row: &FeatureRow) -> Vec<f64> {
        let mut out = Vec::with_capacity(self.n_outputs());

        for col in 0..N_NUMERIC {
            let v = row.numeric[col].map_or(0.0, |x| (x - self.means[col]) / self.scales[col]);
            out.push(v);
        }

        for (col, vocab) in self.vocabularies.iter().enumerate() {
            let hit = vocab.binary_search(&row.categorical[col]).ok();
            out.extend((0..vocab.len()).map(|i| if Some(i) == hit { 1.0 } else { 0.0 }));
        }

        out.extend(row.boolean.iter().map(|&b| if b { 1.0 } else { 0.0 }));
        out
    }
}
