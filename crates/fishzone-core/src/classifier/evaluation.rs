use serde::{Deserialize, Serialize};

use crate::zone::{Zone, N_ZONES};

/// Precision, recall and F1 for one zone.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AveragedMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
}

/// Per-class report over the zones that occur in either the true or the
/// predicted labels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationReport {
    pub per_class: Vec<(Zone, ClassMetrics)>,
    pub macro_avg: AveragedMetrics,
    pub weighted_avg: AveragedMetrics,
}

impl ClassificationReport {
    pub fn metrics(&self, zone: Zone) -> Option<&ClassMetrics> {
        self.per_class.iter().find(|(z, _)| *z == zone).map(|(_, m)| m)
    }
}

/// Held-out evaluation of a trained classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationSummary {
    pub accuracy: f64,
    pub report: ClassificationReport,
    /// Rows are true zones, columns predicted zones, both ordered
    /// Green, Yellow, Red.
    pub confusion_matrix: [[usize; N_ZONES]; N_ZONES],
    pub labels: [Zone; N_ZONES],
    pub n_train: usize,
    pub n_test: usize,
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

pub fn confusion_matrix(y_true: &[Zone], y_pred: &[Zone]) -> [[usize; N_ZONES]; N_ZONES] {
    let mut m = [[0usize; N_ZONES]; N_ZONES];
    for (t, p) in y_true.iter().zip(y_pred) {
        m[t.index()][p.index()] += 1;
    }
    m
}

pub fn classification_report(y_true: &[Zone], y_pred: &[Zone]) -> ClassificationReport {
    let cm = confusion_matrix(y_true, y_pred);
    let mut per_class = Vec::with_capacity(N_ZONES);

    for zone in Zone::ALL {
        let k = zone.index();
        let tp = cm[k][k];
        let support: usize = cm[k].iter().sum();
        let predicted: usize = cm.iter().map(|row| row[k]).sum();
        if support == 0 && predicted == 0 {
            continue;
        }
        let precision = ratio(tp, predicted);
        let recall = ratio(tp, support);
        let f1 = if precision + recall > 0.0 {
            2.0 * precision * recall / (precision + recall)
        } else {
            0.0
        };
        per_class.push((zone, ClassMetrics { precision, recall, f1, support }));
    }

    let n_classes = per_class.len().max(1) as f64;
    let total_support: usize = per_class.iter().map(|(_, m)| m.support).sum();
    let mut macro_avg = AveragedMetrics { precision: 0.0, recall: 0.0, f1: 0.0 };
    let mut weighted_avg = macro_avg;
    for (_, m) in &per_class {
        macro_avg.precision += m.precision / n_classes;
        macro_avg.recall += m.recall / n_classes;
        macro_avg.f1 += m.f1 / n_classes;
        let w = ratio(m.support, total_support);
        weighted_avg.precision += m.precision * w;
        weighted_avg.recall += m.recall * w;
        weighted_avg.f1 += m.f1 * w;
    }

    ClassificationReport { per_class, macro_avg, weighted_avg }
}

pub fn evaluate(y_true: &[Zone], y_pred: &[Zone], n_train: usize) -> EvaluationSummary {
    let correct = y_true.iter().zip(y_pred).filter(|(t, p)| t == p).count();
    EvaluationSummary {
        accuracy: ratio(correct, y_true.len()),
        report: classification_report(y_true, y_pred),
        confusion_matrix: confusion_matrix(y_true, y_pred),
        labels: Zone::ALL,
        n_train,
        n_test: y_true.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use crate::zone::Zone::*;

    #[test]
    fn perfect_predictions() {
        let y = [Green, Yellow, Red, Red];
        let s = evaluate(&y, &y, 10);
        assert_relative_eq!(s.accuracy, 1.0);
        assert_eq!(s.confusion_matrix, [[1, 0, 0], [0, 1, 0], [0, 0, 2]]);
        assert_relative_eq!(s.report.macro_avg.f1, 1.0);
        assert_eq!(s.n_train, 10);
        assert_eq!(s.n_test, 4);
    }

    #[test]
    fn mixed_predictions() {
        let t = [Green, Green, Yellow, Red];
        let p = [Green, Yellow, Yellow, Green];
        let s = evaluate(&t, &p, 0);
        assert_relative_eq!(s.accuracy, 0.5);
        assert_eq!(s.confusion_matrix, [[1, 1, 0], [0, 1, 0], [1, 0, 0]]);

        let green = s.report.metrics(Green).unwrap();
        assert_relative_eq!(green.precision, 0.5);
        assert_relative_eq!(green.recall, 0.5);
        assert_eq!(green.support, 2);

        let red = s.report.metrics(Red).unwrap();
        assert_relative_eq!(red.precision, 0.0);
        assert_relative_eq!(red.f1, 0.0);

        // Weighted by support 2/1/1.
        let yellow_f1 = 2.0 * 0.5 * 1.0 / 1.5;
        assert_relative_eq!(s.report.weighted_avg.f1, (0.5 * 2.0 + yellow_f1) / 4.0, epsilon = 1e-12);
    }

    #[test]
    fn absent_zones_are_left_out() {
        let y = [Green, Yellow];
        let r = classification_report(&y, &y);
        assert_eq!(r.per_class.len(), 2);
        assert!(r.metrics(Red).is_none());
    }
}
