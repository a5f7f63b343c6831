//! Class-weighted random forest over encoded feature vectors.
//!
//! Each tree is a CART tree grown on a bootstrap sample, choosing the best
//! weighted-Gini split among `sqrt(n_features)` randomly drawn features at
//! every node. Leaves store the weighted class distribution; the forest
//! probability is the mean of the leaf distributions reached by a sample.

use rand::distributions::{Distribution, Uniform};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
#[cfg(feature = "threading")]
use rayon::prelude::*;

use crate::zone::N_ZONES;

/// Tree growth settings shared by every tree of a forest.
#[derive(Debug, Clone, PartialEq)]
pub struct ForestConfig {
    pub n_estimators: usize,
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    /// Sample weight per class index.
    pub class_weights: [f64; N_ZONES],
    pub seed: u64,
}

#[derive(Debug, Clone, PartialEq)]
enum TreeNode {
    Split {
        feature: usize,
        /// Samples with `x[feature] <= threshold` go left.
        threshold: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
    },
    Leaf {
        proba: [f64; N_ZONES],
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct DecisionTree {
    root: TreeNode,
}

impl DecisionTree {
    pub fn predict_proba(&self, x: &[f64]) -> [f64; N_ZONES] {
        let mut node = &self.root;
        loop {
            match node {
                TreeNode::Leaf { proba } => return *proba,
                TreeNode::Split { feature, threshold, left, right } => {
                    node = if x[*feature] <= *threshold { left } else { right };
                }
            }
        }
    }

    pub fn depth(&self) -> usize {
        fn depth_of(node: &TreeNode) -> usize {
            match node {
                TreeNode::Leaf { .. } => 0,
                TreeNode::Split { left, right, .. } => 1 + depth_of(left).max(depth_of(right)),
            }
        }
        depth_of(&self.root)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RandomForest {
    trees: Vec<DecisionTree>,
    n_features: usize,
}

impl RandomForest {
    /// Grow the forest. `x` rows must all have the same width; `y` holds
    /// class indices below `N_ZONES`.
    ///
    /// Per-tree seeds are drawn up front from `config.seed`, so parallel and
    /// sequential training produce the same forest.
    pub fn fit(x: &[Vec<f64>], y: &[usize], config: &ForestConfig) -> Self {
        let n_features = x.first().map_or(0, Vec::len);
        let mut master = StdRng::seed_from_u64(config.seed);
        let tree_seeds: Vec<u64> = (0..config.n_estimators).map(|_| master.gen()).collect();

        let grow = |seed: u64| {
            let mut builder = TreeBuilder {
                x,
                y,
                config,
                max_features: max_features(n_features),
                rng: StdRng::seed_from_u64(seed),
            };
            builder.grow()
        };

        #[cfg(feature = "threading")]
        let trees: Vec<DecisionTree> = tree_seeds.par_iter().map(|&s| grow(s)).collect();
        #[cfg(not(feature = "threading"))]
        let trees: Vec<DecisionTree> = tree_seeds.iter().map(|&s| grow(s)).collect();

        Self { trees, n_features }
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn trees(&self) -> &[DecisionTree] {
        &self.trees
    }

    /// Mean of per-tree leaf distributions. Sums to 1 for a fitted forest.
    pub fn predict_proba(&self, x: &[f64]) -> [f64; N_ZONES] {
        let mut acc = [0.0f64; N_ZONES];
        if self.trees.is_empty() {
            return acc;
        }
        for tree in &self.trees {
            let p = tree.predict_proba(x);
            for (a, v) in acc.iter_mut().zip(p) {
                *a += v;
            }
        }
        let n = self.trees.len() as f64;
        acc.map(|a| a / n)
    }
}

/// Number of candidate features per split: `max(1, floor(sqrt(n)))`.
fn max_features(n_features: usize) -> usize {
    ((n_features as f64).sqrt().floor() as usize).max(1).min(n_features.max(1))
}

/// Sample `n` row indices with replacement.
fn bootstrap_sample(n: usize, rng: &mut StdRng) -> Vec<usize> {
    if n == 0 {
        return Vec::new();
    }
    let dist = Uniform::from(0..n);
    (0..n).map(|_| dist.sample(rng)).collect()
}

struct TreeBuilder<'a> {
    x: &'a [Vec<f64>],
    y: &'a [usize],
    config: &'a ForestConfig,
    max_features: usize,
    rng: StdRng,
}

struct SplitCandidate {
    feature: usize,
    threshold: f64,
    gain: f64,
}

impl TreeBuilder<'_> {
    fn grow(&mut self) -> DecisionTree {
        let indices = bootstrap_sample(self.y.len(), &mut self.rng);
        DecisionTree { root: self.build(indices, 0) }
    }

    fn class_totals(&self, indices: &[usize]) -> [f64; N_ZONES] {
        let mut totals = [0.0f64; N_ZONES];
        for &i in indices {
            let c = self.y[i];
            totals[c] += self.config.class_weights[c];
        }
        totals
    }

    fn leaf(totals: [f64; N_ZONES]) -> TreeNode {
        let sum: f64 = totals.iter().sum();
        let proba = if sum > 0.0 { totals.map(|t| t / sum) } else { [1.0 / N_ZONES as f64; N_ZONES] };
        TreeNode::Leaf { proba }
    }

    fn build(&mut self, indices: Vec<usize>, depth: usize) -> TreeNode {
        let totals = self.class_totals(&indices);
        let n = indices.len();
        let pure = totals.iter().filter(|&&t| t > 0.0).count() <= 1;
        let depth_reached = self.config.max_depth.is_some_and(|d| depth >= d);

        if pure
            || depth_reached
            || n < self.config.min_samples_split
            || n < 2 * self.config.min_samples_leaf
        {
            return Self::leaf(totals);
        }

        let Some(split) = self.best_split(&indices, totals) else {
            return Self::leaf(totals);
        };

        let (left, right): (Vec<usize>, Vec<usize>) =
            indices.iter().partition(|&&i| self.x[i][split.feature] <= split.threshold);
        if left.is_empty() || right.is_empty() {
            return Self::leaf(totals);
        }

        let left = self.build(left, depth + 1);
        let right = self.build(right, depth + 1);
        TreeNode::Split {
            feature: split.feature,
            threshold: split.threshold,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Best weighted-Gini split over a random subset of features, or None
    /// when no split respects `min_samples_leaf` and improves impurity.
    fn best_split(&mut self, indices: &[usize], totals: [f64; N_ZONES]) -> Option<SplitCandidate> {
        let n_features = self.x.first().map_or(0, Vec::len);
        if n_features == 0 {
            return None;
        }
        let candidates = rand::seq::index::sample(&mut self.rng, n_features, self.max_features);

        let parent = gini(&totals);
        let total_weight: f64 = totals.iter().sum();
        let min_leaf = self.config.min_samples_leaf;
        let mut best: Option<SplitCandidate> = None;

        let mut order: Vec<usize> = indices.to_vec();
        for feature in candidates.into_iter() {
            order.sort_by(|&a, &b| self.x[a][feature].total_cmp(&self.x[b][feature]));

            let mut left = [0.0f64; N_ZONES];
            for pos in 0..order.len() - 1 {
                let i = order[pos];
                let c = self.y[i];
                left[c] += self.config.class_weights[c];

                let n_left = pos + 1;
                let n_right = order.len() - n_left;
                if n_left < min_leaf || n_right < min_leaf {
                    continue;
                }
                let lo = self.x[i][feature];
                let hi = self.x[order[pos + 1]][feature];
                if lo >= hi {
                    continue;
                }

                let w_left: f64 = left.iter().sum();
                let mut right = totals;
                for (r, l) in right.iter_mut().zip(left) {
                    *r -= l;
                }
                let w_right = total_weight - w_left;
                let child = (w_left * gini(&left) + w_right * gini(&right)) / total_weight;
                let gain = parent - child;

                if gain > 1e-12 && best.as_ref().map_or(true, |b| gain > b.gain) {
                    let mut threshold = lo + (hi - lo) / 2.0;
                    if threshold >= hi {
                        threshold = lo;
                    }
                    best = Some(SplitCandidate { feature, threshold, gain });
                }
            }
        }
        best
    }
}

/// Gini impurity of a weighted class distribution.
fn gini(weights: &[f64; N_ZONES]) -> f64 {
    let total: f64 = weights.iter().sum();
    if total <= 0.0 {
        return 0.0;
    }
    1.0 - weights.iter().map(|w| (w / total).powi(2)).sum::<f64>()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn config(n_estimators: usize) -> ForestConfig {
        ForestConfig {
            n_estimators,
            max_depth: None,
            min_samples_split: 4,
            min_samples_leaf: 2,
            class_weights: [1.0, 2.0, 3.0],
            seed: 42,
        }
    }

    /// Three well-separated bands on feature 0, noise on feature 1.
    fn banded(n_per_class: usize) -> (Vec<Vec<f64>>, Vec<usize>) {
        let mut x = Vec::new();
        let mut y = Vec::new();
        for class in 0..N_ZONES {
            for i in 0..n_per_class {
                x.push(vec![class as f64 * 10.0 + (i % 5) as f64 * 0.1, (i * 7 % 11) as f64]);
                y.push(class);
            }
        }
        (x, y)
    }

    #[test]
    fn gini_of_pure_and_uniform() {
        assert_relative_eq!(gini(&[5.0, 0.0, 0.0]), 0.0);
        assert_relative_eq!(gini(&[1.0, 1.0, 1.0]), 2.0 / 3.0, epsilon = 1e-12);
        assert_relative_eq!(gini(&[0.0, 0.0, 0.0]), 0.0);
    }

    #[test]
    fn max_features_is_floor_sqrt() {
        assert_eq!(max_features(1), 1);
        assert_eq!(max_features(19), 4);
        assert_eq!(max_features(36), 6);
    }

    #[test]
    fn forest_separates_bands() {
        let (x, y) = banded(20);
        let forest = RandomForest::fit(&x, &y, &config(25));
        assert_eq!(forest.n_trees(), 25);
        assert_eq!(forest.n_features(), 2);
        for (row, &label) in x.iter().zip(&y) {
            let p = forest.predict_proba(row);
            let argmax = (0..N_ZONES).max_by(|&a, &b| p[a].total_cmp(&p[b])).unwrap();
            assert_eq!(argmax, label, "row {row:?} proba {p:?}");
        }
    }

    #[test]
    fn probabilities_sum_to_one() {
        let (x, y) = banded(10);
        let forest = RandomForest::fit(&x, &y, &config(10));
        let p = forest.predict_proba(&[4.9, 3.0]);
        assert_relative_eq!(p.iter().sum::<f64>(), 1.0, epsilon = 1e-9);
        assert!(p.iter().all(|&v| (0.0..=1.0).contains(&v)));
    }

    #[test]
    fn same_seed_same_forest() {
        let (x, y) = banded(12);
        let a = RandomForest::fit(&x, &y, &config(8));
        let b = RandomForest::fit(&x, &y, &config(8));
        assert_eq!(a, b);
    }

    #[test]
    fn leaf_minimum_is_respected() {
        let (x, y) = banded(6);
        let forest = RandomForest::fit(&x, &y, &ForestConfig { min_samples_leaf: 9, ..config(5) });
        // 18 samples cannot be split into two leaves of at least 9 more than once.
        assert!(forest.trees().iter().all(|t| t.depth() <= 1));
    }

    #[test]
    fn max_depth_caps_growth() {
        let (x, y) = banded(20);
        let forest = RandomForest::fit(&x, &y, &ForestConfig { max_depth: Some(1), ..config(5) });
        assert!(forest.trees().iter().all(|t| t.depth() <= 1));
    }
}
