use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use super::ClassifierError;
use crate::zone::{Zone, N_ZONES};

/// Stratified train/test split. Returns `(train, test)` row indices, each
/// sorted ascending.
///
/// Every class with at least two rows contributes `round(n * test_fraction)`
/// rows to the test set, clamped to `[1, n - 1]` so both sides keep it.
/// Singleton classes stay in training. Fails when fewer than two distinct
/// classes are present.
pub fn stratified_split(
    labels: &[Zone],
    test_fraction: f64,
    seed: u64,
) -> Result<(Vec<usize>, Vec<usize>), ClassifierError> {
    let mut by_class: [Vec<usize>; N_ZONES] = Default::default();
    for (i, z) in labels.iter().enumerate() {
        by_class[z.index()].push(i);
    }

    let present = by_class.iter().filter(|c| !c.is_empty()).count();
    if present < 2 {
        return Err(ClassifierError::TooFewClasses { found: present });
    }

    let mut rng = StdRng::seed_from_u64(seed ^ 0x7E57_5A17_0000_0001);
    let mut train = Vec::with_capacity(labels.len());
    let mut test = Vec::new();

    for mut members in by_class {
        let n = members.len();
        if n == 0 {
            continue;
        }
        members.shuffle(&mut rng);
        let n_test = if n >= 2 {
            ((n as f64 * test_fraction).round() as usize).clamp(1, n - 1)
        } else {
            0
        };
        test.extend_from_slice(&members[..n_test]);
        train.extend_from_slice(&members[n_test..]);
    }

    train.sort_unstable();
    test.sort_unstable();
    Ok((train, test))
}
