// src/model/split.rs

use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;

/// Shuffled train/test indices. The test share is rounded up, and each side
/// keeps at least one row when `n >= 2`.
pub fn train_test_split(n: usize, test_size: f64, seed: u64) -> (Vec<usize>, Vec<usize>) {
    let mut idx: Vec<usize> = (0..n).collect();
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    idx.shuffle(&mut rng);

    let mut n_test = (test_size.clamp(0.0, 1.0) * n as f64).ceil() as usize;
    if n >= 2 {
        n_test = n_test.clamp(1, n - 1);
    }
    let train = idx.split_off(n_test.min(n));
    (train, idx)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sizes_and_determinism() {
        let (train, test) = train_test_split(10, 0.2, 42);
        assert_eq!((train.len(), test.len()), (8, 2));
        assert_eq!(train_test_split(10, 0.2, 42), (train.clone(), test.clone()));

        let mut all: Vec<usize> = train.into_iter().chain(test).collect();
        all.sort_unstable();
        assert_eq!(all, (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn tiny_sets() {
        assert_eq!(train_test_split(2, 0.2, 1).1.len(), 1);
        assert_eq!(train_test_split(0, 0.2, 1), (vec![], vec![]));
    }
}
