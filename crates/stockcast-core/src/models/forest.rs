use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::tree::{IndexRegressor, RegressionTree};
use super::{FittedModel, ForecastModel, ModelKind};
use crate::ForecastError;

/// Bagged regression trees on the observation index.
///
/// Each tree is grown to purity on a bootstrap resample drawn from a `StdRng` seeded with
/// `seed`, so a fixed seed reproduces the same forest bit for bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RandomForest {
    trees: usize,
    seed: u64,
}

impl RandomForest {
    pub const fn new(trees: usize, seed: u64) -> Self {
        Self { trees, seed }
    }
}

impl ForecastModel for RandomForest {
    fn kind(&self) -> ModelKind {
        ModelKind::RandomForest
    }

    fn min_train_len(&self) -> usize {
        2
    }

    fn fit(&self, train: &[f64]) -> Result<Box<dyn FittedModel>, ForecastError> {
        if self.trees == 0 || train.is_empty() {
            return Err(ForecastError::model_fit(
                ModelKind::RandomForest.as_str(),
                format!(
                    "cannot grow {} trees on {} observations",
                    self.trees,
                    train.len()
                ),
            ));
        }

        let mut rng = StdRng::seed_from_u64(self.seed);
        let n = train.len();
        let trees = (0..self.trees)
            .map(|_| {
                let samples = (0..n)
                    .map(|_| {
                        let index = rng.gen_range(0..n);
                        (index as f64, train[index])
                    })
                    .collect();
                RegressionTree::grow(samples)
            })
            .collect();

        Ok(Box::new(IndexRegressor { trees, origin: n }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wavy(len: usize) -> Vec<f64> {
        (0..len)
            .map(|i| 50.0 + (i as f64 / 4.0).cos() * 3.0 + i as f64 * 0.1)
            .collect()
    }

    #[test]
    fn same_seed_is_bit_for_bit_reproducible() {
        let train = wavy(60);
        let first = RandomForest::new(100, 42)
            .fit(&train)
            .expect("fit")
            .forecast(15)
            .expect("forecast");
        let second = RandomForest::new(100, 42)
            .fit(&train)
            .expect("fit")
            .forecast(15)
            .expect("forecast");

        let bits = |values: &[f64]| values.iter().map(|v| v.to_bits()).collect::<Vec<_>>();
        assert_eq!(bits(&first), bits(&second));
    }

    #[test]
    fn path_is_flat_and_bounded_by_training_range() {
        let train = wavy(60);
        let path = RandomForest::new(25, 7)
            .fit(&train)
            .expect("fit")
            .forecast(10)
            .expect("forecast");

        let low = train.iter().copied().fold(f64::INFINITY, f64::min);
        let high = train.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        assert!(path.iter().all(|value| *value == path[0]));
        assert!(path[0] >= low - 1e-9 && path[0] <= high + 1e-9, "{}", path[0]);
    }

    #[test]
    fn zero_trees_is_a_fit_error() {
        let error = RandomForest::new(0, 42).fit(&wavy(10)).expect_err("must fail");
        assert!(matches!(error, ForecastError::ModelFit { .. }));
    }
}
