use super::{FittedModel, ForecastModel, ModelKind};
use crate::ForecastError;

/// Squared-error regression tree on the observation index, grown until every leaf is pure.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecisionTree;

impl DecisionTree {
    pub const fn new() -> Self {
        Self
    }
}

impl ForecastModel for DecisionTree {
    fn kind(&self) -> ModelKind {
        ModelKind::DecisionTree
    }

    fn min_train_len(&self) -> usize {
        2
    }

    fn fit(&self, train: &[f64]) -> Result<Box<dyn FittedModel>, ForecastError> {
        if train.is_empty() {
            return Err(ForecastError::model_fit(
                ModelKind::DecisionTree.as_str(),
                "cannot fit a tree on an empty training set",
            ));
        }

        let samples = train
            .iter()
            .enumerate()
            .map(|(index, &close)| (index as f64, close))
            .collect();
        Ok(Box::new(IndexRegressor {
            trees: vec![RegressionTree::grow(samples)],
            origin: train.len(),
        }))
    }
}

/// One or more trees evaluated at the indices following the training range.
#[derive(Debug, Clone)]
pub(crate) struct IndexRegressor {
    pub(crate) trees: Vec<RegressionTree>,
    pub(crate) origin: usize,
}

impl FittedModel for IndexRegressor {
    fn forecast(&self, steps: usize) -> Result<Vec<f64>, ForecastError> {
        let count = self.trees.len() as f64;
        Ok((self.origin..self.origin + steps)
            .map(|index| {
                let x = index as f64;
                self.trees.iter().map(|tree| tree.predict(x)).sum::<f64>() / count
            })
            .collect())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Node {
    Leaf { value: f64 },
    Split { threshold: f64, left: usize, right: usize },
}

/// CART regression tree over a single feature, stored as a flat node arena.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RegressionTree {
    nodes: Vec<Node>,
}

impl RegressionTree {
    /// Grows a tree from `(x, y)` samples; duplicates are allowed.
    pub(crate) fn grow(mut samples: Vec<(f64, f64)>) -> Self {
        samples.sort_by(|a, b| a.0.total_cmp(&b.0));
        let mut nodes = Vec::new();
        build(&mut nodes, &samples);
        Self { nodes }
    }

    pub(crate) fn predict(&self, x: f64) -> f64 {
        let mut index = 0;
        loop {
            match self.nodes[index] {
                Node::Leaf { value } => return value,
                Node::Split {
                    threshold,
                    left,
                    right,
                } => index = if x <= threshold { left } else { right },
            }
        }
    }

    #[cfg(test)]
    fn leaf_count(&self) -> usize {
        self.nodes
            .iter()
            .filter(|node| matches!(node, Node::Leaf { .. }))
            .count()
    }
}

/// Appends the subtree for `samples` (sorted by x) and returns its root index.
fn build(nodes: &mut Vec<Node>, samples: &[(f64, f64)]) -> usize {
    let index = nodes.len();
    let mean = samples.iter().map(|sample| sample.1).sum::<f64>() / samples.len() as f64;
    nodes.push(Node::Leaf { value: mean });

    let pure = samples.iter().all(|sample| sample.1 == samples[0].1);
    if samples.len() < 2 || pure {
        return index;
    }

    let Some(cut) = best_cut(samples) else {
        return index;
    };

    let threshold = (samples[cut - 1].0 + samples[cut].0) / 2.0;
    let left = build(nodes, &samples[..cut]);
    let right = build(nodes, &samples[cut..]);
    nodes[index] = Node::Split {
        threshold,
        left,
        right,
    };
    index
}

/// Position minimizing the summed squared error of both sides, first one on ties.
/// Only boundaries between distinct x values qualify.
fn best_cut(samples: &[(f64, f64)]) -> Option<usize> {
    let n = samples.len();
    let total: f64 = samples.iter().map(|sample| sample.1).sum();
    let total_sq: f64 = samples.iter().map(|sample| sample.1 * sample.1).sum();

    let mut best: Option<(usize, f64)> = None;
    let mut left_sum = 0.0;
    let mut left_sq = 0.0;
    for cut in 1..n {
        let y = samples[cut - 1].1;
        left_sum += y;
        left_sq += y * y;
        if samples[cut - 1].0 >= samples[cut].0 {
            continue;
        }

        let left_n = cut as f64;
        let right_n = (n - cut) as f64;
        let right_sum = total - left_sum;
        let right_sq = total_sq - left_sq;
        let error = (left_sq - left_sum * left_sum / left_n) + (right_sq - right_sum * right_sum / right_n);

        if best.map_or(true, |(_, lowest)| error < lowest) {
            best = Some((cut, error));
        }
    }
    best.map(|(cut, _)| cut)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wavy(len: usize) -> Vec<f64> {
        (0..len)
            .map(|i| 100.0 + (i as f64 / 3.0).sin() * 5.0 + i as f64 * 0.2)
            .collect()
    }

    #[test]
    fn pure_tree_reproduces_training_points() {
        let train = wavy(40);
        let samples = train.iter().enumerate().map(|(i, &y)| (i as f64, y)).collect();
        let tree = RegressionTree::grow(samples);

        for (index, &close) in train.iter().enumerate() {
            assert_eq!(tree.predict(index as f64), close);
        }
        assert_eq!(tree.leaf_count(), 40);
    }

    #[test]
    fn splits_at_midpoints_between_indices() {
        let tree = RegressionTree::grow(vec![(0.0, 1.0), (1.0, 1.0), (2.0, 5.0), (3.0, 5.0)]);
        assert_eq!(tree.predict(1.5), 1.0);
        assert_eq!(tree.predict(1.51), 5.0);
        assert_eq!(tree.leaf_count(), 2);
    }

    #[test]
    fn duplicate_x_values_average_into_one_leaf() {
        let tree = RegressionTree::grow(vec![(2.0, 4.0), (2.0, 6.0), (0.0, 1.0)]);
        assert_eq!(tree.predict(2.0), 5.0);
        assert_eq!(tree.predict(0.0), 1.0);
    }

    #[test]
    fn forecast_flattens_at_last_training_value() {
        let train = wavy(30);
        let fitted = DecisionTree::new().fit(&train).expect("fit");
        let path = fitted.forecast(6).expect("forecast");

        assert_eq!(path.len(), 6);
        assert!(path.iter().all(|value| *value == train[29]));
    }
}
