//! Gradient-boosted trees
//!
//! One boosted ensemble per label column. Each round fits a shallow
//! variance-split regression tree to the log-loss gradient (label minus
//! current probability) on a row subsample, then steps the additive score.

use ndarray::Array2;
use rand::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

use super::Classifier;

pub struct GradientBoosting {
    rounds: usize,
    learning_rate: f64,
    max_depth: usize,
    subsample: f64,
    seed: u64,
    models: Vec<BoostedLabel>,
}

struct BoostedLabel {
    base_score: f64,
    trees: Vec<RegNode>,
}

impl GradientBoosting {
    pub fn new(rounds: usize, learning_rate: f64, max_depth: usize, subsample: f64, seed: u64) -> Self {
        Self {
            rounds,
            learning_rate,
            max_depth,
            subsample,
            seed,
            models: Vec::new(),
        }
    }
}

impl Classifier for GradientBoosting {
    fn name(&self) -> &str {
        "gboost"
    }

    fn fit(&mut self, features: &Array2<f64>, labels: &Array2<f64>) {
        let n = features.nrows();
        if n == 0 {
            return;
        }
        let rows: Vec<Vec<f64>> = features.rows().into_iter().map(|r| r.to_vec()).collect();
        let sample_size = ((n as f64 * self.subsample).ceil() as usize).clamp(1, n);

        let mut rng = StdRng::seed_from_u64(self.seed);
        self.models = (0..labels.ncols())
            .map(|j| {
                let y: Vec<f64> = (0..n).map(|i| labels[[i, j]]).collect();

                // Start from the base-rate log-odds
                let p0 = (y.iter().sum::<f64>() / n as f64).clamp(1e-6, 1.0 - 1e-6);
                let base_score = (p0 / (1.0 - p0)).ln();

                let mut scores = vec![base_score; n];
                let mut trees = Vec::with_capacity(self.rounds);

                for _ in 0..self.rounds {
                    let residuals: Vec<f64> = (0..n)
                        .map(|i| y[i] - sigmoid(scores[i]))
                        .collect();

                    let mut sample: Vec<usize> = (0..n).collect();
                    sample.shuffle(&mut rng);
                    sample.truncate(sample_size);

                    let tree = build_reg_tree(&rows, &residuals, &sample, self.max_depth);
                    for (i, row) in rows.iter().enumerate() {
                        scores[i] += self.learning_rate * predict_reg(&tree, row);
                    }
                    trees.push(tree);
                }

                BoostedLabel { base_score, trees }
            })
            .collect();
    }

    fn predict_proba(&self, features: &Array2<f64>) -> Array2<f64> {
        let n = features.nrows();
        let mut proba = Array2::<f64>::zeros((n, self.models.len()));

        for (i, row) in features.rows().into_iter().enumerate() {
            let row = row.to_vec();
            for (j, model) in self.models.iter().enumerate() {
                let score = model.base_score
                    + self.learning_rate
                        * model
                            .trees
                            .iter()
                            .map(|tree| predict_reg(tree, &row))
                            .sum::<f64>();
                proba[[i, j]] = sigmoid(score);
            }
        }

        proba
    }
}

#[derive(Debug)]
enum RegNode {
    Leaf {
        value: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: Box<RegNode>,
        right: Box<RegNode>,
    },
}

fn mean_residual(residuals: &[f64], indices: &[usize]) -> f64 {
    let sum: f64 = indices.iter().map(|&i| residuals[i]).sum();
    sum / indices.len().max(1) as f64
}

fn sum_squared_error(residuals: &[f64], indices: &[usize]) -> f64 {
    let mean = mean_residual(residuals, indices);
    indices
        .iter()
        .map(|&i| (residuals[i] - mean).powi(2))
        .sum()
}

fn build_reg_tree(
    rows: &[Vec<f64>],
    residuals: &[f64],
    indices: &[usize],
    depth: usize,
) -> RegNode {
    if depth == 0 || indices.len() < 4 {
        return RegNode::Leaf {
            value: mean_residual(residuals, indices),
        };
    }

    let parent_sse = sum_squared_error(residuals, indices);
    if parent_sse < 1e-12 {
        return RegNode::Leaf {
            value: mean_residual(residuals, indices),
        };
    }

    let n_features = rows[0].len();
    let mut best_sse = f64::MAX;
    let mut best_feature = 0;
    let mut best_threshold = 0.0;

    for feature in 0..n_features {
        let mut values: Vec<f64> = indices.iter().map(|&i| rows[i][feature]).collect();
        values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        values.dedup();
        if values.len() < 2 {
            continue;
        }

        let step = (values.len() / 10).max(1);
        for i in (0..values.len() - 1).step_by(step) {
            let threshold = (values[i] + values[i + 1]) / 2.0;
            let (left, right): (Vec<usize>, Vec<usize>) = indices
                .iter()
                .copied()
                .partition(|&idx| rows[idx][feature] <= threshold);
            if left.is_empty() || right.is_empty() {
                continue;
            }

            let sse =
                sum_squared_error(residuals, &left) + sum_squared_error(residuals, &right);
            if sse < best_sse {
                best_sse = sse;
                best_feature = feature;
                best_threshold = threshold;
            }
        }
    }

    if best_sse >= parent_sse {
        return RegNode::Leaf {
            value: mean_residual(residuals, indices),
        };
    }

    let (left, right): (Vec<usize>, Vec<usize>) = indices
        .iter()
        .copied()
        .partition(|&idx| rows[idx][best_feature] <= best_threshold);

    RegNode::Split {
        feature: best_feature,
        threshold: best_threshold,
        left: Box::new(build_reg_tree(rows, residuals, &left, depth - 1)),
        right: Box::new(build_reg_tree(rows, residuals, &right, depth - 1)),
    }
}

fn predict_reg(node: &RegNode, row: &[f64]) -> f64 {
    match node {
        RegNode::Leaf { value } => *value,
        RegNode::Split {
            feature,
            threshold,
            left,
            right,
        } => {
            if row[*feature] <= *threshold {
                predict_reg(left, row)
            } else {
                predict_reg(right, row)
            }
        }
    }
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}
