//! Random forest classifier
//!
//! One forest per label column: bootstrap-sampled gini-split trees over a
//! random √d feature subset at each node. Seeded so runs are reproducible.

use ndarray::Array2;
use rand::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

use super::Classifier;

pub struct RandomForest {
    n_trees: usize,
    max_depth: usize,
    seed: u64,
    forests: Vec<Vec<TreeNode>>,
}

impl RandomForest {
    pub fn new(n_trees: usize, max_depth: usize, seed: u64) -> Self {
        Self {
            n_trees,
            max_depth,
            seed,
            forests: Vec::new(),
        }
    }
}

impl Classifier for RandomForest {
    fn name(&self) -> &str {
        "random_forest"
    }

    fn fit(&mut self, features: &Array2<f64>, labels: &Array2<f64>) {
        let n = features.nrows();
        if n == 0 {
            return;
        }
        let rows: Vec<Vec<f64>> = features.rows().into_iter().map(|r| r.to_vec()).collect();
        let features_per_split = (features.ncols() as f64).sqrt().ceil() as usize;

        let mut rng = StdRng::seed_from_u64(self.seed);
        self.forests = (0..labels.ncols())
            .map(|j| {
                let y: Vec<f64> = (0..n).map(|i| labels[[i, j]]).collect();
                (0..self.n_trees)
                    .map(|_| {
                        // Bootstrap sample
                        let indices: Vec<usize> =
                            (0..n).map(|_| rng.random_range(0..n)).collect();
                        build_tree(
                            &rows,
                            &y,
                            &indices,
                            self.max_depth,
                            features_per_split,
                            &mut rng,
                        )
                    })
                    .collect()
            })
            .collect();
    }

    fn predict_proba(&self, features: &Array2<f64>) -> Array2<f64> {
        let n = features.nrows();
        let mut proba = Array2::<f64>::zeros((n, self.forests.len()));

        for (i, row) in features.rows().into_iter().enumerate() {
            let row = row.to_vec();
            for (j, forest) in self.forests.iter().enumerate() {
                let sum: f64 = forest.iter().map(|tree| predict_tree(tree, &row)).sum();
                proba[[i, j]] = (sum / forest.len().max(1) as f64).clamp(0.0, 1.0);
            }
        }

        proba
    }
}

#[derive(Debug)]
enum TreeNode {
    Leaf {
        value: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
    },
}

fn mean_label(labels: &[f64], indices: &[usize]) -> f64 {
    let sum: f64 = indices.iter().map(|&i| labels[i]).sum();
    sum / indices.len().max(1) as f64
}

fn build_tree(
    rows: &[Vec<f64>],
    labels: &[f64],
    indices: &[usize],
    depth: usize,
    features_per_split: usize,
    rng: &mut StdRng,
) -> TreeNode {
    if depth == 0 || indices.len() < 4 {
        return TreeNode::Leaf {
            value: mean_label(labels, indices),
        };
    }

    let first = labels[indices[0]];
    if indices.iter().all(|&i| (labels[i] - first).abs() < 1e-10) {
        return TreeNode::Leaf { value: first };
    }

    let n_features = rows[0].len();
    let mut candidates: Vec<usize> = (0..n_features).collect();
    candidates.shuffle(rng);
    candidates.truncate(features_per_split);

    let parent_gini = gini_impurity(labels, indices);
    let mut best_gini = f64::MAX;
    let mut best_feature = 0;
    let mut best_threshold = 0.0;

    for &feature in &candidates {
        let mut values: Vec<f64> = indices.iter().map(|&i| rows[i][feature]).collect();
        values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        values.dedup();
        if values.len() < 2 {
            continue;
        }

        // Sample thresholds between consecutive values
        let step = (values.len() / 10).max(1);
        for i in (0..values.len() - 1).step_by(step) {
            let threshold = (values[i] + values[i + 1]) / 2.0;
            let gini = split_gini(rows, labels, indices, feature, threshold);
            if gini < best_gini {
                best_gini = gini;
                best_feature = feature;
                best_threshold = threshold;
            }
        }
    }

    if best_gini >= parent_gini {
        return TreeNode::Leaf {
            value: mean_label(labels, indices),
        };
    }

    let (left, right): (Vec<usize>, Vec<usize>) = indices
        .iter()
        .copied()
        .partition(|&i| rows[i][best_feature] <= best_threshold);

    if left.is_empty() || right.is_empty() {
        return TreeNode::Leaf {
            value: mean_label(labels, indices),
        };
    }

    TreeNode::Split {
        feature: best_feature,
        threshold: best_threshold,
        left: Box::new(build_tree(
            rows,
            labels,
            &left,
            depth - 1,
            features_per_split,
            rng,
        )),
        right: Box::new(build_tree(
            rows,
            labels,
            &right,
            depth - 1,
            features_per_split,
            rng,
        )),
    }
}

fn gini_impurity(labels: &[f64], indices: &[usize]) -> f64 {
    if indices.is_empty() {
        return 0.0;
    }
    let p = mean_label(labels, indices);
    2.0 * p * (1.0 - p)
}

fn split_gini(
    rows: &[Vec<f64>],
    labels: &[f64],
    indices: &[usize],
    feature: usize,
    threshold: f64,
) -> f64 {
    let (left, right): (Vec<usize>, Vec<usize>) = indices
        .iter()
        .copied()
        .partition(|&i| rows[i][feature] <= threshold);

    if left.is_empty() || right.is_empty() {
        return f64::MAX;
    }

    let n = indices.len() as f64;
    (left.len() as f64 / n) * gini_impurity(labels, &left)
        + (right.len() as f64 / n) * gini_impurity(labels, &right)
}

fn predict_tree(node: &TreeNode, row: &[f64]) -> f64 {
    match node {
        TreeNode::Leaf { value } => *value,
        TreeNode::Split {
            feature,
            threshold,
            left,
            right,
        } => {
            if row[*feature] <= *threshold {
                predict_tree(left, row)
            } else {
                predict_tree(right, row)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::make_test_matrices;
    use super::*;

    #[test]
    fn test_probabilities_in_unit_interval() {
        let (x, y) = make_test_matrices(24, 6);
        let mut model = RandomForest::new(20, 4, 42);
        model.fit(&x, &y);

        let proba = model.predict_proba(&x);
        assert_eq!(proba.shape(), &[24, 6]);
        for &p in proba.iter() {
            assert!((0.0..=1.0).contains(&p));
        }
    }

    #[test]
    fn test_separates_constant_labels() {
        // One label always on, one always off
        let n = 20;
        let mut x = Array2::<f64>::zeros((n, 3));
        for i in 0..n {
            x[[i, 0]] = (i % 2) as f64;
        }
        let mut y = Array2::<f64>::zeros((n, 2));
        for i in 0..n {
            y[[i, 0]] = 1.0;
        }

        let mut model = RandomForest::new(10, 3, 7);
        model.fit(&x, &y);
        let proba = model.predict_proba(&x);

        for i in 0..n {
            assert!(proba[[i, 0]] > 0.99);
            assert!(proba[[i, 1]] < 0.01);
        }
    }

    #[test]
    fn test_fit_is_deterministic() {
        let (x, y) = make_test_matrices(24, 4);
        let mut a = RandomForest::new(15, 4, 42);
        let mut b = RandomForest::new(15, 4, 42);
        a.fit(&x, &y);
        b.fit(&x, &y);
        assert_eq!(a.predict_proba(&x), b.predict_proba(&x));
    }

    #[test]
    fn test_predict_before_fit_is_empty() {
        let model = RandomForest::new(5, 3, 1);
        let x = Array2::<f64>::zeros((3, 4));
        assert_eq!(model.predict_proba(&x).ncols(), 0);
    }
}
