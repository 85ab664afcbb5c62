//! Pluggable classifiers
//!
//! Each classifier trains one independent binary model per label column
//! (one-vs-rest) and returns per-label probabilities. New model types are
//! added by implementing [`Classifier`], never by branching on type tags.

pub mod boosting;
pub mod forest;
pub mod logistic;

use ndarray::Array2;

pub use boosting::GradientBoosting;
pub use forest::RandomForest;
pub use logistic::LogisticRegression;

/// A multi-label probabilistic classifier with one-vs-rest semantics.
pub trait Classifier {
    fn name(&self) -> &str;

    /// Fit on a feature matrix (rows × d) and a binary label matrix
    /// (rows × labels).
    fn fit(&mut self, features: &Array2<f64>, labels: &Array2<f64>);

    /// Predict per-label probabilities for each row, shape (rows × labels).
    fn predict_proba(&self, features: &Array2<f64>) -> Array2<f64>;
}

/// The three bundled experiment models with their standard hyperparameters.
pub fn default_classifiers() -> Vec<Box<dyn Classifier>> {
    vec![
        Box::new(LogisticRegression::new(0.01, 0.0005, 300)),
        Box::new(RandomForest::new(100, 5, 42)),
        Box::new(GradientBoosting::new(100, 0.1, 3, 0.8, 42)),
    ]
}

#[cfg(test)]
pub(crate) fn make_test_matrices(rows: usize, labels: usize) -> (Array2<f64>, Array2<f64>) {
    // Deterministic cyclic pattern: label j fires when (row + j) % 4 == 0,
    // and the features are the previous row's labels.
    let mut y = Array2::<f64>::zeros((rows, labels));
    for i in 0..rows {
        for j in 0..labels {
            if (i + j) % 4 == 0 {
                y[[i, j]] = 1.0;
            }
        }
    }
    let mut x = Array2::<f64>::zeros((rows, labels));
    for i in 1..rows {
        for j in 0..labels {
            x[[i, j]] = y[[i - 1, j]];
        }
    }
    (x, y)
}
