//! Logistic regression with full-batch gradient descent
//!
//! Features are scaled by their standard deviation without centering, which
//! keeps the one-hot inputs sparse. All label columns train jointly through
//! matrix operations, which is equivalent to independent per-label models.

use ndarray::{Array1, Array2, Axis};

use super::Classifier;

pub struct LogisticRegression {
    learning_rate: f64,
    lambda: f64,
    epochs: usize,
    fitted: Option<Fitted>,
}

struct Fitted {
    /// Per-feature scale (std, floored)
    scale: Array1<f64>,
    /// d × labels weight matrix
    weights: Array2<f64>,
    /// Per-label intercept
    bias: Array1<f64>,
}

impl LogisticRegression {
    pub fn new(learning_rate: f64, lambda: f64, epochs: usize) -> Self {
        Self {
            learning_rate,
            lambda,
            epochs,
            fitted: None,
        }
    }
}

impl Classifier for LogisticRegression {
    fn name(&self) -> &str {
        "logreg_sgd"
    }

    fn fit(&mut self, features: &Array2<f64>, labels: &Array2<f64>) {
        let n = features.nrows();
        let d = features.ncols();
        let l = labels.ncols();
        if n == 0 {
            return;
        }

        let scale = column_stds(features);
        let x = features / &scale;

        let mut weights = Array2::<f64>::zeros((d, l));
        let mut bias = Array1::<f64>::zeros(l);

        for _ in 0..self.epochs {
            let logits = x.dot(&weights) + &bias;
            let preds = logits.mapv(sigmoid);
            let errors = &preds - labels;

            let grad_w = x.t().dot(&errors) / n as f64 + &weights * (self.lambda * 2.0);
            let grad_b = errors.sum_axis(Axis(0)) / n as f64;

            weights = weights - grad_w * self.learning_rate;
            bias = bias - grad_b * self.learning_rate;
        }

        self.fitted = Some(Fitted {
            scale,
            weights,
            bias,
        });
    }

    fn predict_proba(&self, features: &Array2<f64>) -> Array2<f64> {
        let Some(fitted) = &self.fitted else {
            return Array2::zeros((features.nrows(), 0));
        };

        let x = features / &fitted.scale;
        (x.dot(&fitted.weights) + &fitted.bias).mapv(sigmoid)
    }
}

/// Per-column standard deviation, floored to keep division finite.
fn column_stds(x: &Array2<f64>) -> Array1<f64> {
    let n = x.nrows() as f64;
    let means = x.sum_axis(Axis(0)) / n;
    let mut variances = Array1::<f64>::zeros(x.ncols());
    for row in x.rows() {
        let diff = &row - &means;
        variances = variances + diff.mapv(|v| v * v);
    }
    (variances / n).mapv(|v| v.sqrt().max(1e-10))
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

#[cfg(test)]
mod tests {
    use super::super::make_test_matrices;
    use super::*;

    #[test]
    fn test_probabilities_in_unit_interval() {
        let (x, y) = make_test_matrices(32, 8);
        let mut model = LogisticRegression::new(0.01, 0.0005, 300);
        model.fit(&x, &y);

        let proba = model.predict_proba(&x);
        assert_eq!(proba.shape(), &[32, 8]);
        for &p in proba.iter() {
            assert!((0.0..=1.0).contains(&p));
        }
    }

    #[test]
    fn test_learns_deterministic_pattern() {
        // Label fires exactly when the single feature fired
        let n = 40;
        let mut x = Array2::<f64>::zeros((n, 1));
        let mut y = Array2::<f64>::zeros((n, 1));
        for i in 0..n {
            let on = (i % 2) as f64;
            x[[i, 0]] = on;
            y[[i, 0]] = on;
        }

        let mut model = LogisticRegression::new(0.1, 0.0, 500);
        model.fit(&x, &y);
        let proba = model.predict_proba(&x);

        assert!(proba[[1, 0]] > 0.7, "on-case p = {}", proba[[1, 0]]);
        assert!(proba[[0, 0]] < 0.3, "off-case p = {}", proba[[0, 0]]);
    }

    #[test]
    fn test_predict_before_fit_is_empty() {
        let model = LogisticRegression::new(0.01, 0.0005, 10);
        let x = Array2::<f64>::zeros((3, 4));
        assert_eq!(model.predict_proba(&x).ncols(), 0);
    }

    #[test]
    fn test_fit_is_deterministic() {
        let (x, y) = make_test_matrices(20, 5);
        let mut a = LogisticRegression::new(0.01, 0.0005, 100);
        let mut b = LogisticRegression::new(0.01, 0.0005, 100);
        a.fit(&x, &y);
        b.fit(&x, &y);
        assert_eq!(a.predict_proba(&x), b.predict_proba(&x));
    }
}
