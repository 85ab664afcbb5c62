//! Evaluation metrics
//!
//! Probabilistic scores (log-loss, Brier) over all label entries flattened,
//! and hit@k: the fraction of a draw's true numbers recovered among the
//! top-k predicted positions.

use ndarray::Array2;

/// Clip probabilities into `[eps, 1-eps]` so log-loss stays finite.
pub fn clip_probabilities(proba: &Array2<f64>, eps: f64) -> Array2<f64> {
    proba.mapv(|p| p.clamp(eps, 1.0 - eps))
}

/// Binary log-loss over all (label, probability) entries flattened.
///
/// Probabilities must already be clipped away from 0 and 1.
pub fn log_loss(labels: &Array2<f64>, proba: &Array2<f64>) -> f64 {
    let mut sum = 0.0;
    for (&y, &p) in labels.iter().zip(proba.iter()) {
        sum -= if y > 0.5 { p.ln() } else { (1.0 - p).ln() };
    }
    sum / labels.len().max(1) as f64
}

/// Brier-style score: mean squared error between probabilities and the
/// binary labels, flattened.
pub fn brier_score(labels: &Array2<f64>, proba: &Array2<f64>) -> f64 {
    let mut sum = 0.0;
    for (&y, &p) in labels.iter().zip(proba.iter()) {
        sum += (p - y).powi(2);
    }
    sum / labels.len().max(1) as f64
}

/// hit@k: per row, the intersection of the true "on" positions with the k
/// highest-probability positions, divided by k; averaged across rows.
pub fn hit_at_k(labels: &Array2<f64>, proba: &Array2<f64>, k: usize) -> f64 {
    if labels.nrows() == 0 || k == 0 {
        return 0.0;
    }

    let mut hits = 0.0;
    for (truth, probs) in labels.rows().into_iter().zip(proba.rows()) {
        let mut order: Vec<usize> = (0..probs.len()).collect();
        order.sort_by(|&a, &b| {
            probs[a]
                .partial_cmp(&probs[b])
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        let top: Vec<usize> = order[order.len().saturating_sub(k)..].to_vec();

        let captured = top.iter().filter(|&&idx| truth[idx] > 0.5).count();
        hits += captured as f64 / k as f64;
    }

    hits / labels.nrows() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_log_loss_perfect_prediction_is_small() {
        let labels = array![[1.0, 0.0], [0.0, 1.0]];
        let proba = clip_probabilities(&array![[1.0, 0.0], [0.0, 1.0]], 1e-6);
        let ll = log_loss(&labels, &proba);
        assert!(ll < 1e-5, "log-loss = {}", ll);
    }

    #[test]
    fn test_log_loss_uniform() {
        let labels = array![[1.0, 0.0]];
        let proba = array![[0.5, 0.5]];
        let ll = log_loss(&labels, &proba);
        assert!((ll - 0.5f64.ln().abs()).abs() < 1e-12);
    }

    #[test]
    fn test_brier_score() {
        let labels = array![[1.0, 0.0]];
        let proba = array![[0.8, 0.3]];
        // ((0.8-1)^2 + (0.3-0)^2) / 2
        assert!((brier_score(&labels, &proba) - 0.065).abs() < 1e-12);
    }

    #[test]
    fn test_hit_at_k_perfect() {
        let labels = array![[1.0, 1.0, 0.0, 0.0]];
        let proba = array![[0.9, 0.8, 0.1, 0.2]];
        assert_eq!(hit_at_k(&labels, &proba, 2), 1.0);
    }

    #[test]
    fn test_hit_at_k_partial() {
        let labels = array![[1.0, 0.0, 1.0, 0.0]];
        let proba = array![[0.9, 0.8, 0.1, 0.2]];
        // top-2 = {0, 1}; captures one of the two true positions
        assert_eq!(hit_at_k(&labels, &proba, 2), 0.5);
    }

    #[test]
    fn test_hit_at_k_bounds() {
        let labels = array![[1.0, 0.0, 1.0], [0.0, 1.0, 0.0]];
        let proba = array![[0.2, 0.9, 0.4], [0.5, 0.1, 0.3]];
        for k in 1..=3 {
            let h = hit_at_k(&labels, &proba, k);
            assert!((0.0..=1.0).contains(&h), "hit@{} = {}", k, h);
        }
    }

    #[test]
    fn test_hit_at_k_larger_than_width() {
        let labels = array![[1.0, 0.0]];
        let proba = array![[0.9, 0.1]];
        // k exceeding the width captures everything true
        assert_eq!(hit_at_k(&labels, &proba, 10), 1.0 / 10.0);
    }
}
