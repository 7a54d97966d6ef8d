//! Diagonal-covariance Gaussian log-density.

/// ln(2π)
const LN_2PI: f64 = 1.837_877_066_409_345_3;

/// Log-density of a diagonal-covariance Gaussian at `x`.
///
/// `var` holds the diagonal of the covariance matrix and must be strictly
/// positive (the trainer floors variances before they reach this function).
///
/// # Panics
/// Panics if `x`, `mean`, and `var` do not have the same length.
pub fn diag_gaussian_log_pdf(x: &[f64], mean: &[f64], var: &[f64]) -> f64 {
    assert_eq!(x.len(), mean.len());
    assert_eq!(x.len(), var.len());

    let mut acc = 0.0;
    for i in 0..x.len() {
        let d = x[i] - mean[i];
        acc -= 0.5 * (LN_2PI + var[i].ln() + d * d / var[i]);
    }
    acc
}
