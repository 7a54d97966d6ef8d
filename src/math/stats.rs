//! Small statistics helpers.

/// Arithmetic mean, or `None` for an empty slice.
///
/// Returning `None` (rather than NaN) lets callers treat "no usable values"
/// as an explicit exclusion rather than a poison value.
pub fn mean(xs: &[f64]) -> Option<f64> {
    if xs.is_empty() {
        return None;
    }
    Some(xs.iter().sum::<f64>() / xs.len() as f64)
}
