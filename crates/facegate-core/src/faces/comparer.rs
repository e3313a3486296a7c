use crate::errors::{AppError, AppResult};

/// Cosine similarity of two encodings.
///
/// Fails with [`AppError::LengthMismatch`] when the dimensionalities differ.
/// A zero-magnitude operand yields `0.0`.
pub fn cosine_similarity(lhs: &[f64], rhs: &[f64]) -> AppResult<f64> {
    ensure_same_len(lhs, rhs)?;

    // Each operand is divided by its largest magnitude so the sums of squares
    // stay in range for any finite input.
    let lhs_scale = max_magnitude(lhs);
    let rhs_scale = max_magnitude(rhs);
    if lhs_scale == 0.0 || rhs_scale == 0.0 {
        return Ok(0.0);
    }

    let mut dot = 0.0;
    let mut norm_lhs = 0.0;
    let mut norm_rhs = 0.0;

    for (l, r) in lhs.iter().zip(rhs.iter()) {
        let l = l / lhs_scale;
        let r = r / rhs_scale;
        dot += l * r;
        norm_lhs += l * l;
        norm_rhs += r * r;
    }

    let similarity = dot / (norm_lhs * norm_rhs).sqrt();
    Ok(similarity.clamp(-1.0, 1.0))
}

/// Euclidean distance between two encodings, as used for registry lookups.
pub fn euclidean_distance(lhs: &[f64], rhs: &[f64]) -> AppResult<f64> {
    ensure_same_len(lhs, rhs)?;

    let sum = lhs
        .iter()
        .zip(rhs.iter())
        .map(|(l, r)| (l - r) * (l - r))
        .sum::<f64>();
    Ok(sum.sqrt())
}

fn max_magnitude(values: &[f64]) -> f64 {
    values.iter().fold(0.0, |max, value| max.max(value.abs()))
}

fn ensure_same_len(lhs: &[f64], rhs: &[f64]) -> AppResult<()> {
    if lhs.len() != rhs.len() {
        return Err(AppError::LengthMismatch {
            expected: lhs.len(),
            found: rhs.len(),
        });
    }
    Ok(())
}
