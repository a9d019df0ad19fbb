//! Shared numeric helpers.

use std::cmp::Ordering;

// =============================================================================
// Statistical Utilities
// =============================================================================

/// Compute the weighted quantile of a slice using a step function.
///
/// No interpolation: returns the value at the point where the cumulative
/// weight first reaches `alpha * total_weight`.
///
/// # Arguments
/// * `values` - The values to compute the quantile over
/// * `weights` - Optional weights for each value (None = uniform weights)
/// * `alpha` - The quantile level in (0, 1)
/// * `scratch` - Scratch space for sorting indices (resized as needed)
///
/// # Returns
/// The weighted quantile value. Returns `f64::NAN` if values is empty.
#[inline]
pub fn weighted_quantile(
    values: &[f64],
    weights: Option<&[f64]>,
    alpha: f64,
    scratch: &mut Vec<usize>,
) -> f64 {
    let n = values.len();
    if n == 0 {
        return f64::NAN;
    }
    if n == 1 {
        return values[0];
    }

    scratch.clear();
    scratch.extend(0..n);
    scratch.sort_by(|&a, &b| values[a].partial_cmp(&values[b]).unwrap_or(Ordering::Equal));

    let total_weight: f64 = match weights {
        Some(w) => w.iter().sum(),
        None => n as f64,
    };
    let threshold = total_weight * alpha;

    let mut cumulative = 0.0;
    for &idx in scratch.iter() {
        cumulative += weights.map_or(1.0, |ws| ws[idx]);
        if cumulative >= threshold {
            return values[idx];
        }
    }

    values[scratch[n - 1]]
}

/// Median of a slice, averaging the two middle values for even lengths.
///
/// Returns `f64::NAN` if values is empty.
pub fn median(values: &[f64]) -> f64 {
    let n = values.len();
    if n == 0 {
        return f64::NAN;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    if n % 2 == 1 {
        sorted[n / 2]
    } else {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    }
}
