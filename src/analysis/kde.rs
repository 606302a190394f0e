//! Gaussian kernel density estimation over per-run costs.
//!
//! The linear fit reduces every batch to one slope; a density over the
//! per-batch costs `reading / n` shows what that average hides: a second
//! mode from a cold-cache batch, a heavy tail from allocator churn.
//! Diagnostic smoothing only, nothing downstream consumes it numerically.

use serde::{Deserialize, Serialize};

/// A kernel density estimate evaluated on an evenly spaced grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Kde {
    /// Grid points (per-run cost axis).
    pub xs: Vec<f64>,
    /// Estimated density at each grid point.
    pub ys: Vec<f64>,
    /// Bandwidth used (Silverman's rule of thumb).
    pub bandwidth: f64,
}

/// Estimate a Gaussian KDE over `data`, evaluated at `grid_size` points.
///
/// Bandwidth follows Silverman's rule, `h = 1.06 σ n^(-1/5)`, with a small
/// floor for near-constant data so the density stays well-defined. The
/// grid spans the data range extended by three bandwidths on each side;
/// a single-point grid sits on the data mean.
///
/// Returns `None` for an empty data set or a zero grid size.
pub fn gaussian_kde(data: &[f64], grid_size: usize) -> Option<Kde> {
    if data.is_empty() || grid_size == 0 {
        return None;
    }

    let n = data.len() as f64;
    let mean = data.iter().sum::<f64>() / n;
    let variance = data.iter().map(|x| (x - mean) * (x - mean)).sum::<f64>() / n;
    let sigma = variance.sqrt();

    let bandwidth = if sigma > 0.0 {
        1.06 * sigma * n.powf(-0.2)
    } else {
        // Constant data: any positive bandwidth yields a single bump.
        mean.abs().max(1.0) * 1e-3
    };

    let lo = data.iter().cloned().fold(f64::INFINITY, f64::min) - 3.0 * bandwidth;
    let hi = data.iter().cloned().fold(f64::NEG_INFINITY, f64::max) + 3.0 * bandwidth;

    // A one-point grid sits on the data mean, not the padded range edge.
    let (lo, step) = if grid_size > 1 {
        (lo, (hi - lo) / (grid_size - 1) as f64)
    } else {
        (mean, 0.0)
    };

    let norm = 1.0 / (n * bandwidth * (2.0 * std::f64::consts::PI).sqrt());
    let mut xs = Vec::with_capacity(grid_size);
    let mut ys = Vec::with_capacity(grid_size);

    for i in 0..grid_size {
        let x = lo + step * i as f64;
        let density: f64 = data
            .iter()
            .map(|&xi| {
                let u = (x - xi) / bandwidth;
                (-0.5 * u * u).exp()
            })
            .sum::<f64>()
            * norm;
        xs.push(x);
        ys.push(density);
    }

    Some(Kde { xs, ys, bandwidth })
}
