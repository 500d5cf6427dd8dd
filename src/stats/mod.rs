//! Descriptive statistics for the plot catalog and the query engine.
//!
//! Small pure functions over `&[f64]`. Inputs are the fixed 150-row dataset,
//! so nothing here tries to be clever about allocation.

use serde::Serialize;

/// Arithmetic mean. Empty input yields NaN; callers guard.
pub fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Median of a copy of the input.
pub fn median(values: &[f64]) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let n = sorted.len();
    if n % 2 == 1 {
        sorted[n / 2]
    } else {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    }
}

/// Sample standard deviation (n - 1 denominator).
pub fn std_dev(values: &[f64]) -> f64 {
    let m = mean(values);
    let var = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    var.sqrt()
}

pub fn min(values: &[f64]) -> f64 {
    values.iter().copied().fold(f64::INFINITY, f64::min)
}

pub fn max(values: &[f64]) -> f64 {
    values.iter().copied().fold(f64::NEG_INFINITY, f64::max)
}

/// Pearson correlation between two equal-length columns.
pub fn correlation(x: &[f64], y: &[f64]) -> f64 {
    let mx = mean(x);
    let my = mean(y);
    let mut cov = 0.0;
    let mut vx = 0.0;
    let mut vy = 0.0;
    for (a, b) in x.iter().zip(y) {
        cov += (a - mx) * (b - my);
        vx += (a - mx).powi(2);
        vy += (b - my).powi(2);
    }
    cov / (vx.sqrt() * vy.sqrt())
}

/// One histogram bar.
#[derive(Debug, Clone, Serialize)]
pub struct HistogramBin {
    /// Inclusive lower edge.
    pub start: f64,
    /// Exclusive upper edge (inclusive for the last bin).
    pub end: f64,
    pub count: usize,
}

/// Equal-width histogram with `bins` bars spanning [min, max].
pub fn histogram(values: &[f64], bins: usize) -> Vec<HistogramBin> {
    let lo = min(values);
    let hi = max(values);
    let width = (hi - lo) / bins as f64;

    let mut counts = vec![0usize; bins];
    for &v in values {
        let mut idx = ((v - lo) / width) as usize;
        // The maximum lands on the upper edge of the last bin.
        if idx >= bins {
            idx = bins - 1;
        }
        counts[idx] += 1;
    }

    counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| HistogramBin {
            start: lo + i as f64 * width,
            end: lo + (i + 1) as f64 * width,
            count,
        })
        .collect()
}

/// A sampled density curve.
#[derive(Debug, Clone, Serialize)]
pub struct DensityCurve {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

/// Silverman's rule-of-thumb bandwidth.
pub fn silverman_bandwidth(values: &[f64]) -> f64 {
    let n = values.len() as f64;
    1.06 * std_dev(values) * n.powf(-0.2)
}

/// Gaussian kernel density estimate evaluated on an even grid spanning the
/// data with a three-bandwidth margin on each side.
pub fn kde(values: &[f64], grid_points: usize) -> DensityCurve {
    let h = silverman_bandwidth(values);
    let lo = min(values) - 3.0 * h;
    let hi = max(values) + 3.0 * h;
    let step = (hi - lo) / (grid_points - 1) as f64;
    let norm = 1.0 / (values.len() as f64 * h * (2.0 * std::f64::consts::PI).sqrt());

    let mut xs = Vec::with_capacity(grid_points);
    let mut ys = Vec::with_capacity(grid_points);
    for i in 0..grid_points {
        let x = lo + i as f64 * step;
        let density: f64 = values
            .iter()
            .map(|&v| (-0.5 * ((x - v) / h).powi(2)).exp())
            .sum();
        xs.push(x);
        ys.push(norm * density);
    }

    DensityCurve { x: xs, y: ys }
}

/// A two-dimensional density surface on a rectangular grid.
#[derive(Debug, Clone, Serialize)]
pub struct DensityGrid {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    /// Row-major: `z[j][i]` is the density at (x[i], y[j]).
    pub z: Vec<Vec<f64>>,
}

/// Product-kernel 2-D KDE, one bandwidth per axis.
pub fn kde_2d(xs: &[f64], ys: &[f64], grid_points: usize) -> DensityGrid {
    let hx = silverman_bandwidth(xs);
    let hy = silverman_bandwidth(ys);

    let grid_axis = |values: &[f64], h: f64| -> Vec<f64> {
        let lo = min(values) - 3.0 * h;
        let hi = max(values) + 3.0 * h;
        let step = (hi - lo) / (grid_points - 1) as f64;
        (0..grid_points).map(|i| lo + i as f64 * step).collect()
    };

    let gx = grid_axis(xs, hx);
    let gy = grid_axis(ys, hy);
    let norm = 1.0 / (xs.len() as f64 * hx * hy * 2.0 * std::f64::consts::PI);

    let z = gy
        .iter()
        .map(|&yv| {
            gx.iter()
                .map(|&xv| {
                    let density: f64 = xs
                        .iter()
                        .zip(ys)
                        .map(|(&px, &py)| {
                            let dx = (xv - px) / hx;
                            let dy = (yv - py) / hy;
                            (-0.5 * (dx * dx + dy * dy)).exp()
                        })
                        .sum();
                    norm * density
                })
                .collect()
        })
        .collect();

    DensityGrid { x: gx, y: gy, z }
}

/// Least-squares fit of y against x.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
    /// Pearson correlation of the fitted pair.
    pub r: f64,
}

pub fn linear_fit(x: &[f64], y: &[f64]) -> LinearFit {
    let mx = mean(x);
    let my = mean(y);
    let mut cov = 0.0;
    let mut vx = 0.0;
    for (a, b) in x.iter().zip(y) {
        cov += (a - mx) * (b - my);
        vx += (a - mx).powi(2);
    }
    let slope = cov / vx;
    LinearFit {
        slope,
        intercept: my - slope * mx,
        r: correlation(x, y),
    }
}
