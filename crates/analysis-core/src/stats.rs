//! Small numeric helpers shared by the analysis engines.

/// Compute the mean of a data slice.
pub fn mean(data: &[f64]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    data.iter().sum::<f64>() / data.len() as f64
}

/// Compute sample standard deviation.
pub fn std_dev(data: &[f64]) -> f64 {
    if data.len() < 2 {
        return 0.0;
    }
    let m = mean(data);
    let variance = data.iter().map(|x| (x - m).powi(2)).sum::<f64>() / (data.len() - 1) as f64;
    variance.sqrt()
}

/// Pearson correlation coefficient of two equal-length series.
/// Returns 0.0 when either series has no variance or the inputs are too
/// short, so degenerate data never produces NaN.
pub fn pearson(x: &[f64], y: &[f64]) -> f64 {
    if x.len() != y.len() || x.len() < 2 {
        return 0.0;
    }
    let mx = mean(x);
    let my = mean(y);
    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (a, b) in x.iter().zip(y.iter()) {
        cov += (a - mx) * (b - my);
        var_x += (a - mx).powi(2);
        var_y += (b - my).powi(2);
    }
    let denom = (var_x * var_y).sqrt();
    if denom < f64::EPSILON {
        return 0.0;
    }
    let r = cov / denom;
    if r.is_nan() {
        0.0
    } else {
        r
    }
}

/// Percentile of `data` at `pct` (0-100), using linear interpolation
/// between the two nearest order statistics.
pub fn percentile_value(data: &[f64], pct: f64) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    let mut sorted: Vec<f64> = data.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let rank = (pct / 100.0).clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    if lo == hi {
        sorted[lo]
    } else {
        let frac = rank - lo as f64;
        sorted[lo] + (sorted[hi] - sorted[lo]) * frac
    }
}

/// Trailing rolling mean over `window` points with a minimum of one point,
/// so the head of the output is averaged over whatever is available.
pub fn rolling_mean(data: &[f64], window: usize) -> Vec<f64> {
    let window = window.max(1);
    let mut out = Vec::with_capacity(data.len());
    for i in 0..data.len() {
        let start = i.saturating_sub(window - 1);
        out.push(mean(&data[start..=i]));
    }
    out
}

/// Fill gaps in a sparse series: interior `None` runs are linearly
/// interpolated between their neighbors, leading and trailing runs become
/// `fill`.
pub fn interpolate_gaps(data: &[Option<f64>], fill: f64) -> Vec<f64> {
    let mut out = vec![fill; data.len()];
    let known: Vec<usize> = data
        .iter()
        .enumerate()
        .filter_map(|(i, v)| v.map(|_| i))
        .collect();
    if known.is_empty() {
        return out;
    }
    for &i in &known {
        out[i] = data[i].unwrap_or(fill);
    }
    for pair in known.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        if b - a > 1 {
            let step = (out[b] - out[a]) / (b - a) as f64;
            for i in (a + 1)..b {
                out[i] = out[a] + step * (i - a) as f64;
            }
        }
    }
    out
}

/// Log returns of consecutive prices. Non-positive ratios are skipped.
pub fn log_returns(prices: &[f64]) -> Vec<f64> {
    prices
        .windows(2)
        .filter(|w| w[0] > 0.0 && w[1] > 0.0)
        .map(|w| (w[1] / w[0]).ln())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pearson_perfect_correlation() {
        let x = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let y = vec![2.0, 4.0, 6.0, 8.0, 10.0];
        assert!((pearson(&x, &y) - 1.0).abs() < 1e-10);
        let inv: Vec<f64> = y.iter().map(|v| -v).collect();
        assert!((pearson(&x, &inv) + 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_pearson_degenerate_is_zero() {
        let x = vec![3.0, 3.0, 3.0, 3.0];
        let y = vec![1.0, 2.0, 3.0, 4.0];
        assert_eq!(pearson(&x, &y), 0.0);
        assert_eq!(pearson(&x, &[1.0]), 0.0);
    }

    #[test]
    fn test_percentile_interpolates() {
        let data = vec![1.0, 2.0, 3.0, 4.0];
        assert!((percentile_value(&data, 50.0) - 2.5).abs() < 1e-10);
        assert!((percentile_value(&data, 0.0) - 1.0).abs() < 1e-10);
        assert!((percentile_value(&data, 100.0) - 4.0).abs() < 1e-10);
    }

    #[test]
    fn test_rolling_mean_min_one() {
        let data = vec![2.0, 4.0, 6.0, 8.0];
        let rm = rolling_mean(&data, 3);
        assert!((rm[0] - 2.0).abs() < 1e-10);
        assert!((rm[1] - 3.0).abs() < 1e-10);
        assert!((rm[2] - 4.0).abs() < 1e-10);
        assert!((rm[3] - 6.0).abs() < 1e-10);
    }

    #[test]
    fn test_interpolate_gaps_interior_and_edges() {
        let data = vec![None, Some(1.0), None, None, Some(4.0), None];
        let filled = interpolate_gaps(&data, 0.0);
        assert_eq!(filled[0], 0.0);
        assert!((filled[2] - 2.0).abs() < 1e-10);
        assert!((filled[3] - 3.0).abs() < 1e-10);
        assert_eq!(filled[5], 0.0);
    }

    #[test]
    fn test_interpolate_gaps_all_missing() {
        let filled = interpolate_gaps(&[None, None, None], 0.0);
        assert_eq!(filled, vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_log_returns() {
        let prices = vec![100.0, 110.0, 99.0];
        let r = log_returns(&prices);
        assert_eq!(r.len(), 2);
        assert!((r[0] - (1.1f64).ln()).abs() < 1e-10);
    }
}
