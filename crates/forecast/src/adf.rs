use nalgebra::{DMatrix, DVector};

/// Augmented Dickey-Fuller test outcome.
///
/// H0: the series has a unit root (non-stationary). A p-value above 0.05
/// means the null cannot be rejected and the series should be differenced.
#[derive(Debug, Clone, Copy)]
pub struct AdfOutcome {
    pub statistic: f64,
    pub p_value: f64,
}

impl AdfOutcome {
    /// Degenerate outcome: cannot reject the unit root.
    fn inconclusive() -> Self {
        Self {
            statistic: f64::NAN,
            p_value: 1.0,
        }
    }
}

/// ADF regression with constant: dy_t = a + b*y_{t-1} + sum g_i*dy_{t-i} + e.
/// The t-statistic of `b` is compared against the constant-case
/// Dickey-Fuller distribution.
pub fn adf_test(data: &[f64]) -> AdfOutcome {
    let n = data.len();
    if n < 10 {
        return AdfOutcome::inconclusive();
    }

    let diff: Vec<f64> = data.windows(2).map(|w| w[1] - w[0]).collect();

    // Schwert's rule of thumb for the lag order.
    let lag = (((n as f64).powf(1.0 / 3.0) * 2.0) as usize).clamp(1, n / 4);
    let effective_n = n - 1 - lag;
    if effective_n < lag + 3 {
        return AdfOutcome::inconclusive();
    }

    let y: Vec<f64> = diff[lag..].to_vec();

    // Regressor row: [1, y_{t-1}, dy_{t-1}, ..., dy_{t-lag}]
    let num_regressors = 2 + lag;
    let mut x_data = Vec::with_capacity(effective_n * num_regressors);
    for t in lag..diff.len() {
        x_data.push(1.0);
        x_data.push(data[t]);
        for i in 1..=lag {
            x_data.push(diff[t - i]);
        }
    }

    let x = DMatrix::from_row_slice(effective_n, num_regressors, &x_data);
    let y_vec = DVector::from_vec(y);

    let xtx = x.transpose() * &x;
    let xty = x.transpose() * &y_vec;
    let xtx_inv = match xtx.try_inverse() {
        Some(inv) => inv,
        None => return AdfOutcome::inconclusive(),
    };
    let beta = &xtx_inv * xty;

    let y_hat = &x * &beta;
    let residuals = &y_vec - y_hat;
    let sse: f64 = residuals.iter().map(|r| r * r).sum();
    if effective_n <= num_regressors {
        return AdfOutcome::inconclusive();
    }
    let mse = sse / (effective_n - num_regressors) as f64;
    let se_beta = (mse * xtx_inv[(1, 1)]).sqrt();
    if !se_beta.is_finite() || se_beta < 1e-12 {
        return AdfOutcome::inconclusive();
    }

    let t_stat = beta[1] / se_beta;
    AdfOutcome {
        statistic: t_stat,
        p_value: approximate_p_value(t_stat, n),
    }
}

/// Piecewise-linear p-value over the constant-case critical values with a
/// small-sample correction. Only the 0.05 decision boundary matters to the
/// callers, so table precision beyond these anchors is not needed.
fn approximate_p_value(t_stat: f64, n: usize) -> f64 {
    let cv_1 = -3.43 - 6.0 / n as f64;
    let cv_5 = -2.86 - 4.0 / n as f64;
    let cv_10 = -2.57 - 3.0 / n as f64;

    let p = if t_stat < cv_1 {
        0.01 * (cv_1 - t_stat).exp().recip()
    } else if t_stat < cv_5 {
        0.01 + (0.05 - 0.01) * (t_stat - cv_1) / (cv_5 - cv_1)
    } else if t_stat < cv_10 {
        0.05 + (0.10 - 0.05) * (t_stat - cv_5) / (cv_10 - cv_5)
    } else {
        0.10 + 0.90 * (1.0 - (-0.5 * (t_stat - cv_10)).exp())
    };
    p.clamp(0.001, 0.999)
}

#[cfg(test)]
mod tests {
    use super::*;

    // Deterministic pseudo-noise so the regression never fits exactly.
    fn lcg_noise(len: usize) -> Vec<f64> {
        let mut state: u64 = 0x2545_f491_4f6c_dd1d;
        (0..len)
            .map(|_| {
                state = state
                    .wrapping_mul(6364136223846793005)
                    .wrapping_add(1442695040888963407);
                ((state >> 33) as f64 / (1u64 << 31) as f64) - 0.5
            })
            .collect()
    }

    #[test]
    fn test_white_noise_rejects_unit_root() {
        let data = lcg_noise(150);
        let outcome = adf_test(&data);
        assert!(outcome.statistic < -3.43);
        assert!(outcome.p_value < 0.05);
    }

    #[test]
    fn test_trending_series_keeps_unit_root() {
        // Steady growth: levels never revert to a constant mean, so the
        // unit root cannot be rejected.
        let noise = lcg_noise(150);
        let data: Vec<f64> = noise
            .iter()
            .enumerate()
            .map(|(i, n)| 100.0 + i as f64 + 0.2 * n)
            .collect();
        let outcome = adf_test(&data);
        assert!(outcome.p_value > 0.05);
    }

    #[test]
    fn test_short_series_is_inconclusive() {
        let outcome = adf_test(&[1.0, 2.0, 3.0]);
        assert_eq!(outcome.p_value, 1.0);
    }
}
