use analysis_core::AnalysisError;
use serde::{Deserialize, Serialize};

/// ARIMA(p, d, q) with an optional drift term.
///
/// AR coefficients come from the Yule-Walker equations (Levinson-Durbin),
/// MA coefficients from the autocorrelation of the AR residuals. With
/// `with_drift` the mean of the differenced series enters the prediction;
/// for d > 0 that constant is a linear trend in price space, which keeps
/// long forecasts from collapsing back to the sample mean.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArimaModel {
    p: usize,
    d: usize,
    q: usize,
    ar: Vec<f64>,
    ma: Vec<f64>,
    drift: f64,
    original: Vec<f64>,
    differenced: Vec<f64>,
    residuals: Vec<f64>,
    aic: f64,
}

impl ArimaModel {
    pub fn fit(
        data: &[f64],
        p: usize,
        d: usize,
        q: usize,
        with_drift: bool,
    ) -> Result<Self, AnalysisError> {
        let min_required = p + d + q + 10;
        if data.len() < min_required {
            return Err(AnalysisError::InsufficientData(format!(
                "ARIMA({},{},{}) needs at least {} points, got {}",
                p,
                d,
                q,
                min_required,
                data.len()
            )));
        }
        if data.iter().any(|x| !x.is_finite()) {
            return Err(AnalysisError::InvalidData(
                "price series contains NaN or infinite values".to_string(),
            ));
        }

        let differenced = difference(data, d);
        let n = differenced.len();
        let drift = if with_drift {
            differenced.iter().sum::<f64>() / n as f64
        } else {
            0.0
        };

        let ar = yule_walker(&differenced, drift, p);

        let mut residuals = vec![0.0; n];
        for i in p..n {
            let mut prediction = drift;
            for (j, coeff) in ar.iter().enumerate() {
                prediction += coeff * (differenced[i - j - 1] - drift);
            }
            residuals[i] = differenced[i] - prediction;
        }

        let ma = ma_from_residuals(&residuals, q);

        // AIC over the effectively fitted range, k = p + q + 1 for the drift.
        let fitted_n = n - p;
        let sse: f64 = residuals[p..].iter().map(|r| r * r).sum();
        let k = p + q + 1;
        let aic = fitted_n as f64 * (sse / fitted_n as f64).max(1e-12).ln() + 2.0 * k as f64;

        Ok(Self {
            p,
            d,
            q,
            ar,
            ma,
            drift,
            original: data.to_vec(),
            differenced,
            residuals,
            aic,
        })
    }

    pub fn order(&self) -> (usize, usize, usize) {
        (self.p, self.d, self.q)
    }

    pub fn aic(&self) -> f64 {
        self.aic
    }

    /// Standard deviation of the in-sample residuals.
    pub fn residual_std(&self) -> f64 {
        analysis_core::stats::std_dev(&self.residuals[self.p..])
    }

    /// Forecast `steps` values on the original scale.
    pub fn forecast(&self, steps: usize) -> Vec<f64> {
        if steps == 0 {
            return Vec::new();
        }

        let n = self.differenced.len();
        let mut extended = self.differenced.clone();
        let mut extended_residuals = self.residuals.clone();

        for _ in 0..steps {
            let mut value = self.drift;
            for (j, coeff) in self.ar.iter().enumerate() {
                let idx = extended.len() - j - 1;
                value += coeff * (extended[idx] - self.drift);
            }
            for (j, coeff) in self.ma.iter().enumerate() {
                if extended_residuals.len() > j {
                    let idx = extended_residuals.len() - j - 1;
                    value += coeff * extended_residuals[idx];
                }
            }
            extended.push(value);
            // Future shocks have zero expectation.
            extended_residuals.push(0.0);
        }

        self.undifference(&extended[n..])
    }

    fn undifference(&self, forecasts: &[f64]) -> Vec<f64> {
        if self.d == 0 {
            return forecasts.to_vec();
        }
        let mut result = forecasts.to_vec();
        for _ in 0..self.d {
            let mut level = self.original[self.original.len() - 1];
            for value in result.iter_mut() {
                level += *value;
                *value = level;
            }
        }
        result
    }
}

fn difference(data: &[f64], order: usize) -> Vec<f64> {
    let mut result = data.to_vec();
    for _ in 0..order {
        result = result.windows(2).map(|w| w[1] - w[0]).collect();
    }
    result
}

/// AR coefficients via Levinson-Durbin on the sample autocorrelations of
/// the series centered on `center`.
fn yule_walker(data: &[f64], center: f64, p: usize) -> Vec<f64> {
    if p == 0 {
        return Vec::new();
    }
    let n = data.len();
    let centered: Vec<f64> = data.iter().map(|x| x - center).collect();

    let mut autocov = vec![0.0; p + 1];
    for (k, cov) in autocov.iter_mut().enumerate() {
        let mut sum = 0.0;
        for i in k..n {
            sum += centered[i] * centered[i - k];
        }
        *cov = sum / n as f64;
    }

    let mut coeffs = vec![0.0; p];
    if autocov[0].abs() <= 1e-10 {
        return coeffs;
    }
    coeffs[0] = autocov[1] / autocov[0];
    for k in 1..p {
        let mut num = autocov[k + 1];
        for j in 0..k {
            num -= coeffs[j] * autocov[k - j];
        }
        let mut denom = autocov[0];
        for j in 0..k {
            denom -= coeffs[j] * autocov[j + 1];
        }
        if denom.abs() > 1e-10 {
            let reflection = num / denom;
            let previous = coeffs.clone();
            coeffs[k] = reflection;
            for j in 0..k {
                coeffs[j] = previous[j] - reflection * previous[k - 1 - j];
            }
        }
    }
    coeffs
}

/// MA coefficients from the lagged autocorrelation of the residuals,
/// clamped for stability.
fn ma_from_residuals(residuals: &[f64], q: usize) -> Vec<f64> {
    let mut coeffs = vec![0.0; q];
    if q == 0 || residuals.is_empty() {
        return coeffs;
    }
    let n = residuals.len();
    let mean: f64 = residuals.iter().sum::<f64>() / n as f64;
    let centered: Vec<f64> = residuals.iter().map(|x| x - mean).collect();
    let var: f64 = centered.iter().map(|x| x * x).sum::<f64>() / n as f64;
    if var.abs() <= 1e-10 {
        return coeffs;
    }
    for (k, coeff) in coeffs.iter_mut().enumerate() {
        let mut sum = 0.0;
        for i in (k + 1)..n {
            sum += centered[i] * centered[i - k - 1];
        }
        *coeff = ((sum / n as f64) / var).clamp(-0.99, 0.99);
    }
    coeffs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_short_series() {
        let data: Vec<f64> = (0..10).map(|x| x as f64).collect();
        assert!(matches!(
            ArimaModel::fit(&data, 1, 1, 1, true),
            Err(AnalysisError::InsufficientData(_))
        ));
    }

    #[test]
    fn test_rejects_nan() {
        let mut data: Vec<f64> = (0..40).map(|x| x as f64).collect();
        data[5] = f64::NAN;
        assert!(matches!(
            ArimaModel::fit(&data, 1, 1, 1, true),
            Err(AnalysisError::InvalidData(_))
        ));
    }

    #[test]
    fn test_linear_trend_extrapolates_with_drift() {
        let data: Vec<f64> = (1..=40).map(|x| x as f64).collect();
        let model = ArimaModel::fit(&data, 1, 1, 1, true).unwrap();
        let forecast = model.forecast(3);
        assert_eq!(forecast.len(), 3);
        assert!((forecast[0] - 41.0).abs() < 0.5);
        assert!((forecast[2] - 43.0).abs() < 1.0);
    }

    #[test]
    fn test_without_drift_trend_flattens() {
        let data: Vec<f64> = (1..=40).map(|x| x as f64).collect();
        let with_drift = ArimaModel::fit(&data, 1, 1, 1, true).unwrap();
        let without = ArimaModel::fit(&data, 1, 1, 1, false).unwrap();
        let far_with = with_drift.forecast(20)[19];
        let far_without = without.forecast(20)[19];
        assert!(far_with > far_without);
    }

    #[test]
    fn test_forecast_zero_steps() {
        let data: Vec<f64> = (1..=40).map(|x| x as f64).collect();
        let model = ArimaModel::fit(&data, 1, 1, 1, true).unwrap();
        assert!(model.forecast(0).is_empty());
    }

    #[test]
    fn test_aic_finite_and_order_reported() {
        let data: Vec<f64> = (0..60)
            .map(|x| 100.0 + (x as f64 * 0.7).sin() * 5.0 + x as f64 * 0.1)
            .collect();
        let model = ArimaModel::fit(&data, 2, 1, 1, true).unwrap();
        assert_eq!(model.order(), (2, 1, 1));
        assert!(model.aic().is_finite());
        assert!(model.residual_std() >= 0.0);
    }
}
