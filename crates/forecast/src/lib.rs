pub mod adf;
pub mod arima;

use analysis_core::{
    business_days_after, forecast_label, stats, AnalysisError, ForecastTuning,
};
use arima::ArimaModel;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

const TRADING_DAYS_PER_YEAR: f64 = 252.0;
const Z_95: f64 = 1.96;

const GRID_P: &[usize] = &[1, 2, 3];
const GRID_Q: &[usize] = &[1, 2];

/// One forecast step: point estimate and 95% band, on a business day.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub date: NaiveDate,
    pub mean: f64,
    pub lower: f64,
    pub upper: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ForecastStats {
    pub current_price: f64,
    pub forecast_price: f64,
    pub forecast_change: f64,
    pub trend: &'static str,
    pub ci_lower: f64,
    pub ci_upper: f64,
    pub forecast_days: usize,
    pub history_days: usize,
    pub arima_order: (usize, usize, usize),
    pub aic: f64,
    /// Annualized drift of daily log returns, in percent.
    pub annual_drift: f64,
    /// Annualized volatility of daily log returns, in percent.
    pub annual_volatility: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ForecastResult {
    pub symbol: String,
    pub points: Vec<ForecastPoint>,
    pub stats: ForecastStats,
}

/// ARIMA-based price forecaster with drift correction.
///
/// Plain ARIMA mean-reverts, which turns multi-month forecasts into flat
/// lines. Two corrections address that: the fitted models carry a drift
/// term, and horizons past the blend threshold mix in an exponential
/// projection of the historical drift.
pub struct Forecaster {
    tuning: ForecastTuning,
}

impl Forecaster {
    pub fn new(tuning: ForecastTuning) -> Self {
        Self { tuning }
    }

    /// Weight of the drift projection at a given horizon.
    fn trend_weight(&self, horizon: usize) -> f64 {
        if horizon <= self.tuning.blend_threshold_days {
            return 0.0;
        }
        (horizon as f64 / self.tuning.trend_weight_horizon_days).min(self.tuning.max_trend_weight)
    }

    pub fn forecast(
        &self,
        symbol: &str,
        closes: &[(NaiveDate, f64)],
        horizon: usize,
    ) -> Result<ForecastResult, AnalysisError> {
        if horizon == 0 {
            return Err(AnalysisError::InvalidData(
                "forecast horizon must be at least one day".to_string(),
            ));
        }
        let prices: Vec<f64> = closes
            .iter()
            .map(|&(_, p)| p)
            .filter(|p| p.is_finite())
            .collect();
        if prices.len() < self.tuning.min_history {
            return Err(AnalysisError::InsufficientData(format!(
                "Not enough price data for '{}': need at least {} points, got {}.",
                symbol,
                self.tuning.min_history,
                prices.len()
            )));
        }

        let returns = stats::log_returns(&prices);
        if returns.is_empty() {
            return Err(AnalysisError::InvalidData(format!(
                "No usable returns for '{}'.",
                symbol
            )));
        }
        let daily_drift = stats::mean(&returns);
        let daily_volatility = stats::std_dev(&returns);
        let annual_drift = daily_drift * TRADING_DAYS_PER_YEAR;
        let annual_volatility = daily_volatility * TRADING_DAYS_PER_YEAR.sqrt();

        // Unit root in levels means the model works on first differences.
        let d = if adf::adf_test(&prices).p_value > 0.05 {
            1
        } else {
            0
        };

        let model = self.select_model(&prices, d)?;
        let current_price = prices[prices.len() - 1];
        let raw_forecast = model.forecast(horizon);

        let weight = self.trend_weight(horizon);
        let mean: Vec<f64> = if weight > 0.0 {
            let mut drift_path = Vec::with_capacity(horizon);
            let mut level = current_price;
            for t in 0..horizon {
                if t > 0 {
                    level *= daily_drift.exp();
                }
                drift_path.push(level);
            }
            raw_forecast
                .iter()
                .zip(drift_path.iter())
                .map(|(a, t)| (1.0 - weight) * a + weight * t)
                .collect()
        } else {
            raw_forecast
        };

        // Band width grows with the log of the step, anchored so the
        // one-month step has factor 1.
        let std_err = model.residual_std();
        let time_factor: Vec<f64> = (1..=horizon)
            .map(|t| (t as f64).ln_1p() / self.tuning.band_norm_days.ln_1p())
            .collect();
        let mut margin: Vec<f64> = time_factor
            .iter()
            .map(|tf| Z_95 * std_err * (1.0 + tf * daily_volatility * TRADING_DAYS_PER_YEAR.sqrt()))
            .collect();
        if horizon > self.tuning.long_horizon_days {
            let extra = (horizon as f64 / 365.0)
                * self.tuning.long_horizon_uncertainty_per_year
                * current_price;
            let tf_last = time_factor[horizon - 1];
            for (m, tf) in margin.iter_mut().zip(time_factor.iter()) {
                *m += extra * tf / tf_last;
            }
        }

        let lower_floor = current_price * self.tuning.min_lower_frac;
        let point_floor = current_price * self.tuning.min_point_frac;
        let dates = business_days_after(closes[closes.len() - 1].0, horizon);

        let points: Vec<ForecastPoint> = dates
            .into_iter()
            .zip(mean.iter().zip(margin.iter()))
            .map(|(date, (&m, &ci))| ForecastPoint {
                date,
                lower: (m - ci).max(lower_floor),
                upper: m + ci,
                mean: m.max(point_floor),
            })
            .collect();

        let forecast_price = points[points.len() - 1].mean;
        let forecast_change = (forecast_price - current_price) / current_price * 100.0;
        let last = &points[points.len() - 1];

        Ok(ForecastResult {
            symbol: symbol.to_string(),
            stats: ForecastStats {
                current_price,
                forecast_price,
                forecast_change,
                trend: forecast_label(forecast_change),
                ci_lower: last.lower,
                ci_upper: last.upper,
                forecast_days: horizon,
                history_days: prices.len(),
                arima_order: model.order(),
                aic: model.aic(),
                annual_drift: annual_drift * 100.0,
                annual_volatility: annual_volatility * 100.0,
            },
            points,
        })
    }

    /// Grid search over (p, q) by AIC; failed fits are skipped. Falls back
    /// to a plain ARIMA(1,1,1) when nothing in the grid converges.
    fn select_model(&self, prices: &[f64], d: usize) -> Result<ArimaModel, AnalysisError> {
        let mut best: Option<ArimaModel> = None;
        for &p in GRID_P {
            for &q in GRID_Q {
                match ArimaModel::fit(prices, p, d, q, true) {
                    Ok(model) => {
                        let better = best
                            .as_ref()
                            .map(|b| model.aic() < b.aic())
                            .unwrap_or(true);
                        if better {
                            best = Some(model);
                        }
                    }
                    Err(e) => {
                        tracing::debug!("ARIMA({},{},{}) fit skipped: {}", p, d, q, e);
                    }
                }
            }
        }
        match best {
            Some(model) => Ok(model),
            None => ArimaModel::fit(prices, 1, 1, 1, false),
        }
    }
}

impl Default for Forecaster {
    fn default() -> Self {
        Self::new(ForecastTuning::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn closes(prices: &[f64]) -> Vec<(NaiveDate, f64)> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        prices
            .iter()
            .enumerate()
            .map(|(i, &p)| (start + Duration::days(i as i64), p))
            .collect()
    }

    fn trending_prices(len: usize) -> Vec<f64> {
        (0..len)
            .map(|i| 100.0 * (1.0_f64 + 0.001).powi(i as i32) + (i as f64 * 0.9).sin())
            .collect()
    }

    #[test]
    fn test_requires_min_history() {
        let forecaster = Forecaster::default();
        let data = closes(&trending_prices(20));
        let err = forecaster.forecast("TSLA", &data, 10).unwrap_err();
        assert!(matches!(err, AnalysisError::InsufficientData(_)));
    }

    #[test]
    fn test_rejects_zero_horizon() {
        let forecaster = Forecaster::default();
        let data = closes(&trending_prices(100));
        let err = forecaster.forecast("TSLA", &data, 0).unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidData(_)));
    }

    #[test]
    fn test_forecast_shape_and_dates() {
        let forecaster = Forecaster::default();
        let data = closes(&trending_prices(120));
        let result = forecaster.forecast("TSLA", &data, 30).unwrap();
        assert_eq!(result.points.len(), 30);
        assert_eq!(result.stats.forecast_days, 30);
        assert_eq!(result.stats.history_days, 120);
        // All forecast dates are weekdays after the last close.
        let last_close = data[data.len() - 1].0;
        for point in &result.points {
            assert!(point.date > last_close);
            assert!(chrono::Datelike::weekday(&point.date).number_from_monday() <= 5);
        }
    }

    #[test]
    fn test_band_contains_mean_and_widens() {
        let forecaster = Forecaster::default();
        let data = closes(&trending_prices(150));
        let result = forecaster.forecast("AAPL", &data, 60).unwrap();
        for point in &result.points {
            assert!(point.lower <= point.mean);
            assert!(point.mean <= point.upper);
        }
        let first_width = result.points[0].upper - result.points[0].lower;
        let last_width = result.points[59].upper - result.points[59].lower;
        assert!(last_width >= first_width);
    }

    #[test]
    fn test_trend_weight_schedule() {
        let forecaster = Forecaster::default();
        assert_eq!(forecaster.trend_weight(30), 0.0);
        assert_eq!(forecaster.trend_weight(90), 0.0);
        assert!((forecaster.trend_weight(365) - 365.0 / 1825.0).abs() < 1e-12);
        assert!((forecaster.trend_weight(1825) - 0.7).abs() < 1e-12);
        assert!((forecaster.trend_weight(5000) - 0.7).abs() < 1e-12);
    }

    #[test]
    fn test_point_forecast_floor_applies() {
        let mut tuning = ForecastTuning::default();
        // Force the floor above any plausible forecast.
        tuning.min_point_frac = 2.0;
        let forecaster = Forecaster::new(tuning);
        let data = closes(&trending_prices(100));
        let current = data[data.len() - 1].1;
        let result = forecaster.forecast("MSFT", &data, 10).unwrap();
        for point in &result.points {
            assert!((point.mean - current * 2.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_long_horizon_band_wider_than_short() {
        let forecaster = Forecaster::default();
        let data = closes(&trending_prices(200));
        let short = forecaster.forecast("NVDA", &data, 30).unwrap();
        let long = forecaster.forecast("NVDA", &data, 400).unwrap();
        let short_width = short.stats.ci_upper - short.stats.ci_lower;
        let long_width = long.stats.ci_upper - long.stats.ci_lower;
        assert!(long_width > short_width);
    }

    #[test]
    fn test_upward_history_forecasts_upward_at_long_horizon() {
        let prices: Vec<f64> = (0..250)
            .map(|i| 100.0 * (1.0_f64 + 0.002).powi(i as i32))
            .collect();
        let forecaster = Forecaster::default();
        let result = forecaster.forecast("GROW", &closes(&prices), 365).unwrap();
        assert!(result.stats.forecast_price > result.stats.current_price);
        assert!(result.stats.annual_drift > 0.0);
    }
}
