use analysis_core::{
    business_days_after, monte_carlo_label, stats, AnalysisError, MonteCarloTuning,
};
use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

const TRADING_DAYS_PER_YEAR: f64 = 252.0;
const PERCENTILE_LEVELS: &[f64] = &[5.0, 10.0, 25.0, 50.0, 75.0, 90.0, 95.0];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonteCarloStats {
    pub current_price: f64,
    pub mean_price: f64,
    pub median_price: f64,
    pub std_price: f64,
    /// Percent change of the mean final price vs. the current price.
    pub forecast_change: f64,
    pub forecast_days: usize,
    pub num_simulations: usize,
    pub history_days: usize,
    /// Annualized drift of daily log returns, in percent.
    pub annual_drift: f64,
    /// Annualized volatility of daily log returns, in percent.
    pub annual_volatility: f64,
    /// Final-price percentiles keyed as (level, price), ascending.
    pub percentiles: Vec<(u8, f64)>,
    /// Percent of paths finishing above the current price.
    pub prob_positive: f64,
    /// Percent of paths finishing more than 10% up.
    pub prob_up_10: f64,
    /// Percent of paths finishing more than 10% down.
    pub prob_down_10: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct MonteCarloResult {
    pub symbol: String,
    pub label: &'static str,
    /// Forecast dates, one per path column incl. the start (business days).
    pub dates: Vec<NaiveDate>,
    /// Simulated paths; every path starts at the current price and has
    /// `forecast_days + 1` points.
    pub paths: Vec<Vec<f64>>,
    pub stats: MonteCarloStats,
}

/// Geometric Brownian motion price simulator.
///
/// Each path draws from its own RNG seeded with `seed + path_index`, so a
/// fixed base seed reproduces bit-identical results regardless of how rayon
/// schedules the paths.
pub struct MonteCarloSimulator {
    tuning: MonteCarloTuning,
}

impl MonteCarloSimulator {
    pub fn new(tuning: MonteCarloTuning) -> Self {
        Self { tuning }
    }

    pub fn simulate(
        &self,
        symbol: &str,
        closes: &[(NaiveDate, f64)],
        forecast_days: usize,
        num_simulations: usize,
    ) -> Result<MonteCarloResult, AnalysisError> {
        if forecast_days == 0 || num_simulations == 0 {
            return Err(AnalysisError::InvalidData(
                "forecast days and simulation count must be positive".to_string(),
            ));
        }
        let prices: Vec<f64> = closes
            .iter()
            .map(|&(_, p)| p)
            .filter(|p| p.is_finite() && *p > 0.0)
            .collect();
        if prices.len() < self.tuning.min_history {
            return Err(AnalysisError::InsufficientData(format!(
                "Not enough price data for '{}': need at least {} points, got {}.",
                symbol,
                self.tuning.min_history,
                prices.len()
            )));
        }

        let num_simulations = num_simulations.min(self.tuning.max_simulations);
        let returns = stats::log_returns(&prices);
        let mu = stats::mean(&returns);
        let sigma = stats::std_dev(&returns);
        let current_price = prices[prices.len() - 1];

        let step_drift = mu - 0.5 * sigma * sigma;
        let base_seed = self.tuning.seed;

        let paths: Vec<Vec<f64>> = (0..num_simulations as u64)
            .into_par_iter()
            .map(|i| {
                let mut rng = StdRng::seed_from_u64(base_seed.wrapping_add(i));
                let mut path = Vec::with_capacity(forecast_days + 1);
                let mut price = current_price;
                path.push(price);
                for _ in 0..forecast_days {
                    let z: f64 = rng.sample(StandardNormal);
                    price *= (step_drift + sigma * z).exp();
                    path.push(price);
                }
                path
            })
            .collect();

        let final_prices: Vec<f64> = paths.iter().map(|p| p[forecast_days]).collect();
        let mean_price = stats::mean(&final_prices);
        let std_price = stats::std_dev(&final_prices);
        let percentiles: Vec<(u8, f64)> = PERCENTILE_LEVELS
            .iter()
            .map(|&lvl| (lvl as u8, stats::percentile_value(&final_prices, lvl)))
            .collect();
        let median_price = percentiles[3].1;

        let share = |pred: &dyn Fn(f64) -> bool| {
            final_prices.iter().filter(|&&p| pred(p)).count() as f64 / num_simulations as f64
                * 100.0
        };
        let prob_positive = share(&|p| p > current_price);
        let prob_up_10 = share(&|p| p > current_price * 1.10);
        let prob_down_10 = share(&|p| p < current_price * 0.90);

        let forecast_change = (mean_price - current_price) / current_price * 100.0;
        let dates = business_days_after(closes[closes.len() - 1].0, forecast_days + 1);

        Ok(MonteCarloResult {
            symbol: symbol.to_string(),
            label: monte_carlo_label(prob_positive),
            dates,
            paths,
            stats: MonteCarloStats {
                current_price,
                mean_price,
                median_price,
                std_price,
                forecast_change,
                forecast_days,
                num_simulations,
                history_days: prices.len(),
                annual_drift: mu * TRADING_DAYS_PER_YEAR * 100.0,
                annual_volatility: sigma * TRADING_DAYS_PER_YEAR.sqrt() * 100.0,
                percentiles,
                prob_positive,
                prob_up_10,
                prob_down_10,
            },
        })
    }
}

impl Default for MonteCarloSimulator {
    fn default() -> Self {
        Self::new(MonteCarloTuning::default())
    }
}
