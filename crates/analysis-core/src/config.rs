use serde::{Deserialize, Serialize};

/// Tunables for news fetching and deduplication.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedTuning {
    /// Per-request timeout for feed and quote endpoints, in seconds.
    pub timeout_secs: u64,
    /// Lowercased title prefix length used as the dedup key.
    pub dedup_prefix: usize,
    /// Titles shorter than this are treated as junk and skipped.
    pub min_title_len: usize,
}

impl Default for FeedTuning {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            dedup_prefix: 60,
            min_title_len: 10,
        }
    }
}

/// Tunables for the price forecaster.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastTuning {
    /// Minimum closes required to fit a model.
    pub min_history: usize,
    /// Horizons beyond this many days blend the model path with a pure
    /// drift projection.
    pub blend_threshold_days: usize,
    /// Cap on the drift projection's blend weight.
    pub max_trend_weight: f64,
    /// Horizon at which the blend weight would reach 1.0 uncapped.
    pub trend_weight_horizon_days: f64,
    /// Normalizer for the log1p time factor in the confidence band.
    pub band_norm_days: f64,
    /// Horizons beyond this many days get extra per-year uncertainty.
    pub long_horizon_days: usize,
    /// Extra band width per forecast year past the long-horizon mark,
    /// as a fraction of the current price.
    pub long_horizon_uncertainty_per_year: f64,
    /// Lower band floor as a fraction of the current price.
    pub min_lower_frac: f64,
    /// Point forecast floor as a fraction of the current price.
    pub min_point_frac: f64,
}

impl Default for ForecastTuning {
    fn default() -> Self {
        Self {
            min_history: 30,
            blend_threshold_days: 90,
            max_trend_weight: 0.7,
            trend_weight_horizon_days: 1825.0,
            band_norm_days: 30.0,
            long_horizon_days: 365,
            long_horizon_uncertainty_per_year: 0.10,
            min_lower_frac: 0.01,
            min_point_frac: 0.05,
        }
    }
}

/// Tunables for the Monte Carlo simulator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonteCarloTuning {
    /// Minimum closes required to estimate drift and volatility.
    pub min_history: usize,
    /// Base RNG seed; path `i` draws from `seed + i`.
    pub seed: u64,
    /// Upper limit on the number of simulated paths.
    pub max_simulations: usize,
}

impl Default for MonteCarloTuning {
    fn default() -> Self {
        Self {
            min_history: 30,
            seed: 42,
            max_simulations: 10_000,
        }
    }
}
