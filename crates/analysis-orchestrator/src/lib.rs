//! Entry points for the four dashboard analyses.
//!
//! `StockAnalyzer` wires the market client, the news aggregator and the
//! numeric engines together behind one facade and adds short-TTL caching
//! so repeated calls for the same symbol do not re-fetch external data.

use std::sync::Arc;

use analysis_core::{
    sentiment_label, AnalysisError, Bar, FeedTuning, ForecastTuning, MarketData,
    MonteCarloTuning, NewsItem, NewsProvider, SentimentScorer, SourceCount,
};
use chrono::{DateTime, NaiveDate, Utc};
use correlation::CorrelationResult;
use dashmap::DashMap;
use forecast::{ForecastResult, Forecaster};
use market_client::{close_series, YahooClient};
use monte_carlo::{MonteCarloResult, MonteCarloSimulator};
use news_feed::NewsAggregator;
use sentiment_analysis::{daily_sentiment, LexiconScorer};
use serde::Serialize;

const CACHE_TTL_SECS: i64 = 300; // 5 minutes

/// Internal cache entry with timestamp
struct CacheEntry<T> {
    data: T,
    cached_at: DateTime<Utc>,
}

/// Summary block of a sentiment analysis.
#[derive(Debug, Clone, Serialize)]
pub struct SentimentStats {
    pub avg_sentiment: f64,
    pub news_count: usize,
    pub sentiment_days: usize,
    pub start_price: f64,
    pub end_price: f64,
    pub pct_change: f64,
    pub is_positive: bool,
}

/// Full payload of `analyze_sentiment`: the scored news list, which feeds
/// contributed, the daily averages and the price-vs-mood summary.
#[derive(Debug, Clone, Serialize)]
pub struct SentimentReport {
    pub symbol: String,
    pub label: &'static str,
    pub news: Vec<NewsItem>,
    pub sources: Vec<SourceCount>,
    pub sentiment_daily: Vec<(NaiveDate, f64)>,
    pub stats: SentimentStats,
}

/// Convert the UI's news-count selection into a usable limit.
/// The "all" sentinel means "effectively unlimited".
pub fn parse_news_limit(raw: &str, default: usize) -> usize {
    if raw.trim().eq_ignore_ascii_case("all") {
        return 100_000;
    }
    raw.trim().parse().unwrap_or(default)
}

pub struct StockAnalyzer {
    market: Arc<dyn MarketData>,
    news: Arc<dyn NewsProvider>,
    /// Set to `None` when no scorer is configured; sentiment and
    /// correlation then fail fast with `DependencyUnavailable`.
    scorer: Option<Arc<dyn SentimentScorer>>,
    forecaster: Forecaster,
    monte_carlo: MonteCarloSimulator,
    /// Cache news per (symbol, period, limit) (5-min TTL)
    news_cache: DashMap<String, CacheEntry<(Vec<NewsItem>, Vec<SourceCount>)>>,
    /// Cache bars per (symbol, period) (5-min TTL)
    bars_cache: DashMap<String, CacheEntry<Vec<Bar>>>,
}

impl StockAnalyzer {
    pub fn new() -> Self {
        let feed_tuning = FeedTuning::default();
        let market: Arc<dyn MarketData> = Arc::new(YahooClient::new(&feed_tuning));
        let scorer: Arc<dyn SentimentScorer> = Arc::new(LexiconScorer::new());
        let news: Arc<dyn NewsProvider> = Arc::new(NewsAggregator::new(
            scorer.clone(),
            market.clone(),
            feed_tuning,
        ));

        Self::with_providers(market, news, Some(scorer))
    }

    /// Build an analyzer over explicit providers. Used by tests and by
    /// callers that bring their own data sources.
    pub fn with_providers(
        market: Arc<dyn MarketData>,
        news: Arc<dyn NewsProvider>,
        scorer: Option<Arc<dyn SentimentScorer>>,
    ) -> Self {
        Self {
            market,
            news,
            scorer,
            forecaster: Forecaster::new(ForecastTuning::default()),
            monte_carlo: MonteCarloSimulator::new(MonteCarloTuning::default()),
            news_cache: DashMap::new(),
            bars_cache: DashMap::new(),
        }
    }

    fn require_scorer(&self) -> Result<(), AnalysisError> {
        if self.scorer.is_none() {
            return Err(AnalysisError::DependencyUnavailable(
                "No sentiment scorer configured.".to_string(),
            ));
        }
        Ok(())
    }

    /// Get news for a symbol (cached, 5-min TTL).
    async fn get_news(
        &self,
        symbol: &str,
        period: &str,
        limit: usize,
    ) -> Result<(Vec<NewsItem>, Vec<SourceCount>), AnalysisError> {
        let cache_key = format!("news:{}:{}:{}", symbol, period, limit);
        if let Some(entry) = self.news_cache.get(&cache_key) {
            let age = (Utc::now() - entry.cached_at).num_seconds();
            if age < CACHE_TTL_SECS {
                return Ok(entry.data.clone());
            }
        }

        let fetched = self.news.fetch_news(symbol, period, limit).await?;

        self.news_cache.insert(
            cache_key,
            CacheEntry {
                data: fetched.clone(),
                cached_at: Utc::now(),
            },
        );

        Ok(fetched)
    }

    /// Get daily bars for a symbol (cached, 5-min TTL). An empty history
    /// is a hard error for every analysis.
    async fn get_history(&self, symbol: &str, period: &str) -> Result<Vec<Bar>, AnalysisError> {
        let cache_key = format!("bars:{}:{}", symbol, period);
        if let Some(entry) = self.bars_cache.get(&cache_key) {
            let age = (Utc::now() - entry.cached_at).num_seconds();
            if age < CACHE_TTL_SECS {
                return Ok(entry.data.clone());
            }
        }

        let bars = self.market.history(symbol, period).await?;
        if bars.is_empty() {
            return Err(AnalysisError::InsufficientData(format!(
                "No price data available for '{}'.",
                symbol
            )));
        }

        self.bars_cache.insert(
            cache_key,
            CacheEntry {
                data: bars.clone(),
                cached_at: Utc::now(),
            },
        );

        Ok(bars)
    }

    /// News sentiment vs. price over a period.
    pub async fn analyze_sentiment(
        &self,
        symbol: &str,
        period: &str,
        news_limit: usize,
    ) -> Result<SentimentReport, AnalysisError> {
        self.require_scorer()?;
        let symbol = normalize_symbol(symbol);

        let (news, sources) = self.get_news(&symbol, period, news_limit).await?;
        if news.is_empty() {
            return Err(AnalysisError::InsufficientData(format!(
                "No news found for '{}'. Try a longer period.",
                symbol
            )));
        }

        let bars = self.get_history(&symbol, period).await?;

        let daily = daily_sentiment(&news);
        let avg_sentiment =
            news.iter().map(|n| n.sentiment).sum::<f64>() / news.len() as f64;

        let start_price = bars[0].close;
        let end_price = bars[bars.len() - 1].close;
        let pct_change = (end_price - start_price) / start_price * 100.0;

        Ok(SentimentReport {
            label: sentiment_label(avg_sentiment),
            stats: SentimentStats {
                avg_sentiment,
                news_count: news.len(),
                sentiment_days: daily.len(),
                start_price,
                end_price,
                pct_change,
                is_positive: end_price >= start_price,
            },
            sentiment_daily: daily.into_iter().collect(),
            news,
            sources,
            symbol,
        })
    }

    /// Pearson correlation between daily sentiment and closing prices.
    pub async fn analyze_correlation(
        &self,
        symbol: &str,
        period: &str,
        news_limit: usize,
    ) -> Result<CorrelationResult, AnalysisError> {
        self.require_scorer()?;
        let symbol = normalize_symbol(symbol);

        let (news, _sources) = self.get_news(&symbol, period, news_limit).await?;
        let bars = self.get_history(&symbol, period).await?;

        correlation::analyze(&symbol, &close_series(&bars), &news, period)
    }

    /// ARIMA price forecast over `forecast_days` business days.
    pub async fn analyze_forecast(
        &self,
        symbol: &str,
        history_period: &str,
        forecast_days: usize,
    ) -> Result<ForecastResult, AnalysisError> {
        let symbol = normalize_symbol(symbol);
        let bars = self.get_history(&symbol, history_period).await?;

        self.forecaster
            .forecast(&symbol, &close_series(&bars), forecast_days)
    }

    /// Monte-Carlo GBM simulation of `num_simulations` price paths.
    pub async fn analyze_monte_carlo(
        &self,
        symbol: &str,
        history_period: &str,
        forecast_days: usize,
        num_simulations: usize,
    ) -> Result<MonteCarloResult, AnalysisError> {
        let symbol = normalize_symbol(symbol);
        let bars = self.get_history(&symbol, history_period).await?;

        self.monte_carlo
            .simulate(&symbol, &close_series(&bars), forecast_days, num_simulations)
    }
}

impl Default for StockAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

fn normalize_symbol(symbol: &str) -> String {
    symbol.trim().to_uppercase()
}
