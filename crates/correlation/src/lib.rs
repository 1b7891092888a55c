use analysis_core::{correlation_label, stats, AnalysisError, NewsItem, Period};
use chrono::NaiveDate;
use sentiment_analysis::daily_sentiment;
use serde::{Deserialize, Serialize};

const MIN_ARTICLES: usize = 5;
const SENTIMENT_MA_WINDOW: usize = 7;

/// One chart row: price and (gap-filled) sentiment for a trading day.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorrelationPoint {
    pub date: NaiveDate,
    pub price: f64,
    pub sentiment: f64,
    /// 7-day trailing mean of the sentiment column, for the smoothed overlay.
    pub sentiment_ma: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorrelationStats {
    pub news_count: usize,
    pub days_back: i64,
    pub start_price: f64,
    pub end_price: f64,
    pub pct_change: f64,
    pub is_positive: bool,
    pub avg_sentiment: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CorrelationResult {
    pub symbol: String,
    /// Pearson coefficient between price and gap-filled sentiment.
    pub coefficient: f64,
    pub label: &'static str,
    pub series: Vec<CorrelationPoint>,
    pub stats: CorrelationStats,
}

/// Correlate daily news sentiment with closing prices.
///
/// Price dates are the spine: daily sentiment is left-joined onto them,
/// missing days are linearly interpolated between known days and the
/// remaining edge gaps become 0 (neutral).
pub fn analyze(
    symbol: &str,
    closes: &[(NaiveDate, f64)],
    news: &[NewsItem],
    period: &str,
) -> Result<CorrelationResult, AnalysisError> {
    if news.len() < MIN_ARTICLES {
        return Err(AnalysisError::InsufficientData(format!(
            "Too few news articles for '{}' ({} found). Try a longer period.",
            symbol,
            news.len()
        )));
    }
    if closes.is_empty() {
        return Err(AnalysisError::InsufficientData(format!(
            "No price data available for '{}'.",
            symbol
        )));
    }

    let daily = daily_sentiment(news);
    let sparse: Vec<Option<f64>> = closes
        .iter()
        .map(|(date, _)| daily.get(date).copied())
        .collect();
    let sentiment: Vec<f64> = stats::interpolate_gaps(&sparse, 0.0);

    let prices: Vec<f64> = closes.iter().map(|(_, p)| *p).collect();
    let coefficient = stats::pearson(&prices, &sentiment);
    let sentiment_ma = stats::rolling_mean(&sentiment, SENTIMENT_MA_WINDOW);

    let series: Vec<CorrelationPoint> = closes
        .iter()
        .zip(sentiment.iter().zip(sentiment_ma.iter()))
        .map(|(&(date, price), (&s, &ma))| CorrelationPoint {
            date,
            price,
            sentiment: s,
            sentiment_ma: ma,
        })
        .collect();

    let start_price = prices[0];
    let end_price = prices[prices.len() - 1];
    let pct_change = if start_price.abs() > f64::EPSILON {
        (end_price - start_price) / start_price * 100.0
    } else {
        0.0
    };

    Ok(CorrelationResult {
        symbol: symbol.to_string(),
        coefficient,
        label: correlation_label(coefficient),
        series,
        stats: CorrelationStats {
            news_count: news.len(),
            days_back: Period::parse(period).map(|p| p.days()).unwrap_or(90),
            start_price,
            end_price,
            pct_change,
            is_positive: end_price >= start_price,
            // Mean over the gap-filled series, not the raw articles.
            avg_sentiment: stats::mean(&sentiment),
        },
    })
}
