use analysis_core::{AnalysisError, Bar, FeedTuning, MarketData};
use async_trait::async_trait;
use chrono::DateTime;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

const CHART_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";
const SEARCH_URL: &str = "https://query1.finance.yahoo.com/v1/finance/search";
const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36";

/// HTTP client for Yahoo Finance daily bars and symbol search.
#[derive(Clone)]
pub struct YahooClient {
    client: Client,
}

impl YahooClient {
    pub fn new(tuning: &FeedTuning) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(tuning.timeout_secs))
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self { client }
    }

    /// Get daily bars for a symbol over a period code ("1mo", "1y", ...).
    pub async fn get_history(&self, symbol: &str, period: &str) -> Result<Vec<Bar>, AnalysisError> {
        let url = format!("{}/{}", CHART_URL, symbol);
        let response = self
            .client
            .get(&url)
            .query(&[("range", period), ("interval", "1d")])
            .send()
            .await
            .map_err(|e| AnalysisError::FetchFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(AnalysisError::FetchFailed(format!(
                "HTTP {} for {}",
                response.status(),
                symbol
            )));
        }

        let chart: ChartResponse = response
            .json()
            .await
            .map_err(|e| AnalysisError::FetchFailed(e.to_string()))?;

        if let Some(err) = chart.chart.error {
            return Err(AnalysisError::FetchFailed(format!(
                "{}: {}",
                err.code, err.description
            )));
        }

        let result = match chart.chart.result.into_iter().next() {
            Some(r) => r,
            None => return Ok(Vec::new()),
        };
        let quote = match result.indicators.quote.into_iter().next() {
            Some(q) => q,
            None => return Ok(Vec::new()),
        };

        let mut bars = Vec::with_capacity(result.timestamp.len());
        for (i, &ts) in result.timestamp.iter().enumerate() {
            let close = match quote.close.get(i).copied().flatten() {
                Some(c) => c,
                // Yahoo pads in-progress sessions with nulls.
                None => continue,
            };
            let date = match DateTime::from_timestamp(ts, 0) {
                Some(dt) => dt.date_naive(),
                None => continue,
            };
            bars.push(Bar {
                date,
                open: quote.open.get(i).copied().flatten().unwrap_or(close),
                high: quote.high.get(i).copied().flatten().unwrap_or(close),
                low: quote.low.get(i).copied().flatten().unwrap_or(close),
                close,
                volume: quote.volume.get(i).copied().flatten().unwrap_or(0.0),
            });
        }
        Ok(bars)
    }

    /// Last traded price and previous close for a symbol.
    pub async fn get_quote(&self, symbol: &str) -> Result<Quote, AnalysisError> {
        let url = format!("{}/{}", CHART_URL, symbol);
        let response = self
            .client
            .get(&url)
            .query(&[("range", "1d"), ("interval", "1d")])
            .send()
            .await
            .map_err(|e| AnalysisError::FetchFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(AnalysisError::FetchFailed(format!(
                "HTTP {} for {}",
                response.status(),
                symbol
            )));
        }

        let chart: ChartResponse = response
            .json()
            .await
            .map_err(|e| AnalysisError::FetchFailed(e.to_string()))?;

        let meta = chart
            .chart
            .result
            .into_iter()
            .next()
            .and_then(|r| r.meta)
            .ok_or_else(|| {
                AnalysisError::FetchFailed(format!("No quote data for '{}'", symbol))
            })?;

        let price = meta.regular_market_price.ok_or_else(|| {
            AnalysisError::FetchFailed(format!("No market price for '{}'", symbol))
        })?;
        let previous_close = meta.chart_previous_close.unwrap_or(price);
        let change_pct = if previous_close.abs() > f64::EPSILON {
            (price - previous_close) / previous_close * 100.0
        } else {
            0.0
        };

        Ok(Quote {
            symbol: symbol.to_string(),
            price,
            previous_close,
            change_pct,
            currency: meta.currency,
        })
    }

    /// Search for symbols matching a free-text query.
    pub async fn search(&self, query: &str) -> Result<Vec<SymbolMatch>, AnalysisError> {
        let response = self
            .client
            .get(SEARCH_URL)
            .query(&[("q", query), ("quotesCount", "10"), ("newsCount", "0")])
            .send()
            .await
            .map_err(|e| AnalysisError::FetchFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(AnalysisError::FetchFailed(format!(
                "HTTP {} for search '{}'",
                response.status(),
                query
            )));
        }

        let body: SearchResponse = response
            .json()
            .await
            .map_err(|e| AnalysisError::FetchFailed(e.to_string()))?;

        Ok(equity_matches(body.quotes))
    }

    /// Company name for a symbol, trimmed of corporate suffixes so it is
    /// usable as a headline search term. Best effort.
    pub async fn get_company_name(&self, symbol: &str) -> Option<String> {
        let matches = match self.search(symbol).await {
            Ok(m) => m,
            Err(e) => {
                tracing::debug!("Company name lookup failed for {}: {}", symbol, e);
                return None;
            }
        };
        let raw = matches
            .into_iter()
            .find(|m| m.symbol.eq_ignore_ascii_case(symbol))
            .and_then(|m| m.name)?;
        let cleaned = clean_company_name(&raw);
        if cleaned.is_empty() {
            None
        } else {
            Some(cleaned)
        }
    }
}

/// Keep equities (and untyped hits, which some regions return) and map
/// them to `SymbolMatch`, preferring the long name over the short one.
fn equity_matches(quotes: Vec<SearchQuote>) -> Vec<SymbolMatch> {
    quotes
        .into_iter()
        .filter(|q| q.quote_type.as_deref() == Some("EQUITY") || q.quote_type.is_none())
        .map(|q| SymbolMatch {
            symbol: q.symbol,
            name: q.longname.or(q.shortname),
            exchange: q.exchange,
        })
        .collect()
}

/// Strip legal-entity suffixes ("Apple Inc." -> "Apple").
fn clean_company_name(name: &str) -> String {
    let mut cleaned = name;
    if let Some(idx) = cleaned.find(',') {
        cleaned = &cleaned[..idx];
    }
    for suffix in [" Incorporated", " Inc.", " Inc", " Corporation", " Corp.", " Corp"] {
        if let Some(stripped) = cleaned.strip_suffix(suffix) {
            cleaned = stripped;
            break;
        }
    }
    cleaned.trim().to_string()
}

/// Spark quote for the dashboard header.
#[derive(Debug, Clone)]
pub struct Quote {
    pub symbol: String,
    pub price: f64,
    pub previous_close: f64,
    pub change_pct: f64,
    pub currency: Option<String>,
}

/// Hit from the symbol search endpoint.
#[derive(Debug, Clone)]
pub struct SymbolMatch {
    pub symbol: String,
    pub name: Option<String>,
    pub exchange: Option<String>,
}

/// Closing prices keyed by date, ready for the engines.
pub fn close_series(bars: &[Bar]) -> Vec<(chrono::NaiveDate, f64)> {
    bars.iter().map(|b| (b.date, b.close)).collect()
}

#[async_trait]
impl MarketData for YahooClient {
    async fn history(&self, symbol: &str, period: &str) -> Result<Vec<Bar>, AnalysisError> {
        self.get_history(symbol, period).await
    }

    async fn company_name(&self, symbol: &str) -> Option<String> {
        self.get_company_name(symbol).await
    }
}

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartEnvelope,
}

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    #[serde(default)]
    result: Vec<ChartResult>,
    #[serde(default)]
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    #[serde(default)]
    code: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    meta: Option<ChartMeta>,
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct ChartMeta {
    #[serde(rename = "regularMarketPrice", default)]
    regular_market_price: Option<f64>,
    #[serde(rename = "chartPreviousClose", default)]
    chart_previous_close: Option<f64>,
    #[serde(default)]
    currency: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<QuoteBlock>,
}

#[derive(Debug, Default, Deserialize)]
struct QuoteBlock {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    quotes: Vec<SearchQuote>,
}

#[derive(Debug, Deserialize)]
struct SearchQuote {
    #[serde(default)]
    symbol: String,
    #[serde(default)]
    shortname: Option<String>,
    #[serde(default)]
    longname: Option<String>,
    #[serde(default)]
    exchange: Option<String>,
    #[serde(rename = "quoteType", default)]
    quote_type: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_company_name_suffixes() {
        assert_eq!(clean_company_name("Apple Inc."), "Apple");
        assert_eq!(clean_company_name("NVIDIA Corporation"), "NVIDIA");
        assert_eq!(clean_company_name("Amazon.com, Inc."), "Amazon.com");
        assert_eq!(clean_company_name("Tesla"), "Tesla");
    }

    #[test]
    fn test_chart_meta_parses_quote_fields() {
        let body = r#"{
            "chart": {
                "result": [{
                    "meta": {
                        "currency": "USD",
                        "regularMarketPrice": 231.44,
                        "chartPreviousClose": 229.0
                    },
                    "timestamp": [],
                    "indicators": { "quote": [{}] }
                }],
                "error": null
            }
        }"#;
        let parsed: ChartResponse = serde_json::from_str(body).unwrap();
        let meta = parsed.chart.result[0].meta.as_ref().unwrap();
        assert_eq!(meta.regular_market_price, Some(231.44));
        assert_eq!(meta.chart_previous_close, Some(229.0));
        assert_eq!(meta.currency.as_deref(), Some("USD"));
    }

    #[test]
    fn test_chart_response_parses_nulls() {
        let body = r#"{
            "chart": {
                "result": [{
                    "timestamp": [1704412800, 1704499200],
                    "indicators": {
                        "quote": [{
                            "open": [184.2, null],
                            "high": [185.0, null],
                            "low": [183.4, null],
                            "close": [184.9, null],
                            "volume": [51000000, null]
                        }]
                    }
                }],
                "error": null
            }
        }"#;
        let parsed: ChartResponse = serde_json::from_str(body).unwrap();
        let result = &parsed.chart.result[0];
        assert_eq!(result.timestamp.len(), 2);
        assert_eq!(result.indicators.quote[0].close[1], None);
    }

    #[test]
    fn test_search_response_filters_to_equities() {
        let body = r#"{
            "quotes": [
                {
                    "symbol": "AAPL",
                    "shortname": "Apple Inc.",
                    "longname": "Apple Inc.",
                    "exchange": "NMS",
                    "quoteType": "EQUITY"
                },
                {
                    "symbol": "AAPL240119C00150000",
                    "shortname": "AAPL Jan 2024 call",
                    "quoteType": "OPTION"
                },
                {
                    "symbol": "APLE.MX",
                    "longname": "Apple Inc."
                }
            ]
        }"#;
        let parsed: SearchResponse = serde_json::from_str(body).unwrap();
        let matches = equity_matches(parsed.quotes);
        // The option contract is dropped; the untyped regional hit stays.
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].symbol, "AAPL");
        assert_eq!(matches[0].name.as_deref(), Some("Apple Inc."));
        assert_eq!(matches[0].exchange.as_deref(), Some("NMS"));
        assert_eq!(matches[1].symbol, "APLE.MX");
    }

    #[test]
    fn test_close_series_preserves_order() {
        let bars = vec![
            Bar {
                date: chrono::NaiveDate::from_ymd_opt(2024, 1, 4).unwrap(),
                open: 1.0,
                high: 1.0,
                low: 1.0,
                close: 10.0,
                volume: 0.0,
            },
            Bar {
                date: chrono::NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
                open: 1.0,
                high: 1.0,
                low: 1.0,
                close: 11.0,
                volume: 0.0,
            },
        ];
        let series = close_series(&bars);
        assert_eq!(series[0].1, 10.0);
        assert_eq!(series[1].1, 11.0);
    }
}
