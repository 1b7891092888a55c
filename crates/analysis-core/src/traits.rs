use crate::{AnalysisError, Bar, NewsItem, SourceCount};
use async_trait::async_trait;

/// Trait for headline sentiment scorers. Implementations must be
/// deterministic: the same text always yields the same score in [-1, 1].
pub trait SentimentScorer: Send + Sync {
    fn score(&self, text: &str) -> f64;
}

/// Trait for price history providers
#[async_trait]
pub trait MarketData: Send + Sync {
    /// Daily bars for `symbol` over a period code such as "3mo".
    async fn history(&self, symbol: &str, period: &str) -> Result<Vec<Bar>, AnalysisError>;

    /// Best-effort company name lookup; `None` on any failure.
    async fn company_name(&self, symbol: &str) -> Option<String>;
}

/// Trait for news providers
#[async_trait]
pub trait NewsProvider: Send + Sync {
    /// Scored, deduplicated headlines for `symbol` within the period,
    /// newest first, plus per-feed article counts.
    async fn fetch_news(
        &self,
        symbol: &str,
        period: &str,
        limit: usize,
    ) -> Result<(Vec<NewsItem>, Vec<SourceCount>), AnalysisError>;
}
