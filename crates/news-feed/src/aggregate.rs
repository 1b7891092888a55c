use crate::feeds::{identify_source, FEED_TEMPLATES, STATIC_FEEDS};
use crate::parse::{extract_items, parse_feed_item};
use analysis_core::{
    period_days, AnalysisError, FeedTuning, MarketData, NewsItem, NewsProvider, SentimentScorer,
    SourceCount,
};
use async_trait::async_trait;
use chrono::{Duration, NaiveDateTime, Utc};
use reqwest::Client;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration as StdDuration;

const FEED_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Collects, deduplicates and scores headlines for one symbol across all
/// configured feeds.
pub struct NewsAggregator {
    client: Client,
    scorer: Arc<dyn SentimentScorer>,
    market: Arc<dyn MarketData>,
    tuning: FeedTuning,
}

struct CollectedItem {
    item: NewsItem,
    // Feed the item arrived through, for the coverage summary.
    feed: String,
}

impl NewsAggregator {
    pub fn new(
        scorer: Arc<dyn SentimentScorer>,
        market: Arc<dyn MarketData>,
        tuning: FeedTuning,
    ) -> Self {
        let client = Client::builder()
            .timeout(StdDuration::from_secs(tuning.timeout_secs))
            .user_agent(FEED_USER_AGENT)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            scorer,
            market,
            tuning,
        }
    }

    async fn fetch_feed(&self, url: &str) -> Result<Vec<String>, AnalysisError> {
        let response = self
            .client
            .get(url)
            .header("Accept", "application/rss+xml, application/xml, text/xml, */*")
            .header("Accept-Language", "en-US,en;q=0.9,de;q=0.8")
            .send()
            .await
            .map_err(|e| AnalysisError::FetchFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(AnalysisError::FetchFailed(format!(
                "HTTP {} from {}",
                response.status(),
                url
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| AnalysisError::FetchFailed(e.to_string()))?;

        Ok(extract_items(&body))
    }

    /// Parse, filter, dedup and score one feed's raw items.
    ///
    /// `relevance_terms` is `Some` for general feeds whose items must mention
    /// the symbol or company name; symbol-specific feeds pass `None`.
    fn collect_items(
        &self,
        raw_items: &[String],
        feed_name: &str,
        cutoff: NaiveDateTime,
        now: NaiveDateTime,
        seen: &mut HashSet<String>,
        relevance_terms: Option<&[String]>,
        out: &mut Vec<CollectedItem>,
    ) {
        for raw in raw_items {
            let parsed = parse_feed_item(raw);
            if parsed.title.chars().count() < self.tuning.min_title_len {
                continue;
            }

            if let Some(terms) = relevance_terms {
                let title_upper = parsed.title.to_uppercase();
                if !terms.iter().any(|t| title_upper.contains(t.as_str())) {
                    continue;
                }
            }

            let key: String = parsed
                .title
                .to_lowercase()
                .chars()
                .take(self.tuning.dedup_prefix)
                .collect();
            if !seen.insert(key) {
                continue;
            }

            // Items without a parseable date count as fresh.
            let published = parsed.published.unwrap_or(now);
            if published < cutoff {
                continue;
            }

            let sentiment = self.scorer.score(&parsed.title);
            let (source, aggregator) = match parsed.source {
                Some(src) if feed_name == "Google News" && src != "Google News" => {
                    (src, Some("Google News".to_string()))
                }
                Some(src) => (src, None),
                None => (feed_name.to_string(), None),
            };

            out.push(CollectedItem {
                item: NewsItem {
                    title: parsed.title,
                    published,
                    source,
                    aggregator,
                    sentiment,
                },
                feed: feed_name.to_string(),
            });
        }
    }

    async fn fetch_all(
        &self,
        symbol: &str,
        period: &str,
        limit: usize,
    ) -> Result<(Vec<NewsItem>, Vec<SourceCount>), AnalysisError> {
        let now = Utc::now().naive_utc();
        let cutoff = now - Duration::days(period_days(period));

        let mut search_terms = vec![symbol.to_uppercase()];
        if let Some(name) = self.market.company_name(symbol).await {
            search_terms.push(name.to_uppercase());
        }
        tracing::debug!("News search terms for {}: {:?}", symbol, search_terms);

        let mut seen: HashSet<String> = HashSet::new();
        let mut collected: Vec<CollectedItem> = Vec::new();

        for template in FEED_TEMPLATES {
            let url = template.replace("{symbol}", symbol);
            let feed_name = identify_source(&url);
            match self.fetch_feed(&url).await {
                Ok(raw_items) => {
                    tracing::debug!("{}: {} items", feed_name, raw_items.len());
                    self.collect_items(&raw_items, feed_name, cutoff, now, &mut seen, None, &mut collected);
                }
                Err(e) => tracing::warn!("Feed fetch failed ({}): {}", feed_name, e),
            }
        }

        for feed in STATIC_FEEDS {
            match self.fetch_feed(feed.url).await {
                Ok(raw_items) => {
                    tracing::debug!("{}: {} items", feed.name, raw_items.len());
                    self.collect_items(
                        &raw_items,
                        feed.name,
                        cutoff,
                        now,
                        &mut seen,
                        Some(&search_terms),
                        &mut collected,
                    );
                }
                Err(e) => tracing::warn!("Feed fetch failed ({}): {}", feed.name, e),
            }
        }

        Ok(finalize(collected, limit))
    }
}

/// Order newest first, cap at `limit`, then count feeds over what is left.
/// The summary reflects the returned set, not everything fetched.
fn finalize(mut collected: Vec<CollectedItem>, limit: usize) -> (Vec<NewsItem>, Vec<SourceCount>) {
    collected.sort_by(|a, b| b.item.published.cmp(&a.item.published));
    collected.truncate(limit);

    let sources = summarize_sources(&collected);
    let items = collected.into_iter().map(|c| c.item).collect();
    (items, sources)
}

/// Per-feed counts over the final (sorted, truncated) item set, most
/// productive feed first.
fn summarize_sources(collected: &[CollectedItem]) -> Vec<SourceCount> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for c in collected {
        *counts.entry(c.feed.as_str()).or_default() += 1;
    }
    let mut sources: Vec<SourceCount> = counts
        .into_iter()
        .map(|(name, count)| SourceCount {
            name: name.to_string(),
            count,
        })
        .collect();
    sources.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));
    sources
}

#[async_trait]
impl NewsProvider for NewsAggregator {
    async fn fetch_news(
        &self,
        symbol: &str,
        period: &str,
        limit: usize,
    ) -> Result<(Vec<NewsItem>, Vec<SourceCount>), AnalysisError> {
        self.fetch_all(symbol, period, limit).await
    }
}
