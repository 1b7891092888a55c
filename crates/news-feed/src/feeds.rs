/// Feed URL tables.
///
/// The templated feeds are symbol-specific searches; `{symbol}` is replaced
/// before fetching. Several Google News queries with different search terms
/// are used on purpose: each term surfaces a different slice of coverage
/// (earnings, management, price action) and duplicates are removed later.
pub const FEED_TEMPLATES: &[&str] = &[
    "https://news.google.com/rss/search?q={symbol}+stock&hl=en&gl=US&ceid=US:en",
    "https://news.google.com/rss/search?q={symbol}+Aktie&hl=de&gl=DE&ceid=DE:de",
    "https://news.google.com/rss/search?q={symbol}+shares&hl=en&gl=US&ceid=US:en",
    "https://news.google.com/rss/search?q={symbol}+investor&hl=en&gl=US&ceid=US:en",
    "https://news.google.com/rss/search?q={symbol}+earnings&hl=en&gl=US&ceid=US:en",
    "https://news.google.com/rss/search?q={symbol}+quarterly&hl=en&gl=US&ceid=US:en",
    "https://news.google.com/rss/search?q={symbol}+CEO&hl=en&gl=US&ceid=US:en",
    "https://news.google.com/rss/search?q={symbol}+market&hl=en&gl=US&ceid=US:en",
    "https://news.google.com/rss/search?q={symbol}+analysis&hl=en&gl=US&ceid=US:en",
    "https://news.google.com/rss/search?q={symbol}+price&hl=en&gl=US&ceid=US:en",
    "https://feeds.finance.yahoo.com/rss/2.0/headline?s={symbol}&region=US&lang=en-US",
];

/// A general finance feed with no symbol in the URL. Items are filtered for
/// relevance against the symbol and company name instead.
pub struct StaticFeed {
    pub url: &'static str,
    pub name: &'static str,
}

pub const STATIC_FEEDS: &[StaticFeed] = &[
    StaticFeed {
        url: "https://feeds.marketwatch.com/marketwatch/topstories/",
        name: "MarketWatch",
    },
    StaticFeed {
        url: "https://www.cnbc.com/id/100003114/device/rss/rss.html",
        name: "CNBC",
    },
    StaticFeed {
        url: "https://feeds.marketwatch.com/marketwatch/marketpulse/",
        name: "MarketWatch Pulse",
    },
    StaticFeed {
        url: "https://www.investing.com/rss/news.rss",
        name: "Investing.com",
    },
    StaticFeed {
        url: "https://seekingalpha.com/market_currents.xml",
        name: "Seeking Alpha",
    },
];

/// Map a feed URL to a display name by its domain.
pub fn identify_source(feed_url: &str) -> &'static str {
    if feed_url.contains("google.com") {
        "Google News"
    } else if feed_url.contains("yahoo.com") {
        "Yahoo Finance"
    } else if feed_url.contains("marketwatch.com") {
        "MarketWatch"
    } else if feed_url.contains("cnbc.com") {
        "CNBC"
    } else if feed_url.contains("investing.com") {
        "Investing.com"
    } else if feed_url.contains("seekingalpha.com") {
        "Seeking Alpha"
    } else if feed_url.contains("reuters") {
        "Reuters"
    } else {
        "Unknown"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identify_source_by_domain() {
        assert_eq!(
            identify_source("https://news.google.com/rss/search?q=TSLA+stock"),
            "Google News"
        );
        assert_eq!(
            identify_source("https://feeds.finance.yahoo.com/rss/2.0/headline?s=TSLA"),
            "Yahoo Finance"
        );
        assert_eq!(identify_source("https://example.org/feed.xml"), "Unknown");
    }

    #[test]
    fn test_templates_carry_symbol_placeholder() {
        for template in FEED_TEMPLATES {
            assert!(template.contains("{symbol}"), "{template}");
        }
    }
}
