use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// OHLCV bar data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// A scored news headline.
///
/// `source` is the outlet that published the story. When the story arrived
/// through an aggregator feed (e.g. Google News) rather than directly from
/// the outlet, `aggregator` names the feed it came through.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsItem {
    pub title: String,
    pub published: NaiveDateTime,
    pub source: String,
    #[serde(default)]
    pub aggregator: Option<String>,
    pub sentiment: f64,
}

impl NewsItem {
    /// Display form of the source, e.g. "Reuters (via Google News)".
    pub fn source_label(&self) -> String {
        match &self.aggregator {
            Some(agg) => format!("{} (via {})", self.source, agg),
            None => self.source.clone(),
        }
    }
}

/// Article count for one feed, used in coverage summaries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceCount {
    pub name: String,
    pub count: usize,
}

impl std::fmt::Display for SourceCount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name, self.count)
    }
}

/// History lookback period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Period {
    OneDay,
    FiveDays,
    OneMonth,
    ThreeMonths,
    SixMonths,
    OneYear,
    TwoYears,
    FiveYears,
    Max,
}

impl Period {
    pub fn parse(code: &str) -> Option<Period> {
        match code.to_ascii_lowercase().as_str() {
            "1d" => Some(Period::OneDay),
            "5d" => Some(Period::FiveDays),
            "1mo" => Some(Period::OneMonth),
            "3mo" => Some(Period::ThreeMonths),
            "6mo" => Some(Period::SixMonths),
            "1y" => Some(Period::OneYear),
            "2y" => Some(Period::TwoYears),
            "5y" => Some(Period::FiveYears),
            "max" => Some(Period::Max),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Period::OneDay => "1d",
            Period::FiveDays => "5d",
            Period::OneMonth => "1mo",
            Period::ThreeMonths => "3mo",
            Period::SixMonths => "6mo",
            Period::OneYear => "1y",
            Period::TwoYears => "2y",
            Period::FiveYears => "5y",
            Period::Max => "max",
        }
    }

    /// Calendar days covered by the period. `5d` maps to a full week so that
    /// weekend-published news still lands inside a five-session window.
    pub fn days(&self) -> i64 {
        match self {
            Period::OneDay => 1,
            Period::FiveDays => 7,
            Period::OneMonth => 30,
            Period::ThreeMonths => 90,
            Period::SixMonths => 180,
            Period::OneYear => 365,
            Period::TwoYears => 730,
            Period::FiveYears => 1825,
            Period::Max => 1825,
        }
    }
}

/// Days of news lookback for a period code. Unknown codes get one month.
pub fn period_days(code: &str) -> i64 {
    Period::parse(code).map(|p| p.days()).unwrap_or(30)
}

/// Classify an average sentiment score.
pub fn sentiment_label(score: f64) -> &'static str {
    if score > 0.05 {
        "positive"
    } else if score < -0.05 {
        "negative"
    } else {
        "neutral"
    }
}

/// Classify a Pearson coefficient by sign and magnitude.
pub fn correlation_label(r: f64) -> &'static str {
    if r > 0.5 {
        "strong positive"
    } else if r > 0.3 {
        "positive"
    } else if r < -0.5 {
        "strong negative"
    } else if r < -0.3 {
        "negative"
    } else {
        "weak/neutral"
    }
}

/// Classify a forecast's percent change from the current price.
pub fn forecast_label(pct_change: f64) -> &'static str {
    if pct_change > 5.0 {
        "strongly rising"
    } else if pct_change > 2.0 {
        "rising"
    } else if pct_change < -5.0 {
        "strongly falling"
    } else if pct_change < -2.0 {
        "falling"
    } else {
        "sideways"
    }
}

/// Classify a probability (percent) that a simulated price finishes higher.
pub fn monte_carlo_label(prob_positive: f64) -> &'static str {
    if prob_positive > 70.0 {
        "very bullish"
    } else if prob_positive > 55.0 {
        "bullish"
    } else if prob_positive < 30.0 {
        "very bearish"
    } else if prob_positive < 45.0 {
        "bearish"
    } else {
        "neutral"
    }
}

/// The next `n` weekdays strictly after `start`. Saturdays and Sundays are
/// skipped; exchange holidays are not modeled.
pub fn business_days_after(start: NaiveDate, n: usize) -> Vec<NaiveDate> {
    let mut out = Vec::with_capacity(n);
    let mut day = start;
    while out.len() < n {
        day += Duration::days(1);
        if day.weekday().number_from_monday() <= 5 {
            out.push(day);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_period_days_known_codes() {
        assert_eq!(period_days("1d"), 1);
        assert_eq!(period_days("5d"), 7);
        assert_eq!(period_days("1mo"), 30);
        assert_eq!(period_days("3mo"), 90);
        assert_eq!(period_days("6mo"), 180);
        assert_eq!(period_days("1y"), 365);
        assert_eq!(period_days("5y"), 1825);
    }

    #[test]
    fn test_period_days_unknown_defaults_to_month() {
        assert_eq!(period_days("7w"), 30);
        assert_eq!(period_days(""), 30);
    }

    #[test]
    fn test_sentiment_label_thresholds() {
        assert_eq!(sentiment_label(0.2), "positive");
        assert_eq!(sentiment_label(0.05), "neutral");
        assert_eq!(sentiment_label(-0.05), "neutral");
        assert_eq!(sentiment_label(-0.2), "negative");
    }

    #[test]
    fn test_correlation_label_bands() {
        assert_eq!(correlation_label(0.6), "strong positive");
        assert_eq!(correlation_label(0.4), "positive");
        assert_eq!(correlation_label(0.1), "weak/neutral");
        assert_eq!(correlation_label(-0.6), "strong negative");
        assert_eq!(correlation_label(-0.4), "negative");
        assert_eq!(correlation_label(0.0), "weak/neutral");
    }

    #[test]
    fn test_monte_carlo_label_bands() {
        assert_eq!(monte_carlo_label(80.0), "very bullish");
        assert_eq!(monte_carlo_label(60.0), "bullish");
        assert_eq!(monte_carlo_label(50.0), "neutral");
        assert_eq!(monte_carlo_label(40.0), "bearish");
        assert_eq!(monte_carlo_label(20.0), "very bearish");
    }

    #[test]
    fn test_business_days_skip_weekends() {
        // 2024-01-05 is a Friday.
        let friday = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
        let days = business_days_after(friday, 3);
        assert_eq!(days[0], NaiveDate::from_ymd_opt(2024, 1, 8).unwrap());
        assert_eq!(days[1], NaiveDate::from_ymd_opt(2024, 1, 9).unwrap());
        assert_eq!(days[2], NaiveDate::from_ymd_opt(2024, 1, 10).unwrap());
    }

    #[test]
    fn test_source_label_with_aggregator() {
        let item = NewsItem {
            title: "Example".into(),
            published: NaiveDate::from_ymd_opt(2024, 1, 5).unwrap().and_hms_opt(9, 0, 0).unwrap(),
            source: "Reuters".into(),
            aggregator: Some("Google News".into()),
            sentiment: 0.0,
        };
        assert_eq!(item.source_label(), "Reuters (via Google News)");
    }
}
