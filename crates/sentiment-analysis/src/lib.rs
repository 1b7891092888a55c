use analysis_core::{stats, NewsItem, SentimentScorer};
use chrono::NaiveDate;
use std::collections::{BTreeMap, HashSet};

const NEGATION_WORDS: &[&str] = &[
    "not", "no", "never", "don't", "doesn't", "didn't", "isn't", "aren't",
    "wasn't", "weren't", "won't", "wouldn't", "couldn't", "shouldn't", "hardly",
    "barely", "neither", "nor", "without",
];

const NEGATION_WINDOW: usize = 3;

const POSITIVE_WORDS: &[&str] = &[
    "bullish", "rally", "surge", "gain", "gains", "profit", "growth", "beat",
    "beats", "upgrade", "outperform", "strong", "positive", "rise", "rises",
    "increase", "breakthrough", "innovation", "success", "exceed", "exceeds",
    "momentum", "buy", "recommend", "optimistic", "record", "advance",
    "soar", "soars", "jump", "jumps", "climb", "climbs", "upside",
    "recovery", "rebound", "expansion", "robust", "accelerating",
    "overweight", "raised", "upgraded", "initiated", "outpacing", "tailwind",
    "dividend", "buyback",
];

const NEGATIVE_WORDS: &[&str] = &[
    "bearish", "decline", "declines", "loss", "losses", "fall", "falls",
    "plunge", "plunges", "crash", "miss", "misses", "downgrade", "underperform",
    "weak", "negative", "drop", "drops", "decrease", "concern", "concerns",
    "risk", "fail", "fails", "disappoint", "disappoints", "slump", "sell",
    "warning", "pessimistic", "retreat", "fear", "fears", "trouble",
    "tumble", "tumbles", "sink", "sinks", "slide", "slides", "downside",
    "headwind", "lawsuit", "litigation", "recall", "investigation", "probe",
    "default", "bankruptcy", "layoff", "layoffs", "overvalued", "underweight",
    "lowered", "suspended",
];

/// Deterministic word-list sentiment scorer for financial headlines.
///
/// Counts positive and negative lexicon hits, flips a hit's sign when a
/// negation word appears within the preceding three tokens, then squashes
/// the raw sum into [-1, 1].
pub struct LexiconScorer {
    positive: HashSet<&'static str>,
    negative: HashSet<&'static str>,
    negation: HashSet<&'static str>,
}

impl LexiconScorer {
    pub fn new() -> Self {
        Self {
            positive: POSITIVE_WORDS.iter().copied().collect(),
            negative: NEGATIVE_WORDS.iter().copied().collect(),
            negation: NEGATION_WORDS.iter().copied().collect(),
        }
    }

    fn raw_score(&self, text: &str) -> i32 {
        let text_lower = text.to_lowercase();
        let words: Vec<&str> = text_lower
            .split(|c: char| c.is_whitespace() || matches!(c, ',' | ';' | '.' | '!' | '?' | ':' | '"' | '(' | ')'))
            .filter(|w| !w.is_empty())
            .collect();

        let negation_positions: Vec<usize> = words
            .iter()
            .enumerate()
            .filter(|(_, w)| self.negation.contains(*w))
            .map(|(i, _)| i)
            .collect();

        let mut score: i32 = 0;
        for (i, word) in words.iter().enumerate() {
            let is_positive = self.positive.contains(*word);
            let is_negative = self.negative.contains(*word);
            if !is_positive && !is_negative {
                continue;
            }

            let negated = negation_positions
                .iter()
                .any(|&neg_pos| neg_pos < i && (i - neg_pos) <= NEGATION_WINDOW);

            if is_positive {
                score += if negated { -1 } else { 1 };
            } else {
                score += if negated { 1 } else { -1 };
            }
        }
        score
    }
}

impl Default for LexiconScorer {
    fn default() -> Self {
        Self::new()
    }
}

impl SentimentScorer for LexiconScorer {
    fn score(&self, text: &str) -> f64 {
        // tanh(raw / 3): one hit ~ 0.32, saturates around three hits.
        (self.raw_score(text) as f64 / 3.0).tanh()
    }
}

/// Average sentiment per calendar day, keyed by publication date.
pub fn daily_sentiment(items: &[NewsItem]) -> BTreeMap<NaiveDate, f64> {
    let mut by_day: BTreeMap<NaiveDate, Vec<f64>> = BTreeMap::new();
    for item in items {
        by_day.entry(item.published.date()).or_default().push(item.sentiment);
    }
    by_day
        .into_iter()
        .map(|(day, scores)| (day, stats::mean(&scores)))
        .collect()
}
