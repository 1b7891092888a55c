pub mod aggregate;
pub mod feeds;
pub mod parse;

pub use aggregate::NewsAggregator;
pub use feeds::{identify_source, StaticFeed, FEED_TEMPLATES, STATIC_FEEDS};
pub use parse::{decode_entities, extract_items, parse_date, parse_feed_item, ParsedItem};
