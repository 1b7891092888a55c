use chrono::{DateTime, NaiveDate, NaiveDateTime};
use regex::Regex;
use std::sync::OnceLock;

/// One headline pulled out of a feed item, before scoring.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedItem {
    pub title: String,
    pub published: Option<NaiveDateTime>,
    pub source: Option<String>,
}

fn item_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?is)<item>(.*?)</item>").unwrap())
}

fn entry_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?is)<entry>(.*?)</entry>").unwrap())
}

fn title_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?is)<title[^>]*>(.*?)</title>").unwrap())
}

fn source_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?is)<source[^>]*>(.*?)</source>").unwrap())
}

fn cdata_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)<!\[CDATA\[(.*?)\]\]>").unwrap())
}

fn tag_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<[^>]+>").unwrap())
}

fn date_re(tag: &'static str) -> Regex {
    Regex::new(&format!(r"(?is)<{tag}[^>]*>(.*?)</{tag}>")).unwrap()
}

fn pub_date_res() -> &'static [Regex; 3] {
    static RES: OnceLock<[Regex; 3]> = OnceLock::new();
    // RSS uses pubDate; Atom uses published or updated.
    RES.get_or_init(|| [date_re("pubDate"), date_re("published"), date_re("updated")])
}

/// Split a feed body into raw item bodies. RSS `<item>` blocks are tried
/// first, then Atom `<entry>` blocks. Regex instead of an XML parser: feed
/// XML in the wild is frequently malformed, and only three fields matter.
pub fn extract_items(content: &str) -> Vec<String> {
    let items: Vec<String> = item_re()
        .captures_iter(content)
        .map(|c| c[1].to_string())
        .collect();
    if !items.is_empty() {
        return items;
    }
    entry_re()
        .captures_iter(content)
        .map(|c| c[1].to_string())
        .collect()
}

/// Parse title, publication date and origin source out of one item body.
pub fn parse_feed_item(item_xml: &str) -> ParsedItem {
    let title = match title_re().captures(item_xml) {
        Some(cap) => {
            let raw = cdata_re().replace_all(&cap[1], "$1").to_string();
            let decoded = decode_entities(raw.trim());
            tag_re().replace_all(&decoded, "").trim().to_string()
        }
        None => String::new(),
    };

    let published = pub_date_res()
        .iter()
        .find_map(|re| re.captures(item_xml))
        .and_then(|cap| parse_date(&cap[1]));

    let source = source_re().captures(item_xml).and_then(|cap| {
        let raw = cdata_re().replace_all(&cap[1], "$1").to_string();
        let cleaned = decode_entities(raw.trim());
        if cleaned.is_empty() {
            None
        } else {
            Some(cleaned)
        }
    });

    ParsedItem {
        title,
        published,
        source,
    }
}

/// Parse the date formats seen across RSS and Atom feeds, in order of how
/// common they are. Zone offsets are dropped, keeping the wall-clock time as
/// written, so all dates compare as naive timestamps.
pub fn parse_date(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    // RFC 2822, incl. obsolete zone names like GMT.
    if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
        return Some(dt.naive_local());
    }
    // ISO 8601 / RFC 3339.
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_local());
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%z", "%a, %d %b %Y %H:%M:%S %z"] {
        if let Ok(dt) = DateTime::parse_from_str(raw, fmt) {
            return Some(dt.naive_local());
        }
    }
    for fmt in ["%Y-%m-%d %H:%M:%S", "%d %b %Y %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt);
        }
    }
    if let Ok(d) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return d.and_hms_opt(0, 0, 0);
    }
    None
}

/// Decode the HTML entities that actually occur in feed titles: the named
/// XML set plus numeric references. Unknown entities pass through verbatim.
pub fn decode_entities(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(pos) = rest.find('&') {
        out.push_str(&rest[..pos]);
        rest = &rest[pos..];

        let semi = rest.find(';').filter(|&i| i > 1 && i <= 10);
        let decoded = semi.and_then(|end| {
            let entity = &rest[1..end];
            let ch = match entity {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                "nbsp" => Some(' '),
                _ => {
                    let code = if let Some(hex) =
                        entity.strip_prefix("#x").or_else(|| entity.strip_prefix("#X"))
                    {
                        u32::from_str_radix(hex, 16).ok()
                    } else if let Some(dec) = entity.strip_prefix('#') {
                        dec.parse::<u32>().ok()
                    } else {
                        None
                    };
                    code.and_then(char::from_u32)
                }
            };
            ch.map(|c| (c, end))
        });

        match decoded {
            Some((c, end)) => {
                out.push(c);
                rest = &rest[end + 1..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}
