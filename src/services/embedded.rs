// src/services/embedded.rs

//! Embedded-state extraction strategy.
//!
//! The upstream page serializes its client application state into an inline
//! script block as `window.__remixContext = {...};`. The JSON payload is
//! recovered in two stages: a strict regex-bounded parse first, then a
//! tolerant parse that takes everything from the first `{` and trims a
//! trailing statement terminator. Malformed JSON is never a hard failure;
//! the caller falls through to the DOM strategy.

use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use scraper::Html;
use serde_json::Value;

use crate::models::RawListing;
use crate::services::extractor::parse_selector;

/// Marker identifying the state-carrying script block.
const STATE_MARKER: &str = "window.__remixContext";

/// Route keys conventionally holding the result sets.
const ROUTE_KEYS: &[&str] = &["routes/kr.buy-sell._index", "routes/kr.buy-sell.s"];

/// Known (page, collection) key pairs holding listing arrays.
const COLLECTION_KEYS: &[(&str, &str)] = &[
    ("allPage", "fleamarketArticles"),
    ("searchPage", "fleamarketArticles"),
];

fn state_regex() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)window\.__remixContext\s*=\s*(\{.+?\})\s*;?\s*$").ok())
        .as_ref()
}

/// Strict parse: regex-bounded capture of the assignment payload.
pub fn parse_state_strict(script: &str) -> Option<Value> {
    let caps = state_regex()?.captures(script)?;
    serde_json::from_str(caps.get(1)?.as_str()).ok()
}

/// Tolerant parse: everything from the first `{`, with a trailing
/// statement terminator trimmed.
pub fn parse_state_lenient(script: &str) -> Option<Value> {
    let start = script.find('{')?;
    let payload = script[start..]
        .trim_end()
        .trim_end_matches(';')
        .trim_end();
    serde_json::from_str(payload).ok()
}

/// Extract raw records from the embedded application state.
///
/// Returns an empty vector when no script carries the marker, when the
/// payload is unparseable, or when no loader entry holds listings.
pub fn extract(document: &Html) -> Vec<RawListing> {
    let Some(script_sel) = parse_selector("script") else {
        return Vec::new();
    };

    for script in document.select(&script_sel) {
        let text: String = script.text().collect();
        if !text.contains(STATE_MARKER) {
            continue;
        }

        let Some(state) = parse_state_strict(&text).or_else(|| parse_state_lenient(&text)) else {
            log::debug!("Embedded state marker present but payload not parseable");
            continue;
        };

        return articles_from_state(&state);
    }

    Vec::new()
}

/// Walk the loader-data map for the first non-empty listing collection.
fn articles_from_state(state: &Value) -> Vec<RawListing> {
    let Some(loader_data) = state
        .get("state")
        .and_then(|s| s.get("loaderData"))
        .and_then(Value::as_object)
    else {
        return Vec::new();
    };

    for key in ROUTE_KEYS {
        if let Some(articles) = loader_data.get(*key).and_then(collection_in) {
            return articles.iter().map(raw_from_article).collect();
        }
    }

    // Conventional route keys missing or empty: scan every loader entry for
    // a recognizable collection shape and use the first non-empty match.
    for entry in loader_data.values() {
        if let Some(articles) = collection_in(entry) {
            return articles.iter().map(raw_from_article).collect();
        }
    }

    Vec::new()
}

/// First non-empty listing array under a loader entry, if any.
fn collection_in(entry: &Value) -> Option<&Vec<Value>> {
    COLLECTION_KEYS.iter().find_map(|(page, field)| {
        entry
            .get(*page)
            .and_then(|p| p.get(*field))
            .and_then(Value::as_array)
            .filter(|articles| !articles.is_empty())
    })
}

/// Map one article object into an untyped record.
fn raw_from_article(article: &Value) -> RawListing {
    RawListing {
        title: str_field(article, "title"),
        price: price_field(article),
        price_text: None,
        region_name: nested_name(article, "region").or_else(|| nested_name(article, "regionId")),
        created_at: time_field(article, "createdAt"),
        boosted_at: time_field(article, "boostedAt"),
        time_text: None,
        thumbnail: str_field(article, "thumbnail"),
        href: str_field(article, "href"),
        id_path: str_field(article, "id"),
        status: str_field(article, "status"),
    }
}

fn str_field(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(Value::as_str).map(str::to_string)
}

fn nested_name(value: &Value, key: &str) -> Option<String> {
    value
        .get(key)
        .and_then(|v| v.get("name"))
        .and_then(Value::as_str)
        .map(str::to_string)
}

/// Prices arrive as JSON numbers in some revisions and decimal strings in
/// others.
fn price_field(value: &Value) -> Option<f64> {
    match value.get("price") {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    }
}

fn time_field(value: &Value, key: &str) -> Option<DateTime<Utc>> {
    value
        .get(key)
        .and_then(Value::as_str)
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
}
