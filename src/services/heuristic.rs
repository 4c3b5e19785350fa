// src/services/heuristic.rs

//! DOM-heuristic extraction strategy.
//!
//! Fallback for pages without a recoverable embedded state. An ordered list
//! of structural selectors locates candidate card elements; per-card fields
//! come from dedicated sub-selectors first, then from content heuristics
//! over the card's visible text lines. Cards yielding neither a title nor a
//! price are discarded.

use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::models::RawListing;
use crate::services::extractor::parse_selector;
use crate::utils::resolve_url;

/// Base for making scraped asset URLs absolute.
const SITE_BASE: &str = "https://www.daangn.com/";

/// Structural selectors tried in order; the first matching at least one
/// element wins.
const CONTAINER_SELECTORS: &[&str] = &[
    r#"a[href*="/buy-sell/"]"#,
    r#"div[class*="card-item"], div[class*="article-card"]"#,
    "article",
];

const TITLE_SELECTOR: &str = r#"[class*="title"]"#;
const PRICE_SELECTOR: &str = r#"[class*="price"]"#;
const REGION_SELECTOR: &str = r#"[class*="region"], [class*="location"]"#;
const TIME_SELECTOR: &str = r#"time, [class*="time"]"#;
const STATUS_SELECTOR: &str = r#"[class*="status"], [class*="badge"]"#;
const THUMBNAIL_SELECTOR: &str = "img";
const LINK_SELECTOR: &str = "a[href]";

/// Relative-time unit words recognized in card text.
const TIME_WORDS: &[&str] = &["방금 전", "초 전", "분 전", "시간 전", "일 전", "개월 전"];

/// Administrative-unit suffixes marking a region line.
const REGION_SUFFIXES: &[char] = &['동', '읍', '면'];

/// Field a line heuristic can claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineField {
    Price,
    Time,
    Region,
}

/// Ordered (predicate, field) rules over a card's text lines.
const LINE_RULES: &[(fn(&str) -> bool, LineField)] = &[
    (is_price_line, LineField::Price),
    (is_time_line, LineField::Time),
    (is_region_line, LineField::Region),
];

fn is_price_line(line: &str) -> bool {
    (line.contains('원') && line.chars().any(|c| c.is_ascii_digit())) || line.trim() == "나눔"
}

fn is_time_line(line: &str) -> bool {
    TIME_WORDS.iter().any(|word| line.contains(word))
}

fn is_region_line(line: &str) -> bool {
    REGION_SUFFIXES.iter().any(|suffix| line.ends_with(*suffix))
}

fn classify_line(line: &str) -> Option<LineField> {
    LINE_RULES
        .iter()
        .find(|(matches, _)| matches(line))
        .map(|(_, field)| *field)
}

/// Sub-selectors parsed once per extraction run.
struct FieldSelectors {
    title: Option<Selector>,
    price: Option<Selector>,
    region: Option<Selector>,
    time: Option<Selector>,
    status: Option<Selector>,
    thumbnail: Option<Selector>,
    link: Option<Selector>,
}

impl FieldSelectors {
    fn new() -> Self {
        Self {
            title: parse_selector(TITLE_SELECTOR),
            price: parse_selector(PRICE_SELECTOR),
            region: parse_selector(REGION_SELECTOR),
            time: parse_selector(TIME_SELECTOR),
            status: parse_selector(STATUS_SELECTOR),
            thumbnail: parse_selector(THUMBNAIL_SELECTOR),
            link: parse_selector(LINK_SELECTOR),
        }
    }
}

/// Extract raw records from card markup.
pub fn extract(document: &Html) -> Vec<RawListing> {
    let fields = FieldSelectors::new();

    for container in CONTAINER_SELECTORS {
        let Some(selector) = parse_selector(container) else {
            continue;
        };

        let elements: Vec<ElementRef> = document.select(&selector).collect();
        if elements.is_empty() {
            continue;
        }

        log::debug!(
            "DOM strategy: {} candidate element(s) via '{container}'",
            elements.len()
        );
        return elements
            .iter()
            .filter_map(|el| extract_card(el, &fields))
            .collect();
    }

    Vec::new()
}

/// Extract one card; `None` when it yields neither a title nor a price.
fn extract_card(el: &ElementRef, fields: &FieldSelectors) -> Option<RawListing> {
    let mut raw = RawListing {
        title: select_text(el, &fields.title),
        price_text: select_text(el, &fields.price),
        region_name: select_text(el, &fields.region),
        time_text: select_text(el, &fields.time),
        status: select_text(el, &fields.status),
        thumbnail: select_attr(el, &fields.thumbnail, "src").map(absolutize),
        ..RawListing::default()
    };

    set_link(&mut raw, el, &fields.link);

    // Second pass: content heuristics fill whatever the sub-selectors
    // missed. A line claimed by any rule is no longer a title candidate.
    let lines = text_lines(el);
    let mut claimed = vec![false; lines.len()];
    for (i, line) in lines.iter().enumerate() {
        if let Some(field) = classify_line(line) {
            claimed[i] = true;
            let slot = match field {
                LineField::Price => &mut raw.price_text,
                LineField::Time => &mut raw.time_text,
                LineField::Region => &mut raw.region_name,
            };
            if slot.is_none() {
                *slot = Some(line.clone());
            }
        }
    }

    if raw.title.is_none() {
        raw.title = lines
            .iter()
            .zip(&claimed)
            .find(|(_, claimed)| !**claimed)
            .map(|(line, _)| line.clone());
    }

    if raw.title.is_none() && raw.price_text.is_none() {
        return None;
    }
    Some(raw)
}

/// Card link: the element's own `href` when it is an anchor, else the first
/// descendant anchor. Absolute links land in `href`, site-relative ones in
/// `id_path` for later synthesis.
fn set_link(raw: &mut RawListing, el: &ElementRef, link_sel: &Option<Selector>) {
    let href = el
        .value()
        .attr("href")
        .map(str::to_string)
        .or_else(|| select_attr(el, link_sel, "href"));

    match href {
        Some(href) if href.starts_with("http://") || href.starts_with("https://") => {
            raw.href = Some(href);
        }
        Some(href) => raw.id_path = Some(href),
        None => {}
    }
}

fn absolutize(src: String) -> String {
    if src.starts_with("http://") || src.starts_with("https://") {
        return src;
    }
    match Url::parse(SITE_BASE) {
        Ok(base) => resolve_url(&base, &src),
        Err(_) => src,
    }
}

fn select_text(el: &ElementRef, selector: &Option<Selector>) -> Option<String> {
    let found = el.select(selector.as_ref()?).next()?;
    let text = found.text().collect::<String>().trim().to_string();
    (!text.is_empty()).then_some(text)
}

fn select_attr(el: &ElementRef, selector: &Option<Selector>, attr: &str) -> Option<String> {
    el.select(selector.as_ref()?)
        .find_map(|found| found.value().attr(attr))
        .map(str::to_string)
}

fn text_lines(el: &ElementRef) -> Vec<String> {
    el.text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}
