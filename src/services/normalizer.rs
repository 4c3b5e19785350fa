// src/services/normalizer.rs

//! Raw record normalization.
//!
//! Turns either strategy's untyped output into a canonical [`Listing`]:
//! price formatting, relative-time rendering, link canonicalization, and
//! region display fallback. Pure given the caller-supplied wall-clock time.

use chrono::{DateTime, Duration, Utc};

use crate::models::{Listing, RawListing, region_name_prefix};

const SITE_ROOT: &str = "https://www.daangn.com";
const TITLE_FALLBACK: &str = "제목 없음";
const PRICE_FREE: &str = "나눔";
const PRICE_UNKNOWN: &str = "가격 미정";
const BOOST_PREFIX: &str = "끌올 ";

/// Normalize one raw record for the given source region.
pub fn normalize(raw: &RawListing, region_id: &str, now: DateTime<Utc>) -> Listing {
    Listing {
        title: raw
            .title
            .clone()
            .unwrap_or_else(|| TITLE_FALLBACK.to_string()),
        price: format_price(raw),
        region: region_display(raw, region_id),
        time: format_time(raw, now),
        thumbnail: raw.thumbnail.clone().unwrap_or_default(),
        link: canonical_link(raw),
        status: raw.status.clone().unwrap_or_default(),
    }
}

/// Zero maps to the give-away marker, other numeric values to grouped
/// digits with the currency suffix. Display text recovered by the DOM
/// strategy passes through untouched.
fn format_price(raw: &RawListing) -> String {
    if let Some(price) = raw.price {
        if price == 0.0 {
            return PRICE_FREE.to_string();
        }
        return format!("{}원", group_digits(price.round() as u64));
    }
    match &raw.price_text {
        Some(text) => text.clone(),
        None => PRICE_UNKNOWN.to_string(),
    }
}

/// Thousands grouping for a non-negative amount.
fn group_digits(value: u64) -> String {
    let digits = value.to_string();
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Elapsed time against `now`, preferring the re-promotion timestamp. A
/// differing re-promotion timestamp earns the "끌올" prefix. Records with
/// only display text keep it verbatim; records with neither render empty.
fn format_time(raw: &RawListing, now: DateTime<Utc>) -> String {
    let Some(reference) = raw.boosted_at.or(raw.created_at) else {
        return raw.time_text.clone().unwrap_or_default();
    };

    let rendered = elapsed_display(now - reference);
    match raw.boosted_at {
        Some(boosted) if raw.created_at != Some(boosted) => format!("{BOOST_PREFIX}{rendered}"),
        _ => rendered,
    }
}

fn elapsed_display(elapsed: Duration) -> String {
    let minutes = elapsed.num_minutes();
    if minutes < 1 {
        return "방금 전".to_string();
    }
    if minutes < 60 {
        return format!("{minutes}분 전");
    }
    let hours = elapsed.num_hours();
    if hours < 24 {
        return format!("{hours}시간 전");
    }
    let days = elapsed.num_days();
    if days < 30 {
        return format!("{days}일 전");
    }
    format!("{}개월 전", days / 30)
}

/// Absolute links pass through verbatim; otherwise the site-relative
/// identifier path is appended to the site root.
fn canonical_link(raw: &RawListing) -> String {
    if let Some(href) = &raw.href {
        return href.clone();
    }
    match &raw.id_path {
        Some(path) if !path.is_empty() => format!("{SITE_ROOT}{path}"),
        _ => String::new(),
    }
}

/// Explicit region name on the record, else the identifier's name prefix.
fn region_display(raw: &RawListing, region_id: &str) -> String {
    match &raw.region_name {
        Some(name) => name.clone(),
        None => region_name_prefix(region_id).to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw() -> RawListing {
        RawListing::default()
    }

    fn at(now: DateTime<Utc>, ago: Duration) -> Option<DateTime<Utc>> {
        Some(now - ago)
    }

    #[test]
    fn test_price_zero_is_free_marker() {
        let mut r = raw();
        r.price = Some(0.0);
        assert_eq!(format_price(&r), "나눔");
    }

    #[test]
    fn test_price_grouped_with_suffix() {
        let mut r = raw();
        r.price = Some(15000.0);
        assert_eq!(format_price(&r), "15,000원");

        r.price = Some(1234567.0);
        assert_eq!(format_price(&r), "1,234,567원");

        r.price = Some(500.0);
        assert_eq!(format_price(&r), "500원");
    }

    #[test]
    fn test_price_absent_is_placeholder() {
        assert_eq!(format_price(&raw()), "가격 미정");
    }

    #[test]
    fn test_price_display_text_passes_through() {
        let mut r = raw();
        r.price_text = Some("350,000원".to_string());
        assert_eq!(format_price(&r), "350,000원");
    }

    #[test]
    fn test_time_just_now() {
        let now = Utc::now();
        let mut r = raw();
        r.created_at = at(now, Duration::seconds(30));
        assert_eq!(format_time(&r, now), "방금 전");
    }

    #[test]
    fn test_time_ninety_minutes_is_one_hour() {
        let now = Utc::now();
        let mut r = raw();
        r.created_at = at(now, Duration::minutes(90));
        assert_eq!(format_time(&r, now), "1시간 전");
    }

    #[test]
    fn test_time_four_hundred_days_is_thirteen_months() {
        let now = Utc::now();
        let mut r = raw();
        r.created_at = at(now, Duration::days(400));
        assert_eq!(format_time(&r, now), "13개월 전");
    }

    #[test]
    fn test_time_day_range() {
        let now = Utc::now();
        let mut r = raw();
        r.created_at = at(now, Duration::days(5));
        assert_eq!(format_time(&r, now), "5일 전");
    }

    #[test]
    fn test_boost_prefix_when_timestamps_differ() {
        let now = Utc::now();
        let mut r = raw();
        r.created_at = at(now, Duration::days(3));
        r.boosted_at = at(now, Duration::minutes(10));
        assert_eq!(format_time(&r, now), "끌올 10분 전");
    }

    #[test]
    fn test_no_boost_prefix_when_timestamps_equal() {
        let now = Utc::now();
        let mut r = raw();
        r.created_at = at(now, Duration::minutes(10));
        r.boosted_at = r.created_at;
        assert_eq!(format_time(&r, now), "10분 전");
    }

    #[test]
    fn test_time_empty_when_nothing_known() {
        assert_eq!(format_time(&raw(), Utc::now()), "");
    }

    #[test]
    fn test_time_display_text_passes_through() {
        let mut r = raw();
        r.time_text = Some("2시간 전".to_string());
        assert_eq!(format_time(&r, Utc::now()), "2시간 전");
    }

    #[test]
    fn test_link_absolute_passes_verbatim() {
        let mut r = raw();
        r.href = Some("https://www.daangn.com/kr/buy-sell/a/".to_string());
        r.id_path = Some("/ignored".to_string());
        assert_eq!(canonical_link(&r), "https://www.daangn.com/kr/buy-sell/a/");
    }

    #[test]
    fn test_link_synthesized_from_id_path() {
        let mut r = raw();
        r.id_path = Some("/kr/buy-sell/bike-7/".to_string());
        assert_eq!(
            canonical_link(&r),
            "https://www.daangn.com/kr/buy-sell/bike-7/"
        );
    }

    #[test]
    fn test_link_empty_when_unknown() {
        assert_eq!(canonical_link(&raw()), "");
    }

    #[test]
    fn test_region_prefers_record_name() {
        let mut r = raw();
        r.region_name = Some("천호동".to_string());
        assert_eq!(region_display(&r, "역삼동-6035"), "천호동");
    }

    #[test]
    fn test_region_falls_back_to_id_prefix() {
        assert_eq!(region_display(&raw(), "역삼동-6035"), "역삼동");
    }

    #[test]
    fn test_normalize_fills_placeholders() {
        let listing = normalize(&raw(), "구의동-6059", Utc::now());
        assert_eq!(listing.title, "제목 없음");
        assert_eq!(listing.price, "가격 미정");
        assert_eq!(listing.region, "구의동");
        assert_eq!(listing.time, "");
        assert_eq!(listing.thumbnail, "");
        assert_eq!(listing.link, "");
        assert_eq!(listing.status, "");
    }
}
