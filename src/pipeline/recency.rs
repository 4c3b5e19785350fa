// src/pipeline/recency.rs

//! Recency ranking for rendered time strings.
//!
//! Cross-region ordering reparses the human-readable relative-time string
//! back into an approximate minute count. The rank is used purely for
//! ordering; items whose string cannot be interpreted sort last.

use std::sync::OnceLock;

use regex::Regex;

/// Rank assigned to empty or unparseable time strings.
pub const UNKNOWN_RANK: i64 = 999_999;

/// Minute multiplier per relative-time unit, matched in order.
const UNIT_MINUTES: &[(&str, i64)] = &[
    ("분", 1),
    ("시간", 60),
    ("일", 1_440),
    ("개월", 43_200),
];

fn unit_regexes() -> &'static [(Regex, i64)] {
    static REGEXES: OnceLock<Vec<(Regex, i64)>> = OnceLock::new();
    REGEXES.get_or_init(|| {
        UNIT_MINUTES
            .iter()
            .filter_map(|(unit, minutes)| {
                Regex::new(&format!(r"(\d+){unit}"))
                    .ok()
                    .map(|re| (re, *minutes))
            })
            .collect()
    })
}

/// Approximate age in minutes for a rendered time string.
///
/// The "끌올" prefix does not affect ranking; only the count and unit do.
pub fn recency_rank(time: &str) -> i64 {
    if time.is_empty() {
        return UNKNOWN_RANK;
    }
    if time.contains("방금") || time.contains("초") {
        return 0;
    }

    for (re, minutes) in unit_regexes() {
        if let Some(n) = re
            .captures(time)
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse::<i64>().ok())
        {
            return n * minutes;
        }
    }

    UNKNOWN_RANK
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_just_now_and_seconds_rank_zero() {
        assert_eq!(recency_rank("방금 전"), 0);
        assert_eq!(recency_rank("40초 전"), 0);
    }

    #[test]
    fn test_minute_hour_day_month_multipliers() {
        assert_eq!(recency_rank("5분 전"), 5);
        assert_eq!(recency_rank("1시간 전"), 60);
        assert_eq!(recency_rank("3일 전"), 4_320);
        assert_eq!(recency_rank("13개월 전"), 561_600);
    }

    #[test]
    fn test_boost_prefix_is_ignored() {
        assert_eq!(recency_rank("끌올 2시간 전"), 120);
    }

    #[test]
    fn test_unknown_strings_rank_last() {
        assert_eq!(recency_rank(""), UNKNOWN_RANK);
        assert_eq!(recency_rank("어제쯤"), UNKNOWN_RANK);
    }
}
