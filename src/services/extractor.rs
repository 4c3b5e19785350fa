// src/services/extractor.rs

//! Listing extraction orchestrator.
//!
//! Runs the extraction strategies over one fetched page in a fixed priority
//! order: the embedded application state first, the DOM fallback second.
//! Extraction never fails: an unrecognized page degrades to `NoMatch`,
//! since "no listings found" and "layout unrecognized" are observationally
//! the same to the caller.

use scraper::{Html, Selector};

use crate::models::RawListing;
use crate::services::{embedded, heuristic};

/// Outcome of running the extraction strategies over one page.
#[derive(Debug, Clone, PartialEq)]
pub enum ExtractionOutcome {
    /// The embedded application state yielded listings
    EmbeddedState(Vec<RawListing>),

    /// The DOM fallback yielded listings
    DomHeuristic(Vec<RawListing>),

    /// Neither strategy recognized the page
    NoMatch,
}

impl ExtractionOutcome {
    /// Name of the strategy that produced this outcome.
    pub fn strategy(&self) -> &'static str {
        match self {
            Self::EmbeddedState(_) => "embedded-state",
            Self::DomHeuristic(_) => "dom-heuristic",
            Self::NoMatch => "none",
        }
    }

    /// Extracted records, empty for `NoMatch`.
    pub fn into_records(self) -> Vec<RawListing> {
        match self {
            Self::EmbeddedState(records) | Self::DomHeuristic(records) => records,
            Self::NoMatch => Vec::new(),
        }
    }
}

/// Extract raw listing records from page content.
///
/// The first strategy that yields at least one record wins. Deterministic
/// for identical input.
pub fn extract(html: &str) -> ExtractionOutcome {
    let document = Html::parse_document(html);

    let records = embedded::extract(&document);
    if !records.is_empty() {
        return ExtractionOutcome::EmbeddedState(records);
    }

    let records = heuristic::extract(&document);
    if !records.is_empty() {
        return ExtractionOutcome::DomHeuristic(records);
    }

    ExtractionOutcome::NoMatch
}

/// Parse a CSS selector, logging and skipping on failure so extraction
/// degrades to fewer records instead of raising.
pub(crate) fn parse_selector(selector: &str) -> Option<Selector> {
    match Selector::parse(selector) {
        Ok(sel) => Some(sel),
        Err(e) => {
            log::error!("Invalid selector '{selector}': {e:?}");
            None
        }
    }
}
