// src/models/region.rs

//! Region catalog types.
//!
//! The upstream site keys every neighborhood by an opaque identifier of the
//! form `<name>-<numericId>` (e.g. `역삼동-6035`). The crawler never
//! interprets the identifier beyond splitting off the name portion for
//! display fallback.

use serde::{Deserialize, Serialize};

/// A display name to upstream region identifier pair.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RegionEntry {
    /// Neighborhood display name (e.g. "역삼동")
    pub name: String,

    /// Opaque upstream identifier (e.g. "역삼동-6035")
    pub id: String,
}

/// Name portion of a region identifier, used as display fallback.
///
/// # Examples
/// ```
/// use dangmoa::models::region_name_prefix;
///
/// assert_eq!(region_name_prefix("역삼동-6035"), "역삼동");
/// assert_eq!(region_name_prefix("nodash"), "nodash");
/// ```
pub fn region_name_prefix(region_id: &str) -> &str {
    region_id.split('-').next().unwrap_or(region_id)
}
