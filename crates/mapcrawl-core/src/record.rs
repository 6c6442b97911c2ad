//! Domain types shared by the adapter, the crawl controller, and the store.

use serde::{Deserialize, Serialize};

/// Phone value stored when the source response carried no usable number.
pub const PHONE_PLACEHOLDER: &str = "See map link for details";

/// One business found by a query.
///
/// Identity for deduplication is the case-insensitive `name`; `id` is only an
/// opaque token so rows stay distinguishable in exports and backups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    pub id: String,
    pub name: String,
    pub address: String,
    /// Up to two numbers joined with `", "`, or [`PHONE_PLACEHOLDER`].
    pub phone: String,
    pub city: String,
    pub district: String,
    pub category: String,
    pub source_url: String,
}

impl Record {
    /// Generate a fresh opaque record id (`rec-<uuid>`).
    #[must_use]
    pub fn next_id() -> String {
        format!("rec-{}", uuid::Uuid::new_v4().simple())
    }

    /// Lower-cased name used as the deduplication key.
    #[must_use]
    pub fn dedup_key(&self) -> String {
        self.name.to_lowercase()
    }
}

/// The two fixed halves every city is searched in, visited in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Zone {
    Center,
    Districts,
}

impl Zone {
    pub const ALL: [Zone; 2] = [Zone::Center, Zone::Districts];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Zone::Center => "Center",
            Zone::Districts => "Districts",
        }
    }
}

impl std::fmt::Display for Zone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One `(city, zone, category)` combination to query.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryTuple {
    pub city: String,
    pub zone: Zone,
    pub category: String,
}

impl QueryTuple {
    #[must_use]
    pub fn new(city: impl Into<String>, zone: Zone, category: impl Into<String>) -> Self {
        Self {
            city: city.into(),
            zone,
            category: category.into(),
        }
    }
}

impl std::fmt::Display for QueryTuple {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} / {} / {}", self.city, self.zone, self.category)
    }
}

/// Optional caller location used to bias map grounding.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}
