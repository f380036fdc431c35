use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Origin tag stamped on every record.
pub const SOURCE_TAG: &str = "bioladen.de";
/// The search only covers Germany.
pub const HOME_COUNTRY_CODE: &str = "DE";

/// A store harvested from one result block of the dealer search.
///
/// Field names serialize in camelCase to match the dataset layout consumers
/// already read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreRecord {
    pub name: Option<String>,
    pub street: Option<String>,
    pub postal_code: Option<String>,
    pub city: Option<String>,
    pub country_code: Option<String>,
    /// Reserved for geocoding; the result list carries no coordinates.
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub website: Option<String>,
    /// First matched hours fragment, e.g. `"Mo-Fr 9:00"`. Not a parsed schedule.
    pub opening_hours: Option<String>,
    /// Absolute link to the store's detail page.
    pub detail_url: Option<String>,
    /// Distance from the searched postal code.
    pub distance_km: Option<f64>,
    pub category: Option<String>,
    pub source: String,
    pub scraped_at: DateTime<Utc>,
}

impl StoreRecord {
    /// An empty record carrying only the origin tag and capture time.
    #[must_use]
    pub fn empty(scraped_at: DateTime<Utc>) -> Self {
        Self {
            name: None,
            street: None,
            postal_code: None,
            city: None,
            country_code: Some(HOME_COUNTRY_CODE.to_string()),
            latitude: None,
            longitude: None,
            phone: None,
            email: None,
            website: None,
            opening_hours: None,
            detail_url: None,
            distance_km: None,
            category: None,
            source: SOURCE_TAG.to_string(),
            scraped_at,
        }
    }

    /// `true` when at least one of name, street or detail link is non-empty.
    ///
    /// Records without any of these carry no identity and are never emitted.
    #[must_use]
    pub fn has_identity(&self) -> bool {
        [&self.name, &self.street, &self.detail_url]
            .into_iter()
            .any(|field| field.as_deref().is_some_and(|s| !s.trim().is_empty()))
    }
}
