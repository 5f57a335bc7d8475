// Tour records as stored by the server and the summary view consumed by the card renderer

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// Lifecycle status of a tour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TourStatus {
    Active,
    Inactive,
    Completed,
    Cancelled,
}

impl TourStatus {
    pub const ALL: [TourStatus; 4] = [
        TourStatus::Active,
        TourStatus::Inactive,
        TourStatus::Completed,
        TourStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TourStatus::Active => "active",
            TourStatus::Inactive => "inactive",
            TourStatus::Completed => "completed",
            TourStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for TourStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TourStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TourStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                format!(
                    "unknown status '{}', expected one of: active, inactive, completed, cancelled",
                    s
                )
            })
    }
}

// One day of a tour programme
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TourProgram {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day: Option<u32>,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

// Full tour record owned by the repository
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tour {
    pub id: u64,
    pub title: String,
    pub description: Option<String>,
    pub short_description: Option<String>,
    pub price: f64,
    pub duration: Option<u32>,
    pub location: Option<String>,
    pub date_start: Option<NaiveDate>,
    pub date_end: Option<NaiveDate>,
    pub max_participants: Option<u32>,
    pub status: TourStatus,
    pub image_url: Option<String>,
    #[serde(default)]
    pub programs: Vec<TourProgram>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// What a summary card reads; deserializes from the Tour JSON, dates kept raw
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TourSummary {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub short_description: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default, rename = "price")]
    pub price_amount: Option<f64>,
    #[serde(default)]
    pub date_start: Option<String>,
    #[serde(default)]
    pub date_end: Option<String>,
}

impl TourSummary {
    // An id of zero counts as missing, matching how the page treats falsy ids
    pub fn identifier(&self) -> Option<u64> {
        self.id.filter(|id| *id != 0)
    }
}

impl From<&Tour> for TourSummary {
    fn from(tour: &Tour) -> Self {
        Self {
            id: Some(tour.id),
            title: Some(tour.title.clone()),
            short_description: tour.short_description.clone(),
            image_url: tour.image_url.clone(),
            price_amount: Some(tour.price),
            date_start: tour.date_start.map(|d| d.to_string()),
            date_end: tour.date_end.map(|d| d.to_string()),
        }
    }
}

// Listing criteria for GET /tours; every present criterion must match
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TourFilter {
    pub status: Option<TourStatus>,
    pub search: Option<String>,
    pub location: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
}

impl TourFilter {
    pub fn matches(&self, tour: &Tour) -> bool {
        if !self.status.map_or(true, |status| tour.status == status) {
            return false;
        }

        if !self.min_price.map_or(true, |min| tour.price >= min) {
            return false;
        }

        if !self.max_price.map_or(true, |max| tour.price <= max) {
            return false;
        }

        if !self
            .location
            .as_deref()
            .map_or(true, |needle| contains_ci(tour.location.as_deref(), needle))
        {
            return false;
        }

        self.search.as_deref().map_or(true, |needle| {
            contains_ci(Some(&tour.title), needle)
                || contains_ci(tour.description.as_deref(), needle)
                || contains_ci(tour.short_description.as_deref(), needle)
        })
    }
}

fn contains_ci(haystack: Option<&str>, needle: &str) -> bool {
    haystack.map_or(false, |h| h.to_lowercase().contains(&needle.to_lowercase()))
}
