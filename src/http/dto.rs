//! Request and response bodies of the REST API.

use serde::{Deserialize, Serialize};

use super::error::AppError;
use crate::tour::{TourFilter, TourStatus};

/// Query string of `GET /tours`. Values stay strings so a bad number or status
/// produces the regular JSON error body instead of an extractor rejection.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TourListQuery {
    pub status: Option<String>,
    pub search: Option<String>,
    pub location: Option<String>,
    pub min_price: Option<String>,
    pub max_price: Option<String>,
}

impl TryFrom<TourListQuery> for TourFilter {
    type Error = AppError;

    fn try_from(query: TourListQuery) -> Result<Self, Self::Error> {
        let status = non_blank(query.status)
            .map(|raw| raw.parse::<TourStatus>().map_err(AppError::BadRequest))
            .transpose()?;

        Ok(TourFilter {
            status,
            search: non_blank(query.search),
            location: non_blank(query.location),
            min_price: parse_price("minPrice", query.min_price)?,
            max_price: parse_price("maxPrice", query.max_price)?,
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn parse_price(name: &str, value: Option<String>) -> Result<Option<f64>, AppError> {
    non_blank(value)
        .map(|raw| {
            raw.trim()
                .parse::<f64>()
                .map_err(|_| AppError::BadRequest(format!("{} must be a number, got '{}'", name, raw)))
        })
        .transpose()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatedResponse {
    pub id: u64,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_to_filter() {
        let query = TourListQuery {
            status: Some("active".to_string()),
            search: Some("  ".to_string()),
            location: Some("Altai".to_string()),
            min_price: Some("100".to_string()),
            max_price: None,
        };
        let filter = TourFilter::try_from(query).unwrap();

        assert_eq!(filter.status, Some(TourStatus::Active));
        assert_eq!(filter.search, None);
        assert_eq!(filter.location.as_deref(), Some("Altai"));
        assert_eq!(filter.min_price, Some(100.0));
    }

    #[test]
    fn test_bad_query_values() {
        let bad_price = TourListQuery {
            max_price: Some("lots".to_string()),
            ..Default::default()
        };
        assert!(matches!(TourFilter::try_from(bad_price), Err(AppError::BadRequest(_))));

        let bad_status = TourListQuery {
            status: Some("archived".to_string()),
            ..Default::default()
        };
        assert!(matches!(TourFilter::try_from(bad_status), Err(AppError::BadRequest(_))));
    }
}
