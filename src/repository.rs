// Tour persistence behind a trait so the REST layer does not care where tours live

use crate::tour::{Tour, TourFilter, TourProgram, TourStatus};
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("Tour {0} not found")]
    NotFound(u64),
}

// Validated data for a new tour
#[derive(Debug, Clone, PartialEq)]
pub struct NewTour {
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
    pub programs: Vec<TourProgram>,
}

// Partial update; `None` leaves the stored value untouched
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TourChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub short_description: Option<String>,
    pub price: Option<f64>,
    pub duration: Option<u32>,
    pub location: Option<String>,
    pub date_start: Option<NaiveDate>,
    pub date_end: Option<NaiveDate>,
    pub max_participants: Option<u32>,
    pub status: Option<TourStatus>,
    pub image_url: Option<String>,
    pub programs: Option<Vec<TourProgram>>,
}

impl TourChanges {
    pub fn apply_to(self, tour: &mut Tour) {
        if let Some(title) = self.title {
            tour.title = title;
        }
        if let Some(description) = self.description {
            tour.description = Some(description);
        }
        if let Some(short_description) = self.short_description {
            tour.short_description = Some(short_description);
        }
        if let Some(price) = self.price {
            tour.price = price;
        }
        if let Some(duration) = self.duration {
            tour.duration = Some(duration);
        }
        if let Some(location) = self.location {
            tour.location = Some(location);
        }
        if let Some(date_start) = self.date_start {
            tour.date_start = Some(date_start);
        }
        if let Some(date_end) = self.date_end {
            tour.date_end = Some(date_end);
        }
        if let Some(max_participants) = self.max_participants {
            tour.max_participants = Some(max_participants);
        }
        if let Some(status) = self.status {
            tour.status = status;
        }
        if let Some(image_url) = self.image_url {
            tour.image_url = Some(image_url);
        }
        if let Some(programs) = self.programs {
            tour.programs = programs;
        }
    }
}

#[async_trait]
pub trait TourRepository: Send + Sync + 'static {
    async fn list(&self, filter: &TourFilter) -> Result<Vec<Tour>, RepositoryError>;

    async fn get(&self, id: u64) -> Result<Tour, RepositoryError>;

    async fn create(&self, tour: NewTour) -> Result<Tour, RepositoryError>;

    async fn update(&self, id: u64, changes: TourChanges) -> Result<Tour, RepositoryError>;

    // Returns the removed record
    async fn delete(&self, id: u64) -> Result<Tour, RepositoryError>;
}

#[derive(Debug)]
pub struct InMemoryTourRepository {
    tours: DashMap<u64, Tour>,
    next_id: AtomicU64,
}

impl Default for InMemoryTourRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryTourRepository {
    pub fn new() -> Self {
        Self {
            tours: DashMap::new(),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn len(&self) -> usize {
        self.tours.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tours.is_empty()
    }
}

#[async_trait]
impl TourRepository for InMemoryTourRepository {
    async fn list(&self, filter: &TourFilter) -> Result<Vec<Tour>, RepositoryError> {
        let mut tours: Vec<Tour> = self
            .tours
            .iter()
            .filter(|entry| filter.matches(entry.value()))
            .map(|entry| entry.value().clone())
            .collect();
        tours.sort_by_key(|tour| tour.id);
        Ok(tours)
    }

    async fn get(&self, id: u64) -> Result<Tour, RepositoryError> {
        self.tours
            .get(&id)
            .map(|entry| entry.value().clone())
            .ok_or(RepositoryError::NotFound(id))
    }

    async fn create(&self, new_tour: NewTour) -> Result<Tour, RepositoryError> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let now = Utc::now();
        let tour = Tour {
            id,
            title: new_tour.title,
            description: new_tour.description,
            short_description: new_tour.short_description,
            price: new_tour.price,
            duration: new_tour.duration,
            location: new_tour.location,
            date_start: new_tour.date_start,
            date_end: new_tour.date_end,
            max_participants: new_tour.max_participants,
            status: new_tour.status,
            image_url: new_tour.image_url,
            programs: new_tour.programs,
            created_at: now,
            updated_at: now,
        };
        self.tours.insert(id, tour.clone());
        debug!(tour_id = id, "stored new tour");
        Ok(tour)
    }

    async fn update(&self, id: u64, changes: TourChanges) -> Result<Tour, RepositoryError> {
        let mut entry = self
            .tours
            .get_mut(&id)
            .ok_or(RepositoryError::NotFound(id))?;
        changes.apply_to(entry.value_mut());
        entry.updated_at = Utc::now();
        Ok(entry.value().clone())
    }

    async fn delete(&self, id: u64) -> Result<Tour, RepositoryError> {
        self.tours
            .remove(&id)
            .map(|(_, tour)| tour)
            .ok_or(RepositoryError::NotFound(id))
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn new_tour(title: &str, price: f64) -> NewTour {
        NewTour {
            title: title.to_string(),
            description: None,
            short_description: None,
            price,
            duration: None,
            location: None,
            date_start: None,
            date_end: None,
            max_participants: None,
            status: TourStatus::Active,
            image_url: None,
            programs: Vec::new(),
        }
    }
}
