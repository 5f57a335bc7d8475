// Form validation and tour operations on top of the repository and image store

use crate::repository::{NewTour, RepositoryError, TourChanges, TourRepository};
use crate::tour::{Tour, TourFilter, TourProgram, TourStatus};
use crate::uploads::{ImageStore, UploadError, UploadedImage};
use chrono::NaiveDate;
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug, PartialEq)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidField { field: String, message: String },
}

impl ValidationError {
    fn invalid(field: &str, message: impl Into<String>) -> Self {
        ValidationError::InvalidField {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

#[derive(Error, Debug)]
pub enum ControllerError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    Upload(#[from] UploadError),
}

// Raw multipart submission: text fields by name plus an optional image part
#[derive(Debug, Clone, Default)]
pub struct TourForm {
    pub fields: HashMap<String, String>,
    pub image: Option<UploadedImage>,
}

impl TourForm {
    pub fn with_field(mut self, name: &str, value: &str) -> Self {
        self.fields.insert(name.to_string(), value.to_string());
        self
    }

    // Blank values count as absent
    fn text(&self, name: &str) -> Option<String> {
        self.fields
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    }

    fn parsed<T>(&self, name: &str) -> Result<Option<T>, ValidationError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        self.text(name)
            .map(|raw| {
                raw.parse::<T>()
                    .map_err(|e| ValidationError::invalid(name, e.to_string()))
            })
            .transpose()
    }

    fn price(&self) -> Result<Option<f64>, ValidationError> {
        match self.parsed::<f64>("price")? {
            Some(price) if !price.is_finite() || price < 0.0 => Err(ValidationError::invalid(
                "price",
                "must be a non-negative number",
            )),
            other => Ok(other),
        }
    }

    fn date(&self, name: &str) -> Result<Option<NaiveDate>, ValidationError> {
        self.text(name)
            .map(|raw| {
                NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
                    .map_err(|_| ValidationError::invalid(name, "expected YYYY-MM-DD"))
            })
            .transpose()
    }

    fn programs(&self) -> Result<Option<Vec<TourProgram>>, ValidationError> {
        self.text("programs")
            .map(|raw| {
                serde_json::from_str::<Vec<TourProgram>>(&raw)
                    .map_err(|e| ValidationError::invalid("programs", e.to_string()))
            })
            .transpose()
    }

    pub fn to_changes(&self) -> Result<TourChanges, ValidationError> {
        let changes = TourChanges {
            title: self.text("title"),
            description: self.text("description"),
            short_description: self.text("short_description"),
            price: self.price()?,
            duration: self.parsed("duration")?,
            location: self.text("location"),
            date_start: self.date("date_start")?,
            date_end: self.date("date_end")?,
            max_participants: self.parsed("max_participants")?,
            status: self.parsed::<TourStatus>("status")?,
            image_url: None,
            programs: self.programs()?,
        };

        check_date_order(changes.date_start, changes.date_end)?;
        Ok(changes)
    }

    pub fn to_new_tour(&self) -> Result<NewTour, ValidationError> {
        let changes = self.to_changes()?;
        Ok(NewTour {
            title: changes
                .title
                .ok_or_else(|| ValidationError::MissingField("title".to_string()))?,
            price: changes
                .price
                .ok_or_else(|| ValidationError::MissingField("price".to_string()))?,
            status: changes
                .status
                .ok_or_else(|| ValidationError::MissingField("status".to_string()))?,
            description: changes.description,
            short_description: changes.short_description,
            duration: changes.duration,
            location: changes.location,
            date_start: changes.date_start,
            date_end: changes.date_end,
            max_participants: changes.max_participants,
            image_url: None,
            programs: changes.programs.unwrap_or_default(),
        })
    }
}

// A tour may not end before it starts
fn check_date_order(
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Result<(), ValidationError> {
    match (start, end) {
        (Some(start), Some(end)) if end < start => Err(ValidationError::invalid(
            "date_end",
            "must not be before date_start",
        )),
        _ => Ok(()),
    }
}

pub struct TourController {
    repository: Arc<dyn TourRepository>,
    images: ImageStore,
}

impl TourController {
    pub fn new(repository: Arc<dyn TourRepository>, images: ImageStore) -> Self {
        Self { repository, images }
    }

    pub fn images(&self) -> &ImageStore {
        &self.images
    }

    pub async fn list(&self, filter: &TourFilter) -> Result<Vec<Tour>, ControllerError> {
        Ok(self.repository.list(filter).await?)
    }

    pub async fn get(&self, id: u64) -> Result<Tour, ControllerError> {
        Ok(self.repository.get(id).await?)
    }

    pub async fn create(&self, form: TourForm) -> Result<Tour, ControllerError> {
        let mut new_tour = form.to_new_tour()?;
        if let Some(image) = &form.image {
            new_tour.image_url = Some(self.images.save(image).await?);
        }

        let tour = self.repository.create(new_tour).await?;
        info!(tour_id = tour.id, title = %tour.title, "tour created");
        Ok(tour)
    }

    pub async fn update(&self, id: u64, form: TourForm) -> Result<Tour, ControllerError> {
        let previous = self.repository.get(id).await?;
        let mut changes = form.to_changes()?;
        check_date_order(
            changes.date_start.or(previous.date_start),
            changes.date_end.or(previous.date_end),
        )?;
        if let Some(image) = &form.image {
            changes.image_url = Some(self.images.save(image).await?);
        }
        let new_image = changes.image_url.clone();

        let tour = match self.repository.update(id, changes).await {
            Ok(tour) => tour,
            Err(e) => {
                if let Some(url) = new_image.as_deref() {
                    self.images.remove(url).await;
                }
                return Err(e.into());
            }
        };
        if new_image.is_some() {
            if let Some(old_url) = previous.image_url.as_deref() {
                self.images.remove(old_url).await;
            }
        }
        info!(tour_id = id, "tour updated");
        Ok(tour)
    }

    pub async fn remove(&self, id: u64) -> Result<Tour, ControllerError> {
        let tour = self.repository.delete(id).await?;
        if let Some(url) = tour.image_url.as_deref() {
            self.images.remove(url).await;
        }
        info!(tour_id = id, "tour deleted");
        Ok(tour)
    }
}
