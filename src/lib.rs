// Main library file for the travel showcase: tour cards and the tour API

// Card rendering and its formatters
pub mod card;
pub mod date_format;
pub mod image;
pub mod locale;
pub mod markup;
pub mod price_format;
pub mod tour;

// Tour management service
pub mod client;
pub mod config;
pub mod controller;
pub mod http;
pub mod logging;
pub mod repository;
pub mod uploads;

// Re-export key types for convenience
pub use card::{
    AnalyticsError, AnalyticsSink, CardCollaborators, CardRenderer, ClickOutcome, ImageLazyLoader,
    LazyLoadError, LazyLoadTask, Navigator, RenderError, RenderedCard,
};
pub use client::{ClientConfig, ClientError, RetryConfig, TourApiClient};
pub use config::{AppConfig, ConfigError, LogFormat};
pub use controller::{ControllerError, TourController, TourForm, ValidationError};
pub use date_format::DateFormatter;
pub use image::ImageResolver;
pub use locale::{Locale, Localizer, StaticLocalizer};
pub use markup::{Element, MarkupError, Node};
pub use price_format::{CurrencyFormatter, PriceFormatter};
pub use repository::{InMemoryTourRepository, RepositoryError, TourRepository};
pub use tour::{Tour, TourFilter, TourProgram, TourStatus, TourSummary};
pub use uploads::{ImageStore, UploadError, UploadedImage};
