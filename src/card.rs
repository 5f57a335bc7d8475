// Tour summary cards: markup tree, click behaviour and deferred image loading

use crate::date_format::DateFormatter;
use crate::image::ImageResolver;
use crate::locale::{Locale, Localizer, DEFAULT_TOUR_TEXT};
use crate::markup::{Element, MarkupError, Node};
use crate::price_format::{CurrencyFormatter, PriceFormatter};
use crate::tour::TourSummary;
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

pub const META_SEPARATOR: &str = " • ";

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

#[derive(Error, Debug)]
pub enum AnalyticsError {
    #[error("Analytics unavailable: {0}")]
    Unavailable(String),
}

#[derive(Error, Debug)]
pub enum LazyLoadError {
    #[error("Image load failed: {0}")]
    LoadFailed(String),

    #[error("Lazy load task was aborted")]
    Aborted,

    #[error("Lazy load task panicked: {0}")]
    Panicked(String),
}

// Starts loading the background image of a card's placeholder element
#[async_trait]
pub trait ImageLazyLoader: Send + Sync + 'static {
    async fn init(&self, placeholder: Element) -> Result<(), LazyLoadError>;
}

pub trait AnalyticsSink: Send + Sync {
    fn track_tour_click(&self, tour_id: u64) -> Result<(), AnalyticsError>;
}

// Moves the current page to another URL
pub trait Navigator: Send + Sync {
    fn navigate(&self, url: &str);
}

#[derive(Clone)]
pub struct CardCollaborators {
    pub localizer: Arc<dyn Localizer>,
    pub lazy_loader: Arc<dyn ImageLazyLoader>,
    pub analytics: Arc<dyn AnalyticsSink>,
    pub navigator: Arc<dyn Navigator>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickOutcome {
    Navigated(String),
    Ignored,
}

pub struct CardRenderer {
    dates: DateFormatter,
    prices: PriceFormatter,
    images: ImageResolver,
    collaborators: CardCollaborators,
    runtime: Handle,
}

impl fmt::Debug for CardRenderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CardRenderer")
            .field("dates", &self.dates)
            .field("prices", &self.prices)
            .field("images", &self.images)
            .finish_non_exhaustive()
    }
}

impl CardRenderer {
    // Lazy-load tasks are spawned on `runtime`
    pub fn new(locale: Locale, collaborators: CardCollaborators, runtime: Handle) -> Self {
        Self {
            dates: DateFormatter::new(locale),
            prices: PriceFormatter::new(locale, Arc::clone(&collaborators.localizer)),
            images: ImageResolver::default(),
            collaborators,
            runtime,
        }
    }

    pub fn with_currency_formatter(mut self, currency: Arc<dyn CurrencyFormatter>) -> Self {
        self.prices = self.prices.with_currency_formatter(currency);
        self
    }

    pub fn with_image_resolver(mut self, images: ImageResolver) -> Self {
        self.images = images;
        self
    }

    // Nothing is spawned on error; on success the lazy load yields once before running
    pub fn render(&self, tour: &TourSummary) -> Result<RenderedCard, RenderError> {
        let tour_id = tour
            .identifier()
            .ok_or_else(|| RenderError::InvalidInput("tour identifier is required".to_string()))?;
        let tour_url = tour_url(tour_id);

        let placeholder = Element::new("div")
            .with_class("tour-card-image")
            .with_class("lazy-image")
            .with_attr("data-bg", self.images.resolve(tour.image_url.as_deref()));

        let root = Element::new("div")
            .with_class("travelCard")
            .with_attr("data-tour-id", tour_id.to_string())
            .with_attr("data-dynamic-card", "true")
            .with_attr("data-tilda-ignore", "true")
            .with_attr("data-tour-url", tour_url.as_str())
            .with_child(placeholder.clone())
            .with_child(self.content(tour));

        let lazy_load = self.schedule_lazy_load(tour_id, placeholder);
        debug!(tour_id, "rendered tour card");

        Ok(RenderedCard {
            root,
            tour_id,
            tour_url: tour_url.clone(),
            on_click: ClickHandler {
                tour_id,
                tour_url,
                analytics: Arc::clone(&self.collaborators.analytics),
                navigator: Arc::clone(&self.collaborators.navigator),
            },
            lazy_load,
        })
    }

    // Entry point for raw JSON records; `null` and non-objects are rejected
    pub fn render_json(&self, raw: &serde_json::Value) -> Result<RenderedCard, RenderError> {
        if !raw.is_object() {
            return Err(RenderError::InvalidInput("tour data is required".to_string()));
        }
        let tour: TourSummary = serde_json::from_value(raw.clone())
            .map_err(|e| RenderError::InvalidInput(e.to_string()))?;
        self.render(&tour)
    }

    // Renders a grid, dropping records that cannot be rendered
    pub fn render_all(&self, tours: &[TourSummary]) -> Vec<RenderedCard> {
        tours
            .iter()
            .filter_map(|tour| match self.render(tour) {
                Ok(card) => Some(card),
                Err(e) => {
                    warn!(error = %e, "skipping tour card");
                    None
                }
            })
            .collect()
    }

    fn content(&self, tour: &TourSummary) -> Element {
        let mut content = Element::new("div")
            .with_class("tour-card-content")
            .with_child(self.meta(tour))
            .with_child(self.title(tour));

        if let Some(description) = tour.short_description.as_deref().filter(|d| !d.is_empty()) {
            content.push_child(
                Element::new("div")
                    .with_class("tour-card-description")
                    .with_text(description),
            );
        }

        content
    }

    fn meta(&self, tour: &TourSummary) -> Element {
        let date_text = self
            .dates
            .format_range(tour.date_start.as_deref(), tour.date_end.as_deref());
        let price_text = self.prices.format(tour.price_amount);

        let mut meta = Element::new("div").with_class("tour-card-meta");

        if !date_text.is_empty() {
            meta.push_child(
                Element::new("span")
                    .with_class("tour-card-date")
                    .with_text(date_text.as_str()),
            );
        }

        if !date_text.is_empty() && !price_text.is_empty() {
            meta.push_child(
                Element::new("span")
                    .with_class("tour-card-separator")
                    .with_text(META_SEPARATOR),
            );
        }

        if !price_text.is_empty() {
            let raw_price = tour
                .price_amount
                .map(|amount| amount.to_string())
                .unwrap_or_default();
            meta.push_child(
                Element::new("span")
                    .with_class("tour-card-price")
                    .with_class("price")
                    .with_attr("data-price-rub", raw_price)
                    .with_text(price_text),
            );
        }

        meta
    }

    fn title(&self, tour: &TourSummary) -> Element {
        let title = match tour.title.as_deref().filter(|t| !t.is_empty()) {
            Some(title) => title.to_string(),
            None => self
                .collaborators
                .localizer
                .text_or("calendar", "tour", DEFAULT_TOUR_TEXT),
        };
        Element::new("div").with_class("tour-card-title").with_text(title)
    }

    fn schedule_lazy_load(&self, tour_id: u64, placeholder: Element) -> LazyLoadTask {
        let loader = Arc::clone(&self.collaborators.lazy_loader);
        let handle = self.runtime.spawn(async move {
            tokio::task::yield_now().await;
            let result = loader.init(placeholder).await;
            if let Err(e) = &result {
                warn!(tour_id, error = %e, "lazy image initialization failed");
            }
            result
        });
        LazyLoadTask {
            handle: Some(handle),
        }
    }
}

pub fn tour_url(tour_id: u64) -> String {
    format!("/tour/{}", tour_id)
}

// Handle to the deferred image initialization of one card
#[derive(Debug)]
pub struct LazyLoadTask {
    handle: Option<JoinHandle<Result<(), LazyLoadError>>>,
}

impl LazyLoadTask {
    // Waits for the loader; a second call returns immediately
    pub async fn wait(&mut self) -> Result<(), LazyLoadError> {
        let Some(handle) = self.handle.take() else {
            return Ok(());
        };
        match handle.await {
            Ok(result) => result,
            Err(e) if e.is_cancelled() => Err(LazyLoadError::Aborted),
            Err(e) => Err(LazyLoadError::Panicked(e.to_string())),
        }
    }

    pub fn abort(&self) {
        if let Some(handle) = &self.handle {
            handle.abort();
        }
    }

    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().map_or(true, JoinHandle::is_finished)
    }
}

struct ClickHandler {
    tour_id: u64,
    tour_url: String,
    analytics: Arc<dyn AnalyticsSink>,
    navigator: Arc<dyn Navigator>,
}

impl ClickHandler {
    fn handle(&self, root: &Element, target: &[usize]) -> ClickOutcome {
        let Some(chain) = root.ancestry(target) else {
            warn!(tour_id = self.tour_id, ?target, "click target is outside the card");
            return ClickOutcome::Ignored;
        };

        // Nested links and buttons keep their own behaviour
        if chain.iter().any(|element| matches!(element.tag(), "a" | "button")) {
            return ClickOutcome::Ignored;
        }

        if let Err(e) = self.analytics.track_tour_click(self.tour_id) {
            debug!(tour_id = self.tour_id, error = %e, "ignoring analytics failure");
        }

        self.navigator.navigate(&self.tour_url);
        ClickOutcome::Navigated(self.tour_url.clone())
    }
}

pub struct RenderedCard {
    root: Element,
    tour_id: u64,
    tour_url: String,
    on_click: ClickHandler,
    lazy_load: LazyLoadTask,
}

impl fmt::Debug for RenderedCard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderedCard")
            .field("tour_id", &self.tour_id)
            .field("tour_url", &self.tour_url)
            .field("root", &self.root)
            .finish_non_exhaustive()
    }
}

impl RenderedCard {
    pub fn root(&self) -> &Element {
        &self.root
    }

    pub fn tour_id(&self) -> u64 {
        self.tour_id
    }

    pub fn tour_url(&self) -> &str {
        &self.tour_url
    }

    // For page-specific extras such as a booking button
    pub fn push_child(&mut self, node: impl Into<Node>) {
        self.root.push_child(node);
    }

    // `target` is a child-index path from the root; empty means the root
    pub fn click(&self, target: &[usize]) -> ClickOutcome {
        self.on_click.handle(&self.root, target)
    }

    pub fn lazy_load(&mut self) -> &mut LazyLoadTask {
        &mut self.lazy_load
    }

    pub fn to_html(&self) -> Result<String, MarkupError> {
        self.root.to_html()
    }
}
