//! Fetches tours from a running API and prints their card markup, one card per line.
//!
//! - `TOURS_API_URL`: API base URL (default: http://localhost:3000)
//! - `TOURS_STATUS`: optional status filter
//! - `SITE_LOCALE`, `LOG_FORMAT`, `RUST_LOG`: as for the server

use std::env;
use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use futures::future::join_all;
use tokio::runtime::Handle;
use tracing::{debug, info, warn};

use travel_showcase::card::{
    AnalyticsError, AnalyticsSink, CardCollaborators, CardRenderer, ImageLazyLoader, LazyLoadError,
    Navigator,
};
use travel_showcase::client::{ClientConfig, TourApiClient};
use travel_showcase::config::AppConfig;
use travel_showcase::locale::StaticLocalizer;
use travel_showcase::logging::init_logger;
use travel_showcase::markup::Element;
use travel_showcase::tour::TourFilter;

// Static output: images stay placeholders, clicks never happen
struct PlaceholderLoader;

#[async_trait]
impl ImageLazyLoader for PlaceholderLoader {
    async fn init(&self, placeholder: Element) -> Result<(), LazyLoadError> {
        debug!(src = ?placeholder.attr("data-bg"), "image left for the page loader");
        Ok(())
    }
}

struct NoAnalytics;

impl AnalyticsSink for NoAnalytics {
    fn track_tour_click(&self, _tour_id: u64) -> Result<(), AnalyticsError> {
        Ok(())
    }
}

struct NoNavigation;

impl Navigator for NoNavigation {
    fn navigate(&self, _url: &str) {}
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load(None).context("loading configuration")?;
    init_logger(config.logging.format, config.logging.verbose);

    let client = TourApiClient::new(ClientConfig {
        base_url: env::var("TOURS_API_URL").unwrap_or_else(|_| ClientConfig::default().base_url),
        ..ClientConfig::default()
    })?;

    let filter = TourFilter {
        status: match env::var("TOURS_STATUS") {
            Ok(raw) => Some(raw.parse().map_err(anyhow::Error::msg)?),
            Err(_) => None,
        },
        ..TourFilter::default()
    };

    let tours = client.list_tours(&filter).await?;
    info!(count = tours.len(), "fetched tours");

    let collaborators = CardCollaborators {
        localizer: Arc::new(StaticLocalizer::default()),
        lazy_loader: Arc::new(PlaceholderLoader),
        analytics: Arc::new(NoAnalytics),
        navigator: Arc::new(NoNavigation),
    };
    let renderer = CardRenderer::new(config.site.locale, collaborators, Handle::current());

    let mut cards = renderer.render_all(&tours);
    for card in &cards {
        println!("{}", card.to_html()?);
    }

    let loads = join_all(cards.iter_mut().map(|card| card.lazy_load().wait())).await;
    for failure in loads.into_iter().filter_map(Result::err) {
        warn!(error = %failure, "image lazy load failed");
    }

    Ok(())
}
