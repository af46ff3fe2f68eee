use crate::model::{Coordinate, Forecast, Location};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod nominatim;
pub mod openmeteo;

pub use nominatim::NominatimGeocoder;
pub use openmeteo::OpenMeteoProvider;

/// Best-effort place lookup. Never fails: implementations degrade to
/// [`Location::unresolved`] and log the cause.
#[async_trait]
pub trait ReverseGeocoder: Send + Sync + Debug {
    async fn resolve(&self, coord: &Coordinate) -> Location;
}

/// Source of current/hourly/daily weather. Failure is fatal to the request.
#[async_trait]
pub trait ForecastProvider: Send + Sync + Debug {
    async fn forecast(&self, coord: &Coordinate) -> Result<Forecast, ForecastError>;
}

#[derive(Debug, thiserror::Error)]
pub enum ForecastError {
    #[error("Weather API error: forecast not found")]
    NotFound { status: u16, body: String },

    #[error("Failed to send request to forecast provider: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Failed to parse forecast JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        let cut = (0..=MAX).rev().find(|&i| body.is_char_boundary(i)).unwrap_or(0);
        format!("{}...", &body[..cut])
    } else {
        body.to_string()
    }
}

fn trim_base(url: &str) -> &str {
    url.trim_end_matches('/')
}
