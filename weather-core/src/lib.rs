//! Core library for the weather backend.
//!
//! This crate defines:
//! - Configuration handling
//! - Upstream clients (reverse geocoding, forecast)
//! - Shaping of the combined frontend payload
//!
//! It is used by `weather-server`, but can also be reused by other binaries or services.

pub mod compose;
pub mod config;
pub mod model;
pub mod provider;
pub mod service;

pub use config::{Config, ServerConfig, UpstreamConfig};
pub use model::{Coordinate, Location, WeatherResponse};
pub use provider::{ForecastError, ForecastProvider, ReverseGeocoder};
pub use service::WeatherService;
