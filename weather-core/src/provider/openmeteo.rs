use async_trait::async_trait;
use reqwest::Client;

use crate::model::{Coordinate, Forecast};

use super::{ForecastError, ForecastProvider, trim_base, truncate_body};

const HOURLY_FIELDS: &str = "temperature_2m,apparent_temperature,relative_humidity_2m,surface_pressure,windspeed_10m,weathercode";
const DAILY_FIELDS: &str = "temperature_2m_max,temperature_2m_min,weathercode";

/// Forecast provider backed by Open-Meteo. Timezone is inferred by the
/// provider from the coordinates.
#[derive(Debug, Clone)]
pub struct OpenMeteoProvider {
    base_url: String,
    http: Client,
}

impl OpenMeteoProvider {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            http: Client::new(),
        }
    }
}

#[async_trait]
impl ForecastProvider for OpenMeteoProvider {
    async fn forecast(&self, coord: &Coordinate) -> Result<Forecast, ForecastError> {
        let url = format!("{}/v1/forecast", trim_base(&self.base_url));
        tracing::debug!(%url, lat = %coord.lat, lon = %coord.lon, "requesting forecast");

        let res = self
            .http
            .get(&url)
            .query(&[
                ("latitude", coord.lat.as_str()),
                ("longitude", coord.lon.as_str()),
                ("current_weather", "true"),
                ("hourly", HOURLY_FIELDS),
                ("daily", DAILY_FIELDS),
                ("timezone", "auto"),
            ])
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            return Err(ForecastError::NotFound {
                status: status.as_u16(),
                body: truncate_body(&body),
            });
        }

        Ok(serde_json::from_str(&body)?)
    }
}
