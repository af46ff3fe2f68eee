use std::sync::Arc;

use crate::{
    Config,
    compose::compose,
    model::{Coordinate, WeatherResponse},
    provider::{
        ForecastError, ForecastProvider, NominatimGeocoder, OpenMeteoProvider, ReverseGeocoder,
    },
};

/// Resolves a coordinate into the combined place + forecast payload.
#[derive(Debug, Clone)]
pub struct WeatherService {
    geocoder: Arc<dyn ReverseGeocoder>,
    forecaster: Arc<dyn ForecastProvider>,
}

impl WeatherService {
    pub fn new(geocoder: Arc<dyn ReverseGeocoder>, forecaster: Arc<dyn ForecastProvider>) -> Self {
        Self { geocoder, forecaster }
    }

    /// Construct the production clients from the `[upstream]` section.
    pub fn from_config(config: &Config) -> Self {
        let upstream = &config.upstream;
        Self::new(
            Arc::new(NominatimGeocoder::new(&upstream.geocoder_url, &upstream.user_agent)),
            Arc::new(OpenMeteoProvider::new(&upstream.forecast_url)),
        )
    }

    /// Both lookups run concurrently and always complete; only the forecast
    /// can fail the request.
    pub async fn weather(&self, coord: &Coordinate) -> Result<WeatherResponse, ForecastError> {
        let (location, forecast) =
            tokio::join!(self.geocoder.resolve(coord), self.forecaster.forecast(coord));

        Ok(compose(location, forecast?))
    }
}
