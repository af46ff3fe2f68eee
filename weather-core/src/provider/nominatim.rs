use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::model::{AUTO_TIMEZONE, Coordinate, Location};

use super::{ReverseGeocoder, trim_base, truncate_body};

/// Reverse geocoder backed by Nominatim (OpenStreetMap).
#[derive(Debug, Clone)]
pub struct NominatimGeocoder {
    base_url: String,
    user_agent: String,
    http: Client,
}

impl NominatimGeocoder {
    pub fn new(base_url: impl Into<String>, user_agent: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            user_agent: user_agent.into(),
            http: Client::new(),
        }
    }

    async fn lookup(&self, coord: &Coordinate) -> Result<Location> {
        let url = format!("{}/reverse", trim_base(&self.base_url));
        tracing::debug!(%url, lat = %coord.lat, lon = %coord.lon, "reverse geocoding");

        let res = self
            .http
            .get(&url)
            .header(reqwest::header::USER_AGENT, &self.user_agent)
            .query(&[
                ("format", "jsonv2"),
                ("lat", coord.lat.as_str()),
                ("lon", coord.lon.as_str()),
            ])
            .send()
            .await
            .context("Failed to send request to Nominatim")?;

        let status = res.status();
        let body = res
            .text()
            .await
            .context("Failed to read Nominatim response body")?;

        if !status.is_success() {
            return Err(anyhow!(
                "Nominatim request failed with status {}: {}",
                status,
                truncate_body(&body),
            ));
        }

        let parsed: NominatimResponse =
            serde_json::from_str(&body).context("Failed to parse Nominatim JSON")?;

        Ok(parsed.into_location(coord))
    }
}

#[derive(Debug, Deserialize)]
struct NominatimAddress {
    city: Option<String>,
    town: Option<String>,
    village: Option<String>,
    country: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NominatimResponse {
    address: NominatimAddress,
    name: Option<String>,
    timezone: Option<String>,
}

impl NominatimResponse {
    fn into_location(self, coord: &Coordinate) -> Location {
        let non_empty = |v: Option<String>| v.filter(|s| !s.is_empty());

        let city = non_empty(self.address.city)
            .or_else(|| non_empty(self.address.town))
            .or_else(|| non_empty(self.address.village))
            .or(self.name);

        Location {
            city,
            country: self.address.country,
            lat: coord.latitude(),
            lon: coord.longitude(),
            timezone: non_empty(self.timezone).unwrap_or_else(|| AUTO_TIMEZONE.to_string()),
        }
    }
}

#[async_trait]
impl ReverseGeocoder for NominatimGeocoder {
    async fn resolve(&self, coord: &Coordinate) -> Location {
        match self.lookup(coord).await {
            Ok(location) => location,
            Err(err) => {
                tracing::warn!(lat = %coord.lat, lon = %coord.lon, "Reverse geocoding error: {err:#}");
                Location::unresolved(coord)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn london() -> Coordinate {
        Coordinate::new("51.5074", "-0.1278")
    }

    fn response(value: serde_json::Value) -> NominatimResponse {
        serde_json::from_value(value).expect("nominatim json")
    }

    #[test]
    fn city_falls_back_through_town_village_and_name() {
        let loc = response(serde_json::json!({
            "address": { "town": "Reading", "village": "Tilehurst", "country": "United Kingdom" },
            "name": "Somewhere"
        }))
        .into_location(&london());
        assert_eq!(loc.city.as_deref(), Some("Reading"));

        let loc = response(serde_json::json!({
            "address": { "city": "", "village": "Tilehurst" }
        }))
        .into_location(&london());
        assert_eq!(loc.city.as_deref(), Some("Tilehurst"));

        let loc = response(serde_json::json!({
            "address": { "country": "Antarctica" },
            "name": "Amundsen-Scott"
        }))
        .into_location(&london());
        assert_eq!(loc.city.as_deref(), Some("Amundsen-Scott"));
        assert_eq!(loc.country.as_deref(), Some("Antarctica"));
    }

    #[test]
    fn city_is_none_when_nothing_resolves() {
        let loc = response(serde_json::json!({ "address": {} })).into_location(&london());

        assert_eq!(loc.city, None);
        assert_eq!(loc.timezone, "auto");
    }

    #[test]
    fn trailing_name_is_taken_verbatim() {
        let loc = response(serde_json::json!({
            "address": { "city": "", "town": "" },
            "name": ""
        }))
        .into_location(&london());

        assert_eq!(loc.city.as_deref(), Some(""));
    }

    #[test]
    fn timezone_is_taken_when_supplied() {
        let loc = response(serde_json::json!({
            "address": { "city": "London" },
            "timezone": "Europe/London"
        }))
        .into_location(&london());

        assert_eq!(loc.timezone, "Europe/London");
    }

    #[tokio::test]
    async fn resolve_sends_client_identifier_and_parses_address() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/reverse"))
            .and(query_param("format", "jsonv2"))
            .and(query_param("lat", "51.5074"))
            .and(query_param("lon", "-0.1278"))
            .and(header("user-agent", "WeatherBackend/1.0"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "name": "Westminster",
                "address": { "city": "London", "country": "United Kingdom" }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let geocoder = NominatimGeocoder::new(server.uri(), "WeatherBackend/1.0");
        let loc = geocoder.resolve(&london()).await;

        assert_eq!(loc.city.as_deref(), Some("London"));
        assert_eq!(loc.country.as_deref(), Some("United Kingdom"));
        assert_eq!(loc.lat, Some(51.5074));
        assert_eq!(loc.lon, Some(-0.1278));
        assert_eq!(loc.timezone, "auto");
    }

    #[tokio::test]
    async fn resolve_forwards_coordinate_text_verbatim() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/reverse"))
            .and(query_param("lat", "12abc"))
            .and(query_param("lon", " 1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "address": { "village": "Nowhere" }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let geocoder = NominatimGeocoder::new(server.uri(), "WeatherBackend/1.0");
        let loc = geocoder.resolve(&Coordinate::new("12abc", " 1")).await;

        assert_eq!(loc.city.as_deref(), Some("Nowhere"));
        assert_eq!(loc.lat, Some(12.0));
        assert_eq!(loc.lon, Some(1.0));
    }

    #[tokio::test]
    async fn resolve_degrades_on_error_status() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/reverse"))
            .respond_with(ResponseTemplate::new(503).set_body_string("busy"))
            .mount(&server)
            .await;

        let geocoder = NominatimGeocoder::new(server.uri(), "WeatherBackend/1.0");
        let loc = geocoder.resolve(&london()).await;

        assert_eq!(loc, Location::unresolved(&london()));
    }

    #[tokio::test]
    async fn resolve_degrades_on_malformed_body() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/reverse"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "error": "Unable to geocode"
            })))
            .mount(&server)
            .await;

        let geocoder = NominatimGeocoder::new(server.uri(), "WeatherBackend/1.0");
        let loc = geocoder.resolve(&london()).await;

        assert_eq!(loc, Location::unresolved(&london()));
    }

    #[tokio::test]
    async fn resolve_degrades_when_unreachable() {
        // Nothing listens on the discard port.
        let geocoder = NominatimGeocoder::new("http://127.0.0.1:9", "WeatherBackend/1.0");
        let loc = geocoder.resolve(&london()).await;

        assert_eq!(loc, Location::unresolved(&london()));
    }
}
