use std::collections::HashMap;

use anyhow::Context;
use axum::{
    Json, Router,
    extract::{Query, State},
    http::{HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
};
use tower_http::cors::{AllowOrigin, CorsLayer};
use weather_core::{Coordinate, ForecastError, WeatherResponse, WeatherService};

/// Build the application router with the CORS allow-list applied.
pub fn router(service: WeatherService, allowed_origins: &[String]) -> anyhow::Result<Router> {
    Ok(Router::new()
        .route("/api/weather", get(weather))
        .layer(cors(allowed_origins)?)
        .with_state(service))
}

fn cors(allowed_origins: &[String]) -> anyhow::Result<CorsLayer> {
    let origins = allowed_origins
        .iter()
        .map(|o| HeaderValue::from_str(o).with_context(|| format!("Invalid allowed origin '{o}'")))
        .collect::<anyhow::Result<Vec<_>>>()?;

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET]))
}

/// Only presence is checked; the text is passed on as received.
fn coordinate(params: &HashMap<String, String>) -> Result<Coordinate, ApiError> {
    match (present(params, "lat"), present(params, "lon")) {
        (Some(lat), Some(lon)) => Ok(Coordinate::new(lat, lon)),
        _ => Err(ApiError::MissingCoordinates),
    }
}

fn present<'a>(params: &'a HashMap<String, String>, key: &str) -> Option<&'a str> {
    params.get(key).map(String::as_str).filter(|v| !v.is_empty())
}

async fn weather(
    State(service): State<WeatherService>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<WeatherResponse>, ApiError> {
    let coord = coordinate(&params)?;
    let response = service.weather(&coord).await?;
    Ok(Json(response))
}

#[derive(Debug)]
enum ApiError {
    MissingCoordinates,
    Forecast(ForecastError),
}

impl From<ForecastError> for ApiError {
    fn from(err: ForecastError) -> Self {
        ApiError::Forecast(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::MissingCoordinates => (StatusCode::BAD_REQUEST, "lat/lon required".to_string()),
            ApiError::Forecast(err) => {
                tracing::error!(error = ?err, "weather request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
            }
        };

        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}
