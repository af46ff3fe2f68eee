use serde::{Deserialize, Serialize};

/// Timezone value used when the geocoder does not supply one.
pub const AUTO_TIMEZONE: &str = "auto";

/// Coordinate exactly as the caller sent it. The text is forwarded upstream
/// untouched; numeric values are derived leniently with [`leading_number`].
#[derive(Debug, Clone, PartialEq)]
pub struct Coordinate {
    pub lat: String,
    pub lon: String,
}

impl Coordinate {
    pub fn new(lat: impl Into<String>, lon: impl Into<String>) -> Self {
        Self { lat: lat.into(), lon: lon.into() }
    }

    pub fn latitude(&self) -> Option<f64> {
        leading_number(&self.lat)
    }

    pub fn longitude(&self) -> Option<f64> {
        leading_number(&self.lon)
    }
}

/// Parses the longest numeric prefix of `text` after leading whitespace,
/// e.g. `"12.5abc"` is `12.5`. `None` when no digits lead the text.
pub fn leading_number(text: &str) -> Option<f64> {
    let s = text.trim_start();
    let bytes = s.as_bytes();
    let digits_from = |mut i: usize| {
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        i
    };

    let mut end = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end = 1;
    }
    if s[end..].starts_with("Infinity") {
        return s[..end + "Infinity".len()].parse::<f64>().ok();
    }

    let int_end = digits_from(end);
    let mut mantissa_digits = int_end - end;
    end = int_end;
    if bytes.get(end) == Some(&b'.') {
        let frac_end = digits_from(end + 1);
        mantissa_digits += frac_end - (end + 1);
        end = frac_end;
    }
    if mantissa_digits == 0 {
        return None;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp = end + 1;
        if matches!(bytes.get(exp), Some(b'+' | b'-')) {
            exp += 1;
        }
        let exp_end = digits_from(exp);
        if exp_end > exp {
            end = exp_end;
        }
    }

    s[..end].parse().ok()
}

/// Place resolved for a coordinate. Built once per request by the geocoder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub city: Option<String>,
    pub country: Option<String>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub timezone: String,
}

impl Location {
    /// Degraded location returned when reverse geocoding fails.
    pub fn unresolved(coord: &Coordinate) -> Self {
        Self {
            city: None,
            country: None,
            lat: coord.latitude(),
            lon: coord.longitude(),
            timezone: AUTO_TIMEZONE.to_string(),
        }
    }
}

// Raw forecast provider payload.

#[derive(Debug, Clone, Deserialize)]
pub struct Forecast {
    #[serde(default)]
    pub timezone: Option<String>,
    pub current_weather: ProviderCurrent,
    pub hourly: ProviderHourly,
    pub daily: ProviderDaily,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProviderCurrent {
    pub temperature: f64,
    pub windspeed: f64,
    pub winddirection: f64,
    pub weathercode: i32,
    pub time: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProviderHourly {
    pub time: Vec<String>,
    #[serde(default)]
    pub temperature_2m: Vec<Option<f64>>,
    #[serde(default)]
    pub apparent_temperature: Vec<Option<f64>>,
    #[serde(default)]
    pub relative_humidity_2m: Vec<Option<f64>>,
    #[serde(default)]
    pub surface_pressure: Vec<Option<f64>>,
    #[serde(default)]
    pub windspeed_10m: Vec<Option<f64>>,
    #[serde(default)]
    pub weathercode: Vec<Option<i32>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProviderDaily {
    pub time: Vec<String>,
    #[serde(default)]
    pub temperature_2m_max: Vec<Option<f64>>,
    #[serde(default)]
    pub temperature_2m_min: Vec<Option<f64>>,
    #[serde(default)]
    pub weathercode: Vec<Option<i32>>,
}

// Payload returned to the frontend.

#[derive(Debug, Clone, Serialize)]
pub struct WeatherResponse {
    pub city: Option<String>,
    pub country: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub timezone: Option<String>,
    pub current: CurrentConditions,
    pub hourly: HourlySeries,
    pub daily: DailySeries,
}

/// Current snapshot plus the fields looked up in the matching hourly record.
#[derive(Debug, Clone, Serialize)]
pub struct CurrentConditions {
    pub temperature: f64,
    pub windspeed: f64,
    pub winddirection: f64,
    pub weathercode: i32,
    pub time: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feels_like: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub humidity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pressure: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HourlySeries {
    pub time: Vec<String>,
    pub temperature: Vec<Option<f64>>,
    pub feels_like: Vec<Option<f64>>,
    pub humidity: Vec<Option<f64>>,
    pub pressure: Vec<Option<f64>>,
    pub windspeed: Vec<Option<f64>>,
    pub weathercode: Vec<Option<i32>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DailySeries {
    pub time: Vec<String>,
    pub temp_max: Vec<Option<f64>>,
    pub temp_min: Vec<Option<f64>>,
    pub weathercode: Vec<Option<i32>>,
}
