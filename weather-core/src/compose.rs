//! Merges a resolved [`Location`] and a raw [`Forecast`] into the payload
//! served to the frontend.

use crate::model::{
    CurrentConditions, DailySeries, Forecast, HourlySeries, Location, WeatherResponse,
};

/// Number of daily entries kept in the response.
pub const DAILY_DAYS: usize = 4;

/// Truncates an ISO-8601 style timestamp to its hour, e.g.
/// `2024-01-01T01:37:12` becomes `2024-01-01T01:00`.
pub fn hour_key(time: &str) -> String {
    let mut key: String = time.chars().take(13).collect();
    key.push_str(":00");
    key
}

/// Position of the current snapshot's hour within the hourly series, if present.
pub fn align_index(hourly_times: &[String], current_time: &str) -> Option<usize> {
    let key = hour_key(current_time);
    hourly_times.iter().position(|t| *t == key)
}

pub fn compose(location: Location, forecast: Forecast) -> WeatherResponse {
    let Forecast {
        timezone: provider_timezone,
        current_weather,
        hourly,
        daily,
    } = forecast;

    let index = align_index(&hourly.time, &current_weather.time);
    if index.is_none() {
        tracing::debug!(time = %current_weather.time, "current snapshot not found in hourly series");
    }

    let current = CurrentConditions {
        temperature: current_weather.temperature,
        windspeed: current_weather.windspeed,
        winddirection: current_weather.winddirection,
        weathercode: current_weather.weathercode,
        feels_like: value_at(&hourly.apparent_temperature, index),
        humidity: value_at(&hourly.relative_humidity_2m, index),
        pressure: value_at(&hourly.surface_pressure, index),
        time: current_weather.time,
    };

    let timezone = Some(location.timezone)
        .filter(|tz| !tz.is_empty())
        .or(provider_timezone);

    WeatherResponse {
        city: location.city,
        country: location.country,
        latitude: location.lat,
        longitude: location.lon,
        timezone,
        current,
        hourly: HourlySeries {
            time: hourly.time,
            temperature: hourly.temperature_2m,
            feels_like: hourly.apparent_temperature,
            humidity: hourly.relative_humidity_2m,
            pressure: hourly.surface_pressure,
            windspeed: hourly.windspeed_10m,
            weathercode: hourly.weathercode,
        },
        daily: DailySeries {
            time: first_days(daily.time),
            temp_max: first_days(daily.temperature_2m_max),
            temp_min: first_days(daily.temperature_2m_min),
            weathercode: first_days(daily.weathercode),
        },
    }
}

fn value_at(series: &[Option<f64>], index: Option<usize>) -> Option<f64> {
    index.and_then(|i| series.get(i).copied().flatten())
}

fn first_days<T>(mut series: Vec<T>) -> Vec<T> {
    series.truncate(DAILY_DAYS);
    series
}
