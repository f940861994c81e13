use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use serde::Deserialize;

use crate::model::{WeatherRecord, WeatherRequest};

use super::{ProviderError, UPSTREAM_TIMEOUT, WeatherProvider, format_measure, truncate_body};

const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    base_url: String,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn new(api_key: String) -> Result<Self> {
        let http = Client::builder()
            .timeout(UPSTREAM_TIMEOUT)
            .build()
            .context("Failed to build HTTP client for OpenWeather")?;

        Ok(Self { api_key, base_url: DEFAULT_BASE_URL.to_string(), http })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn fetch_current(&self, city: &str) -> Result<WeatherRecord, ProviderError> {
        let url = format!("{}/weather", self.base_url);

        let res = self
            .http
            .get(&url)
            .query(&[("q", city), ("appid", self.api_key.as_str()), ("units", "metric")])
            .send()
            .await
            .map_err(|err| ProviderError::from_transport(&err))?;

        let status = res.status();
        let body = res.text().await.map_err(|err| ProviderError::from_transport(&err))?;

        if status == StatusCode::NOT_FOUND {
            return Err(ProviderError::NotFound(city.to_string()));
        }

        if !status.is_success() {
            tracing::warn!(%status, body = %truncate_body(&body), "OpenWeather current request failed");
            return Err(ProviderError::Unavailable(format!("OpenWeather returned {status}")));
        }

        let parsed: OwCurrentResponse = serde_json::from_str(&body)
            .map_err(|err| ProviderError::InvalidResponse(err.to_string()))?;

        let condition = parsed
            .weather
            .first()
            .map(|w| w.description.clone())
            .unwrap_or_else(|| "Unknown".to_string());

        let last_updated = format_observation(parsed.dt).ok_or_else(|| {
            ProviderError::InvalidResponse(format!("observation time {} is out of range", parsed.dt))
        })?;

        // OpenWeather reports wind in m/s under metric units.
        let wind_kph = (parsed.wind.speed * 3.6 * 10.0).round() / 10.0;

        Ok(WeatherRecord {
            city: parsed.name,
            country: parsed.sys.country.unwrap_or_default(),
            temperature: format!("{}°C", format_measure(parsed.main.temp)),
            condition,
            humidity: format!("{}%", parsed.main.humidity),
            wind_speed: format!("{} km/h", format_measure(wind_kph)),
            last_updated,
        })
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    humidity: u8,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    description: String,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OwSys {
    country: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: String,
    dt: i64,
    main: OwMain,
    weather: Vec<OwWeather>,
    wind: OwWind,
    sys: OwSys,
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn get_weather(&self, request: &WeatherRequest) -> Result<WeatherRecord, ProviderError> {
        self.fetch_current(request.city.trim()).await
    }
}

fn format_observation(ts: i64) -> Option<String> {
    DateTime::<Utc>::from_timestamp(ts, 0).map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
}
