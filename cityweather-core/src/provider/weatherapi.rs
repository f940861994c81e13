use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;

use crate::model::{WeatherRecord, WeatherRequest};

use super::{ProviderError, UPSTREAM_TIMEOUT, WeatherProvider, format_measure, truncate_body};

const DEFAULT_BASE_URL: &str = "http://api.weatherapi.com/v1";

#[derive(Debug, Clone)]
pub struct WeatherApiProvider {
    api_key: String,
    base_url: String,
    http: Client,
}

impl WeatherApiProvider {
    pub fn new(api_key: String) -> Result<Self> {
        let http = Client::builder()
            .timeout(UPSTREAM_TIMEOUT)
            .build()
            .context("Failed to build HTTP client for WeatherAPI.com")?;

        Ok(Self { api_key, base_url: DEFAULT_BASE_URL.to_string(), http })
    }

    /// Point the provider at a different API root (used against fakes).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn fetch_current(&self, city: &str) -> Result<WeatherRecord, ProviderError> {
        let url = format!("{}/current.json", self.base_url);

        let res = self
            .http
            .get(&url)
            .query(&[("key", self.api_key.as_str()), ("q", city), ("aqi", "no")])
            .send()
            .await
            .map_err(|err| ProviderError::from_transport(&err))?;

        let status = res.status();
        let body = res.text().await.map_err(|err| ProviderError::from_transport(&err))?;

        if status == StatusCode::BAD_REQUEST {
            // WeatherAPI answers 400 with code 1006 when no location matches.
            return Err(ProviderError::NotFound(city.to_string()));
        }

        if !status.is_success() {
            tracing::warn!(%status, body = %truncate_body(&body), "WeatherAPI current request failed");
            return Err(ProviderError::Unavailable(format!("WeatherAPI returned {status}")));
        }

        let parsed: WaResponse = serde_json::from_str(&body)
            .map_err(|err| ProviderError::InvalidResponse(err.to_string()))?;

        Ok(WeatherRecord {
            city: parsed.location.name,
            country: parsed.location.country,
            temperature: format!("{}°C", format_measure(parsed.current.temp_c)),
            condition: parsed.current.condition.text,
            humidity: format!("{}%", parsed.current.humidity),
            wind_speed: format!("{} km/h", format_measure(parsed.current.wind_kph)),
            last_updated: parsed.current.last_updated,
        })
    }
}

#[derive(Debug, Deserialize)]
struct WaLocation {
    name: String,
    country: String,
}

#[derive(Debug, Deserialize)]
struct WaCondition {
    text: String,
}

#[derive(Debug, Deserialize)]
struct WaCurrent {
    temp_c: f64,
    humidity: u8,
    wind_kph: f64,
    condition: WaCondition,
    last_updated: String,
}

#[derive(Debug, Deserialize)]
struct WaResponse {
    location: WaLocation,
    current: WaCurrent,
}

#[async_trait]
impl WeatherProvider for WeatherApiProvider {
    async fn get_weather(&self, request: &WeatherRequest) -> Result<WeatherRecord, ProviderError> {
        self.fetch_current(request.city.trim()).await
    }
}
