//! HTTP/JSON weather service.
//!
//! `POST /WeatherService/GetWeather` (and the older `POST /weather`) take
//! `{"city": "..."}` and answer with a [`WeatherRecord`] or `{"error": "..."}`.
//! HTTP statuses line up with [`RpcStatus::http_status`] so the client
//! gateway can recover the call status.

use std::{sync::Arc, time::Instant};

use anyhow::{Context, Result};
use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Deserialize;
use serde_json::json;
use tokio::net::TcpListener;

use crate::{
    gateway::MethodId,
    model::{RpcStatus, WeatherRecord, WeatherRequest},
    provider::{ProviderError, WeatherProvider},
};

#[derive(Debug, Clone)]
struct ServiceState {
    provider: Arc<dyn WeatherProvider>,
}

#[derive(Debug, Deserialize)]
struct WeatherQuery {
    #[serde(default)]
    city: Option<String>,
}

pub fn router(provider: Arc<dyn WeatherProvider>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/weather", post(get_weather))
        .route(&MethodId::GET_WEATHER.path(), post(get_weather))
        .with_state(ServiceState { provider })
}

/// Bind `listen` and serve until Ctrl-C.
pub async fn serve(listen: &str, provider: Arc<dyn WeatherProvider>) -> Result<()> {
    let listener = TcpListener::bind(listen)
        .await
        .with_context(|| format!("Failed to bind weather service to {listen}"))?;

    let addr = listener.local_addr().context("Failed to read bound address")?;
    tracing::info!(%addr, ?provider, "weather service listening");

    axum::serve(listener, router(provider))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Weather service stopped unexpectedly")?;

    tracing::info!("weather service stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %err, "failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down weather service");
}

async fn index() -> impl IntoResponse {
    Json(json!({
        "message": "Welcome to the city weather service",
        "usage": "POST /WeatherService/GetWeather with {\"city\": \"city_name\"}",
    }))
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "healthy", "service": "weather-api" }))
}

async fn get_weather(
    State(state): State<ServiceState>,
    body: Result<Json<WeatherQuery>, JsonRejection>,
) -> Response {
    let started = Instant::now();

    let city = match body {
        Ok(Json(query)) => query.city.unwrap_or_default(),
        Err(rejection) => {
            tracing::debug!(error = %rejection, "unreadable GetWeather body");
            String::new()
        }
    };
    let city = city.trim();

    if city.is_empty() {
        return failure(RpcStatus::InvalidArgument, "City name cannot be empty");
    }

    tracing::info!(city, "received GetWeather request");

    match state.provider.get_weather(&WeatherRequest::new(city)).await {
        Ok(record) => {
            tracing::info!(
                city = %record.city,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "GetWeather succeeded"
            );
            success(record)
        }
        Err(err) => {
            let (status, message) = classify(&err);
            tracing::error!(city, %status, error = %err, "GetWeather failed");
            failure(status, message)
        }
    }
}

fn classify(err: &ProviderError) -> (RpcStatus, String) {
    match err {
        ProviderError::NotFound(_) => (RpcStatus::NotFound, err.to_string()),
        ProviderError::Timeout => (RpcStatus::DeadlineExceeded, err.to_string()),
        ProviderError::Unavailable(_) => {
            (RpcStatus::Unavailable, "Weather service temporarily unavailable".to_string())
        }
        ProviderError::InvalidResponse(_) => {
            (RpcStatus::Internal, "Invalid response from weather service".to_string())
        }
        ProviderError::Internal(_) => (RpcStatus::Internal, "Internal server error".to_string()),
    }
}

fn success(record: WeatherRecord) -> Response {
    (StatusCode::OK, Json(record)).into_response()
}

fn failure(status: RpcStatus, message: impl Into<String>) -> Response {
    let code = StatusCode::from_u16(status.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (code, Json(json!({ "error": message.into() }))).into_response()
}
