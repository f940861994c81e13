use serde::{Deserialize, Serialize};

/// A lookup request for the current weather in one city.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeatherRequest {
    pub city: String,
}

impl WeatherRequest {
    pub fn new(city: impl Into<String>) -> Self {
        Self { city: city.into() }
    }
}

/// Display-ready weather observation. Every field is already formatted
/// (`"18.0°C"`, `"60%"`, `"10.1 km/h"`), so renderers never do unit work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeatherRecord {
    pub city: String,
    pub country: String,
    pub temperature: String,
    pub condition: String,
    pub humidity: String,
    pub wind_speed: String,
    pub last_updated: String,
}

/// Status codes carried by a completed call. Numbering follows gRPC so that
/// `0` is the success sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RpcStatus {
    Ok,
    Unknown,
    InvalidArgument,
    DeadlineExceeded,
    NotFound,
    Internal,
    Unavailable,
}

impl RpcStatus {
    pub const fn code(self) -> i32 {
        match self {
            RpcStatus::Ok => 0,
            RpcStatus::Unknown => 2,
            RpcStatus::InvalidArgument => 3,
            RpcStatus::DeadlineExceeded => 4,
            RpcStatus::NotFound => 5,
            RpcStatus::Internal => 13,
            RpcStatus::Unavailable => 14,
        }
    }

    pub fn from_code(code: i32) -> Self {
        match code {
            0 => RpcStatus::Ok,
            3 => RpcStatus::InvalidArgument,
            4 => RpcStatus::DeadlineExceeded,
            5 => RpcStatus::NotFound,
            13 => RpcStatus::Internal,
            14 => RpcStatus::Unavailable,
            _ => RpcStatus::Unknown,
        }
    }

    /// Map an HTTP status returned by the weather service.
    pub fn from_http(status: u16) -> Self {
        match status {
            200..=299 => RpcStatus::Ok,
            400 => RpcStatus::InvalidArgument,
            404 => RpcStatus::NotFound,
            408 | 504 => RpcStatus::DeadlineExceeded,
            503 => RpcStatus::Unavailable,
            500 => RpcStatus::Internal,
            _ => RpcStatus::Unknown,
        }
    }

    /// The HTTP status the weather service answers with for this outcome.
    pub const fn http_status(self) -> u16 {
        match self {
            RpcStatus::Ok => 200,
            RpcStatus::InvalidArgument => 400,
            RpcStatus::NotFound => 404,
            RpcStatus::DeadlineExceeded => 504,
            RpcStatus::Unavailable => 503,
            RpcStatus::Internal | RpcStatus::Unknown => 500,
        }
    }
}

impl std::fmt::Display for RpcStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            RpcStatus::Ok => "OK",
            RpcStatus::Unknown => "UNKNOWN",
            RpcStatus::InvalidArgument => "INVALID_ARGUMENT",
            RpcStatus::DeadlineExceeded => "DEADLINE_EXCEEDED",
            RpcStatus::NotFound => "NOT_FOUND",
            RpcStatus::Internal => "INTERNAL",
            RpcStatus::Unavailable => "UNAVAILABLE",
        };
        f.write_str(name)
    }
}
