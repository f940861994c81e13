//! Translation between raw input text and the wire payload.
//!
//! Inbound payloads are treated as untrusted: any of the seven weather fields
//! may be missing depending on which serializer produced the message, so
//! extraction goes through a fixed `(field, default)` table and never indexes
//! into an unchecked structure.

use std::{collections::HashMap, fmt::Debug};

use serde_json::{Map, Value, json};

use crate::model::WeatherRecord;

/// Wire payload. Requests and responses are JSON objects.
pub type Payload = Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WeatherField {
    City,
    Country,
    Temperature,
    Condition,
    Humidity,
    WindSpeed,
    LastUpdated,
}

impl WeatherField {
    /// Key used on the wire.
    pub const fn key(self) -> &'static str {
        match self {
            WeatherField::City => "city",
            WeatherField::Country => "country",
            WeatherField::Temperature => "temperature",
            WeatherField::Condition => "condition",
            WeatherField::Humidity => "humidity",
            WeatherField::WindSpeed => "wind_speed",
            WeatherField::LastUpdated => "last_updated",
        }
    }

    /// Key emitted by camelCase serializers (gRPC-web JSON, JS clients).
    pub const fn camel_key(self) -> &'static str {
        match self {
            WeatherField::WindSpeed => "windSpeed",
            WeatherField::LastUpdated => "lastUpdated",
            other => other.key(),
        }
    }
}

/// Extraction order and placeholder for every display field.
pub const FIELD_DEFAULTS: [(WeatherField, &str); 7] = [
    (WeatherField::City, "Unknown"),
    (WeatherField::Country, ""),
    (WeatherField::Temperature, ""),
    (WeatherField::Condition, ""),
    (WeatherField::Humidity, ""),
    (WeatherField::WindSpeed, ""),
    (WeatherField::LastUpdated, ""),
];

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CodecError {
    #[error("city name cannot be empty")]
    EmptyCity,
}

/// Fields that were actually present in an inbound payload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodedFields {
    values: HashMap<WeatherField, String>,
}

impl DecodedFields {
    pub fn insert(&mut self, field: WeatherField, value: impl Into<String>) {
        self.values.insert(field, value.into());
    }

    pub fn get(&self, field: WeatherField) -> Option<&str> {
        self.values.get(&field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Fill every display field, falling back to its placeholder when absent.
    pub fn into_record(self) -> WeatherRecord {
        let [city, country, temperature, condition, humidity, wind_speed, last_updated] =
            FIELD_DEFAULTS.map(|(field, default)| {
                self.get(field).unwrap_or(default).to_string()
            });

        WeatherRecord {
            city,
            country,
            temperature,
            condition,
            humidity,
            wind_speed,
            last_updated,
        }
    }
}

pub trait RequestCodec: Send + Sync + Debug {
    /// Build the outbound payload for the given (already trimmed) city name.
    fn encode(&self, raw_text: &str) -> Result<Payload, CodecError>;

    /// Pull out whichever weather fields are readable. `None` means the
    /// payload is missing or has nothing extractable.
    fn decode(&self, payload: &Payload) -> Option<DecodedFields>;
}

/// Codec for the JSON shape spoken by the weather service.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl RequestCodec for JsonCodec {
    fn encode(&self, raw_text: &str) -> Result<Payload, CodecError> {
        let city = raw_text.trim();
        if city.is_empty() {
            return Err(CodecError::EmptyCity);
        }
        Ok(json!({ "city": city }))
    }

    fn decode(&self, payload: &Payload) -> Option<DecodedFields> {
        let object = payload.as_object()?;

        let mut fields = DecodedFields::default();
        for (field, _) in FIELD_DEFAULTS {
            if let Some(value) = read_field(object, field) {
                fields.insert(field, value);
            }
        }

        if fields.is_empty() { None } else { Some(fields) }
    }
}

/// First readable scalar under either spelling of the field's key.
fn read_field(object: &Map<String, Value>, field: WeatherField) -> Option<String> {
    [field.key(), field.camel_key()]
        .into_iter()
        .find_map(|key| object.get(key).and_then(scalar_to_string))
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}
