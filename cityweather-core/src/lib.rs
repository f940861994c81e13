//! Core library for the `cityweather` client and service.
//!
//! This crate defines:
//! - The request lifecycle controller driving one lookup at a time
//! - Payload codec and the RPC gateway capability it talks through
//! - Weather providers and the HTTP service that fronts them
//! - Configuration & credentials handling
//!
//! It is used by `cityweather-cli`, but can also be embedded by other hosts
//! that supply their own gateway.

pub mod codec;
pub mod config;
pub mod controller;
pub mod gateway;
pub mod model;
pub mod provider;
pub mod service;
pub mod view;

pub use codec::{JsonCodec, Payload, RequestCodec};
pub use config::{Config, ProviderConfig};
pub use controller::{Lifecycle, RequestLifecycleController, ResponseViewModel, SubmitOutcome};
pub use gateway::{MethodId, RpcGateway, RpcResult, http::HttpGateway};
pub use model::{RpcStatus, WeatherRecord, WeatherRequest};
pub use provider::{ProviderError, ProviderId, WeatherProvider};
