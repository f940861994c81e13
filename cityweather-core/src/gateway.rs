use std::fmt::Debug;

use crate::{codec::Payload, model::RpcStatus};

pub mod http;

/// Fully-qualified remote method, e.g. `WeatherService/GetWeather`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MethodId {
    pub service: &'static str,
    pub method: &'static str,
}

impl MethodId {
    pub const GET_WEATHER: MethodId = MethodId { service: "WeatherService", method: "GetWeather" };

    /// Route path on the weather service.
    pub fn path(&self) -> String {
        format!("/{}/{}", self.service, self.method)
    }
}

impl std::fmt::Display for MethodId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.service, self.method)
    }
}

/// Terminal outcome of one call, as handed to the completion callback.
#[derive(Debug, Clone, PartialEq)]
pub struct RpcResult {
    pub status: i32,
    pub status_message: String,
    pub message: Option<Payload>,
}

impl RpcResult {
    pub fn ok(message: Option<Payload>) -> Self {
        Self { status: RpcStatus::Ok.code(), status_message: String::new(), message }
    }

    pub fn failure(status: RpcStatus, status_message: impl Into<String>) -> Self {
        Self { status: status.code(), status_message: status_message.into(), message: None }
    }

    pub fn is_ok(&self) -> bool {
        self.status == RpcStatus::Ok.code()
    }
}

/// Completion callback. Invoked exactly once per accepted call.
pub type OnEnd = Box<dyn FnOnce(RpcResult) + Send + 'static>;

#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("no async runtime available to dispatch {0}")]
    NoRuntime(MethodId),
    #[error("{0}")]
    Rejected(String),
}

/// Capability to perform remote calls, injected by the host.
///
/// When `call` returns `Err` the callback is dropped without being invoked;
/// when it returns `Ok` the gateway guarantees exactly one invocation.
pub trait RpcGateway: Send + Sync + Debug {
    fn call(&self, method: &MethodId, payload: Payload, on_end: OnEnd) -> Result<(), DispatchError>;
}
