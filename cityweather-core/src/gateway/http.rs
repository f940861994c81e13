use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Client;
use serde_json::Value;
use tokio::runtime::Handle;

use crate::{codec::Payload, model::RpcStatus, provider::truncate_body};

use super::{DispatchError, MethodId, OnEnd, RpcGateway, RpcResult};

/// Gateway that speaks JSON over HTTP to the weather service.
///
/// Each call runs on its own tokio task; the completion callback fires from
/// that task once the response (or transport failure) is known.
#[derive(Debug, Clone)]
pub struct HttpGateway {
    base_url: String,
    http: Client,
}

impl HttpGateway {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client for the weather service")?;

        Ok(Self { base_url: base_url.into().trim_end_matches('/').to_string(), http })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url_for(&self, method: &MethodId) -> String {
        format!("{}{}", self.base_url, method.path())
    }
}

impl RpcGateway for HttpGateway {
    fn call(&self, method: &MethodId, payload: Payload, on_end: OnEnd) -> Result<(), DispatchError> {
        let handle = Handle::try_current().map_err(|_| DispatchError::NoRuntime(*method))?;

        let url = self.url_for(method);
        let http = self.http.clone();
        let method = *method;

        tracing::debug!(%method, %url, "dispatching call");
        handle.spawn(async move {
            let result = perform(&http, &url, &payload).await;
            tracing::debug!(%method, status = result.status, "call completed");
            on_end(result);
        });

        Ok(())
    }
}

async fn perform(http: &Client, url: &str, payload: &Payload) -> RpcResult {
    let res = match http.post(url).json(payload).send().await {
        Ok(res) => res,
        Err(err) => return transport_failure(&err),
    };

    let status = res.status();
    let body = match res.text().await {
        Ok(body) => body,
        Err(err) => return transport_failure(&err),
    };

    let rpc_status = RpcStatus::from_http(status.as_u16());
    if rpc_status == RpcStatus::Ok {
        // An unparseable body is left for the caller to report as malformed.
        return RpcResult::ok(serde_json::from_str::<Value>(&body).ok());
    }

    let message = error_message(&body).unwrap_or_else(|| {
        if body.trim().is_empty() {
            status.canonical_reason().unwrap_or("Request failed").to_string()
        } else {
            truncate_body(&body)
        }
    });

    RpcResult::failure(rpc_status, message)
}

fn transport_failure(err: &reqwest::Error) -> RpcResult {
    if err.is_timeout() {
        RpcResult::failure(RpcStatus::DeadlineExceeded, "Request timed out")
    } else if err.is_connect() {
        RpcResult::failure(RpcStatus::Unavailable, "Weather service unavailable")
    } else {
        RpcResult::failure(RpcStatus::Unknown, err.to_string())
    }
}

/// The service reports failures as `{"error": "..."}`.
fn error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    value.get("error")?.as_str().map(str::to_string)
}
