//! Client-side lifecycle of a single weather lookup.
//!
//! The controller owns the query text and the current view model. A call is
//! dispatched through the injected [`RpcGateway`]; its completion callback
//! only posts a [`Completion`] into the controller's inbox, and the host loop
//! applies it with [`RequestLifecycleController::drain_completions`] or
//! [`RequestLifecycleController::next_completion`]. All state changes thus
//! happen on the thread that owns the controller.

use std::sync::Arc;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::{
    codec::RequestCodec,
    gateway::{MethodId, OnEnd, RpcGateway, RpcResult},
    model::WeatherRecord,
};

pub const MALFORMED_RESPONSE_MESSAGE: &str = "No valid response received from the server.";
pub const CLIENT_ERROR_PREFIX: &str = "Client error: ";

/// Renderable outcome of the latest completed lookup.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ResponseViewModel {
    #[default]
    Empty,
    ErrorMessage(String),
    WeatherRecord(WeatherRecord),
}

/// Identifies one dispatched call. Later calls get larger tickets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestTicket(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Idle,
    AwaitingResult(RequestTicket),
    Resolved,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub ticket: RequestTicket,
    pub result: RpcResult,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The gateway accepted the call; the query text was cleared.
    Dispatched(RequestTicket),
    /// Query text is blank; nothing happened.
    NotAllowed,
    /// A previous call has not completed yet; nothing happened.
    InFlight(RequestTicket),
    /// Encoding or dispatch failed; the view model now holds a client error.
    ClientError,
}

#[derive(Debug)]
pub struct RequestLifecycleController {
    gateway: Arc<dyn RpcGateway>,
    codec: Arc<dyn RequestCodec>,
    query_text: String,
    view_model: ResponseViewModel,
    lifecycle: Lifecycle,
    last_ticket: u64,
    completions_tx: UnboundedSender<Completion>,
    completions_rx: UnboundedReceiver<Completion>,
}

impl RequestLifecycleController {
    pub fn new(gateway: Arc<dyn RpcGateway>, codec: Arc<dyn RequestCodec>) -> Self {
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();

        Self {
            gateway,
            codec,
            query_text: String::new(),
            view_model: ResponseViewModel::Empty,
            lifecycle: Lifecycle::Idle,
            last_ticket: 0,
            completions_tx,
            completions_rx,
        }
    }

    pub fn query_text(&self) -> &str {
        &self.query_text
    }

    pub fn view_model(&self) -> &ResponseViewModel {
        &self.view_model
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn is_awaiting_result(&self) -> bool {
        matches!(self.lifecycle, Lifecycle::AwaitingResult(_))
    }

    /// Replace the query text verbatim.
    pub fn update_query_text(&mut self, new_text: impl Into<String>) {
        self.query_text = new_text.into();
    }

    pub fn submission_allowed(&self) -> bool {
        !self.query_text.trim().is_empty()
    }

    /// Dispatch a lookup for the trimmed query text.
    pub fn submit(&mut self) -> SubmitOutcome {
        if !self.submission_allowed() {
            tracing::debug!("submit ignored: query text is blank");
            return SubmitOutcome::NotAllowed;
        }

        if let Lifecycle::AwaitingResult(pending) = self.lifecycle {
            tracing::debug!(?pending, "submit ignored: previous lookup still in flight");
            return SubmitOutcome::InFlight(pending);
        }

        self.last_ticket += 1;
        let ticket = RequestTicket(self.last_ticket);

        match self.dispatch(ticket) {
            Ok(()) => {
                tracing::info!(?ticket, city = self.query_text.trim(), "weather lookup dispatched");
                self.query_text.clear();
                self.lifecycle = Lifecycle::AwaitingResult(ticket);
                SubmitOutcome::Dispatched(ticket)
            }
            Err(message) => {
                tracing::warn!(?ticket, error = %message, "weather lookup could not be dispatched");
                self.view_model = ResponseViewModel::ErrorMessage(format!("{CLIENT_ERROR_PREFIX}{message}"));
                self.lifecycle = Lifecycle::Resolved;
                SubmitOutcome::ClientError
            }
        }
    }

    fn dispatch(&self, ticket: RequestTicket) -> Result<(), String> {
        let payload = self.codec.encode(self.query_text.trim()).map_err(|err| err.to_string())?;

        let inbox = self.completions_tx.clone();
        let on_end: OnEnd = Box::new(move |result| {
            if inbox.send(Completion { ticket, result }).is_err() {
                tracing::debug!(?ticket, "completion arrived after controller was dropped");
            }
        });

        self.gateway
            .call(&MethodId::GET_WEATHER, payload, on_end)
            .map_err(|err| err.to_string())
    }

    /// Apply a result unconditionally, replacing the current view model.
    pub fn on_result(&mut self, result: &RpcResult) {
        self.view_model = resolve_view_model(self.codec.as_ref(), result);
        self.lifecycle = Lifecycle::Resolved;
    }

    /// Apply a ticketed completion. Completions for tickets older than the
    /// most recently issued one are discarded; returns whether it was applied.
    pub fn on_completion(&mut self, completion: Completion) -> bool {
        if completion.ticket.0 < self.last_ticket {
            tracing::warn!(ticket = ?completion.ticket, latest = self.last_ticket, "discarding stale completion");
            return false;
        }

        self.on_result(&completion.result);
        tracing::debug!(ticket = ?completion.ticket, status = completion.result.status, "lookup resolved");
        true
    }

    /// Apply every completion already waiting in the inbox without blocking.
    pub fn drain_completions(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(completion) = self.completions_rx.try_recv() {
            if self.on_completion(completion) {
                applied += 1;
            }
        }
        applied
    }

    /// Wait for the in-flight lookup to resolve. Returns `None` immediately
    /// when nothing is in flight.
    pub async fn next_completion(&mut self) -> Option<&ResponseViewModel> {
        while self.is_awaiting_result() {
            let completion = self.completions_rx.recv().await?;
            self.on_completion(completion);
        }

        match self.lifecycle {
            Lifecycle::Resolved => Some(&self.view_model),
            _ => None,
        }
    }
}

fn resolve_view_model(codec: &dyn RequestCodec, result: &RpcResult) -> ResponseViewModel {
    if !result.is_ok() {
        return ResponseViewModel::ErrorMessage(result.status_message.clone());
    }

    match result.message.as_ref().and_then(|payload| codec.decode(payload)) {
        Some(fields) => ResponseViewModel::WeatherRecord(fields.into_record()),
        None => ResponseViewModel::ErrorMessage(MALFORMED_RESPONSE_MESSAGE.to_string()),
    }
}
