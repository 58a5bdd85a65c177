//! Spreadsheet endpoint client

use crate::error::{GatewayError, OptimizeError, OPTIMIZE_FALLBACK_MESSAGE};
use crate::wire::{self, Ack, Action, OptimizeReply, RequestsEnvelope};
use board_core::{Request, RequestId, StatusUpdate};
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;
use url::Url;

/// Longest response body kept in a status error
const MAX_ERROR_BODY: usize = 200;

/// Client for the remote spreadsheet endpoint
#[derive(Debug, Clone)]
pub struct RemoteGateway {
    client: Client,
    endpoint: Url,
}

impl RemoteGateway {
    /// Create new gateway for `endpoint`
    ///
    /// `timeout` bounds each call; `None` waits as long as the transport does.
    pub fn new(endpoint: &str, timeout: Option<Duration>) -> Result<Self, GatewayError> {
        let trimmed = endpoint.trim();
        let endpoint = Url::parse(trimmed).map_err(|source| GatewayError::InvalidEndpoint {
            endpoint: trimmed.to_string(),
            source,
        })?;

        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(GatewayError::Client)?;

        Ok(Self { client, endpoint })
    }

    /// Endpoint URL
    #[inline]
    #[must_use]
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    async fn call<T: DeserializeOwned>(
        &self,
        action: Action,
        params: &[(&'static str, String)],
    ) -> Result<T, GatewayError> {
        tracing::debug!("remote call: action={}", action);

        let response = self
            .client
            .get(self.endpoint.clone())
            .query(&[("action", action.as_str())])
            .query(params)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(GatewayError::Status {
                status: status.as_u16(),
                body: body.chars().take(MAX_ERROR_BODY).collect(),
            });
        }

        Ok(serde_json::from_str(&body)?)
    }

    async fn acknowledge(
        &self,
        action: Action,
        params: &[(&'static str, String)],
    ) -> Result<(), GatewayError> {
        let ack: Ack = self.call(action, params).await?;
        if ack.success {
            Ok(())
        } else {
            Err(GatewayError::Rejected(ack.error.unwrap_or_else(|| {
                format!("remote endpoint rejected {action}")
            })))
        }
    }

    /// Fetch the whole collection
    pub async fn get_all(&self) -> Result<Vec<Request>, GatewayError> {
        let envelope: RequestsEnvelope = self.call(Action::GetAll, &[]).await?;
        Ok(envelope.requests.unwrap_or_default())
    }

    /// Append a request
    pub async fn create(&self, request: &Request) -> Result<(), GatewayError> {
        self.acknowledge(Action::Add, &wire::add_params(request)).await
    }

    /// Change status fields of a request
    pub async fn update(&self, update: &StatusUpdate) -> Result<(), GatewayError> {
        self.acknowledge(Action::Update, &wire::update_params(update))
            .await
    }

    /// Delete a request
    pub async fn delete(&self, id: &RequestId) -> Result<(), GatewayError> {
        self.acknowledge(Action::Delete, &wire::delete_params(id))
            .await
    }

    /// Ask the endpoint to rewrite a description
    pub async fn optimize(&self, description: &str) -> Result<String, OptimizeError> {
        let reply: OptimizeReply = self
            .call(Action::Optimize, &wire::optimize_params(description))
            .await?;

        match reply.optimized {
            Some(text) if reply.success && !text.trim().is_empty() => Ok(text),
            _ => Err(OptimizeError::Failed(
                reply
                    .error
                    .filter(|msg| !msg.trim().is_empty())
                    .unwrap_or_else(|| OPTIMIZE_FALLBACK_MESSAGE.to_string()),
            )),
        }
    }
}
