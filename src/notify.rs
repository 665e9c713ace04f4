use reqwest::blocking::Client;
use reqwest::StatusCode;
use std::time::Duration;
use tracing::{error, info, warn};

use crate::error::NotifyError;
use crate::models::dto::SummaryPayload;

/// How a single webhook delivery ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    Sent,
    /// The endpoint answered with something other than 200.
    Rejected { status: u16, body: String },
    /// The request never produced a response.
    Failed { reason: String },
}

pub struct Notifier {
    client: Client,
    url: String,
}

impl Notifier {
    pub fn new(url: impl Into<String>) -> Result<Self, NotifyError> {
        // No request timeout: a hung endpoint blocks the run.
        let client = Client::builder()
            .timeout(None::<Duration>)
            .build()
            .map_err(NotifyError::Client)?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    fn post(&self, payload: &SummaryPayload) -> Result<(StatusCode, String), NotifyError> {
        let response = self.client.post(&self.url).json(payload).send()?;
        let status = response.status();
        let body = response.text()?;
        Ok((status, body))
    }

    /// POSTs the payload once and reports the outcome. Never retries.
    pub fn send(&self, payload: &SummaryPayload) -> Delivery {
        match self.post(payload) {
            Ok((StatusCode::OK, _)) => {
                info!("Data sent to webhook successfully!");
                Delivery::Sent
            }
            Ok((status, body)) => {
                warn!("Failed to send data: {}, {}", status.as_u16(), body);
                Delivery::Rejected {
                    status: status.as_u16(),
                    body,
                }
            }
            Err(e) => {
                error!("Error sending data to webhook: {}", e);
                Delivery::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }
}

/// Builds a one-shot notifier for `url` and delivers `payload`.
pub fn send_summary(payload: &SummaryPayload, url: &str) -> Delivery {
    match Notifier::new(url) {
        Ok(notifier) => notifier.send(payload),
        Err(e) => {
            error!("Error sending data to webhook: {}", e);
            Delivery::Failed {
                reason: e.to_string(),
            }
        }
    }
}
