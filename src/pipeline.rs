use serde::ser::Error as _;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use tracing::{info, warn};

use crate::config::{self, Settings};
use crate::models::dto::SummaryPayload;
use crate::notify::{self, Delivery};
use crate::parser;

/// How a run ended. Every variant is a normal exit for the process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    ConfigMissing,
    /// No stats event, an unreadable log, or a malformed line in strict mode.
    NoSummary,
    DryRun(SummaryPayload),
    Delivered(SummaryPayload),
    Rejected { status: u16, body: String },
    TransportFailed { reason: String },
}

/// Payload as four-space indented JSON, the format printed before delivery.
pub fn render_payload(payload: &SummaryPayload) -> serde_json::Result<String> {
    let mut buf = Vec::new();
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
    payload.serialize(&mut ser)?;
    String::from_utf8(buf).map_err(serde_json::Error::custom)
}

pub fn run(settings: &Settings) -> RunOutcome {
    let url = match config::load_webhook_url(&settings.config_path, &settings.webhook_key_name) {
        Some(url) if !url.is_empty() => url,
        _ => {
            warn!("Webhook URL could not be loaded. Exiting.");
            return RunOutcome::ConfigMissing;
        }
    };

    let Some(payload) = parser::latest_summary(&settings.log_path, settings.scan_mode) else {
        return RunOutcome::NoSummary;
    };

    match render_payload(&payload) {
        Ok(rendered) => println!("{}", rendered),
        Err(e) => warn!("could not render payload: {}", e),
    }

    if settings.dry_run {
        info!("dry run, not sending to {}", url);
        return RunOutcome::DryRun(payload);
    }

    match notify::send_summary(&payload, &url) {
        Delivery::Sent => RunOutcome::Delivered(payload),
        Delivery::Rejected { status, body } => RunOutcome::Rejected { status, body },
        Delivery::Failed { reason } => RunOutcome::TransportFailed { reason },
    }
}
