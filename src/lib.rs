//! Reads the newest stats event from a Suricata EVE log, flattens a handful of
//! its counters into a [`SummaryPayload`] and POSTs it to a webhook.

pub mod config;
pub mod error;
pub mod models;
pub mod notify;
pub mod parser;
pub mod pipeline;

pub use config::Settings;
pub use models::dto::SummaryPayload;
pub use parser::ScanMode;
pub use pipeline::{run, RunOutcome};
