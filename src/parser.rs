// Finds the newest stats event in an EVE log.
// "Newest" means lowest in the file: the scan walks lines bottom-up and stops at the
// first stats record. Embedded timestamps are never compared.

use std::fs;
use std::path::Path;
use tracing::{debug, error, info, warn};

use crate::error::{ExtractError, MalformedRecord};
use crate::models::domain::EveRecord;
use crate::models::dto::SummaryPayload;

/// What to do with a line that is not a JSON object.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ScanMode {
    /// Abort the whole extraction on the first malformed line reached.
    /// A log that is not valid UTF-8 is rejected as a whole.
    #[default]
    Strict,
    /// Skip malformed lines, including lines that are not valid UTF-8, and keep scanning.
    Lenient,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedLine {
    /// 1-based physical line number.
    pub line_number: usize,
    pub reason: String,
}

#[derive(Debug, Default)]
pub struct ScanReport {
    pub summary: Option<SummaryPayload>,
    /// 1-based physical line of the stats event the summary came from.
    pub line_number: Option<usize>,
    /// Malformed lines passed over before the match, newest first.
    pub skipped: Vec<SkippedLine>,
}

// Same line boundaries as `str::lines`: split on `\n`, drop one trailing `\r`,
// no empty line after a final newline.
fn split_lines(content: &[u8]) -> Vec<&[u8]> {
    let mut lines: Vec<&[u8]> = content
        .split(|&b| b == b'\n')
        .map(|line| line.strip_suffix(b"\r").unwrap_or(line))
        .collect();
    if lines.last().is_some_and(|line| line.is_empty()) {
        lines.pop();
    }
    lines
}

fn parse_line(line: &[u8]) -> Result<EveRecord, MalformedRecord> {
    EveRecord::parse(std::str::from_utf8(line)?)
}

pub fn scan_bytes(content: &[u8], mode: ScanMode) -> Result<ScanReport, ExtractError> {
    let mut report = ScanReport::default();

    for (index, line) in split_lines(content).into_iter().enumerate().rev() {
        let line_number = index + 1;
        let record = match parse_line(line) {
            Ok(record) => record,
            Err(source) => match mode {
                ScanMode::Strict => {
                    return Err(ExtractError::MalformedLine {
                        line_number,
                        source,
                    })
                }
                ScanMode::Lenient => {
                    report.skipped.push(SkippedLine {
                        line_number,
                        reason: source.to_string(),
                    });
                    continue;
                }
            },
        };

        if record.is_stats() {
            debug!(
                "using stats event on line {} (timestamp {})",
                line_number,
                record.timestamp().unwrap_or("unknown")
            );
            report.summary = Some(SummaryPayload::from(record.stats()));
            report.line_number = Some(line_number);
            break;
        }
    }

    Ok(report)
}

pub fn scan_lines(content: &str, mode: ScanMode) -> Result<ScanReport, ExtractError> {
    scan_bytes(content.as_bytes(), mode)
}

pub fn scan_log(path: &Path, mode: ScanMode) -> Result<ScanReport, ExtractError> {
    let content = fs::read(path).map_err(|source| ExtractError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    if mode == ScanMode::Strict {
        std::str::from_utf8(&content).map_err(|source| ExtractError::Encoding {
            path: path.to_path_buf(),
            source,
        })?;
    }
    scan_bytes(&content, mode)
}

/// Summary of the newest stats event in the log at `path`.
///
/// Returns `None` when the log holds no stats event, or when it cannot be read
/// (or, in strict mode, holds a malformed line below the newest stats event).
/// Failures are reported here and never returned to the caller.
pub fn latest_summary(path: &Path, mode: ScanMode) -> Option<SummaryPayload> {
    let report = match scan_log(path, mode) {
        Ok(report) => report,
        Err(e) => {
            error!("Error preparing summary payload: {}", e);
            return None;
        }
    };

    for skipped in &report.skipped {
        warn!(
            "skipped malformed line {} in {}: {}",
            skipped.line_number,
            path.display(),
            skipped.reason
        );
    }

    if report.summary.is_none() {
        info!("No stats event found in {}", path.display());
    }
    report.summary
}
