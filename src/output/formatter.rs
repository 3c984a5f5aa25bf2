//! Report formatters

use crate::{
    error::{AppError, Result},
    models::ProbeReport,
};
use serde::Serialize;

/// Renders a finished probe as one line of text
pub trait OutputFormatter {
    fn format_report(&self, report: &ProbeReport) -> Result<String>;
}

/// `dns connect first_byte total rate`, four decimals for the times and
/// whole bytes per second for the rate
#[derive(Debug, Default, Clone, Copy)]
pub struct LineFormatter;

impl OutputFormatter for LineFormatter {
    fn format_report(&self, report: &ProbeReport) -> Result<String> {
        let t = &report.timings;
        Ok(format!(
            "{:.4} {:.4} {:.4} {:.4} {:.0}",
            t.dns_secs(),
            t.connect_secs(),
            t.first_byte_secs(),
            t.total_secs(),
            report.transfer_rate()
        ))
    }
}

#[derive(Serialize)]
struct JsonReport<'a> {
    url: &'a str,
    peer: String,
    dns: f64,
    connect: f64,
    first_byte: f64,
    total: f64,
    rate: f64,
    content_length: usize,
    truncated: bool,
    tls_handshake: Option<f64>,
}

/// The same values as [`LineFormatter`] plus peer and content details, as a
/// single JSON object
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonFormatter;

impl OutputFormatter for JsonFormatter {
    fn format_report(&self, report: &ProbeReport) -> Result<String> {
        let t = &report.timings;
        let json = JsonReport {
            url: &report.url,
            peer: report.peer.to_string(),
            dns: t.dns_secs(),
            connect: t.connect_secs(),
            first_byte: t.first_byte_secs(),
            total: t.total_secs(),
            rate: report.transfer_rate().round(),
            content_length: report.content_length,
            truncated: report.truncated,
            tls_handshake: t.tls_handshake.map(|d| d.as_secs_f64()),
        };
        serde_json::to_string(&json)
            .map_err(|e| AppError::internal(format!("Can't serialize report: {}", e)))
    }
}
