//! Report output
//!
//! stdout carries the (optional) response content followed by exactly one
//! report line. Diagnostics never go here.

mod formatter;

pub use formatter::{JsonFormatter, LineFormatter, OutputFormatter};

use crate::{
    error::Result,
    models::ProbeReport,
    types::OutputFormat,
};
use std::io::Write;

/// Output formatting factory for creating appropriate formatters
pub struct OutputFormatterFactory;

impl OutputFormatterFactory {
    pub fn create_formatter(format: OutputFormat) -> Box<dyn OutputFormatter> {
        match format {
            OutputFormat::Line => Box::new(LineFormatter),
            OutputFormat::Json => Box::new(JsonFormatter),
        }
    }
}

/// Writes the content and the report to an output stream
pub struct Reporter {
    formatter: Box<dyn OutputFormatter>,
    print_content: bool,
}

impl Reporter {
    pub fn new(format: OutputFormat, print_content: bool) -> Self {
        Self {
            formatter: OutputFormatterFactory::create_formatter(format),
            print_content,
        }
    }

    /// Content first (raw bytes and a newline) when enabled, then the report
    pub fn emit<W: Write>(&self, out: &mut W, report: &ProbeReport) -> Result<()> {
        let line = self.formatter.format_report(report)?;
        if self.print_content {
            out.write_all(&report.content)?;
            out.write_all(b"\n")?;
        }
        writeln!(out, "{}", line)?;
        out.flush()?;
        Ok(())
    }
}
