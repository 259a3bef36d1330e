//! Bus-send seam for reports.

use std::io::Write;

use super::report::Report;
use crate::error::SinkError;

/// Destination for reports built by a collector.
///
/// The sink receives a shared reference; anything it keeps is its own copy.
pub trait ReportSink {
    fn send(&mut self, report: &Report) -> Result<(), SinkError>;
}

/// Keeps every report in memory.
#[derive(Debug, Default)]
pub struct VecSink {
    pub reports: Vec<Report>,
}

impl ReportSink for VecSink {
    fn send(&mut self, report: &Report) -> Result<(), SinkError> {
        self.reports.push(report.clone());
        Ok(())
    }
}

/// Writes one JSON document per report, newline separated.
pub struct JsonLinesSink<W: Write> {
    writer: W,
    sent: usize,
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, sent: 0 }
    }

    /// Number of reports written so far.
    pub fn sent(&self) -> usize {
        self.sent
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> ReportSink for JsonLinesSink<W> {
    fn send(&mut self, report: &Report) -> Result<(), SinkError> {
        serde_json::to_writer(&mut self.writer, report)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        self.sent += 1;
        Ok(())
    }
}
