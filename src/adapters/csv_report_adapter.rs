//! Transaction log CSV report adapter.

use crate::domain::engine::RunReport;
use crate::domain::error::ReplayError;
use crate::ports::report_port::ReportPort;

/// Writes one row per transaction: `timestamp,kind,price,number,value`.
pub struct CsvReportAdapter;

impl CsvReportAdapter {
    pub fn new() -> Self {
        Self
    }

    pub fn render(report: &RunReport) -> Result<String, ReplayError> {
        let mut wtr = csv::Writer::from_writer(Vec::new());
        Self::write_rows(&mut wtr, report)?;
        let bytes = wtr
            .into_inner()
            .map_err(|e| std::io::Error::other(e.to_string()))?;
        String::from_utf8(bytes).map_err(|e| ReplayError::Data {
            reason: format!("report is not valid UTF-8: {e}"),
        })
    }

    fn write_rows<W: std::io::Write>(
        wtr: &mut csv::Writer<W>,
        report: &RunReport,
    ) -> Result<(), ReplayError> {
        wtr.write_record(["timestamp", "kind", "price", "number", "value"])
            .map_err(std::io::Error::from)?;
        for tx in report.ledger.transactions() {
            wtr.write_record([
                tx.timestamp.to_string(),
                tx.kind.to_string(),
                tx.price.to_string(),
                tx.number.to_string(),
                tx.value().to_string(),
            ])
            .map_err(std::io::Error::from)?;
        }
        wtr.flush()?;
        Ok(())
    }
}

impl Default for CsvReportAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportPort for CsvReportAdapter {
    fn write(&self, report: &RunReport, output_path: &str) -> Result<(), ReplayError> {
        let mut wtr = csv::Writer::from_path(output_path).map_err(std::io::Error::from)?;
        Self::write_rows(&mut wtr, report)?;
        tracing::info!(
            path = output_path,
            rows = report.ledger.transactions().len(),
            "transaction log written"
        );
        Ok(())
    }
}
