//! Report output port trait.

use crate::domain::engine::RunReport;
use crate::domain::error::ReplayError;

/// Port for writing the result of a replay.
pub trait ReportPort {
    fn write(&self, report: &RunReport, output_path: &str) -> Result<(), ReplayError>;
}
