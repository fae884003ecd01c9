use std::path::PathBuf;

use log::{info, warn};

use super::Report;
use crate::error::Result;
use crate::window::MonthRange;

const FILE_DATE_FORMAT: &str = "%Y-%m-%d";

pub struct ReportWriter {
    output_dir: PathBuf,
    team: String,
}

impl ReportWriter {
    pub fn new(output_dir: PathBuf, team: String) -> Self {
        Self { output_dir, team }
    }

    /// `{team}_Report_{start}_{end}.xlsx`
    pub fn file_name(&self, range: &MonthRange) -> String {
        format!(
            "{}_Report_{}_{}.xlsx",
            self.team,
            range.start.format(FILE_DATE_FORMAT),
            range.end.format(FILE_DATE_FORMAT)
        )
    }

    /// Serializes the whole workbook in one step. Any failure is returned as is.
    pub fn write(&self, report: Report, range: &MonthRange) -> Result<PathBuf> {
        let path = self.output_dir.join(self.file_name(range));

        if report.is_empty() {
            warn!("No month had any issues; writing a report without data sheets");
        } else {
            info!(
                "Writing {} sheets: {}",
                report.sheet_names().len(),
                report.sheet_names().join(", ")
            );
        }

        report.save(&path)?;
        info!("Report written to: {}", path.display());

        Ok(path)
    }
}
