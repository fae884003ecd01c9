mod aggregator;
mod columns;
mod renderer;
mod writer;

pub use aggregator::ReportAggregator;
pub use renderer::{RenderOptions, SpreadsheetRenderer};
pub use writer::ReportWriter;

use std::path::Path;

use rust_xlsxwriter::{Workbook, Worksheet};

use crate::error::Result;
use crate::providers::Issue;
use crate::window::MonthWindow;

/// Issues attributed to one person within one window.
#[derive(Debug, Clone, PartialEq)]
pub struct AssigneeIssueGroup {
    pub assignee: String,
    pub issues: Vec<Issue>,
}

/// Grouped issues of a single month. Never holds an empty group.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyAggregate {
    window: MonthWindow,
    groups: Vec<AssigneeIssueGroup>,
}

impl MonthlyAggregate {
    pub fn new(window: MonthWindow, groups: Vec<AssigneeIssueGroup>) -> Self {
        let groups = groups
            .into_iter()
            .filter(|group| !group.issues.is_empty())
            .collect();

        Self { window, groups }
    }

    pub fn window(&self) -> &MonthWindow {
        &self.window
    }

    pub fn groups(&self) -> &[AssigneeIssueGroup] {
        &self.groups
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn issue_count(&self) -> usize {
        self.groups.iter().map(|group| group.issues.len()).sum()
    }
}

/// The workbook being assembled for one run, one sheet per rendered month.
pub struct Report {
    workbook: Workbook,
    sheet_names: Vec<String>,
}

impl Report {
    pub fn new() -> Self {
        Self {
            workbook: Workbook::new(),
            sheet_names: Vec::new(),
        }
    }

    fn add_sheet(&mut self, name: &str) -> Result<&mut Worksheet> {
        let worksheet = self.workbook.add_worksheet();
        worksheet.set_name(name)?;
        self.sheet_names.push(name.to_owned());
        Ok(worksheet)
    }

    pub fn sheet_names(&self) -> &[String] {
        &self.sheet_names
    }

    pub fn is_empty(&self) -> bool {
        self.sheet_names.is_empty()
    }

    fn save(mut self, path: &Path) -> Result<()> {
        self.workbook.save(path)?;
        Ok(())
    }

    #[cfg(test)]
    fn save_to_buffer(&mut self) -> Result<Vec<u8>> {
        Ok(self.workbook.save_to_buffer()?)
    }
}

impl Default for Report {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::io::{Cursor, Read};

    use chrono::{DateTime, NaiveDate};

    use super::*;

    pub fn window(year: i32, month: u32) -> MonthWindow {
        MonthWindow::containing(NaiveDate::from_ymd_opt(year, month, 1).unwrap()).unwrap()
    }

    pub fn issue(key: &str, status: &str, resolution: Option<&str>) -> Issue {
        Issue {
            key: key.to_owned(),
            id: key.trim_start_matches(|c: char| !c.is_ascii_digit()).to_owned(),
            parent_id: None,
            summary: format!("Work on {key}"),
            status: status.to_owned(),
            created: DateTime::parse_from_rfc3339("2024-03-04T09:30:00+00:00").ok(),
            resolved: resolution
                .and_then(|_| DateTime::parse_from_rfc3339("2024-03-18T16:05:00+00:00").ok()),
            resolution: resolution.map(str::to_owned),
            issue_type: "Story".to_owned(),
        }
    }

    pub fn group(assignee: &str, issues: Vec<Issue>) -> AssigneeIssueGroup {
        AssigneeIssueGroup {
            assignee: assignee.to_owned(),
            issues,
        }
    }

    /// Serializes the report and returns one XML part of the xlsx package,
    /// e.g. `xl/worksheets/sheet1.xml`.
    pub fn workbook_part(report: &mut Report, name: &str) -> String {
        let buffer = report.save_to_buffer().unwrap();
        let mut archive = zip::ZipArchive::new(Cursor::new(buffer)).unwrap();
        let mut part = String::new();
        archive
            .by_name(name)
            .unwrap()
            .read_to_string(&mut part)
            .unwrap();
        part
    }
}
