use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, FixedOffset};
use log::debug;
use rust_xlsxwriter::{Color, Format, FormatAlign, FormatBorder, FormatPattern, Worksheet};

use super::columns::{
    conditional_fill, Column, FONT_NAME, FONT_SIZE, HEADER_ROW_HEIGHT, SEPARATOR_FILL,
};
use super::{MonthlyAggregate, Report};
use crate::error::{ReportError, Result};
use crate::providers::Issue;
use crate::window::MonthWindow;

const UNRESOLVED: &str = "Unresolved";

#[derive(Debug, Clone)]
pub struct RenderOptions {
    project: String,
    timestamp_format: String,
}

impl RenderOptions {
    /// `date_format` is a strftime date pattern; `" %H:%M"` is appended for timestamps.
    pub fn new(project: String, date_format: &str) -> Result<Self> {
        let timestamp_format = format!("{date_format} %H:%M");
        if StrftimeItems::new(&timestamp_format).any(|item| matches!(item, Item::Error)) {
            return Err(ReportError::Config(format!(
                "Invalid date format '{date_format}'"
            )));
        }

        Ok(Self {
            project,
            timestamp_format,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CellValue<'a> {
    Text(&'a str),
    Number(f64),
}

/// One issue flattened into display strings.
#[derive(Debug, Clone, PartialEq)]
pub struct IssueRow {
    project: String,
    assignee: String,
    key: String,
    id: String,
    parent_id: String,
    summary: String,
    status: String,
    created: String,
    resolved: String,
    month: String,
    year: String,
    issue_type: String,
    resolution: String,
}

impl IssueRow {
    fn new(options: &RenderOptions, assignee: &str, issue: &Issue) -> Self {
        let timestamp = |value: Option<DateTime<FixedOffset>>, pattern: &str| {
            value
                .map(|value| value.format(pattern).to_string())
                .unwrap_or_default()
        };

        Self {
            project: options.project.clone(),
            assignee: assignee.to_owned(),
            key: issue.key.clone(),
            id: issue.id.clone(),
            parent_id: issue.parent_id.clone().unwrap_or_default(),
            summary: issue.summary.clone(),
            status: issue.status.clone(),
            created: timestamp(issue.created, &options.timestamp_format),
            resolved: timestamp(issue.resolved, &options.timestamp_format),
            month: timestamp(issue.resolved, "%B"),
            year: timestamp(issue.resolved, "%Y"),
            issue_type: issue.issue_type.clone(),
            resolution: issue
                .resolution
                .clone()
                .unwrap_or_else(|| UNRESOLVED.to_owned()),
        }
    }

    pub fn value(&self, column: Column) -> CellValue<'_> {
        let text = match column {
            Column::Project => &self.project,
            Column::Assignee => &self.assignee,
            Column::IssueKey => &self.key,
            Column::IssueId => &self.id,
            Column::ParentId => &self.parent_id,
            Column::Summary => &self.summary,
            Column::Status => &self.status,
            Column::Created => &self.created,
            Column::Resolved => &self.resolved,
            Column::Month => &self.month,
            Column::Year => &self.year,
            Column::TaskCount => return CellValue::Number(1.0),
            Column::IssueType => &self.issue_type,
            Column::Resolution => &self.resolution,
        };
        CellValue::Text(text)
    }

    /// Status and resolution cells share one rule table; other cells stay plain.
    pub fn fill(&self, column: Column) -> Option<Color> {
        match column {
            Column::Status => conditional_fill(&self.status),
            Column::Resolution => conditional_fill(&self.resolution),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SheetRow {
    Issue(IssueRow),
    /// Blank highlighted row between two assignee groups.
    Separator,
}

pub struct SpreadsheetRenderer {
    options: RenderOptions,
}

impl SpreadsheetRenderer {
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }

    pub fn sheet_name(window: &MonthWindow) -> String {
        format!("{}-{}", window.month_name(), window.year())
    }

    /// Data rows below the header: groups in aggregate order, separated but not terminated.
    pub fn rows(&self, aggregate: &MonthlyAggregate) -> Vec<SheetRow> {
        let mut rows = Vec::with_capacity(aggregate.issue_count() + aggregate.groups().len());

        for (index, group) in aggregate.groups().iter().enumerate() {
            if index > 0 {
                rows.push(SheetRow::Separator);
            }
            rows.extend(group.issues.iter().map(|issue| {
                SheetRow::Issue(IssueRow::new(&self.options, &group.assignee, issue))
            }));
        }

        rows
    }

    /// Appends one sheet for the month. Empty aggregates add nothing.
    pub fn render(&self, report: &mut Report, aggregate: &MonthlyAggregate) -> Result<()> {
        if aggregate.is_empty() {
            return Ok(());
        }

        let name = Self::sheet_name(aggregate.window());
        let rows = self.rows(aggregate);
        debug!("Rendering sheet {name} with {} rows", rows.len());

        let worksheet = report.add_sheet(&name)?;
        write_header(worksheet)?;

        for (index, row) in rows.iter().enumerate() {
            #[allow(clippy::cast_possible_truncation)]
            let row_number = index as u32 + 1;
            match row {
                SheetRow::Issue(issue_row) => write_issue_row(worksheet, row_number, issue_row)?,
                SheetRow::Separator => write_separator_row(worksheet, row_number)?,
            }
        }

        apply_sheet_font(worksheet)?;

        #[allow(clippy::cast_possible_truncation)]
        let last_row = rows.len() as u32;
        worksheet.autofilter(0, 0, last_row, Column::last().index())?;

        for column in Column::ALL {
            worksheet.set_column_width(column.index(), column.width())?;
        }

        Ok(())
    }
}

fn base_format() -> Format {
    Format::new().set_font_name(FONT_NAME).set_font_size(FONT_SIZE)
}

fn with_fill(format: Format, fill: Option<Color>) -> Format {
    match fill {
        Some(color) => format
            .set_background_color(color)
            .set_pattern(FormatPattern::Solid),
        None => format,
    }
}

fn write_header(worksheet: &mut Worksheet) -> Result<()> {
    for column in Column::ALL {
        let format = with_fill(
            base_format()
                .set_bold()
                .set_border(FormatBorder::Thin)
                .set_align(FormatAlign::VerticalCenter),
            column.header_fill(),
        );
        worksheet.write_string_with_format(0, column.index(), column.header(), &format)?;
    }
    worksheet.set_row_height(0, HEADER_ROW_HEIGHT)?;

    Ok(())
}

fn write_issue_row(worksheet: &mut Worksheet, row: u32, issue_row: &IssueRow) -> Result<()> {
    for column in Column::ALL {
        let format = with_fill(
            base_format().set_border(FormatBorder::Thin),
            issue_row.fill(column),
        );
        match issue_row.value(column) {
            CellValue::Text(text) => {
                worksheet.write_string_with_format(row, column.index(), text, &format)?;
            }
            CellValue::Number(number) => {
                worksheet.write_number_with_format(row, column.index(), number, &format)?;
            }
        }
    }

    Ok(())
}

fn write_separator_row(worksheet: &mut Worksheet, row: u32) -> Result<()> {
    let format = with_fill(base_format(), Some(SEPARATOR_FILL));
    for column in Column::ALL {
        worksheet.write_blank(row, column.index(), &format)?;
    }

    Ok(())
}

/// Sheet-wide font, so cells added later in Excel match the rendered ones.
fn apply_sheet_font(worksheet: &mut Worksheet) -> Result<()> {
    let format = base_format();
    for column in Column::ALL {
        worksheet.set_column_format(column.index(), &format)?;
    }

    Ok(())
}
