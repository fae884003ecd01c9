use rust_xlsxwriter::Color;

pub const HEADER_ROW_HEIGHT: f64 = 30.0;
pub const FONT_NAME: &str = "Calibri";
pub const FONT_SIZE: f64 = 11.0;

pub const SEPARATOR_FILL: Color = Color::RGB(0xFFFF00);
const DONE_FILL: Color = Color::RGB(0xCCFFCE);
const DISMISSED_FILL: Color = Color::RGB(0xD3D3D3);

/// Fixed sheet layout, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Project,
    Assignee,
    IssueKey,
    IssueId,
    ParentId,
    Summary,
    Status,
    Created,
    Resolved,
    Month,
    Year,
    TaskCount,
    IssueType,
    Resolution,
}

impl Column {
    pub const ALL: [Self; 14] = [
        Self::Project,
        Self::Assignee,
        Self::IssueKey,
        Self::IssueId,
        Self::ParentId,
        Self::Summary,
        Self::Status,
        Self::Created,
        Self::Resolved,
        Self::Month,
        Self::Year,
        Self::TaskCount,
        Self::IssueType,
        Self::Resolution,
    ];

    pub fn index(self) -> u16 {
        self as u16
    }

    pub fn header(self) -> &'static str {
        match self {
            Self::Project => "Project",
            Self::Assignee => "Assignee",
            Self::IssueKey => "Issue Key",
            Self::IssueId => "Issue ID",
            Self::ParentId => "Parent ID",
            Self::Summary => "Summary",
            Self::Status => "Status",
            Self::Created => "Created Date",
            Self::Resolved => "Updated Date",
            Self::Month => "Month-GTV",
            Self::Year => "Year-GTV",
            Self::TaskCount => "Number of Task",
            Self::IssueType => "Issue Type",
            Self::Resolution => "Resolution",
        }
    }

    pub fn width(self) -> f64 {
        match self {
            Self::Summary => 32.0,
            Self::Status => 15.0,
            _ => 20.0,
        }
    }

    /// Background for the derived summary columns' header cells.
    pub fn header_fill(self) -> Option<Color> {
        match self {
            Self::Month => Some(Color::RGB(0xFFFF00)),
            Self::Year => Some(Color::RGB(0xF8E5D5)),
            Self::TaskCount => Some(Color::RGB(0xDBEDF4)),
            _ => None,
        }
    }

    pub fn last() -> Self {
        Self::ALL[Self::ALL.len() - 1]
    }
}

/// Status-like text pattern mapped to a background color.
#[derive(Debug, Clone, Copy)]
pub struct CellFillRule {
    pub patterns: &'static [&'static str],
    pub fill: Color,
}

/// Checked in order; the first rule with a matching pattern wins.
pub const CELL_FILL_RULES: [CellFillRule; 2] = [
    CellFillRule {
        patterns: &["done"],
        fill: DONE_FILL,
    },
    CellFillRule {
        patterns: &["won't do", "closed"],
        fill: DISMISSED_FILL,
    },
];

/// Case-insensitive substring match against [`CELL_FILL_RULES`].
pub fn conditional_fill(value: &str) -> Option<Color> {
    let value = value.to_lowercase();

    CELL_FILL_RULES
        .iter()
        .find(|rule| rule.patterns.iter().any(|pattern| value.contains(pattern)))
        .map(|rule| rule.fill)
}
