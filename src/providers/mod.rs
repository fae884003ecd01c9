pub mod jira;

use chrono::{DateTime, FixedOffset};

use crate::window::MonthWindow;

/// A tracker issue as the report pipeline sees it.
#[derive(Debug, Clone, PartialEq)]
pub struct Issue {
    pub key: String,
    pub id: String,
    pub parent_id: Option<String>,
    pub summary: String,
    pub status: String,
    pub created: Option<DateTime<FixedOffset>>,
    pub resolved: Option<DateTime<FixedOffset>>,
    pub resolution: Option<String>,
    pub issue_type: String,
}

pub trait IssueFetcher {
    /// Issues assigned to `assignee` at any point during `window`, in tracker order.
    ///
    /// Implementations absorb their own failures: a broken request yields an
    /// empty list and a diagnostic, never an error.
    async fn search_issues(&self, assignee: &str, window: &MonthWindow) -> Vec<Issue>;
}
