use log::{debug, warn};

use super::client::JiraClient;
use crate::auth::Token;
use crate::error::Result;
use crate::providers::{Issue, IssueFetcher};
use crate::window::MonthWindow;

const JQL_DATE_FORMAT: &str = "%Y-%m-%d";

pub struct JiraProvider {
    client: JiraClient,
}

impl JiraProvider {
    pub fn new(base_url: &str, token: Option<Token>) -> Result<Self> {
        let client = JiraClient::new(base_url, token)?;

        Ok(Self { client })
    }

    /// Issues the person was assigned to at any point inside the window.
    pub fn build_jql(assignee: &str, window: &MonthWindow) -> String {
        format!(
            r#"assignee was in ({assignee}) during ("{}", "{}")"#,
            window.start().format(JQL_DATE_FORMAT),
            window.end().format(JQL_DATE_FORMAT)
        )
    }
}

impl IssueFetcher for JiraProvider {
    async fn search_issues(&self, assignee: &str, window: &MonthWindow) -> Vec<Issue> {
        let jql = Self::build_jql(assignee, window);
        debug!(
            "Querying issues for {assignee} ({} to {}, next month starts {}): {jql}",
            window.start().format("%Y-%m-%d %H:%M"),
            window.end().format("%Y-%m-%d %H:%M"),
            window.next_month_first_day()
        );

        match self.client.search(&jql).await {
            Ok(issues) => issues.into_iter().map(Issue::from).collect(),
            Err(e) => {
                warn!(
                    "Failed to fetch issues for {assignee} in {}-{}: {e}",
                    window.month_name(),
                    window.year()
                );
                Vec::new()
            }
        }
    }
}
