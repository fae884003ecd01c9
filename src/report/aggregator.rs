use futures::{stream, StreamExt};
use log::{info, warn};

use super::{AssigneeIssueGroup, MonthlyAggregate, Report, SpreadsheetRenderer};
use crate::error::Result;
use crate::providers::IssueFetcher;
use crate::window::MonthWindow;

const CONCURRENCY: usize = 10;

pub struct ReportAggregator<'a, F> {
    fetcher: &'a F,
    assignees: &'a [String],
}

impl<'a, F: IssueFetcher> ReportAggregator<'a, F> {
    pub fn new(fetcher: &'a F, assignees: &'a [String]) -> Self {
        Self { fetcher, assignees }
    }

    /// Queries every assignee for one window and waits for all of them.
    ///
    /// Groups come back in assignee order regardless of which fetch
    /// finished first; empty ones are dropped.
    pub async fn aggregate(&self, window: MonthWindow) -> MonthlyAggregate {
        let groups: Vec<AssigneeIssueGroup> = stream::iter(self.assignees)
            .map(|assignee| async move {
                let issues = self.fetcher.search_issues(assignee, &window).await;
                AssigneeIssueGroup {
                    assignee: assignee.clone(),
                    issues,
                }
            })
            .buffered(CONCURRENCY)
            .collect()
            .await;

        MonthlyAggregate::new(window, groups)
    }

    /// Walks the windows oldest first, rendering each non-empty month
    /// before the next window's queries start.
    pub async fn build_report(
        &self,
        windows: &[MonthWindow],
        renderer: &SpreadsheetRenderer,
    ) -> Result<Report> {
        let mut report = Report::new();

        for (index, window) in windows.iter().enumerate() {
            let sheet_name = SpreadsheetRenderer::sheet_name(window);
            info!(
                "Fetching {sheet_name} ({}/{}) for {} assignees...",
                index + 1,
                windows.len(),
                self.assignees.len()
            );

            let aggregate = self.aggregate(*window).await;
            if aggregate.is_empty() {
                warn!("No issues found for {sheet_name}, skipping sheet");
                continue;
            }

            info!(
                "{sheet_name}: {} issues across {} assignees",
                aggregate.issue_count(),
                aggregate.groups().len()
            );
            renderer.render(&mut report, &aggregate)?;
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::time::Duration;

    use chrono::NaiveDate;

    use super::*;
    use crate::providers::Issue;
    use crate::report::test_support::{issue, window, workbook_part};
    use crate::report::RenderOptions;

    #[derive(Debug, Clone, PartialEq)]
    enum Event {
        Started(String, NaiveDate),
        Finished(String, NaiveDate),
    }

    /// Canned results keyed by assignee and window start; anything missing is empty.
    #[derive(Default)]
    struct FakeFetcher {
        results: HashMap<(String, NaiveDate), Vec<Issue>>,
        delays_ms: HashMap<String, u64>,
        events: RefCell<Vec<Event>>,
    }

    impl FakeFetcher {
        fn with_issues(
            mut self,
            assignee: &str,
            window: &MonthWindow,
            issues: Vec<Issue>,
        ) -> Self {
            self.results
                .insert((assignee.to_owned(), window.start().date()), issues);
            self
        }

        fn with_delay(mut self, assignee: &str, delay_ms: u64) -> Self {
            self.delays_ms.insert(assignee.to_owned(), delay_ms);
            self
        }
    }

    impl IssueFetcher for FakeFetcher {
        async fn search_issues(&self, assignee: &str, window: &MonthWindow) -> Vec<Issue> {
            let month = window.start().date();
            self.events
                .borrow_mut()
                .push(Event::Started(assignee.to_owned(), month));

            if let Some(delay) = self.delays_ms.get(assignee) {
                tokio::time::sleep(Duration::from_millis(*delay)).await;
            }

            self.events
                .borrow_mut()
                .push(Event::Finished(assignee.to_owned(), month));
            self.results
                .get(&(assignee.to_owned(), month))
                .cloned()
                .unwrap_or_default()
        }
    }

    fn assignees(names: &[&str]) -> Vec<String> {
        names.iter().map(|name| (*name).to_owned()).collect()
    }

    fn renderer() -> SpreadsheetRenderer {
        SpreadsheetRenderer::new(RenderOptions::new("Platform".to_owned(), "%Y-%m-%d").unwrap())
    }

    #[tokio::test]
    async fn test_aggregate_drops_assignees_without_issues() {
        let march = window(2024, 3);
        let fetcher = FakeFetcher::default().with_issues(
            "alice",
            &march,
            vec![
                issue("CORE-1", "Done", Some("Done")),
                issue("CORE-2", "Done", Some("Done")),
            ],
        );
        let team = assignees(&["alice", "bob"]);

        let aggregate = ReportAggregator::new(&fetcher, &team).aggregate(march).await;

        assert_eq!(aggregate.groups().len(), 1);
        assert_eq!(aggregate.groups()[0].assignee, "alice");
        assert_eq!(aggregate.issue_count(), 2);
    }

    #[tokio::test]
    async fn test_aggregate_keeps_assignee_order_not_completion_order() {
        let march = window(2024, 3);
        let fetcher = FakeFetcher::default()
            .with_issues("alice", &march, vec![issue("CORE-1", "Done", None)])
            .with_issues("bob", &march, vec![issue("CORE-2", "Done", None)])
            .with_issues("carol", &march, vec![issue("CORE-3", "Done", None)])
            .with_delay("alice", 30)
            .with_delay("bob", 10);
        let team = assignees(&["alice", "bob", "carol"]);

        let aggregate = ReportAggregator::new(&fetcher, &team).aggregate(march).await;

        let order: Vec<_> = aggregate
            .groups()
            .iter()
            .map(|group| group.assignee.as_str())
            .collect();
        assert_eq!(order, vec!["alice", "bob", "carol"]);

        let finished: Vec<_> = fetcher
            .events
            .borrow()
            .iter()
            .filter_map(|event| match event {
                Event::Finished(assignee, _) => Some(assignee.clone()),
                Event::Started(..) => None,
            })
            .collect();
        assert_eq!(finished, vec!["carol", "bob", "alice"]);
    }

    #[tokio::test]
    async fn test_issue_order_within_group_is_preserved() {
        let march = window(2024, 3);
        let fetcher = FakeFetcher::default().with_issues(
            "alice",
            &march,
            vec![
                issue("CORE-9", "Done", None),
                issue("CORE-2", "Done", None),
                issue("CORE-5", "Done", None),
            ],
        );
        let team = assignees(&["alice"]);

        let aggregate = ReportAggregator::new(&fetcher, &team).aggregate(march).await;

        let keys: Vec<_> = aggregate.groups()[0]
            .issues
            .iter()
            .map(|issue| issue.key.as_str())
            .collect();
        assert_eq!(keys, vec!["CORE-9", "CORE-2", "CORE-5"]);
    }

    #[tokio::test]
    async fn test_single_month_report_has_one_sheet() {
        let march = window(2024, 3);
        let fetcher = FakeFetcher::default().with_issues(
            "alice",
            &march,
            vec![
                issue("CORE-1", "Done", Some("Done")),
                issue("CORE-2", "Done", Some("Done")),
            ],
        );
        let team = assignees(&["alice", "bob"]);
        let renderer = renderer();

        let mut report = ReportAggregator::new(&fetcher, &team)
            .build_report(&[march], &renderer)
            .await
            .unwrap();

        assert_eq!(report.sheet_names(), ["March-2024"]);
        let sheet = workbook_part(&mut report, "xl/worksheets/sheet1.xml");
        assert!(sheet.contains(r#"<autoFilter ref="A1:N3"/>"#));
        assert!(sheet.contains(r#"<row r="3""#));
        assert!(!sheet.contains(r#"<row r="4""#));
        let strings = workbook_part(&mut report, "xl/sharedStrings.xml");
        assert!(strings.contains("<t>alice</t>"));
        assert!(!strings.contains("<t>bob</t>"));
    }

    #[tokio::test]
    async fn test_only_months_with_issues_get_sheets() {
        let windows = [window(2024, 1), window(2024, 2), window(2024, 3)];
        let fetcher = FakeFetcher::default().with_issues(
            "bob",
            &windows[1],
            vec![issue("CORE-7", "Closed", Some("Won't Do"))],
        );
        let team = assignees(&["alice", "bob"]);

        let report = ReportAggregator::new(&fetcher, &team)
            .build_report(&windows, &renderer())
            .await
            .unwrap();

        assert_eq!(report.sheet_names(), ["February-2024"]);
    }

    #[tokio::test]
    async fn test_no_issues_anywhere_yields_empty_report() {
        let fetcher = FakeFetcher::default();
        let team = assignees(&["alice", "bob"]);

        let report = ReportAggregator::new(&fetcher, &team)
            .build_report(&[window(2024, 1), window(2024, 2)], &renderer())
            .await
            .unwrap();

        assert!(report.is_empty());
    }

    #[tokio::test]
    async fn test_windows_settle_one_at_a_time() {
        let windows = [window(2024, 1), window(2024, 2)];
        let fetcher = FakeFetcher::default()
            .with_delay("alice", 20)
            .with_delay("bob", 5);
        let team = assignees(&["alice", "bob"]);

        ReportAggregator::new(&fetcher, &team)
            .build_report(&windows, &renderer())
            .await
            .unwrap();

        let january = windows[0].start().date();
        let months: Vec<_> = fetcher
            .events
            .borrow()
            .iter()
            .map(|event| match event {
                Event::Started(_, month) | Event::Finished(_, month) => *month == january,
            })
            .collect();

        assert_eq!(months.len(), 8);
        assert!(months[..4].iter().all(|is_january| *is_january));
        assert!(months[4..].iter().all(|is_january| !*is_january));

        let events = fetcher.events.borrow();
        assert!(matches!(&events[0], Event::Started(name, _) if name == "alice"));
        assert!(matches!(&events[1], Event::Started(name, _) if name == "bob"));
    }
}
