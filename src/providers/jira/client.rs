use log::debug;
use reqwest::Client;
use url::Url;

use super::types::{IssueDto, SearchResponseDto};
use crate::auth::Token;
use crate::error::{ReportError, Result};

const PAGE_SIZE: usize = 100;
const SEARCH_FIELDS: &str = "summary,status,created,resolutiondate,resolution,issuetype,parent";

pub struct JiraClient {
    client: Client,
    api_url: Url,
    token: Option<Token>,
}

impl JiraClient {
    pub fn new(base_url: &str, token: Option<Token>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("team-report/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ReportError::Config(format!("Failed to create HTTP client: {e}")))?;

        // Keep any context path such as `/jira` when joining.
        let base_url = format!("{}/", base_url.trim_end_matches('/'));
        let api_url = Url::parse(&base_url)
            .map_err(|e| ReportError::Config(format!("Invalid base URL: {e}")))?
            .join("rest/api/2/")
            .map_err(|e| ReportError::Config(format!("Invalid API base URL: {e}")))?;

        Ok(Self {
            client,
            api_url,
            token: token.filter(|token| !token.is_empty()),
        })
    }

    fn auth_request(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        if let Some(token) = &self.token {
            request.bearer_auth(token.as_str())
        } else {
            request
        }
    }

    fn search_url(&self) -> Result<Url> {
        self.api_url
            .join("search")
            .map_err(|e| ReportError::Config(format!("Invalid search URL: {e}")))
    }

    /// Runs a JQL search and follows pagination until every match is collected.
    pub async fn search(&self, jql: &str) -> Result<Vec<IssueDto>> {
        let url = self.search_url()?;
        let mut all_issues = Vec::new();
        let mut start_at = 0;

        loop {
            let request = self
                .client
                .get(url.clone())
                .query(&[("jql", jql), ("fields", SEARCH_FIELDS)])
                .query(&[("startAt", start_at), ("maxResults", PAGE_SIZE)]);
            let response = self.auth_request(request).send().await?;

            if !response.status().is_success() {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                return Err(ReportError::Api(format!(
                    "Issue search failed: {status} - {body}"
                )));
            }

            let page = response.json::<SearchResponseDto>().await?;
            let fetched = page.issues.len();
            all_issues.extend(page.issues);

            debug!(
                "Search page at {start_at}: fetched {fetched} issues (total: {}/{})",
                all_issues.len(),
                page.total
            );

            start_at += fetched;
            if fetched == 0 || start_at >= page.total {
                break;
            }
        }

        Ok(all_issues)
    }
}
