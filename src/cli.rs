use anyhow::Result;
use chrono::Local;
use clap::{Parser, Subcommand};
use log::info;
use std::path::PathBuf;

use crate::auth::Token;
use crate::error::ReportError;
use crate::providers::jira::JiraProvider;
use crate::report::{RenderOptions, ReportAggregator, ReportWriter, SpreadsheetRenderer};
use crate::window::MonthRange;

#[derive(Parser)]
#[command(name = "team-report")]
#[command(author, version, about = "Monthly team activity workbook", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Directory the workbook is written to
    #[arg(short, long, global = true, default_value = ".")]
    output_dir: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the report from a Jira instance
    Jira {
        /// Jira instance URL
        #[arg(short, long, env = "JIRA_URL")]
        url: String,

        /// Jira personal access token
        #[arg(short, long, env = "JIRA_ACCESS_TOKEN", hide_env_values = true)]
        token: Option<String>,

        /// Comma-separated assignee identifiers
        #[arg(short, long, env = "JIRA_TEAM_MEMBERS", value_delimiter = ',', required = true)]
        members: Vec<String>,

        /// Project label written on every row
        #[arg(short = 'P', long, env = "JIRA_PROJECT_NAME", default_value = "")]
        project: String,

        /// Team label used in the output file name
        #[arg(long, env = "JIRA_TEAM_NAME", default_value = "Team")]
        team: String,

        /// First month to report (yyyy-MM or yyyy-MM-dd), defaults to the current month
        #[arg(short, long, env = "JIRA_START_MONTH")]
        start_month: Option<String>,

        /// Last month to report (yyyy-MM or yyyy-MM-dd), defaults to the current month
        #[arg(short, long, env = "JIRA_END_MONTH")]
        end_month: Option<String>,

        /// Date pattern for timestamp cells; " %H:%M" is appended
        #[arg(short, long, env = "EXCEL_DATE_FORMAT", default_value = "%Y-%m-%d")]
        date_format: String,
    },
}

fn normalize_members(members: &[String]) -> Vec<String> {
    members
        .iter()
        .map(|member| member.trim())
        .filter(|member| !member.is_empty())
        .map(str::to_owned)
        .collect()
}

impl Cli {
    pub async fn execute(&self) -> Result<()> {
        match &self.command {
            Commands::Jira {
                url,
                token,
                members,
                project,
                team,
                start_month,
                end_month,
                date_format,
            } => {
                let members = normalize_members(members);
                if members.is_empty() {
                    let message = "No team members configured".to_string();
                    return Err(ReportError::Config(message).into());
                }

                let range = MonthRange::from_args(
                    start_month.as_deref(),
                    end_month.as_deref(),
                    Local::now().date_naive(),
                )?;
                let options = RenderOptions::new(project.clone(), date_format)?;

                info!(
                    "Querying [{}] team members from {} to {}",
                    members.len(),
                    range.start.format("%Y-%m-%d"),
                    range.end.format("%Y-%m-%d")
                );

                let provider = JiraProvider::new(url, token.as_deref().map(Token::from))?;
                let renderer = SpreadsheetRenderer::new(options);
                let windows = range.windows();

                let report = ReportAggregator::new(&provider, &members)
                    .build_report(&windows, &renderer)
                    .await?;

                ReportWriter::new(self.output_dir.clone(), team.clone()).write(report, &range)?;

                Ok(())
            }
        }
    }
}
