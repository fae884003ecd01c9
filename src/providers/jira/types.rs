use chrono::{DateTime, FixedOffset};
use serde::Deserialize;

use crate::providers::Issue;

/// One page of `GET /rest/api/2/search`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponseDto {
    #[serde(default)]
    pub start_at: usize,
    #[serde(default)]
    pub total: usize,
    #[serde(default)]
    pub issues: Vec<IssueDto>,
}

#[derive(Debug, Deserialize)]
pub struct IssueDto {
    pub id: String,
    pub key: String,
    pub fields: IssueFieldsDto,
}

#[derive(Debug, Deserialize)]
pub struct IssueFieldsDto {
    pub summary: Option<String>,
    pub status: Option<NamedDto>,
    pub created: Option<String>,
    pub resolutiondate: Option<String>,
    pub resolution: Option<NamedDto>,
    pub issuetype: Option<NamedDto>,
    pub parent: Option<ParentDto>,
}

#[derive(Debug, Deserialize)]
pub struct NamedDto {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct ParentDto {
    pub id: String,
}

/// Jira timestamps look like `2024-03-05T10:15:30.000+0000`.
pub fn parse_timestamp(value: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f%z")
        .or_else(|_| DateTime::parse_from_rfc3339(value))
        .ok()
}

impl From<IssueDto> for Issue {
    fn from(dto: IssueDto) -> Self {
        let fields = dto.fields;

        Self {
            key: dto.key,
            id: dto.id,
            parent_id: fields.parent.map(|parent| parent.id),
            summary: fields.summary.unwrap_or_default(),
            status: fields.status.map(|status| status.name).unwrap_or_default(),
            created: fields.created.as_deref().and_then(parse_timestamp),
            resolved: fields.resolutiondate.as_deref().and_then(parse_timestamp),
            resolution: fields.resolution.map(|resolution| resolution.name),
            issue_type: fields
                .issuetype
                .map(|issue_type| issue_type.name)
                .unwrap_or_default(),
        }
    }
}
