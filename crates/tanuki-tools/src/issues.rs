//! Issues and issue notes.

use std::sync::Arc;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tanuki_client::{GitLabClient, GitLabError, GitLabResponse, encode_project_id};

use crate::ToolImplementation;
use crate::params::{
    SortOrder, StateEvent, clamp_per_page, default_page, default_per_page, is_blank, is_false,
};
use crate::tool::gitlab_tool;
use crate::validation::{
    MAX_ASSIGNEES, MAX_DESCRIPTION_LENGTH, MAX_LABELS_LENGTH, MAX_TITLE_LENGTH, Validate,
    check_length, check_max_items, check_not_blank, check_optional_length,
};

fn default_order_by() -> String {
    "created_at".to_string()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum IssueState {
    #[default]
    Opened,
    Closed,
    All,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ListIssuesParams {
    /// Project ID or path.
    #[serde(skip_serializing)]
    pub project_id: String,
    /// Filter by state.
    #[serde(default)]
    pub state: IssueState,
    /// Order by field (created_at, updated_at, priority, due_date).
    #[serde(default = "default_order_by")]
    pub order_by: String,
    /// Sort direction.
    #[serde(default)]
    pub sort: SortOrder,
    /// Comma-separated label names.
    #[serde(default, skip_serializing_if = "is_blank")]
    pub labels: Option<String>,
    /// Milestone title.
    #[serde(default, skip_serializing_if = "is_blank")]
    pub milestone: Option<String>,
    /// Search in title and description.
    #[serde(default, skip_serializing_if = "is_blank")]
    pub search: Option<String>,
    /// Filter by assignee user ID.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee_id: Option<u64>,
    /// Page number.
    #[serde(default = "default_page")]
    pub page: u32,
    /// Results per page, max 100.
    #[serde(default = "default_per_page", serialize_with = "clamp_per_page")]
    pub per_page: u32,
}

impl Validate for ListIssuesParams {}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct IssueParams {
    /// Project ID or path.
    pub project_id: String,
    /// Issue internal ID (the number shown in the UI).
    pub issue_iid: u64,
}

impl Validate for IssueParams {}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct CreateIssueParams {
    /// Project ID or path.
    #[serde(skip_serializing)]
    pub project_id: String,
    /// Issue title.
    pub title: String,
    /// Issue description (Markdown).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Comma-separated label names.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<String>,
    /// User IDs to assign.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee_ids: Option<Vec<u64>>,
    /// Milestone ID.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub milestone_id: Option<u64>,
    /// Whether the issue is confidential.
    #[serde(default, skip_serializing_if = "is_false")]
    pub confidential: bool,
}

impl Validate for CreateIssueParams {
    fn validate(&self) -> Result<(), GitLabError> {
        check_length("title", &self.title, 1, MAX_TITLE_LENGTH)?;
        check_optional_length("description", self.description.as_deref(), 0, MAX_DESCRIPTION_LENGTH)?;
        check_optional_length("labels", self.labels.as_deref(), 0, MAX_LABELS_LENGTH)?;
        check_max_items("assignee_ids", self.assignee_ids.as_deref(), MAX_ASSIGNEES)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct UpdateIssueParams {
    /// Project ID or path.
    #[serde(skip_serializing)]
    pub project_id: String,
    /// Issue internal ID.
    #[serde(skip_serializing)]
    pub issue_iid: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<String>,
    /// State transition.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_event: Option<StateEvent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee_ids: Option<Vec<u64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub milestone_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidential: Option<bool>,
}

impl Validate for UpdateIssueParams {
    fn validate(&self) -> Result<(), GitLabError> {
        check_optional_length("title", self.title.as_deref(), 1, MAX_TITLE_LENGTH)?;
        check_optional_length("description", self.description.as_deref(), 0, MAX_DESCRIPTION_LENGTH)?;
        check_optional_length("labels", self.labels.as_deref(), 0, MAX_LABELS_LENGTH)?;
        check_max_items("assignee_ids", self.assignee_ids.as_deref(), MAX_ASSIGNEES)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ListIssueNotesParams {
    /// Project ID or path.
    #[serde(skip_serializing)]
    pub project_id: String,
    /// Issue internal ID.
    #[serde(skip_serializing)]
    pub issue_iid: u64,
    /// Order by field (created_at, updated_at).
    #[serde(default = "default_order_by")]
    pub order_by: String,
    /// Sort direction.
    #[serde(default)]
    pub sort: SortOrder,
    /// Page number.
    #[serde(default = "default_page")]
    pub page: u32,
    /// Results per page, max 100.
    #[serde(default = "default_per_page", serialize_with = "clamp_per_page")]
    pub per_page: u32,
}

impl Validate for ListIssueNotesParams {}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct IssueNoteParams {
    /// Project ID or path.
    #[serde(skip_serializing)]
    pub project_id: String,
    /// Issue internal ID.
    #[serde(skip_serializing)]
    pub issue_iid: u64,
    /// Note content (Markdown).
    pub body: String,
}

impl Validate for IssueNoteParams {
    fn validate(&self) -> Result<(), GitLabError> {
        check_not_blank("body", &self.body)
    }
}

fn issue_path(project_id: &str, iid: u64) -> Result<String, GitLabError> {
    let id = encode_project_id(project_id)?;
    Ok(format!("/projects/{id}/issues/{iid}"))
}

pub async fn list_issues(
    client: &GitLabClient,
    params: ListIssuesParams,
) -> Result<GitLabResponse, GitLabError> {
    let id = encode_project_id(&params.project_id)?;
    client
        .get_with_query(&format!("/projects/{id}/issues"), &params)
        .await
}

pub async fn get_issue(
    client: &GitLabClient,
    params: IssueParams,
) -> Result<GitLabResponse, GitLabError> {
    client.get(&issue_path(&params.project_id, params.issue_iid)?).await
}

pub async fn create_issue(
    client: &GitLabClient,
    params: CreateIssueParams,
) -> Result<GitLabResponse, GitLabError> {
    let id = encode_project_id(&params.project_id)?;
    client.post(&format!("/projects/{id}/issues"), &params).await
}

pub async fn update_issue(
    client: &GitLabClient,
    params: UpdateIssueParams,
) -> Result<GitLabResponse, GitLabError> {
    let path = issue_path(&params.project_id, params.issue_iid)?;
    client.put(&path, &params).await
}

pub async fn list_issue_notes(
    client: &GitLabClient,
    params: ListIssueNotesParams,
) -> Result<GitLabResponse, GitLabError> {
    let path = issue_path(&params.project_id, params.issue_iid)?;
    client.get_with_query(&format!("{path}/notes"), &params).await
}

pub async fn create_issue_note(
    client: &GitLabClient,
    params: IssueNoteParams,
) -> Result<GitLabResponse, GitLabError> {
    let path = issue_path(&params.project_id, params.issue_iid)?;
    client.post(&format!("{path}/notes"), &params).await
}

pub(crate) fn tools(client: &Arc<GitLabClient>) -> Vec<Arc<dyn ToolImplementation>> {
    vec![
        gitlab_tool!(client, "list_issues", ReadOnly,
            "List issues for a project.", list_issues),
        gitlab_tool!(client, "get_issue", ReadOnly,
            "Get a single issue.", get_issue),
        gitlab_tool!(client, "create_issue", Write,
            "Create a new issue.", create_issue),
        gitlab_tool!(client, "update_issue", Write,
            "Update an existing issue.", update_issue),
        gitlab_tool!(client, "list_issue_notes", ReadOnly,
            "List notes (comments) on an issue.", list_issue_notes),
        gitlab_tool!(client, "create_issue_note", Write,
            "Create a note (comment) on an issue.", create_issue_note),
    ]
}
