//! Merge requests, their notes, diffs and review discussions.

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
    MAX_ASSIGNEES, MAX_BRANCH_LENGTH, MAX_DESCRIPTION_LENGTH, MAX_LABELS_LENGTH, MAX_TITLE_LENGTH,
    Validate, check_length, check_max_items, check_not_blank, check_optional_length,
};

fn default_order_by() -> String {
    "created_at".to_string()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum MergeRequestState {
    #[default]
    Opened,
    Closed,
    Merged,
    All,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ListMergeRequestsParams {
    /// Project ID or path.
    #[serde(skip_serializing)]
    pub project_id: String,
    /// Filter by state.
    #[serde(default)]
    pub state: MergeRequestState,
    /// Order by field (created_at, updated_at).
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
    /// Page number.
    #[serde(default = "default_page")]
    pub page: u32,
    /// Results per page, max 100.
    #[serde(default = "default_per_page", serialize_with = "clamp_per_page")]
    pub per_page: u32,
}

impl Validate for ListMergeRequestsParams {}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct MergeRequestParams {
    /// Project ID or path.
    pub project_id: String,
    /// Merge request internal ID (the number shown in the UI).
    pub merge_request_iid: u64,
}

impl Validate for MergeRequestParams {}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct CreateMergeRequestParams {
    /// Project ID or path.
    #[serde(skip_serializing)]
    pub project_id: String,
    /// Source branch name.
    pub source_branch: String,
    /// Target branch name.
    pub target_branch: String,
    /// Merge request title.
    pub title: String,
    /// Description (Markdown).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Comma-separated label names.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<String>,
    /// User IDs to assign.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee_ids: Option<Vec<u64>>,
    /// User IDs to request review from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviewer_ids: Option<Vec<u64>>,
    /// Milestone ID.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub milestone_id: Option<u64>,
    /// Remove the source branch after merge.
    #[serde(default, skip_serializing_if = "is_false")]
    pub remove_source_branch: bool,
}

impl Validate for CreateMergeRequestParams {
    fn validate(&self) -> Result<(), GitLabError> {
        check_length("source_branch", &self.source_branch, 1, MAX_BRANCH_LENGTH)?;
        check_length("target_branch", &self.target_branch, 1, MAX_BRANCH_LENGTH)?;
        check_length("title", &self.title, 1, MAX_TITLE_LENGTH)?;
        check_optional_length("description", self.description.as_deref(), 0, MAX_DESCRIPTION_LENGTH)?;
        check_optional_length("labels", self.labels.as_deref(), 0, MAX_LABELS_LENGTH)?;
        check_max_items("assignee_ids", self.assignee_ids.as_deref(), MAX_ASSIGNEES)?;
        check_max_items("reviewer_ids", self.reviewer_ids.as_deref(), MAX_ASSIGNEES)
    }
}

/// Only fields that are present are sent.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct UpdateMergeRequestParams {
    /// Project ID or path.
    #[serde(skip_serializing)]
    pub project_id: String,
    /// Merge request internal ID.
    #[serde(skip_serializing)]
    pub merge_request_iid: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Description (Markdown).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Comma-separated label names.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<String>,
    /// State transition.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_event: Option<StateEvent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee_ids: Option<Vec<u64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviewer_ids: Option<Vec<u64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub milestone_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_branch: Option<String>,
    /// Remove the source branch after merge.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remove_source_branch: Option<bool>,
}

impl Validate for UpdateMergeRequestParams {
    fn validate(&self) -> Result<(), GitLabError> {
        check_optional_length("title", self.title.as_deref(), 1, MAX_TITLE_LENGTH)?;
        check_optional_length("description", self.description.as_deref(), 0, MAX_DESCRIPTION_LENGTH)?;
        check_optional_length("labels", self.labels.as_deref(), 0, MAX_LABELS_LENGTH)?;
        check_max_items("assignee_ids", self.assignee_ids.as_deref(), MAX_ASSIGNEES)?;
        check_max_items("reviewer_ids", self.reviewer_ids.as_deref(), MAX_ASSIGNEES)?;
        check_optional_length("target_branch", self.target_branch.as_deref(), 1, MAX_BRANCH_LENGTH)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ListNotesParams {
    /// Project ID or path.
    #[serde(skip_serializing)]
    pub project_id: String,
    /// Merge request internal ID.
    #[serde(skip_serializing)]
    pub merge_request_iid: u64,
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

impl Validate for ListNotesParams {}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ListDiscussionsParams {
    /// Project ID or path.
    #[serde(skip_serializing)]
    pub project_id: String,
    /// Merge request internal ID.
    #[serde(skip_serializing)]
    pub merge_request_iid: u64,
    /// Page number.
    #[serde(default = "default_page")]
    pub page: u32,
    /// Results per page, max 100.
    #[serde(default = "default_per_page", serialize_with = "clamp_per_page")]
    pub per_page: u32,
}

impl Validate for ListDiscussionsParams {}

/// A comment body posted as a note or a new discussion.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct CommentParams {
    /// Project ID or path.
    #[serde(skip_serializing)]
    pub project_id: String,
    /// Merge request internal ID.
    #[serde(skip_serializing)]
    pub merge_request_iid: u64,
    /// Content (Markdown).
    pub body: String,
}

impl Validate for CommentParams {
    fn validate(&self) -> Result<(), GitLabError> {
        check_not_blank("body", &self.body)
    }
}

fn mr_path(project_id: &str, iid: u64) -> Result<String, GitLabError> {
    let id = encode_project_id(project_id)?;
    Ok(format!("/projects/{id}/merge_requests/{iid}"))
}

pub async fn list_merge_requests(
    client: &GitLabClient,
    params: ListMergeRequestsParams,
) -> Result<GitLabResponse, GitLabError> {
    let id = encode_project_id(&params.project_id)?;
    client
        .get_with_query(&format!("/projects/{id}/merge_requests"), &params)
        .await
}

pub async fn get_merge_request(
    client: &GitLabClient,
    params: MergeRequestParams,
) -> Result<GitLabResponse, GitLabError> {
    let path = mr_path(&params.project_id, params.merge_request_iid)?;
    client.get(&path).await
}

pub async fn create_merge_request(
    client: &GitLabClient,
    params: CreateMergeRequestParams,
) -> Result<GitLabResponse, GitLabError> {
    let id = encode_project_id(&params.project_id)?;
    client
        .post(&format!("/projects/{id}/merge_requests"), &params)
        .await
}

pub async fn update_merge_request(
    client: &GitLabClient,
    params: UpdateMergeRequestParams,
) -> Result<GitLabResponse, GitLabError> {
    let path = mr_path(&params.project_id, params.merge_request_iid)?;
    client.put(&path, &params).await
}

pub async fn list_mr_notes(
    client: &GitLabClient,
    params: ListNotesParams,
) -> Result<GitLabResponse, GitLabError> {
    let path = mr_path(&params.project_id, params.merge_request_iid)?;
    client.get_with_query(&format!("{path}/notes"), &params).await
}

pub async fn create_mr_note(
    client: &GitLabClient,
    params: CommentParams,
) -> Result<GitLabResponse, GitLabError> {
    let path = mr_path(&params.project_id, params.merge_request_iid)?;
    client.post(&format!("{path}/notes"), &params).await
}

pub async fn get_mr_changes(
    client: &GitLabClient,
    params: MergeRequestParams,
) -> Result<GitLabResponse, GitLabError> {
    let path = mr_path(&params.project_id, params.merge_request_iid)?;
    client.get(&format!("{path}/changes")).await
}

pub async fn list_mr_discussions(
    client: &GitLabClient,
    params: ListDiscussionsParams,
) -> Result<GitLabResponse, GitLabError> {
    let path = mr_path(&params.project_id, params.merge_request_iid)?;
    client
        .get_with_query(&format!("{path}/discussions"), &params)
        .await
}

pub async fn create_mr_discussion(
    client: &GitLabClient,
    params: CommentParams,
) -> Result<GitLabResponse, GitLabError> {
    let path = mr_path(&params.project_id, params.merge_request_iid)?;
    client.post(&format!("{path}/discussions"), &params).await
}

pub(crate) fn tools(client: &Arc<GitLabClient>) -> Vec<Arc<dyn ToolImplementation>> {
    vec![
        gitlab_tool!(client, "list_merge_requests", ReadOnly,
            "List merge requests for a project.", list_merge_requests),
        gitlab_tool!(client, "get_merge_request", ReadOnly,
            "Get a single merge request.", get_merge_request),
        gitlab_tool!(client, "create_merge_request", Write,
            "Create a new merge request.", create_merge_request),
        gitlab_tool!(client, "update_merge_request", Write,
            "Update an existing merge request.", update_merge_request),
        gitlab_tool!(client, "list_mr_notes", ReadOnly,
            "List notes (comments) on a merge request.", list_mr_notes),
        gitlab_tool!(client, "create_mr_note", Write,
            "Create a note (comment) on a merge request.", create_mr_note),
        gitlab_tool!(client, "get_mr_changes", ReadOnly,
            "Get the changes (diff) for a merge request.", get_mr_changes),
        gitlab_tool!(client, "list_mr_discussions", ReadOnly,
            "List discussions (threaded comments, including inline review comments) on a merge request.",
            list_mr_discussions),
        gitlab_tool!(client, "create_mr_discussion", Write,
            "Create a new discussion on a merge request.", create_mr_discussion),
    ]
}
