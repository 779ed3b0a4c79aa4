//! Project milestones.

use std::sync::Arc;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tanuki_client::{GitLabClient, GitLabError, GitLabResponse, encode_project_id};

use crate::ToolImplementation;
use crate::params::{clamp_per_page, default_page, default_per_page, is_blank};
use crate::tool::gitlab_tool;
use crate::validation::{
    MAX_DESCRIPTION_LENGTH, MAX_TITLE_LENGTH, Validate, check_length, check_optional_length,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum MilestoneState {
    #[default]
    Active,
    Closed,
    All,
}

/// Milestones close and activate rather than close and reopen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum MilestoneStateEvent {
    Close,
    Activate,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ListMilestonesParams {
    /// Project ID or path.
    #[serde(skip_serializing)]
    pub project_id: String,
    /// Filter by state.
    #[serde(default)]
    pub state: MilestoneState,
    /// Filter by title.
    #[serde(default, skip_serializing_if = "is_blank")]
    pub search: Option<String>,
    /// Page number.
    #[serde(default = "default_page")]
    pub page: u32,
    /// Results per page, max 100.
    #[serde(default = "default_per_page", serialize_with = "clamp_per_page")]
    pub per_page: u32,
}

impl Validate for ListMilestonesParams {}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct CreateMilestoneParams {
    /// Project ID or path.
    #[serde(skip_serializing)]
    pub project_id: String,
    pub title: String,
    /// Description (Markdown).
    #[serde(default, skip_serializing_if = "is_blank")]
    pub description: Option<String>,
    /// Due date (YYYY-MM-DD).
    #[serde(default, skip_serializing_if = "is_blank")]
    pub due_date: Option<String>,
    /// Start date (YYYY-MM-DD).
    #[serde(default, skip_serializing_if = "is_blank")]
    pub start_date: Option<String>,
}

impl Validate for CreateMilestoneParams {
    fn validate(&self) -> Result<(), GitLabError> {
        check_length("title", &self.title, 1, MAX_TITLE_LENGTH)?;
        check_optional_length("description", self.description.as_deref(), 0, MAX_DESCRIPTION_LENGTH)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct UpdateMilestoneParams {
    /// Project ID or path.
    #[serde(skip_serializing)]
    pub project_id: String,
    #[serde(skip_serializing)]
    pub milestone_id: u64,
    #[serde(default, skip_serializing_if = "is_blank")]
    pub title: Option<String>,
    /// Description (Markdown); an empty string clears it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "is_blank")]
    pub due_date: Option<String>,
    #[serde(default, skip_serializing_if = "is_blank")]
    pub start_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_event: Option<MilestoneStateEvent>,
}

impl Validate for UpdateMilestoneParams {
    fn validate(&self) -> Result<(), GitLabError> {
        check_optional_length("title", self.title.as_deref(), 0, MAX_TITLE_LENGTH)?;
        check_optional_length("description", self.description.as_deref(), 0, MAX_DESCRIPTION_LENGTH)
    }
}

pub async fn list_milestones(
    client: &GitLabClient,
    params: ListMilestonesParams,
) -> Result<GitLabResponse, GitLabError> {
    let id = encode_project_id(&params.project_id)?;
    client
        .get_with_query(&format!("/projects/{id}/milestones"), &params)
        .await
}

pub async fn create_milestone(
    client: &GitLabClient,
    params: CreateMilestoneParams,
) -> Result<GitLabResponse, GitLabError> {
    let id = encode_project_id(&params.project_id)?;
    client
        .post(&format!("/projects/{id}/milestones"), &params)
        .await
}

pub async fn update_milestone(
    client: &GitLabClient,
    params: UpdateMilestoneParams,
) -> Result<GitLabResponse, GitLabError> {
    let id = encode_project_id(&params.project_id)?;
    client
        .put(
            &format!("/projects/{id}/milestones/{}", params.milestone_id),
            &params,
        )
        .await
}

pub(crate) fn tools(client: &Arc<GitLabClient>) -> Vec<Arc<dyn ToolImplementation>> {
    vec![
        gitlab_tool!(client, "list_milestones", ReadOnly,
            "List milestones for a project.", list_milestones),
        gitlab_tool!(client, "create_milestone", Write,
            "Create a new milestone.", create_milestone),
        gitlab_tool!(client, "update_milestone", Write,
            "Update an existing milestone.", update_milestone),
    ]
}
