//! Project labels.

use std::sync::Arc;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tanuki_client::{GitLabClient, GitLabError, GitLabResponse, encode_project_id};

use crate::ToolImplementation;
use crate::params::{clamp_per_page, default_page, default_per_page, is_blank};
use crate::tool::gitlab_tool;
use crate::validation::{Validate, check_not_blank};

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ListLabelsParams {
    /// Project ID or path.
    #[serde(skip_serializing)]
    pub project_id: String,
    /// Filter labels by keyword.
    #[serde(default, skip_serializing_if = "is_blank")]
    pub search: Option<String>,
    /// Page number.
    #[serde(default = "default_page")]
    pub page: u32,
    /// Results per page, max 100.
    #[serde(default = "default_per_page", serialize_with = "clamp_per_page")]
    pub per_page: u32,
}

impl Validate for ListLabelsParams {}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct CreateLabelParams {
    /// Project ID or path.
    #[serde(skip_serializing)]
    pub project_id: String,
    pub name: String,
    /// Hex code such as "#FF0000" or a named CSS color.
    pub color: String,
    #[serde(default, skip_serializing_if = "is_blank")]
    pub description: Option<String>,
    /// Lower values sort first.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<u32>,
}

impl Validate for CreateLabelParams {
    fn validate(&self) -> Result<(), GitLabError> {
        check_not_blank("name", &self.name)?;
        check_not_blank("color", &self.color)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct UpdateLabelParams {
    /// Project ID or path.
    #[serde(skip_serializing)]
    pub project_id: String,
    #[serde(skip_serializing)]
    pub label_id: u64,
    #[serde(default, skip_serializing_if = "is_blank")]
    pub new_name: Option<String>,
    #[serde(default, skip_serializing_if = "is_blank")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<u32>,
}

impl Validate for UpdateLabelParams {}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct LabelParams {
    /// Project ID or path.
    pub project_id: String,
    pub label_id: u64,
}

impl Validate for LabelParams {}

pub async fn list_labels(
    client: &GitLabClient,
    params: ListLabelsParams,
) -> Result<GitLabResponse, GitLabError> {
    let id = encode_project_id(&params.project_id)?;
    client
        .get_with_query(&format!("/projects/{id}/labels"), &params)
        .await
}

pub async fn create_label(
    client: &GitLabClient,
    params: CreateLabelParams,
) -> Result<GitLabResponse, GitLabError> {
    let id = encode_project_id(&params.project_id)?;
    client.post(&format!("/projects/{id}/labels"), &params).await
}

pub async fn update_label(
    client: &GitLabClient,
    params: UpdateLabelParams,
) -> Result<GitLabResponse, GitLabError> {
    let id = encode_project_id(&params.project_id)?;
    client
        .put(&format!("/projects/{id}/labels/{}", params.label_id), &params)
        .await
}

pub async fn delete_label(
    client: &GitLabClient,
    params: LabelParams,
) -> Result<GitLabResponse, GitLabError> {
    let id = encode_project_id(&params.project_id)?;
    client
        .delete(&format!("/projects/{id}/labels/{}", params.label_id))
        .await
}

pub(crate) fn tools(client: &Arc<GitLabClient>) -> Vec<Arc<dyn ToolImplementation>> {
    vec![
        gitlab_tool!(client, "list_labels", ReadOnly,
            "List labels for a project.", list_labels),
        gitlab_tool!(client, "create_label", Write,
            "Create a new label in a project.", create_label),
        gitlab_tool!(client, "update_label", Write,
            "Update an existing label.", update_label),
        gitlab_tool!(client, "delete_label", Destructive,
            "Delete a label from a project.", delete_label),
    ]
}
