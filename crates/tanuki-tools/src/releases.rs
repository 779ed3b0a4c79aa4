//! Project releases.

use std::sync::Arc;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tanuki_client::{
    GitLabClient, GitLabError, GitLabResponse, encode_path_segment, encode_project_id,
};

use crate::ToolImplementation;
use crate::params::{SortOrder, clamp_per_page, default_page, default_per_page, is_blank};
use crate::tool::gitlab_tool;
use crate::validation::{MAX_DESCRIPTION_LENGTH, Validate, check_not_blank, check_optional_length};

fn default_order_by() -> String {
    "released_at".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ListReleasesParams {
    /// Project ID or path.
    #[serde(skip_serializing)]
    pub project_id: String,
    /// Order by field (released_at, created_at).
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

impl Validate for ListReleasesParams {}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct GetReleaseParams {
    /// Project ID or path.
    pub project_id: String,
    /// Tag associated with the release.
    pub tag_name: String,
}

impl Validate for GetReleaseParams {
    fn validate(&self) -> Result<(), GitLabError> {
        check_not_blank("tag_name", &self.tag_name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct CreateReleaseParams {
    /// Project ID or path.
    #[serde(skip_serializing)]
    pub project_id: String,
    /// Tag for the release, created if it does not exist.
    pub tag_name: String,
    /// Release title (defaults to the tag name).
    #[serde(default, skip_serializing_if = "is_blank")]
    pub name: Option<String>,
    /// Release notes (Markdown).
    #[serde(default, skip_serializing_if = "is_blank")]
    pub description: Option<String>,
    /// Commit SHA or branch to tag from; required when the tag is new.
    #[serde(default, rename = "ref", skip_serializing_if = "is_blank")]
    pub git_ref: Option<String>,
    /// Release date (ISO 8601, default: now).
    #[serde(default, skip_serializing_if = "is_blank")]
    pub released_at: Option<String>,
}

impl Validate for CreateReleaseParams {
    fn validate(&self) -> Result<(), GitLabError> {
        check_not_blank("tag_name", &self.tag_name)?;
        check_optional_length("description", self.description.as_deref(), 0, MAX_DESCRIPTION_LENGTH)
    }
}

pub async fn list_releases(
    client: &GitLabClient,
    params: ListReleasesParams,
) -> Result<GitLabResponse, GitLabError> {
    let id = encode_project_id(&params.project_id)?;
    client
        .get_with_query(&format!("/projects/{id}/releases"), &params)
        .await
}

pub async fn get_release(
    client: &GitLabClient,
    params: GetReleaseParams,
) -> Result<GitLabResponse, GitLabError> {
    let id = encode_project_id(&params.project_id)?;
    let tag = encode_path_segment(&params.tag_name);
    client.get(&format!("/projects/{id}/releases/{tag}")).await
}

pub async fn create_release(
    client: &GitLabClient,
    params: CreateReleaseParams,
) -> Result<GitLabResponse, GitLabError> {
    let id = encode_project_id(&params.project_id)?;
    client.post(&format!("/projects/{id}/releases"), &params).await
}

pub(crate) fn tools(client: &Arc<GitLabClient>) -> Vec<Arc<dyn ToolImplementation>> {
    vec![
        gitlab_tool!(client, "list_releases", ReadOnly,
            "List releases for a project.", list_releases),
        gitlab_tool!(client, "get_release", ReadOnly,
            "Get a single release by tag name.", get_release),
        gitlab_tool!(client, "create_release", Write,
            "Create a new release.", create_release),
    ]
}
