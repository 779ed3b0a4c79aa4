//! Projects, their branches and commit history.

use std::sync::Arc;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tanuki_client::{
    GitLabClient, GitLabError, GitLabResponse, encode_path_segment, encode_project_id,
};

use crate::ToolImplementation;
use crate::params::{
    SortOrder, Visibility, clamp_per_page, default_page, default_per_page, is_blank, is_false,
};
use crate::tool::gitlab_tool;
use crate::validation::{
    MAX_DESCRIPTION_LENGTH, MAX_PROJECT_NAME_LENGTH, Validate, check_length, check_optional_length,
};

fn default_order_by() -> String {
    "created_at".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ListProjectsParams {
    /// Search for projects by name.
    #[serde(default, skip_serializing_if = "is_blank")]
    pub search: Option<String>,
    /// Only projects owned by the authenticated user.
    #[serde(default, skip_serializing_if = "is_false")]
    pub owned: bool,
    /// Only projects the user is a member of.
    #[serde(default, skip_serializing_if = "is_false")]
    pub membership: bool,
    /// Filter by visibility.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<Visibility>,
    /// Order by field (created_at, updated_at, name, path).
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

impl Validate for ListProjectsParams {}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ProjectParams {
    /// Project ID or path (e.g. "group/project").
    pub project_id: String,
}

impl Validate for ProjectParams {}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ListBranchesParams {
    /// Project ID or path.
    #[serde(skip_serializing)]
    pub project_id: String,
    /// Filter branches by name.
    #[serde(default, skip_serializing_if = "is_blank")]
    pub search: Option<String>,
    /// Page number.
    #[serde(default = "default_page")]
    pub page: u32,
    /// Results per page, max 100.
    #[serde(default = "default_per_page", serialize_with = "clamp_per_page")]
    pub per_page: u32,
}

impl Validate for ListBranchesParams {}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct GetBranchParams {
    /// Project ID or path.
    pub project_id: String,
    /// Branch name.
    pub branch: String,
}

impl Validate for GetBranchParams {}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ListCommitsParams {
    /// Project ID or path.
    #[serde(skip_serializing)]
    pub project_id: String,
    /// Branch or tag name (default: the default branch).
    #[serde(default, skip_serializing_if = "is_blank")]
    pub ref_name: Option<String>,
    /// Only commits after this date (ISO 8601).
    #[serde(default, skip_serializing_if = "is_blank")]
    pub since: Option<String>,
    /// Only commits before this date (ISO 8601).
    #[serde(default, skip_serializing_if = "is_blank")]
    pub until: Option<String>,
    /// Only commits touching this file path.
    #[serde(default, skip_serializing_if = "is_blank")]
    pub path: Option<String>,
    /// Page number.
    #[serde(default = "default_page")]
    pub page: u32,
    /// Results per page, max 100.
    #[serde(default = "default_per_page", serialize_with = "clamp_per_page")]
    pub per_page: u32,
}

impl Validate for ListCommitsParams {}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct CreateProjectParams {
    /// Project name.
    pub name: String,
    /// Project description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Visibility level.
    #[serde(default)]
    pub visibility: Visibility,
    /// Initialize with a README file.
    #[serde(default, skip_serializing_if = "is_false")]
    pub initialize_with_readme: bool,
    /// Namespace ID (group or user) to create the project under.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace_id: Option<u64>,
}

impl Validate for CreateProjectParams {
    fn validate(&self) -> Result<(), GitLabError> {
        check_length("name", &self.name, 1, MAX_PROJECT_NAME_LENGTH)?;
        check_optional_length(
            "description",
            self.description.as_deref(),
            0,
            MAX_DESCRIPTION_LENGTH,
        )
    }
}

pub async fn list_projects(
    client: &GitLabClient,
    params: ListProjectsParams,
) -> Result<GitLabResponse, GitLabError> {
    client.get_with_query("/projects", &params).await
}

pub async fn get_project(
    client: &GitLabClient,
    params: ProjectParams,
) -> Result<GitLabResponse, GitLabError> {
    let id = encode_project_id(&params.project_id)?;
    client.get(&format!("/projects/{id}")).await
}

pub async fn create_project(
    client: &GitLabClient,
    params: CreateProjectParams,
) -> Result<GitLabResponse, GitLabError> {
    client.post("/projects", &params).await
}

pub async fn delete_project(
    client: &GitLabClient,
    params: ProjectParams,
) -> Result<GitLabResponse, GitLabError> {
    let id = encode_project_id(&params.project_id)?;
    client.delete(&format!("/projects/{id}")).await
}

pub async fn list_project_branches(
    client: &GitLabClient,
    params: ListBranchesParams,
) -> Result<GitLabResponse, GitLabError> {
    let id = encode_project_id(&params.project_id)?;
    client
        .get_with_query(&format!("/projects/{id}/repository/branches"), &params)
        .await
}

pub async fn get_project_branch(
    client: &GitLabClient,
    params: GetBranchParams,
) -> Result<GitLabResponse, GitLabError> {
    let id = encode_project_id(&params.project_id)?;
    let branch = encode_path_segment(&params.branch);
    client
        .get(&format!("/projects/{id}/repository/branches/{branch}"))
        .await
}

pub async fn list_project_commits(
    client: &GitLabClient,
    params: ListCommitsParams,
) -> Result<GitLabResponse, GitLabError> {
    let id = encode_project_id(&params.project_id)?;
    client
        .get_with_query(&format!("/projects/{id}/repository/commits"), &params)
        .await
}

pub(crate) fn tools(client: &Arc<GitLabClient>) -> Vec<Arc<dyn ToolImplementation>> {
    vec![
        gitlab_tool!(client, "list_projects", ReadOnly,
            "List GitLab projects accessible by the API token.", list_projects),
        gitlab_tool!(client, "get_project", ReadOnly,
            "Get GitLab project details by ID or path.", get_project),
        gitlab_tool!(client, "create_project", Write,
            "Create a new project.", create_project),
        gitlab_tool!(client, "delete_project", Destructive,
            "Delete a project.", delete_project),
        gitlab_tool!(client, "list_project_branches", ReadOnly,
            "List repository branches for a GitLab project.", list_project_branches),
        gitlab_tool!(client, "get_project_branch", ReadOnly,
            "Get a single repository branch.", get_project_branch),
        gitlab_tool!(client, "list_project_commits", ReadOnly,
            "List repository commits for a GitLab project.", list_project_commits),
    ]
}
