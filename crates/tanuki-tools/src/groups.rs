//! Groups and the projects inside them.

use std::sync::Arc;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tanuki_client::{GitLabClient, GitLabError, GitLabResponse, encode_group_id};

use crate::ToolImplementation;
use crate::params::{
    SortOrder, Visibility, clamp_per_page, default_page, default_per_page, default_true, is_blank,
    is_false,
};
use crate::tool::gitlab_tool;
use crate::validation::Validate;

fn default_group_order_by() -> String {
    "name".to_string()
}

fn default_project_order_by() -> String {
    "created_at".to_string()
}

const fn ascending() -> SortOrder {
    SortOrder::Asc
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ListGroupsParams {
    /// Search for groups by name.
    #[serde(default, skip_serializing_if = "is_blank")]
    pub search: Option<String>,
    /// Only groups owned by the authenticated user.
    #[serde(default, skip_serializing_if = "is_false")]
    pub owned: bool,
    /// Only top-level groups.
    #[serde(default, skip_serializing_if = "is_false")]
    pub top_level_only: bool,
    /// Order by field (name, path, id).
    #[serde(default = "default_group_order_by")]
    pub order_by: String,
    /// Sort direction.
    #[serde(default = "ascending")]
    pub sort: SortOrder,
    /// Page number.
    #[serde(default = "default_page")]
    pub page: u32,
    /// Results per page, max 100.
    #[serde(default = "default_per_page", serialize_with = "clamp_per_page")]
    pub per_page: u32,
}

impl Validate for ListGroupsParams {}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct GetGroupParams {
    /// Group ID or path (e.g. "group/subgroup").
    pub group_id: String,
    /// Include the group's projects.
    #[serde(default = "default_true")]
    pub with_projects: bool,
}

impl Validate for GetGroupParams {}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ListGroupProjectsParams {
    /// Group ID or path.
    #[serde(skip_serializing)]
    pub group_id: String,
    /// Filter projects by name.
    #[serde(default, skip_serializing_if = "is_blank")]
    pub search: Option<String>,
    /// Filter by visibility.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<Visibility>,
    /// Include projects from subgroups.
    #[serde(default, skip_serializing_if = "is_false")]
    pub include_subgroups: bool,
    /// Order by field (created_at, updated_at, name, path).
    #[serde(default = "default_project_order_by")]
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

impl Validate for ListGroupProjectsParams {}

pub async fn list_groups(
    client: &GitLabClient,
    params: ListGroupsParams,
) -> Result<GitLabResponse, GitLabError> {
    client.get_with_query("/groups", &params).await
}

pub async fn get_group(
    client: &GitLabClient,
    params: GetGroupParams,
) -> Result<GitLabResponse, GitLabError> {
    let id = encode_group_id(&params.group_id)?;
    let path = format!("/groups/{id}");
    if params.with_projects {
        client.get(&path).await
    } else {
        client
            .get_with_query(&path, &[("with_projects", "false")])
            .await
    }
}

pub async fn list_group_projects(
    client: &GitLabClient,
    params: ListGroupProjectsParams,
) -> Result<GitLabResponse, GitLabError> {
    let id = encode_group_id(&params.group_id)?;
    client
        .get_with_query(&format!("/groups/{id}/projects"), &params)
        .await
}

pub(crate) fn tools(client: &Arc<GitLabClient>) -> Vec<Arc<dyn ToolImplementation>> {
    vec![
        gitlab_tool!(client, "list_groups", ReadOnly,
            "List groups accessible by the API token.", list_groups),
        gitlab_tool!(client, "get_group", ReadOnly,
            "Get group details by ID or path.", get_group),
        gitlab_tool!(client, "list_group_projects", ReadOnly,
            "List projects within a group.", list_group_projects),
    ]
}
