//! User lookup.

use std::sync::Arc;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tanuki_client::{GitLabClient, GitLabError, GitLabResponse};

use crate::ToolImplementation;
use crate::params::{
    clamp_per_page, default_page, default_per_page, default_true, is_blank, is_false,
};
use crate::tool::gitlab_tool;
use crate::validation::Validate;

/// No arguments.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct CurrentUserParams {}

impl Validate for CurrentUserParams {}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ListUsersParams {
    /// Search for users by name or email.
    #[serde(default, skip_serializing_if = "is_blank")]
    pub search: Option<String>,
    /// Exact username.
    #[serde(default, skip_serializing_if = "is_blank")]
    pub username: Option<String>,
    /// Only active users.
    #[serde(default = "default_true", skip_serializing_if = "is_false")]
    pub active: bool,
    /// Page number.
    #[serde(default = "default_page")]
    pub page: u32,
    /// Results per page, max 100.
    #[serde(default = "default_per_page", serialize_with = "clamp_per_page")]
    pub per_page: u32,
}

impl Validate for ListUsersParams {}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct UserParams {
    pub user_id: u64,
}

impl Validate for UserParams {}

pub async fn get_current_user(
    client: &GitLabClient,
    _params: CurrentUserParams,
) -> Result<GitLabResponse, GitLabError> {
    client.get("/user").await
}

pub async fn list_users(
    client: &GitLabClient,
    params: ListUsersParams,
) -> Result<GitLabResponse, GitLabError> {
    client.get_with_query("/users", &params).await
}

pub async fn get_user(
    client: &GitLabClient,
    params: UserParams,
) -> Result<GitLabResponse, GitLabError> {
    client.get(&format!("/users/{}", params.user_id)).await
}

pub(crate) fn tools(client: &Arc<GitLabClient>) -> Vec<Arc<dyn ToolImplementation>> {
    vec![
        gitlab_tool!(client, "get_current_user", ReadOnly,
            "Get the currently authenticated user.", get_current_user),
        gitlab_tool!(client, "list_users", ReadOnly,
            "List GitLab users.", list_users),
        gitlab_tool!(client, "get_user", ReadOnly,
            "Get a specific user by ID.", get_user),
    ]
}
