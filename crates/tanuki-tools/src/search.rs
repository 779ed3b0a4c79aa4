//! Global and project-scoped search.

use std::sync::Arc;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize, Serializer};
use tanuki_client::{GitLabClient, GitLabError, GitLabResponse, encode_project_id};

use crate::ToolImplementation;
use crate::params::{clamp_per_page, default_page, default_per_page};
use crate::tool::gitlab_tool;
use crate::validation::Validate;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum SearchScope {
    #[default]
    Projects,
    Issues,
    MergeRequests,
    Milestones,
    SnippetTitles,
    WikiBlobs,
    Commits,
    Blobs,
    Notes,
    Users,
}

impl SearchScope {
    pub const ALL: [Self; 10] = [
        Self::Projects,
        Self::Issues,
        Self::MergeRequests,
        Self::Milestones,
        Self::SnippetTitles,
        Self::WikiBlobs,
        Self::Commits,
        Self::Blobs,
        Self::Notes,
        Self::Users,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Projects => "projects",
            Self::Issues => "issues",
            Self::MergeRequests => "merge_requests",
            Self::Milestones => "milestones",
            Self::SnippetTitles => "snippet_titles",
            Self::WikiBlobs => "wiki_blobs",
            Self::Commits => "commits",
            Self::Blobs => "blobs",
            Self::Notes => "notes",
            Self::Users => "users",
        }
    }

    /// Scopes a single project can be searched in.
    #[must_use]
    pub const fn applies_to_project(self) -> bool {
        !matches!(self, Self::Projects | Self::SnippetTitles | Self::Users)
    }
}

const fn project_default_scope() -> SearchScope {
    SearchScope::Blobs
}

fn trimmed<S: Serializer>(value: &str, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(value.trim())
}

fn check_query(search: &str) -> Result<(), GitLabError> {
    if search.trim().is_empty() {
        return Err(GitLabError::validation("Search query must not be empty"));
    }
    Ok(())
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct SearchGlobalParams {
    /// Search query.
    #[serde(serialize_with = "trimmed")]
    pub search: String,
    /// What to search.
    #[serde(default)]
    pub scope: SearchScope,
    /// Page number.
    #[serde(default = "default_page")]
    pub page: u32,
    /// Results per page, max 100.
    #[serde(default = "default_per_page", serialize_with = "clamp_per_page")]
    pub per_page: u32,
}

impl Validate for SearchGlobalParams {
    fn validate(&self) -> Result<(), GitLabError> {
        check_query(&self.search)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct SearchProjectParams {
    /// Project ID or path.
    #[serde(skip_serializing)]
    pub project_id: String,
    /// Search query.
    #[serde(serialize_with = "trimmed")]
    pub search: String,
    /// What to search (projects, snippet_titles and users are not available here).
    #[serde(default = "project_default_scope")]
    pub scope: SearchScope,
    /// Page number.
    #[serde(default = "default_page")]
    pub page: u32,
    /// Results per page, max 100.
    #[serde(default = "default_per_page", serialize_with = "clamp_per_page")]
    pub per_page: u32,
}

impl Validate for SearchProjectParams {
    fn validate(&self) -> Result<(), GitLabError> {
        check_query(&self.search)?;
        if !self.scope.applies_to_project() {
            let mut allowed: Vec<_> = SearchScope::ALL
                .into_iter()
                .filter(|s| s.applies_to_project())
                .map(SearchScope::as_str)
                .collect();
            allowed.sort_unstable();
            return Err(GitLabError::validation(format!(
                "Invalid project search scope. Allowed: {}",
                allowed.join(", ")
            )));
        }
        Ok(())
    }
}

pub async fn search_global(
    client: &GitLabClient,
    params: SearchGlobalParams,
) -> Result<GitLabResponse, GitLabError> {
    client.get_with_query("/search", &params).await
}

pub async fn search_project(
    client: &GitLabClient,
    params: SearchProjectParams,
) -> Result<GitLabResponse, GitLabError> {
    let id = encode_project_id(&params.project_id)?;
    client
        .get_with_query(&format!("/projects/{id}/search"), &params)
        .await
}

pub(crate) fn tools(client: &Arc<GitLabClient>) -> Vec<Arc<dyn ToolImplementation>> {
    vec![
        gitlab_tool!(client, "search_global", ReadOnly,
            "Search across all GitLab resources accessible by the token.", search_global),
        gitlab_tool!(client, "search_project", ReadOnly,
            "Search within a specific GitLab project.", search_project),
    ]
}
