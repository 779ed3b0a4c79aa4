//! Project snippets.

use std::sync::Arc;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tanuki_client::{GitLabClient, GitLabError, GitLabResponse, encode_project_id};

use crate::ToolImplementation;
use crate::params::{Visibility, clamp_per_page, default_page, default_per_page, is_blank};
use crate::tool::gitlab_tool;
use crate::validation::{
    MAX_DESCRIPTION_LENGTH, MAX_TITLE_LENGTH, Validate, check_length, check_not_blank,
    check_optional_length,
};

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ListSnippetsParams {
    /// Project ID or path.
    #[serde(skip_serializing)]
    pub project_id: String,
    /// Page number.
    #[serde(default = "default_page")]
    pub page: u32,
    /// Results per page, max 100.
    #[serde(default = "default_per_page", serialize_with = "clamp_per_page")]
    pub per_page: u32,
}

impl Validate for ListSnippetsParams {}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct CreateSnippetParams {
    /// Project ID or path.
    pub project_id: String,
    pub title: String,
    /// File name for the snippet (e.g. "example.rs").
    pub file_name: String,
    pub content: String,
    /// Description (Markdown).
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub visibility: Visibility,
}

impl Validate for CreateSnippetParams {
    fn validate(&self) -> Result<(), GitLabError> {
        check_length("title", &self.title, 1, MAX_TITLE_LENGTH)?;
        check_not_blank("file_name", &self.file_name)?;
        check_optional_length("description", self.description.as_deref(), 0, MAX_DESCRIPTION_LENGTH)
    }
}

#[derive(Serialize)]
struct SnippetFile<'a> {
    file_path: &'a str,
    content: &'a str,
}

/// Request body for the multi-file snippet API, carrying a single file.
#[derive(Serialize)]
struct SnippetBody<'a> {
    title: &'a str,
    files: [SnippetFile<'a>; 1],
    visibility: Visibility,
    #[serde(skip_serializing_if = "is_blank")]
    description: Option<String>,
}

impl<'a> From<&'a CreateSnippetParams> for SnippetBody<'a> {
    fn from(params: &'a CreateSnippetParams) -> Self {
        Self {
            title: &params.title,
            files: [SnippetFile {
                file_path: &params.file_name,
                content: &params.content,
            }],
            visibility: params.visibility,
            description: params.description.clone(),
        }
    }
}

pub async fn list_snippets(
    client: &GitLabClient,
    params: ListSnippetsParams,
) -> Result<GitLabResponse, GitLabError> {
    let id = encode_project_id(&params.project_id)?;
    client
        .get_with_query(&format!("/projects/{id}/snippets"), &params)
        .await
}

pub async fn create_snippet(
    client: &GitLabClient,
    params: CreateSnippetParams,
) -> Result<GitLabResponse, GitLabError> {
    let id = encode_project_id(&params.project_id)?;
    client
        .post(&format!("/projects/{id}/snippets"), &SnippetBody::from(&params))
        .await
}

pub(crate) fn tools(client: &Arc<GitLabClient>) -> Vec<Arc<dyn ToolImplementation>> {
    vec![
        gitlab_tool!(client, "list_snippets", ReadOnly,
            "List snippets for a project.", list_snippets),
        gitlab_tool!(client, "create_snippet", Write,
            "Create a new snippet in a project.", create_snippet),
    ]
}
