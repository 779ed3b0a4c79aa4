//! Project wiki pages.

use std::sync::Arc;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize, Serializer};
use tanuki_client::{
    GitLabClient, GitLabError, GitLabResponse, encode_path_segment, encode_project_id,
};

use crate::ToolImplementation;
use crate::params::{clamp_per_page, default_page, default_per_page, is_false};
use crate::tool::gitlab_tool;
use crate::validation::{MAX_TITLE_LENGTH, Validate, check_length, check_not_blank};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum WikiFormat {
    #[default]
    Markdown,
    Rdoc,
    Asciidoc,
    Org,
}

/// GitLab expects `with_content=1`.
#[allow(clippy::trivially_copy_pass_by_ref)]
fn as_flag<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(if *value { "1" } else { "0" })
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ListWikiPagesParams {
    /// Project ID or path.
    #[serde(skip_serializing)]
    pub project_id: String,
    /// Include page content in the listing.
    #[serde(default, skip_serializing_if = "is_false", serialize_with = "as_flag")]
    pub with_content: bool,
    /// Page number.
    #[serde(default = "default_page")]
    pub page: u32,
    /// Results per page, max 100.
    #[serde(default = "default_per_page", serialize_with = "clamp_per_page")]
    pub per_page: u32,
}

impl Validate for ListWikiPagesParams {}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct GetWikiPageParams {
    /// Project ID or path.
    pub project_id: String,
    /// URL slug of the page.
    pub slug: String,
}

impl Validate for GetWikiPageParams {
    fn validate(&self) -> Result<(), GitLabError> {
        check_not_blank("slug", &self.slug)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct CreateWikiPageParams {
    /// Project ID or path.
    #[serde(skip_serializing)]
    pub project_id: String,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub format: WikiFormat,
}

impl Validate for CreateWikiPageParams {
    fn validate(&self) -> Result<(), GitLabError> {
        check_length("title", &self.title, 1, MAX_TITLE_LENGTH)
    }
}

pub async fn list_wiki_pages(
    client: &GitLabClient,
    params: ListWikiPagesParams,
) -> Result<GitLabResponse, GitLabError> {
    let id = encode_project_id(&params.project_id)?;
    client
        .get_with_query(&format!("/projects/{id}/wikis"), &params)
        .await
}

pub async fn get_wiki_page(
    client: &GitLabClient,
    params: GetWikiPageParams,
) -> Result<GitLabResponse, GitLabError> {
    let id = encode_project_id(&params.project_id)?;
    let slug = encode_path_segment(&params.slug);
    client.get(&format!("/projects/{id}/wikis/{slug}")).await
}

pub async fn create_wiki_page(
    client: &GitLabClient,
    params: CreateWikiPageParams,
) -> Result<GitLabResponse, GitLabError> {
    let id = encode_project_id(&params.project_id)?;
    client.post(&format!("/projects/{id}/wikis"), &params).await
}

pub(crate) fn tools(client: &Arc<GitLabClient>) -> Vec<Arc<dyn ToolImplementation>> {
    vec![
        gitlab_tool!(client, "list_wiki_pages", ReadOnly,
            "List wiki pages for a project.", list_wiki_pages),
        gitlab_tool!(client, "get_wiki_page", ReadOnly,
            "Get a single wiki page by slug.", get_wiki_page),
        gitlab_tool!(client, "create_wiki_page", Write,
            "Create a new wiki page.", create_wiki_page),
    ]
}
