//! Branch creation, deletion and comparison.

use std::sync::Arc;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tanuki_client::{
    GitLabClient, GitLabError, GitLabResponse, encode_path_segment, encode_project_id,
};

use crate::ToolImplementation;
use crate::params::is_false;
use crate::tool::gitlab_tool;
use crate::validation::{MAX_BRANCH_LENGTH, Validate, check_length, check_not_blank};

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct CreateBranchParams {
    /// Project ID or path.
    #[serde(skip_serializing)]
    pub project_id: String,
    /// Name of the new branch.
    pub branch: String,
    /// Branch name or commit SHA to create from.
    #[serde(rename = "ref")]
    pub git_ref: String,
}

impl Validate for CreateBranchParams {
    fn validate(&self) -> Result<(), GitLabError> {
        check_length("branch", &self.branch, 1, MAX_BRANCH_LENGTH)?;
        check_not_blank("ref", &self.git_ref)
    }
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct DeleteBranchParams {
    /// Project ID or path.
    pub project_id: String,
    /// Branch to delete.
    pub branch: String,
}

impl Validate for DeleteBranchParams {
    fn validate(&self) -> Result<(), GitLabError> {
        check_not_blank("branch", &self.branch)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct CompareParams {
    /// Project ID or path.
    #[serde(skip_serializing)]
    pub project_id: String,
    /// Base branch, tag or commit.
    #[serde(rename(serialize = "from"))]
    pub from_ref: String,
    /// Head branch, tag or commit.
    #[serde(rename(serialize = "to"))]
    pub to_ref: String,
    /// Compare directly instead of from the merge base.
    #[serde(default, skip_serializing_if = "is_false")]
    pub straight: bool,
}

impl Validate for CompareParams {}

pub async fn create_branch(
    client: &GitLabClient,
    params: CreateBranchParams,
) -> Result<GitLabResponse, GitLabError> {
    let id = encode_project_id(&params.project_id)?;
    client
        .post(&format!("/projects/{id}/repository/branches"), &params)
        .await
}

pub async fn delete_branch(
    client: &GitLabClient,
    params: DeleteBranchParams,
) -> Result<GitLabResponse, GitLabError> {
    let id = encode_project_id(&params.project_id)?;
    let branch = encode_path_segment(&params.branch);
    client
        .delete(&format!("/projects/{id}/repository/branches/{branch}"))
        .await
}

pub async fn compare_branches(
    client: &GitLabClient,
    params: CompareParams,
) -> Result<GitLabResponse, GitLabError> {
    let id = encode_project_id(&params.project_id)?;
    client
        .get_with_query(&format!("/projects/{id}/repository/compare"), &params)
        .await
}

pub(crate) fn tools(client: &Arc<GitLabClient>) -> Vec<Arc<dyn ToolImplementation>> {
    vec![
        gitlab_tool!(client, "create_branch", Write,
            "Create a new branch in a repository.", create_branch),
        gitlab_tool!(client, "delete_branch", Destructive,
            "Delete a branch from a repository.", delete_branch),
        gitlab_tool!(client, "compare_branches", ReadOnly,
            "Compare two branches, tags, or commits.", compare_branches),
    ]
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::expect_used)]

    use serde_json::json;
    use wiremock::matchers::{body_json, method, path, query_param, query_param_is_missing};
    use wiremock::{Mock, ResponseTemplate};

    use super::*;
    use crate::test_support::mock_gitlab;

    #[tokio::test]
    async fn test_create_branch_body() {
        let (server, client) = mock_gitlab().await;
        Mock::given(method("POST"))
            .and(path("/api/v4/projects/1/repository/branches"))
            .and(body_json(json!({"branch": "fix/login", "ref": "main"})))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"name": "fix/login"})))
            .expect(1)
            .mount(&server)
            .await;

        let params = serde_json::from_value(
            json!({"project_id": "1", "branch": "fix/login", "ref": "main"}),
        )
        .unwrap();
        create_branch(&client, params).await.unwrap();
    }

    #[tokio::test]
    async fn test_delete_branch_encodes_name() {
        let (server, client) = mock_gitlab().await;
        Mock::given(method("DELETE"))
            .and(path("/api/v4/projects/1/repository/branches/fix%2Flogin"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let params =
            serde_json::from_value(json!({"project_id": "1", "branch": "fix/login"})).unwrap();
        let result = delete_branch(&client, params).await.unwrap();
        assert_eq!(result.into_json(), json!({"status": "deleted"}));
    }

    #[tokio::test]
    async fn test_compare_renames_refs() {
        let (server, client) = mock_gitlab().await;
        Mock::given(method("GET"))
            .and(path("/api/v4/projects/1/repository/compare"))
            .and(query_param("from", "main"))
            .and(query_param("to", "feature"))
            .and(query_param_is_missing("straight"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"commits": [], "diffs": []})))
            .expect(1)
            .mount(&server)
            .await;

        let params = serde_json::from_value(
            json!({"project_id": "1", "from_ref": "main", "to_ref": "feature"}),
        )
        .unwrap();
        let result = compare_branches(&client, params).await.unwrap().into_json();
        assert_eq!(result["commits"], json!([]));
    }
}
