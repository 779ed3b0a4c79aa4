//! Repository tree and file contents.

use std::sync::Arc;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tanuki_client::{
    GitLabClient, GitLabError, GitLabResponse, encode_path_segment, encode_project_id,
};

use crate::ToolImplementation;
use crate::params::{clamp_per_page, default_page, default_per_page, is_blank, is_false};
use crate::tool::gitlab_tool;
use crate::validation::{MAX_BRANCH_LENGTH, Validate, check_length, check_not_blank};

fn default_file_ref() -> String {
    "HEAD".to_string()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ContentEncoding {
    #[default]
    Text,
    Base64,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ListTreeParams {
    /// Project ID or path.
    #[serde(skip_serializing)]
    pub project_id: String,
    /// Path inside the repository (default: root).
    #[serde(default, skip_serializing_if = "is_blank")]
    pub path: Option<String>,
    /// Branch, tag, or commit SHA (default: the default branch).
    #[serde(default, rename = "ref", skip_serializing_if = "is_blank")]
    pub git_ref: Option<String>,
    /// List entries recursively.
    #[serde(default, skip_serializing_if = "is_false")]
    pub recursive: bool,
    /// Page number.
    #[serde(default = "default_page")]
    pub page: u32,
    /// Results per page, max 100.
    #[serde(default = "default_per_page", serialize_with = "clamp_per_page")]
    pub per_page: u32,
}

impl Validate for ListTreeParams {}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct GetFileParams {
    /// Project ID or path.
    pub project_id: String,
    /// Path to the file in the repository.
    pub file_path: String,
    /// Branch, tag, or commit SHA.
    #[serde(default = "default_file_ref", rename = "ref")]
    pub git_ref: String,
}

impl Validate for GetFileParams {
    fn validate(&self) -> Result<(), GitLabError> {
        check_not_blank("file_path", &self.file_path)
    }
}

/// A commit that creates or replaces one file.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct FileCommitParams {
    /// Project ID or path.
    #[serde(skip_serializing)]
    pub project_id: String,
    /// Path of the file in the repository.
    #[serde(skip_serializing)]
    pub file_path: String,
    /// Branch to commit to.
    pub branch: String,
    /// File content, plain or base64 depending on `encoding`.
    pub content: String,
    pub commit_message: String,
    #[serde(default)]
    pub encoding: ContentEncoding,
}

impl Validate for FileCommitParams {
    fn validate(&self) -> Result<(), GitLabError> {
        check_not_blank("file_path", &self.file_path)?;
        check_length("branch", &self.branch, 1, MAX_BRANCH_LENGTH)?;
        check_not_blank("commit_message", &self.commit_message)
    }
}

fn file_path(project_id: &str, file_path: &str) -> Result<String, GitLabError> {
    let id = encode_project_id(project_id)?;
    let file = encode_path_segment(file_path);
    Ok(format!("/projects/{id}/repository/files/{file}"))
}

pub async fn list_repository_tree(
    client: &GitLabClient,
    params: ListTreeParams,
) -> Result<GitLabResponse, GitLabError> {
    let id = encode_project_id(&params.project_id)?;
    client
        .get_with_query(&format!("/projects/{id}/repository/tree"), &params)
        .await
}

/// File metadata with base64 content.
pub async fn get_file(
    client: &GitLabClient,
    params: GetFileParams,
) -> Result<GitLabResponse, GitLabError> {
    let path = file_path(&params.project_id, &params.file_path)?;
    client
        .get_with_query(&path, &[("ref", params.git_ref.as_str())])
        .await
}

pub async fn create_file(
    client: &GitLabClient,
    params: FileCommitParams,
) -> Result<GitLabResponse, GitLabError> {
    let path = file_path(&params.project_id, &params.file_path)?;
    client.post(&path, &params).await
}

pub async fn update_file(
    client: &GitLabClient,
    params: FileCommitParams,
) -> Result<GitLabResponse, GitLabError> {
    let path = file_path(&params.project_id, &params.file_path)?;
    client.put(&path, &params).await
}

pub(crate) fn tools(client: &Arc<GitLabClient>) -> Vec<Arc<dyn ToolImplementation>> {
    vec![
        gitlab_tool!(client, "list_repository_tree", ReadOnly,
            "List repository tree (files and directories).", list_repository_tree),
        gitlab_tool!(client, "get_file", ReadOnly,
            "Get a file from the repository. Returns file metadata and base64 content.", get_file),
        gitlab_tool!(client, "create_file", Write,
            "Create a new file in the repository.", create_file),
        gitlab_tool!(client, "update_file", Write,
            "Update an existing file in the repository.", update_file),
    ]
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::expect_used)]

    use serde_json::json;
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, ResponseTemplate};

    use super::*;
    use crate::test_support::mock_gitlab;

    #[tokio::test]
    async fn test_tree_query() {
        let (server, client) = mock_gitlab().await;
        Mock::given(method("GET"))
            .and(path("/api/v4/projects/1/repository/tree"))
            .and(query_param("path", "src"))
            .and(query_param("ref", "dev"))
            .and(query_param("recursive", "true"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"name": "lib.rs"}])))
            .expect(1)
            .mount(&server)
            .await;

        let params = serde_json::from_value(
            json!({"project_id": "1", "path": "src", "ref": "dev", "recursive": true}),
        )
        .unwrap();
        list_repository_tree(&client, params).await.unwrap();
    }

    #[tokio::test]
    async fn test_get_file_encodes_path() {
        let (server, client) = mock_gitlab().await;
        Mock::given(method("GET"))
            .and(path("/api/v4/projects/1/repository/files/src%2Fmain.rs"))
            .and(query_param("ref", "HEAD"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"file_path": "src/main.rs", "encoding": "base64"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let params =
            serde_json::from_value(json!({"project_id": "1", "file_path": "src/main.rs"})).unwrap();
        let result = get_file(&client, params).await.unwrap().into_json();
        assert_eq!(result["encoding"], "base64");
    }

    #[tokio::test]
    async fn test_file_path_with_dots_stays_one_segment() {
        let (server, client) = mock_gitlab().await;
        Mock::given(method("GET"))
            .and(path("/api/v4/projects/1/repository/files/..%2F..%2Fetc%2Fpasswd"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({"message": "404 File Not Found"})))
            .expect(1)
            .mount(&server)
            .await;

        let params = serde_json::from_value(
            json!({"project_id": "1", "file_path": "../../etc/passwd"}),
        )
        .unwrap();
        let err = get_file(&client, params).await.unwrap_err();
        assert!(matches!(err, GitLabError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_create_and_update_file() {
        let (server, client) = mock_gitlab().await;
        let body = json!({
            "branch": "main",
            "content": "hello",
            "commit_message": "Add greeting",
            "encoding": "text"
        });
        Mock::given(method("POST"))
            .and(path("/api/v4/projects/1/repository/files/docs%2Fhello.txt"))
            .and(body_json(body.clone()))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"file_path": "docs/hello.txt"})))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path("/api/v4/projects/1/repository/files/docs%2Fhello.txt"))
            .and(body_json(body))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"file_path": "docs/hello.txt"})))
            .expect(1)
            .mount(&server)
            .await;

        let args = json!({
            "project_id": "1",
            "file_path": "docs/hello.txt",
            "branch": "main",
            "content": "hello",
            "commit_message": "Add greeting"
        });
        create_file(&client, serde_json::from_value(args.clone()).unwrap())
            .await
            .unwrap();
        update_file(&client, serde_json::from_value(args).unwrap())
            .await
            .unwrap();
    }

    #[test]
    fn test_encoding_is_closed() {
        let result = serde_json::from_value::<FileCommitParams>(json!({
            "project_id": "1",
            "file_path": "a",
            "branch": "main",
            "content": "x",
            "commit_message": "m",
            "encoding": "utf-16"
        }));
        assert!(result.is_err());
    }
}
