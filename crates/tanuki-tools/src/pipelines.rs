//! CI/CD pipelines and jobs.

use std::sync::Arc;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tanuki_client::{GitLabClient, GitLabError, GitLabResponse, encode_project_id};

use crate::ToolImplementation;
use crate::params::{SortOrder, clamp_per_page, default_page, default_per_page, is_blank};
use crate::tool::gitlab_tool;
use crate::validation::{MAX_BRANCH_LENGTH, Validate, check_length, check_not_blank};

fn default_order_by() -> String {
    "id".to_string()
}

fn default_ref() -> String {
    "main".to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStatus {
    Created,
    WaitingForResource,
    Preparing,
    Pending,
    Running,
    Success,
    Failed,
    Canceled,
    Skipped,
    Manual,
    Scheduled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum JobScope {
    Created,
    Pending,
    Running,
    Failed,
    Success,
    Canceled,
    Skipped,
    Manual,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ListPipelinesParams {
    /// Project ID or path.
    #[serde(skip_serializing)]
    pub project_id: String,
    /// Filter by status.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<PipelineStatus>,
    /// Filter by branch or tag name.
    #[serde(default, rename = "ref", skip_serializing_if = "is_blank")]
    pub git_ref: Option<String>,
    /// Order by field (id, status, ref, updated_at, user_id).
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

impl Validate for ListPipelinesParams {}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct PipelineParams {
    /// Project ID or path.
    pub project_id: String,
    /// Pipeline ID.
    pub pipeline_id: u64,
}

impl Validate for PipelineParams {}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct PipelineVariable {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct CreatePipelineParams {
    /// Project ID or path.
    #[serde(skip_serializing)]
    pub project_id: String,
    /// Branch or tag to run the pipeline for.
    #[serde(default = "default_ref", rename = "ref")]
    pub git_ref: String,
    /// CI/CD variables passed to the pipeline.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variables: Option<Vec<PipelineVariable>>,
}

impl Validate for CreatePipelineParams {
    fn validate(&self) -> Result<(), GitLabError> {
        check_length("ref", &self.git_ref, 1, MAX_BRANCH_LENGTH)?;
        for variable in self.variables.iter().flatten() {
            check_not_blank("variables.key", &variable.key)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ListJobsParams {
    /// Project ID or path.
    #[serde(skip_serializing)]
    pub project_id: String,
    /// Pipeline ID.
    #[serde(skip_serializing)]
    pub pipeline_id: u64,
    /// Filter by job scope.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<JobScope>,
    /// Page number.
    #[serde(default = "default_page")]
    pub page: u32,
    /// Results per page, max 100.
    #[serde(default = "default_per_page", serialize_with = "clamp_per_page")]
    pub per_page: u32,
}

impl Validate for ListJobsParams {}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct JobParams {
    /// Project ID or path.
    pub project_id: String,
    /// Job ID.
    pub job_id: u64,
}

impl Validate for JobParams {}

fn pipeline_path(project_id: &str, pipeline_id: u64) -> Result<String, GitLabError> {
    let id = encode_project_id(project_id)?;
    Ok(format!("/projects/{id}/pipelines/{pipeline_id}"))
}

fn job_path(project_id: &str, job_id: u64) -> Result<String, GitLabError> {
    let id = encode_project_id(project_id)?;
    Ok(format!("/projects/{id}/jobs/{job_id}"))
}

pub async fn list_pipelines(
    client: &GitLabClient,
    params: ListPipelinesParams,
) -> Result<GitLabResponse, GitLabError> {
    let id = encode_project_id(&params.project_id)?;
    client
        .get_with_query(&format!("/projects/{id}/pipelines"), &params)
        .await
}

pub async fn get_pipeline(
    client: &GitLabClient,
    params: PipelineParams,
) -> Result<GitLabResponse, GitLabError> {
    client
        .get(&pipeline_path(&params.project_id, params.pipeline_id)?)
        .await
}

pub async fn create_pipeline(
    client: &GitLabClient,
    params: CreatePipelineParams,
) -> Result<GitLabResponse, GitLabError> {
    let id = encode_project_id(&params.project_id)?;
    client
        .post(&format!("/projects/{id}/pipeline"), &params)
        .await
}

pub async fn retry_pipeline(
    client: &GitLabClient,
    params: PipelineParams,
) -> Result<GitLabResponse, GitLabError> {
    let path = pipeline_path(&params.project_id, params.pipeline_id)?;
    client.post_empty(&format!("{path}/retry")).await
}

pub async fn cancel_pipeline(
    client: &GitLabClient,
    params: PipelineParams,
) -> Result<GitLabResponse, GitLabError> {
    let path = pipeline_path(&params.project_id, params.pipeline_id)?;
    client.post_empty(&format!("{path}/cancel")).await
}

pub async fn delete_pipeline(
    client: &GitLabClient,
    params: PipelineParams,
) -> Result<GitLabResponse, GitLabError> {
    client
        .delete(&pipeline_path(&params.project_id, params.pipeline_id)?)
        .await
}

pub async fn list_pipeline_jobs(
    client: &GitLabClient,
    params: ListJobsParams,
) -> Result<GitLabResponse, GitLabError> {
    let path = pipeline_path(&params.project_id, params.pipeline_id)?;
    client.get_with_query(&format!("{path}/jobs"), &params).await
}

/// The trace is served as `text/plain` and comes back as
/// [`GitLabResponse::Text`].
pub async fn get_job_log(
    client: &GitLabClient,
    params: JobParams,
) -> Result<GitLabResponse, GitLabError> {
    let path = job_path(&params.project_id, params.job_id)?;
    client.get(&format!("{path}/trace")).await
}

pub async fn retry_job(
    client: &GitLabClient,
    params: JobParams,
) -> Result<GitLabResponse, GitLabError> {
    let path = job_path(&params.project_id, params.job_id)?;
    client.post_empty(&format!("{path}/retry")).await
}

pub async fn cancel_job(
    client: &GitLabClient,
    params: JobParams,
) -> Result<GitLabResponse, GitLabError> {
    let path = job_path(&params.project_id, params.job_id)?;
    client.post_empty(&format!("{path}/cancel")).await
}

/// Erases the job's artifacts and trace; GitLab has no hard delete for jobs.
pub async fn delete_job(
    client: &GitLabClient,
    params: JobParams,
) -> Result<GitLabResponse, GitLabError> {
    let path = job_path(&params.project_id, params.job_id)?;
    client.post_empty(&format!("{path}/erase")).await
}

pub(crate) fn tools(client: &Arc<GitLabClient>) -> Vec<Arc<dyn ToolImplementation>> {
    vec![
        gitlab_tool!(client, "list_pipelines", ReadOnly,
            "List pipelines for a project.", list_pipelines),
        gitlab_tool!(client, "get_pipeline", ReadOnly,
            "Get a single pipeline.", get_pipeline),
        gitlab_tool!(client, "create_pipeline", Write,
            "Create (trigger) a new CI/CD pipeline.", create_pipeline),
        gitlab_tool!(client, "retry_pipeline", Write,
            "Retry all failed jobs in a CI/CD pipeline.", retry_pipeline),
        gitlab_tool!(client, "cancel_pipeline", Write,
            "Cancel a running CI/CD pipeline.", cancel_pipeline),
        gitlab_tool!(client, "delete_pipeline", Destructive,
            "Delete a CI/CD pipeline and all its jobs permanently.", delete_pipeline),
        gitlab_tool!(client, "list_pipeline_jobs", ReadOnly,
            "List jobs for a pipeline.", list_pipeline_jobs),
        gitlab_tool!(client, "get_job_log", ReadOnly,
            "Get the log (trace) output of a job.", get_job_log),
        gitlab_tool!(client, "retry_job", Write,
            "Retry a specific failed CI/CD job.", retry_job),
        gitlab_tool!(client, "cancel_job", Write,
            "Cancel a running CI/CD job.", cancel_job),
        gitlab_tool!(client, "delete_job", Destructive,
            "Delete a CI/CD job's artifacts and trace log.", delete_job),
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

    fn job(project_id: &str, job_id: u64) -> JobParams {
        JobParams {
            project_id: project_id.to_string(),
            job_id,
        }
    }

    #[tokio::test]
    async fn test_list_pipelines_status_and_ref() {
        let (server, client) = mock_gitlab().await;
        Mock::given(method("GET"))
            .and(path("/api/v4/projects/3/pipelines"))
            .and(query_param("status", "waiting_for_resource"))
            .and(query_param("ref", "main"))
            .and(query_param("order_by", "id"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 100}])))
            .expect(1)
            .mount(&server)
            .await;

        let params = serde_json::from_value(
            json!({"project_id": "3", "status": "waiting_for_resource", "ref": "main"}),
        )
        .unwrap();
        list_pipelines(&client, params).await.unwrap();
    }

    #[test]
    fn test_unknown_status_rejected() {
        let result = serde_json::from_value::<ListPipelinesParams>(
            json!({"project_id": "3", "status": "exploded"}),
        );
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_create_pipeline_default_ref() {
        let (server, client) = mock_gitlab().await;
        Mock::given(method("POST"))
            .and(path("/api/v4/projects/3/pipeline"))
            .and(body_json(json!({"ref": "main"})))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 101, "status": "created"})))
            .expect(1)
            .mount(&server)
            .await;

        let params = serde_json::from_value(json!({"project_id": "3"})).unwrap();
        let result = create_pipeline(&client, params).await.unwrap().into_json();
        assert_eq!(result["status"], "created");
    }

    #[tokio::test]
    async fn test_create_pipeline_with_variables() {
        let (server, client) = mock_gitlab().await;
        Mock::given(method("POST"))
            .and(path("/api/v4/projects/3/pipeline"))
            .and(body_json(json!({
                "ref": "release",
                "variables": [{"key": "DEPLOY", "value": "true"}]
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 102})))
            .expect(1)
            .mount(&server)
            .await;

        let params = serde_json::from_value(json!({
            "project_id": "3",
            "ref": "release",
            "variables": [{"key": "DEPLOY", "value": "true"}]
        }))
        .unwrap();
        create_pipeline(&client, params).await.unwrap();
    }

    #[tokio::test]
    async fn test_pipeline_actions() {
        let (server, client) = mock_gitlab().await;
        for action in ["retry", "cancel"] {
            Mock::given(method("POST"))
                .and(path(format!("/api/v4/projects/3/pipelines/100/{action}")))
                .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 100})))
                .expect(1)
                .mount(&server)
                .await;
        }
        Mock::given(method("DELETE"))
            .and(path("/api/v4/projects/3/pipelines/100"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let params = || PipelineParams {
            project_id: "3".to_string(),
            pipeline_id: 100,
        };
        retry_pipeline(&client, params()).await.unwrap();
        cancel_pipeline(&client, params()).await.unwrap();
        let deleted = delete_pipeline(&client, params()).await.unwrap();
        assert_eq!(deleted, GitLabResponse::Deleted);
    }

    #[tokio::test]
    async fn test_list_jobs_scope() {
        let (server, client) = mock_gitlab().await;
        Mock::given(method("GET"))
            .and(path("/api/v4/projects/3/pipelines/100/jobs"))
            .and(query_param("scope", "failed"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 9}])))
            .expect(1)
            .mount(&server)
            .await;

        let params = serde_json::from_value(
            json!({"project_id": "3", "pipeline_id": 100, "scope": "failed"}),
        )
        .unwrap();
        list_pipeline_jobs(&client, params).await.unwrap();
    }

    #[tokio::test]
    async fn test_job_log_is_text() {
        let (server, client) = mock_gitlab().await;
        Mock::given(method("GET"))
            .and(path("/api/v4/projects/3/jobs/9/trace"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "text/plain; charset=utf-8")
                    .set_body_string("$ cargo test\nok"),
            )
            .expect(1)
            .mount(&server)
            .await;

        let result = get_job_log(&client, job("3", 9)).await.unwrap();
        assert_eq!(result.into_json(), json!({"content": "$ cargo test\nok"}));
    }

    #[tokio::test]
    async fn test_job_actions() {
        let (server, client) = mock_gitlab().await;
        for action in ["retry", "cancel", "erase"] {
            Mock::given(method("POST"))
                .and(path(format!("/api/v4/projects/3/jobs/9/{action}")))
                .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 9})))
                .expect(1)
                .mount(&server)
                .await;
        }

        retry_job(&client, job("3", 9)).await.unwrap();
        cancel_job(&client, job("3", 9)).await.unwrap();
        delete_job(&client, job("3", 9)).await.unwrap();
    }
}
