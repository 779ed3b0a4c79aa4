//! # tanuki-tools
//!
//! GitLab operations packaged as tools an agent can discover and call.
//!
//! ## Core Components
//!
//! - [`ToolImplementation`]: Trait every tool implements
//! - [`ToolRegistry`]: Thread-safe registry keyed by tool name
//! - [`GitLabTool`]: Adapter from a typed async operation to a tool
//! - [`validation`]: Length and count limits applied before any request
//!
//! Each domain module (`projects`, `issues`, `pipelines`, ...) defines one
//! strict parameter struct and one async function per operation. Functions
//! only encode identifiers, build a path, and call a single verb on
//! [`GitLabClient`]; all response handling lives in `tanuki-client`.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use serde_json::json;
//! use tanuki_client::{Config, GitLabClient};
//! use tanuki_tools::ToolRegistry;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Arc::new(GitLabClient::new(Arc::new(Config::from_env()?)));
//! let registry = ToolRegistry::gitlab(&client);
//!
//! let result = registry
//!     .execute("get_project", &json!({"project_id": "gitlab-org/gitlab"}))
//!     .await?;
//! println!("{result}");
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tanuki_client::{GitLabClient, GitLabError};
use thiserror::Error;
use typed_builder::TypedBuilder;

pub mod branches;
pub mod files;
pub mod groups;
pub mod issues;
pub mod labels;
pub mod merge_requests;
pub mod milestones;
pub mod params;
pub mod pipelines;
pub mod projects;
pub mod releases;
pub mod search;
pub mod snippets;
#[cfg(test)]
mod test_support;
pub mod tool;
pub mod users;
pub mod validation;
pub mod wiki;

pub use tool::GitLabTool;

/// What a tool does to remote state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolAccess {
    /// Reads only.
    ReadOnly,
    /// Creates or modifies resources.
    Write,
    /// Deletes or irreversibly erases resources.
    Destructive,
}

/// Name, description and input schema advertised for a tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TypedBuilder)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub access: ToolAccess,
    /// JSON Schema of the accepted arguments object.
    pub input_schema: Map<String, Value>,
}

#[async_trait]
pub trait ToolImplementation: Send + Sync {
    fn get_definition(&self) -> ToolDefinition;

    async fn execute(&self, args: &Value) -> Result<Value, GitLabError>;

    fn is_auto_approved(&self) -> bool {
        false
    }
}

/// Failure to run a tool by name.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ToolCallError {
    #[error("Unknown tool: '{0}'")]
    UnknownTool(String),

    #[error(transparent)]
    GitLab(#[from] GitLabError),
}

pub struct ToolRegistry {
    tools: Arc<DashMap<String, Arc<dyn ToolImplementation>>>,
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ToolRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self {
            tools: Arc::new(DashMap::new()),
        }
    }

    /// A registry holding every GitLab tool, all sharing `client`.
    #[must_use]
    pub fn gitlab(client: &Arc<GitLabClient>) -> Self {
        let registry = Self::new();
        for tool in all_tools(client) {
            registry.register(tool);
        }
        registry
    }

    pub fn register(&self, tool: Arc<dyn ToolImplementation>) {
        let name = tool.get_definition().name;
        self.tools.insert(name, tool);
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<dyn ToolImplementation>> {
        self.tools.get(name).map(|r| r.value().clone())
    }

    /// All definitions, sorted by name.
    #[must_use]
    pub fn get_all_definitions(&self) -> Vec<ToolDefinition> {
        let mut definitions: Vec<_> = self.tools.iter().map(|t| t.get_definition()).collect();
        definitions.sort_by(|a, b| a.name.cmp(&b.name));
        definitions
    }

    #[must_use]
    pub fn is_tool_auto_approved(&self, name: &str) -> bool {
        self.tools.get(name).is_some_and(|t| t.is_auto_approved())
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Run a tool by name.
    ///
    /// # Errors
    ///
    /// Returns [`ToolCallError::UnknownTool`] if no tool has that name, or the
    /// tool's own [`GitLabError`].
    pub async fn execute(&self, name: &str, args: &Value) -> Result<Value, ToolCallError> {
        let tool = self
            .get(name)
            .ok_or_else(|| ToolCallError::UnknownTool(name.to_string()))?;
        Ok(tool.execute(args).await?)
    }
}

fn all_tools(client: &Arc<GitLabClient>) -> Vec<Arc<dyn ToolImplementation>> {
    [
        projects::tools(client),
        groups::tools(client),
        merge_requests::tools(client),
        issues::tools(client),
        pipelines::tools(client),
        files::tools(client),
        branches::tools(client),
        labels::tools(client),
        users::tools(client),
        releases::tools(client),
        milestones::tools(client),
        wiki::tools(client),
        snippets::tools(client),
        search::tools(client),
    ]
    .into_iter()
    .flatten()
    .collect()
}
