//! MCP handler backed by a [`ToolRegistry`].

use std::sync::Arc;

use rmcp::model::{
    CallToolRequestParams, CallToolResult, Content, ErrorData, Implementation,
    ListToolsResult, PaginatedRequestParams, ProtocolVersion, ServerCapabilities, ServerInfo,
    Tool, ToolAnnotations,
};
use rmcp::service::RequestContext;
use rmcp::{RoleServer, ServerHandler};
use serde_json::Value;
use tanuki_tools::{ToolAccess, ToolCallError, ToolDefinition, ToolRegistry};
use tracing::{debug, info, warn};

const INSTRUCTIONS: &str = "GitLab REST API tools: projects, groups, merge requests, issues, \
    pipelines and jobs, repository files and branches, labels, users, releases, milestones, \
    wiki pages, snippets and search. Project and group IDs accept a numeric ID or a path such \
    as 'group/project'. List tools return {items, pagination}. Tools annotated as destructive \
    delete or erase data and cannot be undone.";

/// Serves every tool in the registry over MCP.
#[derive(Clone)]
pub struct TanukiServer {
    registry: Arc<ToolRegistry>,
}

impl TanukiServer {
    #[must_use]
    pub const fn new(registry: Arc<ToolRegistry>) -> Self {
        Self { registry }
    }

    /// MCP tool descriptors, sorted by name.
    #[must_use]
    pub fn tools(&self) -> Vec<Tool> {
        self.registry
            .get_all_definitions()
            .into_iter()
            .map(to_mcp_tool)
            .collect()
    }

    /// Run a tool and shape the outcome as an MCP result.
    ///
    /// GitLab and validation failures are tool-level errors the model can
    /// read; only an unknown tool name is a protocol error.
    ///
    /// # Errors
    ///
    /// Returns `invalid_params` when no tool has the requested name.
    pub async fn dispatch(&self, name: &str, arguments: Value) -> Result<CallToolResult, ErrorData> {
        debug!(tool = name, "Tool call");
        match self.registry.execute(name, &arguments).await {
            Ok(value) => Ok(CallToolResult::structured(value)),
            Err(ToolCallError::GitLab(e)) => {
                warn!(tool = name, error = %e, "Tool call failed");
                Ok(CallToolResult::error(vec![Content::text(e.to_string())]))
            }
            Err(e) => Err(ErrorData::invalid_params(e.to_string(), None)),
        }
    }
}

fn to_mcp_tool(definition: ToolDefinition) -> Tool {
    let annotations = ToolAnnotations::new()
        .read_only(definition.access == ToolAccess::ReadOnly)
        .destructive(definition.access == ToolAccess::Destructive)
        .open_world(true);
    Tool::new(
        definition.name,
        definition.description,
        Arc::new(definition.input_schema),
    )
    .annotate(annotations)
}

impl ServerHandler for TanukiServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2025_03_26,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "tanuki".to_string(),
                title: Some("Tanuki GitLab MCP Server".to_string()),
                version: env!("CARGO_PKG_VERSION").to_string(),
                description: Some(
                    "GitLab REST v4 API exposed as validated, token-safe MCP tools".to_string(),
                ),
                icons: None,
                website_url: None,
            },
            instructions: Some(INSTRUCTIONS.to_string()),
        }
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, ErrorData> {
        let tools = self.tools();
        info!("Listing {} tools", tools.len());
        Ok(ListToolsResult::with_all_items(tools))
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParams,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, ErrorData> {
        let arguments = request.arguments.map_or(Value::Null, Value::Object);
        self.dispatch(&request.name, arguments).await
    }
}
