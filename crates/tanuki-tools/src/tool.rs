//! Adapter turning a typed async GitLab operation into a [`ToolImplementation`].

use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;
use log::debug;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tanuki_client::{GitLabClient, GitLabError, GitLabResponse};

use crate::validation::Validate;
use crate::{ToolAccess, ToolDefinition, ToolImplementation};

/// A typed operation: borrow the client, consume validated parameters.
pub type Handler<P> =
    for<'a> fn(&'a GitLabClient, P) -> BoxFuture<'a, Result<GitLabResponse, GitLabError>>;

/// One GitLab operation exposed as a tool.
///
/// Arguments are deserialized strictly into `P` (unknown fields rejected),
/// checked with [`Validate`], then handed to the handler.
pub struct GitLabTool<P> {
    name: &'static str,
    description: &'static str,
    access: ToolAccess,
    client: Arc<GitLabClient>,
    handler: Handler<P>,
    _params: PhantomData<fn(P)>,
}

impl<P> GitLabTool<P>
where
    P: DeserializeOwned + JsonSchema + Validate + Send + 'static,
{
    #[must_use]
    pub const fn new(
        name: &'static str,
        description: &'static str,
        access: ToolAccess,
        client: Arc<GitLabClient>,
        handler: Handler<P>,
    ) -> Self {
        Self {
            name,
            description,
            access,
            client,
            handler,
            _params: PhantomData,
        }
    }

    fn parse(&self, args: &Value) -> Result<P, GitLabError> {
        let args = match args {
            Value::Null => Value::Object(Map::new()),
            other => other.clone(),
        };
        let params: P = serde_json::from_value(args).map_err(|e| {
            GitLabError::validation(format!("invalid arguments for {}: {e}", self.name))
        })?;
        params.validate()?;
        Ok(params)
    }
}

#[async_trait]
impl<P> ToolImplementation for GitLabTool<P>
where
    P: DeserializeOwned + JsonSchema + Validate + Send + 'static,
{
    fn get_definition(&self) -> ToolDefinition {
        ToolDefinition::builder()
            .name(self.name.to_string())
            .description(self.description.to_string())
            .access(self.access)
            .input_schema(input_schema::<P>())
            .build()
    }

    async fn execute(&self, args: &Value) -> Result<Value, GitLabError> {
        let params = self.parse(args)?;
        debug!("Executing tool {}", self.name);
        let response = (self.handler)(&self.client, params).await?;
        Ok(response.into_json())
    }

    fn is_auto_approved(&self) -> bool {
        self.access == ToolAccess::ReadOnly
    }
}

/// JSON Schema of `P` as a plain object map.
#[must_use]
pub fn input_schema<P: JsonSchema>() -> Map<String, Value> {
    let schema = schemars::schema_for!(P);
    match serde_json::to_value(schema) {
        Ok(Value::Object(map)) => map,
        _ => {
            let mut map = Map::new();
            map.insert("type".to_string(), Value::String("object".to_string()));
            map
        }
    }
}

/// Build an `Arc<dyn ToolImplementation>` from an async fn
/// `(&GitLabClient, Params) -> Result<GitLabResponse, GitLabError>`.
macro_rules! gitlab_tool {
    ($client:expr, $name:literal, $access:ident, $description:literal, $handler:path) => {
        ::std::sync::Arc::new($crate::tool::GitLabTool::new(
            $name,
            $description,
            $crate::ToolAccess::$access,
            ::std::sync::Arc::clone($client),
            |client, params| ::std::boxed::Box::pin($handler(client, params)),
        )) as ::std::sync::Arc<dyn $crate::ToolImplementation>
    };
}

pub(crate) use gitlab_tool;
