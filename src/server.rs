use std::sync::Arc;

use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::*;
use rmcp::service::RequestContext;
use rmcp::{schemars, tool, tool_handler, tool_router, RoleServer, ServerHandler};
use serde::Deserialize;
use tokio_util::sync::CancellationToken;

use crate::error::OrgReposError;
use crate::github::{self, RepoSource};
use crate::org::OrgRef;

#[derive(Clone)]
pub struct OrgReposServer {
    source: Arc<dyn RepoSource>,
    per_page: u32,
    tool_router: ToolRouter<Self>,
}

// -- Tool parameter types --

/// Either field identifies the organization; `url` wins when both are set.
#[derive(Debug, Default, Deserialize, schemars::JsonSchema)]
pub struct ListRepositoriesParams {
    #[schemars(description = "GitHub organization name (e.g., kubernetes)")]
    #[serde(default)]
    pub name: Option<String>,

    #[schemars(description = "GitHub organization URL (e.g., https://github.com/kubernetes)")]
    #[serde(default)]
    pub url: Option<String>,
}

impl OrgReposServer {
    pub fn new(source: Arc<dyn RepoSource>, per_page: u32) -> Self {
        Self {
            source,
            per_page,
            tool_router: Self::tool_router(),
        }
    }

    /// Resolve the organization and fetch its summary, giving up as soon as
    /// `ct` is cancelled.
    pub async fn run(
        &self,
        params: ListRepositoriesParams,
        ct: CancellationToken,
    ) -> Result<CallToolResult, OrgReposError> {
        let org = OrgRef::from_args(params.name.as_deref(), params.url.as_deref())?;

        let summary = tokio::select! {
            biased;
            _ = ct.cancelled() => {
                tracing::debug!(?org, "list-repositories cancelled");
                return Err(OrgReposError::Cancelled);
            }
            summary = github::list_repositories(self.source.as_ref(), &org, self.per_page) => summary?,
        };

        Ok(CallToolResult::success(vec![Content::text(summary)]))
    }

    fn err(&self, e: OrgReposError) -> ErrorData {
        e.to_mcp_error()
    }
}

#[tool_router]
impl OrgReposServer {
    #[tool(
        name = "list-repositories",
        description = "List all repositories in a GitHub organization"
    )]
    async fn list_repositories(
        &self,
        Parameters(params): Parameters<ListRepositoriesParams>,
        context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, ErrorData> {
        self.run(params, context.ct).await.map_err(|e| self.err(e))
    }
}

#[tool_handler]
impl ServerHandler for OrgReposServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "mcp-github-orgs".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                ..Default::default()
            },
            instructions: Some(
                "GitHub organization server. Use list-repositories with an organization \
                 name or URL to list the organization's repositories."
                    .to_string(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::tests::StubSource;
    use crate::github::ApiResponse;

    struct PendingSource;

    #[async_trait::async_trait]
    impl RepoSource for PendingSource {
        async fn get(&self, _route: &str) -> Result<ApiResponse, OrgReposError> {
            std::future::pending().await
        }
    }

    fn params(name: &str, url: &str) -> ListRepositoriesParams {
        ListRepositoriesParams {
            name: Some(name.to_string()),
            url: Some(url.to_string()),
        }
    }

    fn text_of(result: &CallToolResult) -> String {
        result.content[0].as_text().unwrap().text.clone()
    }

    #[tokio::test]
    async fn test_run_returns_single_text_block() {
        let source = Arc::new(StubSource::new(
            200,
            r#"[{"name":"repo1","full_name":"org/repo1","html_url":"https://github.com/org/repo1","private":false}]"#,
        ));
        let server = OrgReposServer::new(source.clone(), 100);

        let result = server
            .run(params("", "https://github.com/org"), CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(result.content.len(), 1);
        assert_eq!(
            text_of(&result),
            "Repositories for organization org:Name: repo1, URL: https://github.com/org/repo1"
        );
        assert_eq!(source.routes(), vec!["/orgs/org/repos?per_page=100"]);
    }

    #[tokio::test]
    async fn test_run_empty_arguments_skips_network() {
        let source = Arc::new(StubSource::new(200, "[]"));
        let server = OrgReposServer::new(source.clone(), 100);

        let err = server
            .run(params("", ""), CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, OrgReposError::EmptyArguments));

        let err = server
            .run(ListRepositoriesParams::default(), CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, OrgReposError::EmptyArguments));

        assert!(source.routes().is_empty());
    }

    #[tokio::test]
    async fn test_run_uses_configured_page_size() {
        let source = Arc::new(StubSource::new(200, "[]"));
        let server = OrgReposServer::new(source.clone(), 30);

        server
            .run(params("kubernetes", ""), CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(source.routes(), vec!["/orgs/kubernetes/repos?per_page=30"]);
    }

    #[tokio::test]
    async fn test_run_cancelled() {
        let server = OrgReposServer::new(Arc::new(PendingSource), 100);
        let ct = CancellationToken::new();
        ct.cancel();

        let err = server.run(params("org", ""), ct).await.unwrap_err();
        assert!(matches!(err, OrgReposError::Cancelled));
    }

    #[tokio::test]
    async fn test_upstream_error_maps_to_internal_error() {
        let server = OrgReposServer::new(
            Arc::new(StubSource::new(404, r#"{"message":"Not Found"}"#)),
            100,
        );
        let err = server
            .run(params("missing", ""), CancellationToken::new())
            .await
            .unwrap_err();

        let data = server.err(err);
        assert_eq!(data.code, ErrorCode::INTERNAL_ERROR);
        assert!(data.message.contains("404"));
    }

    #[tokio::test]
    async fn test_tool_registered_with_both_fields() {
        let server = OrgReposServer::new(Arc::new(StubSource::new(200, "[]")), 100);
        let tools = server.tool_router.list_all();

        assert_eq!(tools.len(), 1);
        assert_eq!(tools[0].name, "list-repositories");

        let properties = tools[0]
            .input_schema
            .get("properties")
            .and_then(|p| p.as_object())
            .unwrap();
        assert!(properties.contains_key("name"));
        assert!(properties.contains_key("url"));
    }

    #[tokio::test]
    async fn test_server_info_enables_tools() {
        let server = OrgReposServer::new(Arc::new(StubSource::new(200, "[]")), 100);
        let info = server.get_info();

        assert_eq!(info.server_info.name, "mcp-github-orgs");
        assert!(info.capabilities.tools.is_some());
    }
}
