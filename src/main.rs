use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use mcp_github_orgs::github::GithubApi;
use mcp_github_orgs::org::MAX_PER_PAGE;
use mcp_github_orgs::server;
use rmcp::{transport::stdio, ServiceExt};
use tracing_subscriber::EnvFilter;

/// MCP server that lists the repositories of a GitHub organization
#[derive(Parser)]
#[command(name = "mcp-github-orgs", version, about)]
struct Cli {
    /// Base URL of the GitHub REST API.
    #[arg(long, env = "GITHUB_API_URL", default_value = "https://api.github.com")]
    api_url: String,

    /// Timeout for each GitHub request, in seconds
    #[arg(long, default_value = "10", value_parser = clap::value_parser!(u64).range(1..))]
    timeout: u64,

    /// Repositories requested per call (GitHub caps this at 100)
    #[arg(long, default_value = "100", value_parser = clap::value_parser!(u32).range(1..))]
    per_page: u32,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(log_filter(EnvFilter::from_default_env())?)
        .with_writer(std::io::stderr)
        .init();

    let timeout = Duration::from_secs(cli.timeout);
    let per_page = cli.per_page.min(MAX_PER_PAGE);

    let github = GithubApi::new(&cli.api_url, timeout)
        .map_err(|e| anyhow::anyhow!("Failed to create GitHub client: {}", e))?;

    tracing::info!(
        api_url = %cli.api_url,
        timeout_secs = cli.timeout,
        per_page,
        "MCP server starting up"
    );

    let service = server::OrgReposServer::new(Arc::new(github), per_page);
    let result = serve(service).await;
    if let Err(ref e) = result {
        tracing::error!("Server failed: {:#}", e);
    }

    tracing::info!("MCP server shutting down");
    result
}

/// Startup and shutdown lines are always shown; `RUST_LOG` can raise verbosity.
fn log_filter(base: EnvFilter) -> Result<EnvFilter> {
    Ok(base.add_directive("mcp_github_orgs=info".parse()?))
}

async fn serve(service: server::OrgReposServer) -> Result<()> {
    let running = service.serve(stdio()).await?;
    running.waiting().await?;
    Ok(())
}
