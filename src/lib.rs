//! MCP server that lists the repositories of a GitHub organization.
//!
//! Exposes a single `list-repositories` tool which accepts an organization
//! name or URL and returns a text summary of the organization's repositories.

pub mod error;
pub mod github;
pub mod org;
pub mod server;
