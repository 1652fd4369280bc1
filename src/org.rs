//! Resolution of a caller-supplied organization reference into a GitHub slug.
//!
//! Callers may pass either an organization name (`kubernetes`) or a URL
//! pointing at it (`https://github.com/kubernetes`). Both collapse to the same
//! slug and therefore the same API route.

use crate::error::OrgReposError;

/// GitHub's maximum page size for list endpoints.
pub const MAX_PER_PAGE: u32 = 100;

/// An organization, identified either by its name or by a URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrgRef {
    ByName(String),
    ByUrl(String),
}

impl OrgRef {
    /// Build a reference from the two optional tool arguments.
    ///
    /// A non-empty `url` takes precedence over `name`. Absent and empty
    /// strings are treated the same.
    pub fn from_args(name: Option<&str>, url: Option<&str>) -> Result<Self, OrgReposError> {
        let name = name.unwrap_or_default();
        let url = url.unwrap_or_default();

        if !url.is_empty() {
            Ok(OrgRef::ByUrl(url.to_string()))
        } else if !name.is_empty() {
            Ok(OrgRef::ByName(name.to_string()))
        } else {
            Err(OrgReposError::EmptyArguments)
        }
    }

    /// The organization slug used in the API route.
    pub fn slug(&self) -> Result<String, OrgReposError> {
        let slug = match self {
            OrgRef::ByName(name) => name.as_str(),
            OrgRef::ByUrl(url) => slug_from_url(url),
        };
        if slug.is_empty() {
            return Err(OrgReposError::EmptyArguments);
        }
        Ok(slug.to_string())
    }
}

/// Strip scheme, `github.com/` host and trailing slash, then keep the first
/// path segment.
fn slug_from_url(url: &str) -> &str {
    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .unwrap_or(url);
    let rest = rest.strip_prefix("github.com/").unwrap_or(rest);
    let rest = rest.strip_suffix('/').unwrap_or(rest);
    rest.split('/').next().unwrap_or_default()
}

/// Route for listing an organization's repositories, relative to the API base.
pub fn repos_route(slug: &str, per_page: u32) -> String {
    format!(
        "/orgs/{}/repos?per_page={}",
        slug,
        per_page.clamp(1, MAX_PER_PAGE)
    )
}

/// Absolute request URL for the given API base.
pub fn repos_url(api_url: &str, slug: &str, per_page: u32) -> String {
    format!(
        "{}{}",
        api_url.trim_end_matches('/'),
        repos_route(slug, per_page)
    )
}
