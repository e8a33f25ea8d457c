// GitHub API endpoint functions.
// Typed methods for the repository listing and the upstream detail lookups.

use reqwest::Request;
use serde_json::Value;
use tracing::warn;

use crate::error::{FolioError, Result};

use super::client::GitHubClient;
use super::types::Repository;

/// Page size for the listing request; one page is all the feed ever shows.
pub const LIST_PER_PAGE: u32 = 100;

/// Decode a listing payload, rejecting anything that is not a JSON array.
/// Elements that do not decode as repositories are skipped.
pub fn parse_repo_list(body: Value) -> Result<Vec<Repository>> {
    match body {
        Value::Array(items) => Ok(items
            .into_iter()
            .enumerate()
            .filter_map(|(index, item)| {
                let name = item.get("name").and_then(Value::as_str).map(str::to_string);
                match serde_json::from_value(item) {
                    Ok(repo) => Some(repo),
                    Err(e) => {
                        warn!(index, name = ?name, error = %e, "skipping undecodable repository");
                        None
                    }
                }
            })
            .collect()),
        other => {
            let kind = match other {
                Value::Null => "null",
                Value::Bool(_) => "boolean",
                Value::Number(_) => "number",
                Value::String(_) => "string",
                Value::Object(_) => "object",
                Value::Array(_) => "array",
            };
            Err(FolioError::InvalidResponse(format!(
                "expected an array of repositories, got {}",
                kind
            )))
        }
    }
}

impl GitHubClient {
    /// The single listing request: up to 100 repositories, most recently updated first.
    pub fn list_user_repos_request(&self, account: &str) -> Result<Request> {
        let params = [
            ("per_page", LIST_PER_PAGE.to_string()),
            ("sort", "updated".to_string()),
        ];
        self.build_get(&format!("/users/{}/repos", account), &params)
    }

    /// List up to 100 public repositories for an account, most recently updated first.
    pub async fn list_user_repos(&self, account: &str) -> Result<Vec<Repository>> {
        let request = self.list_user_repos_request(account)?;
        let response = self.execute(request).await?;
        let body: Value = response.json().await?;
        parse_repo_list(body)
    }

    /// Get a repository by its API detail URL.
    pub async fn get_repo_by_url(&self, url: &str) -> Result<Repository> {
        let response = self.get_url(url).await?;
        let repository: Repository = response.json().await?;
        Ok(repository)
    }

    /// Get a specific repository.
    pub async fn get_repo(&self, owner: &str, repo: &str) -> Result<Repository> {
        let response = self.get(&format!("/repos/{}/{}", owner, repo)).await?;
        let repository: Repository = response.json().await?;
        Ok(repository)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_array() {
        let body = json!([
            {"name": "a", "stargazers_count": 5},
            {"name": "b", "stargazers_count": 20, "fork": true}
        ]);
        let repos = parse_repo_list(body).unwrap();
        assert_eq!(repos.len(), 2);
        assert_eq!(repos[1].name, "b");
        assert!(repos[1].fork);
    }

    #[test]
    fn test_rate_limit_body_is_shape_violation() {
        let body = json!({
            "message": "API rate limit exceeded",
            "documentation_url": "https://docs.github.com/rest"
        });
        match parse_repo_list(body) {
            Err(FolioError::InvalidResponse(msg)) => assert!(msg.contains("object")),
            other => panic!("expected InvalidResponse, got {:?}", other),
        }
    }

    #[test]
    fn test_undecodable_element_is_skipped() {
        let body = json!([
            {"name": "a", "stargazers_count": 5, "html_url": "https://github.com/uwuclxdy/a"},
            {"name": "b", "html_url": null},
            {"name": "c", "stargazers_count": 2}
        ]);
        let repos = parse_repo_list(body).unwrap();
        let names: Vec<&str> = repos.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["a", "c"]);
    }

    #[test]
    fn test_listing_request_shape() {
        let client = GitHubClient::new("https://api.github.com", None).unwrap();
        let request = client.list_user_repos_request("uwuclxdy").unwrap();
        assert_eq!(request.method(), reqwest::Method::GET);
        assert_eq!(request.url().path(), "/users/uwuclxdy/repos");
        assert_eq!(request.url().query(), Some("per_page=100&sort=updated"));
    }

    #[test]
    fn test_empty_array_is_valid() {
        assert!(parse_repo_list(json!([])).unwrap().is_empty());
    }
}
