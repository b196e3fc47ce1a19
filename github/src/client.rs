//! GitHub organisation client.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;

use crate::fetch::{FetchError, HttpFetcher, JsonFetcher};
use crate::memo::Memo;
use crate::nested::{NestedMapError, access_nested_map};

/// Canonical GitHub REST API base URL.
pub const GITHUB_API_BASE: &str = "https://api.github.com";

#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error("org payload for '{org}' has no string field '{field}'")]
    MissingField { org: String, field: &'static str },
    #[error("repos payload from {url} is not a list")]
    NotAList { url: String },
    #[error("repo entry is missing key {0}")]
    Repo(#[from] NestedMapError),
}

/// Client for one GitHub organisation.
///
/// The org payload and the repos payload are each fetched at most once per
/// client.
pub struct GithubOrgClient {
    org: String,
    api_base: String,
    fetcher: Arc<dyn JsonFetcher>,
    org_payload: Memo<Value>,
    repos_payload: Memo<Value>,
}

impl GithubOrgClient {
    /// Client against the public GitHub API using the shared HTTP fetcher.
    pub fn new(org: impl Into<String>) -> Self {
        Self::with_fetcher(org, Arc::new(HttpFetcher::shared().clone()))
    }

    pub fn with_fetcher(org: impl Into<String>, fetcher: Arc<dyn JsonFetcher>) -> Self {
        Self {
            org: org.into(),
            api_base: GITHUB_API_BASE.to_string(),
            fetcher,
            org_payload: Memo::new(),
            repos_payload: Memo::new(),
        }
    }

    /// Point the client at another API root (GitHub Enterprise, a mock server).
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    #[must_use]
    pub fn org_name(&self) -> &str {
        &self.org
    }

    #[must_use]
    pub fn org_url(&self) -> String {
        format!("{}/orgs/{}", self.api_base, self.org)
    }

    /// The organisation payload (memoized).
    pub async fn org(&self) -> Result<&Value, ClientError> {
        let url = self.org_url();
        let payload = self
            .org_payload
            .get_or_try_init(|| self.fetcher.get_json(&url))
            .await?;
        Ok(payload)
    }

    /// `repos_url` from the org payload.
    pub async fn public_repos_url(&self) -> Result<String, ClientError> {
        let org = self.org().await?;
        access_nested_map(org, &["repos_url"])
            .ok()
            .and_then(Value::as_str)
            .map(ToString::to_string)
            .ok_or_else(|| ClientError::MissingField {
                org: self.org.clone(),
                field: "repos_url",
            })
    }

    /// The repos listing (memoized).
    pub async fn repos_payload(&self) -> Result<&Value, ClientError> {
        if let Some(payload) = self.repos_payload.get() {
            return Ok(payload);
        }
        let url = self.public_repos_url().await?;
        let payload = self
            .repos_payload
            .get_or_try_init(|| self.fetcher.get_json(&url))
            .await?;
        Ok(payload)
    }

    /// Public repo names in payload order, optionally only those carrying
    /// `license`.
    pub async fn public_repos(&self, license: Option<&str>) -> Result<Vec<String>, ClientError> {
        let payload = self.repos_payload().await?;
        let Some(repos) = payload.as_array() else {
            // The org payload is memoized, so this re-reads the URL that was fetched.
            let url = self.public_repos_url().await?;
            return Err(ClientError::NotAList { url });
        };

        let mut names = Vec::with_capacity(repos.len());
        for repo in repos {
            if license.is_some_and(|key| !Self::has_license(repo, key)) {
                continue;
            }
            let name = access_nested_map(repo, &["name"])?;
            names.push(name.as_str().map_or_else(|| name.to_string(), ToString::to_string));
        }

        tracing::debug!(
            org = %self.org,
            license = license.unwrap_or("*"),
            count = names.len(),
            "public repos listed"
        );
        Ok(names)
    }

    /// Whether `repo.license.key` equals `license_key`.
    ///
    /// A missing or null license never matches.
    #[must_use]
    pub fn has_license(repo: &Value, license_key: &str) -> bool {
        access_nested_map(repo, &["license", "key"])
            .ok()
            .and_then(Value::as_str)
            == Some(license_key)
    }
}

impl fmt::Debug for GithubOrgClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GithubOrgClient")
            .field("org", &self.org)
            .field("api_base", &self.api_base)
            .field("org_payload", &self.org_payload)
            .field("repos_payload", &self.repos_payload)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use serde_json::json;

    use super::*;
    use crate::fetch::FetchFut;

    /// Serves canned payloads by URL and records every request.
    #[derive(Default)]
    struct FakeFetcher {
        routes: HashMap<String, Value>,
        calls: Mutex<Vec<String>>,
    }

    impl FakeFetcher {
        fn route(mut self, url: &str, payload: Value) -> Self {
            self.routes.insert(url.to_string(), payload);
            self
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl JsonFetcher for FakeFetcher {
        fn get_json<'a>(&'a self, url: &'a str) -> FetchFut<'a> {
            self.calls.lock().unwrap().push(url.to_string());
            let result = self
                .routes
                .get(url)
                .cloned()
                .ok_or_else(|| FetchError::Status {
                    url: url.to_string(),
                    status: 404,
                });
            Box::pin(async move { result })
        }
    }

    const GOOGLE_REPOS_URL: &str = "https://api.github.com/users/google/repos";

    fn google_fetcher() -> FakeFetcher {
        FakeFetcher::default()
            .route(
                "https://api.github.com/orgs/google",
                json!({"login": "google", "repos_url": GOOGLE_REPOS_URL}),
            )
            .route(
                GOOGLE_REPOS_URL,
                json!([{"name": "episodes.dart"}, {"name": "kratu"}]),
            )
    }

    #[tokio::test]
    async fn org_fetches_the_org_url_once() {
        for org in ["google", "abc"] {
            let url = format!("https://api.github.com/orgs/{org}");
            let fetcher = Arc::new(FakeFetcher::default().route(&url, json!({"login": org})));
            let client = GithubOrgClient::with_fetcher(org, fetcher.clone());

            assert_eq!(client.org().await.unwrap(), &json!({"login": org}));
            assert_eq!(client.org().await.unwrap(), &json!({"login": org}));
            assert_eq!(fetcher.calls(), vec![url]);
        }
    }

    #[tokio::test]
    async fn public_repos_url_comes_from_org_payload() {
        let fetcher = Arc::new(google_fetcher());
        let client = GithubOrgClient::with_fetcher("google", fetcher.clone());

        assert_eq!(client.public_repos_url().await.unwrap(), GOOGLE_REPOS_URL);
        assert_eq!(fetcher.calls().len(), 1);
    }

    #[tokio::test]
    async fn public_repos_url_missing_is_an_error() {
        let fetcher = Arc::new(
            FakeFetcher::default().route("https://api.github.com/orgs/empty", json!({})),
        );
        let client = GithubOrgClient::with_fetcher("empty", fetcher);

        assert!(matches!(
            client.public_repos_url().await,
            Err(ClientError::MissingField {
                field: "repos_url",
                ..
            })
        ));
    }

    #[tokio::test]
    async fn public_repos_lists_names_and_fetches_once() {
        let fetcher = Arc::new(google_fetcher());
        let client = GithubOrgClient::with_fetcher("google", fetcher.clone());

        assert_eq!(
            client.public_repos(None).await.unwrap(),
            vec!["episodes.dart", "kratu"]
        );
        assert_eq!(
            client.public_repos(None).await.unwrap(),
            vec!["episodes.dart", "kratu"]
        );
        assert_eq!(
            fetcher.calls(),
            vec![
                "https://api.github.com/orgs/google".to_string(),
                GOOGLE_REPOS_URL.to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn fetch_failures_propagate_and_are_not_cached() {
        let fetcher = Arc::new(FakeFetcher::default());
        let client = GithubOrgClient::with_fetcher("ghost", fetcher.clone());

        let err = client.org().await.unwrap_err();
        assert!(matches!(err, ClientError::Fetch(ref e) if e.status() == Some(404)));
        assert!(client.org().await.is_err());
        assert_eq!(fetcher.calls().len(), 2);
    }

    #[tokio::test]
    async fn non_list_repos_payload_reports_the_fetched_url() {
        // repos_url on a different host than the API base.
        let repos_url = "https://mirror.example.com/odd/repositories";
        let fetcher = Arc::new(
            FakeFetcher::default()
                .route(
                    "https://api.github.com/orgs/odd",
                    json!({"repos_url": repos_url}),
                )
                .route(repos_url, json!({"message": "nope"})),
        );
        let client = GithubOrgClient::with_fetcher("odd", fetcher.clone());

        let err = client.public_repos(None).await.unwrap_err();
        assert!(matches!(err, ClientError::NotAList { ref url } if url == repos_url));
        assert!(err.to_string().contains(repos_url));
        assert_eq!(fetcher.calls().len(), 2);
    }

    #[test]
    fn has_license_matches_key() {
        let cases = [
            (json!({"license": {"key": "bsd-3-clause"}}), "bsd-3-clause", true),
            (json!({"license": {"key": "bsl-1.0"}}), "bsd-3-clause", false),
            (json!({"license": null}), "bsd-3-clause", false),
            (json!({}), "bsd-3-clause", false),
        ];

        for (repo, key, expected) in cases {
            assert_eq!(GithubOrgClient::has_license(&repo, key), expected, "{repo}");
        }
    }

    #[test]
    fn api_base_trailing_slash_is_trimmed() {
        let client = GithubOrgClient::with_fetcher("google", Arc::new(FakeFetcher::default()))
            .with_api_base("http://localhost:8080/");
        assert_eq!(client.org_url(), "http://localhost:8080/orgs/google");
    }
}
