//! GithubOrgClient against a mock GitHub API over real HTTP.

use std::sync::Arc;

use kata_github::{ClientError, GithubOrgClient, HttpFetcher, HttpFetcherConfig};
use serde_json::{Value, json};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const REPOS_FIXTURE: &str = include_str!("fixtures/google_repos.json");

const EXPECTED_REPOS: &[&str] = &[
    "episodes.dart",
    "cpp-netlib",
    "dagger",
    "ios-webkit-debug-proxy",
    "google.github.io",
    "kratu",
    "build-debian-cloud",
    "traceur-compiler",
    "firmata.py",
];

const APACHE2_REPOS: &[&str] = &["dagger", "kratu", "traceur-compiler", "firmata.py"];

/// Mount the org and repos endpoints; anything else is a 404.
async fn start_github_mock() -> MockServer {
    let server = MockServer::start().await;
    let repos: Value = serde_json::from_str(REPOS_FIXTURE).unwrap();
    let org = json!({
        "login": "google",
        "id": 1342004,
        "repos_url": format!("{}/orgs/google/repos", server.uri()),
    });

    Mock::given(method("GET"))
        .and(path("/orgs/google"))
        .respond_with(ResponseTemplate::new(200).set_body_json(org))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/orgs/google/repos"))
        .respond_with(ResponseTemplate::new(200).set_body_json(repos))
        .mount(&server)
        .await;

    server
}

fn client_for(server: &MockServer, org: &str) -> GithubOrgClient {
    let fetcher = HttpFetcher::new(&HttpFetcherConfig::default()).unwrap();
    GithubOrgClient::with_fetcher(org, Arc::new(fetcher)).with_api_base(server.uri())
}

#[tokio::test]
async fn lists_all_public_repos() {
    let server = start_github_mock().await;
    let client = client_for(&server, "google");

    assert_eq!(client.public_repos(None).await.unwrap(), EXPECTED_REPOS);
}

#[tokio::test]
async fn filters_by_license() {
    let server = start_github_mock().await;
    let client = client_for(&server, "google");

    assert_eq!(
        client.public_repos(Some("apache-2.0")).await.unwrap(),
        APACHE2_REPOS
    );
}

#[tokio::test]
async fn unknown_license_yields_nothing() {
    let server = start_github_mock().await;
    let client = client_for(&server, "google");

    assert!(
        client
            .public_repos(Some("non-existing"))
            .await
            .unwrap()
            .is_empty()
    );
}

#[tokio::test]
async fn payloads_are_fetched_once_per_client() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/orgs/google"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "repos_url": format!("{}/orgs/google/repos", server.uri()),
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/orgs/google/repos"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"name": "kratu"}])))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, "google");
    for _ in 0..3 {
        assert_eq!(client.public_repos(None).await.unwrap(), vec!["kratu"]);
    }
    assert_eq!(
        client.public_repos(Some("apache-2.0")).await.unwrap(),
        Vec::<String>::new()
    );
}

#[tokio::test]
async fn unknown_org_is_a_fetch_error() {
    let server = start_github_mock().await;
    let client = client_for(&server, "nobody");

    match client.public_repos(None).await {
        Err(ClientError::Fetch(err)) => assert_eq!(err.status(), Some(404)),
        other => panic!("expected 404 fetch error, got {other:?}"),
    }
}
