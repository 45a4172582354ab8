//! GitHub repository passthrough
//!
//! Fetches the newest public repositories of a GitHub user and returns the
//! upstream JSON untouched.

use std::time::Duration;

use serde_json::Value as JsonValue;
use tracing::{debug, warn};

use crate::config::GithubArgs;
use crate::types::{PeerlinkError, Result};

/// GitHub's own username limit
const MAX_USERNAME_LEN: usize = 39;

pub struct GithubClient {
    http_client: reqwest::Client,
    api_url: String,
    credentials: Option<(String, String)>,
}

impl GithubClient {
    pub fn new(args: &GithubArgs, timeout: Duration) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("peerlink/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_default();

        let credentials = match (&args.github_client_id, &args.github_client_secret) {
            (Some(id), Some(secret)) if !id.is_empty() && !secret.is_empty() => {
                Some((id.clone(), secret.clone()))
            }
            _ => None,
        };

        Self {
            http_client,
            api_url: args.github_api_url.trim_end_matches('/').to_string(),
            credentials,
        }
    }

    /// Listing endpoint for `username` (five newest repositories)
    pub fn repos_url(&self, username: &str) -> String {
        format!(
            "{}/users/{}/repos?per_page=5&sort=created:asc",
            self.api_url, username
        )
    }

    pub async fn fetch_repos(&self, username: &str) -> Result<JsonValue> {
        let username = username.trim();
        if !is_github_username(username) {
            return Err(PeerlinkError::InvalidIdentifier(username.to_string()));
        }

        let url = self.repos_url(username);
        debug!("Fetching GitHub repos: {}", url);

        let mut request = self
            .http_client
            .get(&url)
            .header("accept", "application/vnd.github+json");
        if let Some((id, secret)) = &self.credentials {
            request = request.query(&[("client_id", id), ("client_secret", secret)]);
        }

        let response = request
            .send()
            .await
            .map_err(|e| PeerlinkError::Upstream(format!("GitHub request failed: {e}")))?;

        if !response.status().is_success() {
            warn!("GitHub returned {} for user {}", response.status(), username);
            return Err(PeerlinkError::NotFound("No Github profile found".into()));
        }

        response
            .json::<JsonValue>()
            .await
            .map_err(|e| PeerlinkError::Upstream(format!("Invalid GitHub response: {e}")))
    }
}

/// Alphanumerics and single inner hyphens, at most 39 characters
pub fn is_github_username(name: &str) -> bool {
    !name.is_empty()
        && name.len() <= MAX_USERNAME_LEN
        && !name.starts_with('-')
        && !name.ends_with('-')
        && !name.contains("--")
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use http_body_util::Full;
    use hyper::body::Incoming;
    use hyper::server::conn::http1;
    use hyper::service::service_fn;
    use hyper::{Request, Response, StatusCode};
    use hyper_util::rt::TokioIo;
    use std::convert::Infallible;
    use std::net::SocketAddr;
    use tokio::net::TcpListener;

    // Keys in serde_json's sorted order so the text survives a reserialize
    const REPOS: &str = concat!(
        r#"[{"extra":{"a":[1,2]},"html_url":"https://github.com/octocat/hello-world","#,
        r#""name":"hello-world","stargazers_count":7}]"#
    );

    /// Local stand-in for the GitHub API: `octocat` has repos, everyone else is unknown
    async fn fake_github() -> SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                tokio::spawn(async move {
                    let service = service_fn(|req: Request<Incoming>| async move {
                        let listing = req.uri().path() == "/users/octocat/repos"
                            && req.uri().query() == Some("per_page=5&sort=created:asc");
                        let (status, body) = if listing {
                            (StatusCode::OK, REPOS)
                        } else {
                            (StatusCode::NOT_FOUND, r#"{"message":"Not Found"}"#)
                        };
                        let response = Response::builder()
                            .status(status)
                            .header("content-type", "application/json")
                            .body(Full::new(Bytes::from_static(body.as_bytes())))
                            .unwrap();
                        Ok::<_, Infallible>(response)
                    });
                    let _ = http1::Builder::new()
                        .serve_connection(TokioIo::new(stream), service)
                        .await;
                });
            }
        });

        addr
    }

    fn args(api_url: &str) -> GithubArgs {
        GithubArgs {
            github_api_url: api_url.to_string(),
            github_client_id: None,
            github_client_secret: None,
        }
    }

    #[test]
    fn test_repos_url() {
        let client = GithubClient::new(&args("https://api.github.com/"), Duration::from_secs(1));
        assert_eq!(
            client.repos_url("octocat"),
            "https://api.github.com/users/octocat/repos?per_page=5&sort=created:asc"
        );
    }

    #[test]
    fn test_username_rules() {
        assert!(is_github_username("octocat"));
        assert!(is_github_username("ada-lovelace"));
        assert!(!is_github_username(""));
        assert!(!is_github_username("-ada"));
        assert!(!is_github_username("ada--l"));
        assert!(!is_github_username("ada/../admin"));
        assert!(!is_github_username(&"a".repeat(40)));
    }

    #[test]
    fn test_partial_credentials_ignored() {
        let mut github = args("https://api.github.com");
        github.github_client_id = Some("id".into());
        let client = GithubClient::new(&github, Duration::from_secs(1));
        assert!(client.credentials.is_none());
    }

    #[tokio::test]
    async fn test_invalid_username_makes_no_call() {
        // Unroutable base URL: reaching the network would surface as Upstream
        let client = GithubClient::new(&args("http://127.0.0.1:9"), Duration::from_millis(50));
        let err = client.fetch_repos("bad name").await.unwrap_err();
        assert!(matches!(err, PeerlinkError::InvalidIdentifier(_)));
    }

    #[tokio::test]
    async fn test_unreachable_upstream_is_upstream_error() {
        let client = GithubClient::new(&args("http://127.0.0.1:9"), Duration::from_millis(200));
        let err = client.fetch_repos("octocat").await.unwrap_err();
        assert!(matches!(err, PeerlinkError::Upstream(_)));
    }

    #[tokio::test]
    async fn test_repos_passed_through_unchanged() {
        let addr = fake_github().await;
        let client = GithubClient::new(&args(&format!("http://{addr}")), Duration::from_secs(2));

        let repos = client.fetch_repos("octocat").await.unwrap();
        let expected: JsonValue = serde_json::from_str(REPOS).unwrap();
        assert_eq!(repos, expected);
        assert_eq!(serde_json::to_string(&repos).unwrap(), REPOS);
    }

    #[tokio::test]
    async fn test_unknown_github_user_is_not_found() {
        let addr = fake_github().await;
        let client = GithubClient::new(&args(&format!("http://{addr}")), Duration::from_secs(2));

        let err = client.fetch_repos("ghost").await.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert!(matches!(
            err,
            PeerlinkError::NotFound(ref msg) if msg == "No Github profile found"
        ));
    }
}
