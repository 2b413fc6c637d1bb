//! GitHub releases API client for foundry-release.
//!
//! A blocking client for the four REST endpoints a release run touches:
//! create a release, fetch the latest release, list commits since a
//! timestamp, and upload a release asset.
//!
//! # Example
//!
//! ```no_run
//! use foundry_release_github::{GitHubClient, NewRelease, Repository};
//!
//! let client = GitHubClient::new("https://api.github.com", "ghp_example")?;
//! let repo = Repository::new("acme", "widget");
//! let release = client.create_release(&repo, &NewRelease::draft("v1.0.0", "v1.0.0", "Release v1.0.0"))?;
//! client.upload_asset(&release, "widget.zip", "application/zip", std::fs::read("widget.zip")?)?;
//! # Ok::<(), anyhow::Error>(())
//! ```

use std::fmt;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::Url;
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::{ACCEPT, CONTENT_TYPE, LINK};
use serde::{Deserialize, Serialize};

/// Default REST API endpoint
pub const GITHUB_API: &str = "https://api.github.com";

/// Default web endpoint, used for release download URLs
pub const GITHUB_SERVER: &str = "https://github.com";

/// Default timeout for JSON API requests; uploads are bounded only while
/// connecting
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Largest page the commits endpoint returns; only one page is fetched
pub const COMMITS_PAGE_SIZE: u32 = 100;

/// REST API version pinned through `X-GitHub-Api-Version`
pub const API_VERSION: &str = "2022-11-28";

/// Default user agent for API requests
pub const USER_AGENT: &str = concat!("foundry-release/", env!("CARGO_PKG_VERSION"));

const MEDIA_TYPE: &str = "application/vnd.github+json";

/// An `owner/name` repository reference
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    pub owner: String,
    pub name: String,
}

impl Repository {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }

    /// Parse the `owner/name` form used by `GITHUB_REPOSITORY`
    pub fn parse(slug: &str) -> Option<Self> {
        let (owner, name) = slug.trim().split_once('/')?;
        if owner.is_empty() || name.is_empty() || name.contains('/') {
            return None;
        }
        Some(Self::new(owner, name))
    }
}

impl fmt::Display for Repository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Request body for creating a release
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewRelease {
    pub tag_name: String,
    pub name: String,
    pub body: String,
    pub draft: bool,
}

impl NewRelease {
    pub fn draft(tag_name: &str, name: &str, body: &str) -> Self {
        Self {
            tag_name: tag_name.to_string(),
            name: name.to_string(),
            body: body.to_string(),
            draft: true,
        }
    }
}

/// A release as returned by the API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Release {
    pub id: u64,
    pub tag_name: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub draft: bool,
    pub html_url: String,
    /// Hypermedia template, e.g. `https://uploads.github.com/.../assets{?name,label}`
    pub upload_url: String,
    pub created_at: DateTime<Utc>,
}

/// An uploaded release asset
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReleaseAsset {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub size: u64,
    pub browser_download_url: String,
}

/// One entry of the commit listing, reduced to what a changelog needs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitSummary {
    pub sha: String,
    pub author: String,
    pub message: String,
}

/// First page of a commit listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitPage {
    pub commits: Vec<CommitSummary>,
    /// The API linked a further page, so commits were left out
    pub has_next_page: bool,
}

#[derive(Debug, Deserialize)]
struct CommitEntry {
    sha: String,
    commit: CommitDetail,
}

#[derive(Debug, Deserialize)]
struct CommitDetail {
    author: Option<CommitAuthor>,
    message: String,
}

#[derive(Debug, Deserialize)]
struct CommitAuthor {
    name: String,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// Blocking GitHub REST client authenticated with a token
#[derive(Debug, Clone)]
pub struct GitHubClient {
    api_base: String,
    token: String,
    timeout: Duration,
    client: Client,
}

impl GitHubClient {
    pub fn new(api_base: &str, token: &str) -> Result<Self> {
        Self::with_timeout(api_base, token, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// `timeout` caps each JSON API request end to end; asset uploads only
    /// get it as a connect timeout.
    pub fn with_timeout(api_base: &str, token: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(None::<Duration>)
            .connect_timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            api_base: api_base.trim_end_matches('/').to_string(),
            token: token.to_string(),
            timeout,
            client,
        })
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .bearer_auth(&self.token)
            .header(ACCEPT, MEDIA_TYPE)
            .header("X-GitHub-Api-Version", API_VERSION)
    }

    fn api_call(&self, request: RequestBuilder) -> RequestBuilder {
        self.authorized(request).timeout(self.timeout)
    }

    fn repo_url(&self, repo: &Repository, path: &str) -> String {
        format!("{}/repos/{}/{}/{}", self.api_base, repo.owner, repo.name, path)
    }

    /// `POST /repos/{owner}/{repo}/releases`
    pub fn create_release(&self, repo: &Repository, release: &NewRelease) -> Result<Release> {
        let url = self.repo_url(repo, "releases");
        let response = self
            .api_call(self.client.post(&url))
            .json(release)
            .send()
            .with_context(|| format!("failed to send create-release request for {repo}"))?;

        let response = check_status(response, "create release")?;
        response
            .json()
            .context("failed to parse create-release response")
    }

    /// `GET /repos/{owner}/{repo}/releases/latest`; `None` when the
    /// repository has no published release
    pub fn latest_release(&self, repo: &Repository) -> Result<Option<Release>> {
        let url = self.repo_url(repo, "releases/latest");
        let response = self
            .api_call(self.client.get(&url))
            .send()
            .with_context(|| format!("failed to send latest-release request for {repo}"))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let response = check_status(response, "fetch latest release")?;
        let release = response
            .json()
            .context("failed to parse latest-release response")?;
        Ok(Some(release))
    }

    /// `GET /repos/{owner}/{repo}/commits?since=...&per_page=...`
    ///
    /// Only the first page is requested, so at most `per_page` commits come
    /// back, in the order the API lists them. A `rel="next"` link in the
    /// response marks the page as incomplete.
    pub fn list_commits_since(
        &self,
        repo: &Repository,
        since: DateTime<Utc>,
        per_page: u32,
    ) -> Result<CommitPage> {
        let since = since.to_rfc3339_opts(SecondsFormat::Secs, true);
        let per_page = per_page.clamp(1, COMMITS_PAGE_SIZE).to_string();
        let url = Url::parse_with_params(
            &self.repo_url(repo, "commits"),
            &[("since", since.as_str()), ("per_page", per_page.as_str())],
        )
        .context("failed to build commits URL")?;

        let response = self
            .api_call(self.client.get(url))
            .send()
            .with_context(|| format!("failed to send list-commits request for {repo}"))?;

        let response = check_status(response, "list commits")?;
        let has_next_page = has_next_link(&response);
        let entries: Vec<CommitEntry> = response
            .json()
            .context("failed to parse list-commits response")?;

        let commits = entries
            .into_iter()
            .map(|entry| CommitSummary {
                sha: entry.sha,
                author: entry
                    .commit
                    .author
                    .map(|a| a.name)
                    .unwrap_or_else(|| "unknown".to_string()),
                message: entry.commit.message,
            })
            .collect();

        Ok(CommitPage {
            commits,
            has_next_page,
        })
    }

    /// Upload `data` as asset `name` to the release's upload URL
    pub fn upload_asset(
        &self,
        release: &Release,
        name: &str,
        content_type: &str,
        data: Vec<u8>,
    ) -> Result<ReleaseAsset> {
        let url = upload_endpoint(&release.upload_url, name)?;
        let response = self
            .authorized(self.client.post(url))
            .header(CONTENT_TYPE, content_type)
            .body(data)
            .send()
            .with_context(|| format!("failed to upload release asset {name}"))?;

        let response = check_status(response, "upload release asset")?;
        response
            .json()
            .with_context(|| format!("failed to parse upload response for {name}"))
    }
}

/// Expand a release `upload_url` template into the endpoint for `name`
pub fn upload_endpoint(upload_url: &str, name: &str) -> Result<Url> {
    let base = upload_url
        .split_once('{')
        .map(|(base, _)| base)
        .unwrap_or(upload_url);
    Url::parse_with_params(base, &[("name", name)])
        .with_context(|| format!("invalid release upload URL: {upload_url}"))
}

/// Public download URL of a release asset
pub fn release_download_url(server: &str, repo: &Repository, tag: &str, asset: &str) -> String {
    format!(
        "{}/{}/{}/releases/download/{}/{}",
        server.trim_end_matches('/'),
        repo.owner,
        repo.name,
        tag,
        asset
    )
}

/// Whether the `Link` header points at a next page
fn has_next_link(response: &Response) -> bool {
    response
        .headers()
        .get_all(LINK)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .any(|link| {
            link.split(';')
                .skip(1)
                .any(|param| param.trim().replace(' ', "") == "rel=\"next\"")
        })
}

fn check_status(response: Response, action: &str) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().unwrap_or_default();
    let detail = serde_json::from_str::<ApiErrorBody>(&body)
        .map(|e| e.message)
        .unwrap_or(body);
    if detail.trim().is_empty() {
        bail!("failed to {action}: GitHub returned {status}");
    }
    bail!("failed to {action}: GitHub returned {status}: {}", detail.trim())
}

#[cfg(test)]
mod tests {
    use std::thread;

    use tiny_http::{Header, Response, Server, StatusCode};

    use super::*;

    #[derive(Debug)]
    struct Captured {
        method: String,
        url: String,
        headers: Vec<(String, String)>,
        body: Vec<u8>,
    }

    impl Captured {
        fn header(&self, name: &str) -> Option<&str> {
            self.headers
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(name))
                .map(|(_, v)| v.as_str())
        }
    }

    struct Canned {
        status: u16,
        body: String,
        headers: Vec<(&'static str, String)>,
        delay: Duration,
    }

    impl Canned {
        fn new(status: u16, body: impl Into<String>) -> Self {
            Self {
                status,
                body: body.into(),
                headers: Vec::new(),
                delay: Duration::ZERO,
            }
        }

        fn header(mut self, name: &'static str, value: impl Into<String>) -> Self {
            self.headers.push((name, value.into()));
            self
        }

        fn after(mut self, delay: Duration) -> Self {
            self.delay = delay;
            self
        }
    }

    /// Serve one canned response per expected request; the responses may
    /// embed the server's own base URL.
    fn spawn_api(
        responses: impl FnOnce(&str) -> Vec<(u16, String)>,
    ) -> (String, thread::JoinHandle<Vec<Captured>>) {
        spawn_canned(|base| {
            responses(base)
                .into_iter()
                .map(|(status, body)| Canned::new(status, body))
                .collect()
        })
    }

    fn spawn_canned(
        responses: impl FnOnce(&str) -> Vec<Canned>,
    ) -> (String, thread::JoinHandle<Vec<Captured>>) {
        let server = Server::http("127.0.0.1:0").expect("server");
        let base_url = format!("http://{}", server.server_addr());
        let responses = responses(&base_url);
        let handle = thread::spawn(move || {
            let mut seen = Vec::new();
            for canned in responses {
                let mut req = server.recv().expect("request");
                let mut bytes = Vec::new();
                req.as_reader().read_to_end(&mut bytes).expect("body");
                seen.push(Captured {
                    method: req.method().to_string(),
                    url: req.url().to_string(),
                    headers: req
                        .headers()
                        .iter()
                        .map(|h| (h.field.to_string(), h.value.to_string()))
                        .collect(),
                    body: bytes,
                });
                thread::sleep(canned.delay);
                let mut resp = Response::from_string(canned.body)
                    .with_status_code(StatusCode(canned.status))
                    .with_header(
                        Header::from_bytes("Content-Type", "application/json").expect("header"),
                    );
                for (name, value) in &canned.headers {
                    resp = resp.with_header(
                        Header::from_bytes(name.as_bytes(), value.as_bytes()).expect("header"),
                    );
                }
                // A client that gave up leaves nobody to answer.
                let _ = req.respond(resp);
            }
            seen
        });
        (base_url, handle)
    }

    fn release_json(base_url: &str) -> String {
        format!(
            r#"{{
                "id": 42,
                "tag_name": "v2.0.0",
                "name": "v2.0.0",
                "draft": true,
                "html_url": "https://github.com/acme/widget/releases/tag/v2.0.0",
                "upload_url": "{base_url}/repos/acme/widget/releases/42/assets{{?name,label}}",
                "created_at": "2024-03-01T12:00:00Z",
                "author": {{"login": "octocat"}}
            }}"#
        )
    }

    fn repo() -> Repository {
        Repository::new("acme", "widget")
    }

    #[test]
    fn create_release_posts_draft_with_token() {
        let (base, handle) = spawn_api(|base| vec![(201, release_json(base))]);

        let client = GitHubClient::new(&base, "t0ken").expect("client");
        let release = client
            .create_release(&repo(), &NewRelease::draft("v2.0.0", "v2.0.0", "Release v2.0.0"))
            .expect("create");
        let seen = handle.join().expect("join");

        assert_eq!(seen[0].method, "POST");
        assert_eq!(seen[0].url, "/repos/acme/widget/releases");
        assert_eq!(seen[0].header("Authorization"), Some("Bearer t0ken"));

        let sent: serde_json::Value = serde_json::from_slice(&seen[0].body).expect("json body");
        assert_eq!(sent["tag_name"], "v2.0.0");
        assert_eq!(sent["name"], "v2.0.0");
        assert_eq!(sent["body"], "Release v2.0.0");
        assert_eq!(sent["draft"], true);

        assert_eq!(release.id, 42);
        assert!(release.draft);
        assert_eq!(release.created_at.to_rfc3339(), "2024-03-01T12:00:00+00:00");
    }

    #[test]
    fn create_release_surfaces_api_message() {
        let (base, handle) = spawn_api(|_| {
            vec![(
                422,
                r#"{"message":"Validation Failed","errors":[{"code":"already_exists"}]}"#
                    .to_string(),
            )]
        });

        let client = GitHubClient::new(&base, "t0ken").expect("client");
        let err = client
            .create_release(&repo(), &NewRelease::draft("v1.0.0", "v1.0.0", "Release v1.0.0"))
            .expect_err("must fail");
        handle.join().expect("join");

        let msg = format!("{err:#}");
        assert!(msg.contains("failed to create release"));
        assert!(msg.contains("422"));
        assert!(msg.contains("Validation Failed"));
    }

    #[test]
    fn latest_release_none_on_404() {
        let (base, handle) = spawn_api(|_| vec![(404, r#"{"message":"Not Found"}"#.to_string())]);

        let client = GitHubClient::new(&base, "t0ken").expect("client");
        let latest = client.latest_release(&repo()).expect("latest");
        let seen = handle.join().expect("join");

        assert!(latest.is_none());
        assert_eq!(seen[0].url, "/repos/acme/widget/releases/latest");
        assert_eq!(seen[0].header("Accept"), Some(MEDIA_TYPE));
        assert_eq!(seen[0].header("X-GitHub-Api-Version"), Some(API_VERSION));
    }

    #[test]
    fn latest_release_parses_created_at() {
        let (base, handle) = spawn_api(|_| vec![(200, release_json("https://uploads.example"))]);

        let client = GitHubClient::new(&base, "t0ken").expect("client");
        let latest = client.latest_release(&repo()).expect("latest").expect("some");
        handle.join().expect("join");

        assert_eq!(latest.tag_name, "v2.0.0");
        assert_eq!(
            latest.created_at,
            DateTime::parse_from_rfc3339("2024-03-01T12:00:00Z")
                .expect("ts")
                .with_timezone(&Utc)
        );
    }

    #[test]
    fn list_commits_since_sends_window_and_keeps_order() {
        let body = r#"[
            {"sha":"c3","commit":{"author":{"name":"Ada"},"message":"update docs"}},
            {"sha":"c2","commit":{"author":{"name":"Linus"},"message":"add feature\n\nlong body"}},
            {"sha":"c1","commit":{"author":null,"message":"fix bug"}}
        ]"#;
        let (base, handle) = spawn_api(|_| vec![(200, body.to_string())]);

        let since = DateTime::parse_from_rfc3339("2024-03-01T12:00:00Z")
            .expect("ts")
            .with_timezone(&Utc);
        let client = GitHubClient::new(&base, "t0ken").expect("client");
        let page = client
            .list_commits_since(&repo(), since, COMMITS_PAGE_SIZE)
            .expect("commits");
        let seen = handle.join().expect("join");
        let commits = page.commits;

        assert!(!page.has_next_page);
        assert_eq!(
            seen[0].url,
            "/repos/acme/widget/commits?since=2024-03-01T12%3A00%3A00Z&per_page=100"
        );
        let shas: Vec<&str> = commits.iter().map(|c| c.sha.as_str()).collect();
        assert_eq!(shas, vec!["c3", "c2", "c1"]);
        assert_eq!(commits[1].message, "add feature\n\nlong body");
        assert_eq!(commits[2].author, "unknown");
    }

    #[test]
    fn list_commits_clamps_page_size() {
        let (base, handle) = spawn_api(|_| vec![(200, "[]".to_string())]);

        let client = GitHubClient::new(&base, "t0ken").expect("client");
        let page = client
            .list_commits_since(&repo(), Utc::now(), 500)
            .expect("commits");
        let seen = handle.join().expect("join");

        assert!(page.commits.is_empty());
        assert!(seen[0].url.ends_with("per_page=100"));
    }

    fn commits_json(count: usize) -> String {
        let entries: Vec<String> = (0..count)
            .map(|i| format!(r#"{{"sha":"s{i}","commit":{{"author":{{"name":"Dev"}},"message":"m{i}"}}}}"#))
            .collect();
        format!("[{}]", entries.join(","))
    }

    #[test]
    fn exactly_one_full_page_has_no_next_page() {
        let (base, handle) = spawn_canned(|_| {
            vec![Canned::new(200, commits_json(100)).header(
                "Link",
                r#"<https://api.github.com/repos/acme/widget/commits?page=1>; rel="first""#,
            )]
        });

        let client = GitHubClient::new(&base, "t0ken").expect("client");
        let page = client
            .list_commits_since(&repo(), Utc::now(), COMMITS_PAGE_SIZE)
            .expect("commits");
        handle.join().expect("join");

        assert_eq!(page.commits.len(), 100);
        assert!(!page.has_next_page);
    }

    #[test]
    fn next_link_marks_page_incomplete() {
        let (base, handle) = spawn_canned(|_| {
            vec![Canned::new(200, commits_json(100)).header(
                "Link",
                r#"<https://api.github.com/repositories/1/commits?page=2>; rel="next", <https://api.github.com/repositories/1/commits?page=3>; rel="last""#,
            )]
        });

        let client = GitHubClient::new(&base, "t0ken").expect("client");
        let page = client
            .list_commits_since(&repo(), Utc::now(), COMMITS_PAGE_SIZE)
            .expect("commits");
        handle.join().expect("join");

        assert_eq!(page.commits.len(), 100);
        assert!(page.has_next_page);
    }

    #[test]
    fn slow_upload_is_not_cut_off_by_api_timeout() {
        let asset = r#"{"id":9,"name":"widget.zip","size":4,"browser_download_url":"https://github.com/acme/widget/releases/download/v2.0.0/widget.zip"}"#;
        let (base, handle) = spawn_canned(|_| {
            vec![Canned::new(201, asset).after(Duration::from_millis(1500))]
        });
        let release: Release = serde_json::from_str(&release_json(&base)).expect("release");

        let client =
            GitHubClient::with_timeout(&base, "t0ken", Duration::from_secs(1)).expect("client");
        let uploaded = client
            .upload_asset(&release, "widget.zip", "application/zip", b"PK\x03\x04".to_vec())
            .expect("upload outlives the API timeout");
        handle.join().expect("join");

        assert_eq!(uploaded.id, 9);
    }

    #[test]
    fn slow_api_call_times_out() {
        let (base, handle) = spawn_canned(|base| {
            vec![Canned::new(201, release_json(base)).after(Duration::from_millis(1500))]
        });

        let client =
            GitHubClient::with_timeout(&base, "t0ken", Duration::from_secs(1)).expect("client");
        let err = client
            .create_release(&repo(), &NewRelease::draft("v2.0.0", "v2.0.0", "Release v2.0.0"))
            .expect_err("must time out");
        handle.join().expect("join");

        assert!(format!("{err:#}").contains("failed to send create-release request"));
    }

    #[test]
    fn upload_asset_posts_bytes_to_expanded_upload_url() {
        let asset = r#"{"id":7,"name":"widget.zip","size":4,"browser_download_url":"https://github.com/acme/widget/releases/download/v2.0.0/widget.zip"}"#;
        let (base, handle) = spawn_api(|_| vec![(201, asset.to_string())]);
        let release: Release = serde_json::from_str(&release_json(&base)).expect("release");

        let client = GitHubClient::new(&base, "t0ken").expect("client");
        let uploaded = client
            .upload_asset(&release, "widget.zip", "application/zip", b"PK\x03\x04".to_vec())
            .expect("upload");
        let seen = handle.join().expect("join");

        assert_eq!(seen[0].method, "POST");
        assert_eq!(seen[0].url, "/repos/acme/widget/releases/42/assets?name=widget.zip");
        assert_eq!(seen[0].header("Content-Type"), Some("application/zip"));
        assert_eq!(seen[0].body, b"PK\x03\x04".to_vec());
        assert_eq!(uploaded.id, 7);
        assert_eq!(uploaded.name, "widget.zip");
    }

    #[test]
    fn upload_endpoint_strips_template() {
        let url = upload_endpoint(
            "https://uploads.github.com/repos/acme/widget/releases/1/assets{?name,label}",
            "system.json",
        )
        .expect("url");
        assert_eq!(
            url.as_str(),
            "https://uploads.github.com/repos/acme/widget/releases/1/assets?name=system.json"
        );
    }

    #[test]
    fn upload_endpoint_rejects_garbage() {
        assert!(upload_endpoint("not a url", "a.zip").is_err());
    }

    #[test]
    fn release_download_url_format() {
        assert_eq!(
            release_download_url("https://github.com/", &repo(), "v1.2.3", "widget.zip"),
            "https://github.com/acme/widget/releases/download/v1.2.3/widget.zip"
        );
    }

    #[test]
    fn repository_parse_and_display() {
        let parsed = Repository::parse("acme/widget").expect("parse");
        assert_eq!(parsed, repo());
        assert_eq!(parsed.to_string(), "acme/widget");
        assert!(Repository::parse("acme").is_none());
        assert!(Repository::parse("/widget").is_none());
        assert!(Repository::parse("a/b/c").is_none());
    }

    #[test]
    fn client_trims_trailing_slash() {
        let (base, handle) = spawn_api(|_| vec![(404, r#"{"message":"Not Found"}"#.to_string())]);

        let client = GitHubClient::new(&format!("{base}/"), "t0ken").expect("client");
        client.latest_release(&repo()).expect("latest");
        let seen = handle.join().expect("join");

        assert_eq!(seen[0].url, "/repos/acme/widget/releases/latest");
    }

    #[test]
    fn user_agent_includes_version() {
        assert!(USER_AGENT.starts_with("foundry-release/"));
        assert!(USER_AGENT.contains(env!("CARGO_PKG_VERSION")));
    }
}
