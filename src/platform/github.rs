//! GitHub platform service implementation

use crate::error::{Error, Result};
use crate::platform::PlatformService;
use crate::types::{PlatformConfig, PullRequest, RemoteFile};
use async_trait::async_trait;
use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use octocrab::Octocrab;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

#[derive(Deserialize)]
struct GitRef {
    object: GitObject,
}

#[derive(Deserialize)]
struct GitObject {
    sha: String,
}

#[derive(Deserialize)]
struct GitTree {
    tree: Vec<GitTreeEntry>,
    #[serde(default)]
    truncated: bool,
}

#[derive(Deserialize)]
struct GitTreeEntry {
    path: String,
    #[serde(rename = "type")]
    kind: String,
    sha: String,
}

#[derive(Serialize)]
struct CreateRefPayload<'a> {
    #[serde(rename = "ref")]
    reference: String,
    sha: &'a str,
}

#[derive(Serialize)]
struct UpdateRefPayload<'a> {
    sha: &'a str,
    force: bool,
}

#[derive(Serialize)]
struct PutContentPayload<'a> {
    message: &'a str,
    content: String,
    branch: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha: Option<&'a str>,
}

#[derive(Serialize)]
struct DeleteContentPayload<'a> {
    message: &'a str,
    sha: &'a str,
    branch: &'a str,
}

/// GitHub service using octocrab
pub struct GitHubService {
    client: Octocrab,
    config: PlatformConfig,
}

impl GitHubService {
    /// Create a new GitHub service
    pub fn new(token: &str, owner: String, repo: String, host: Option<String>) -> Result<Self> {
        let base_uri = host.as_ref().map(|h| format!("https://{h}/api/v3"));
        Self::build(token, owner, repo, host, base_uri.as_deref())
    }

    /// Create a service talking to an explicit API base URI
    pub fn with_base_uri(token: &str, owner: String, repo: String, base_uri: &str) -> Result<Self> {
        Self::build(token, owner, repo, None, Some(base_uri))
    }

    fn build(
        token: &str,
        owner: String,
        repo: String,
        host: Option<String>,
        base_uri: Option<&str>,
    ) -> Result<Self> {
        let mut builder = Octocrab::builder().personal_token(token.to_string());

        if let Some(uri) = base_uri {
            builder = builder
                .base_uri(uri)
                .map_err(|e| Error::RemoteAccess(e.to_string()))?;
        }

        let client = builder
            .build()
            .map_err(|e| Error::RemoteAccess(e.to_string()))?;

        Ok(Self {
            client,
            config: PlatformConfig { owner, repo, host },
        })
    }

    fn repo_route(&self, suffix: &str) -> String {
        format!("/repos/{}/{}{suffix}", self.config.owner, self.config.repo)
    }

    fn contents_route(&self, path: &str) -> String {
        self.repo_route(&format!("/contents/{}", encode_path(path)))
    }

    /// Route of a branch ref below `/git/{kind}/heads/`
    fn ref_route(&self, kind: &str, branch: &str) -> String {
        self.repo_route(&format!("/git/{kind}/heads/{}", encode_path(branch)))
    }
}

/// Helper to convert octocrab PR to our `PullRequest` type
fn pr_from_octocrab(pr: &octocrab::models::pulls::PullRequest) -> PullRequest {
    PullRequest {
        number: pr.number,
        html_url: pr
            .html_url
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_default(),
        base_ref: pr.base.ref_field.clone(),
        head_ref: pr.head.ref_field.clone(),
        title: pr.title.as_deref().unwrap_or_default().to_string(),
    }
}

/// Percent-encode each segment, keeping the `/` separators
fn encode_path(path: &str) -> String {
    path.split('/')
        .map(|seg| urlencoding::encode(seg).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

fn is_not_found(err: &octocrab::Error) -> bool {
    matches!(err, octocrab::Error::GitHub { source, .. } if source.status_code == 404)
}

#[async_trait]
impl PlatformService for GitHubService {
    async fn default_branch(&self) -> Result<String> {
        let repo = self
            .client
            .repos(&self.config.owner, &self.config.repo)
            .get()
            .await?;

        repo.default_branch.ok_or_else(|| {
            Error::RemoteAccess(format!(
                "{}/{} has no default branch",
                self.config.owner, self.config.repo
            ))
        })
    }

    async fn branch_head(&self, branch: &str) -> Result<Option<String>> {
        debug!(branch, "resolving branch head");
        let route = self.ref_route("ref", branch);
        match self.client.get::<GitRef, _, ()>(route, None).await {
            Ok(r) => Ok(Some(r.object.sha)),
            Err(e) if is_not_found(&e) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn create_branch(&self, branch: &str, sha: &str) -> Result<()> {
        debug!(branch, sha, "creating branch");
        let payload = CreateRefPayload {
            reference: format!("refs/heads/{branch}"),
            sha,
        };
        let _: serde_json::Value = self
            .client
            .post(self.repo_route("/git/refs"), Some(&payload))
            .await?;
        Ok(())
    }

    async fn reset_branch(&self, branch: &str, sha: &str) -> Result<()> {
        debug!(branch, sha, "force-updating branch");
        let payload = UpdateRefPayload { sha, force: true };
        let _: serde_json::Value = self
            .client
            .patch(
                self.ref_route("refs", branch),
                Some(&payload),
            )
            .await?;
        Ok(())
    }

    async fn list_files(&self, commit: &str, dir: &str) -> Result<Vec<RemoteFile>> {
        debug!(commit, dir, "listing remote tree");
        let route = self.repo_route(&format!("/git/trees/{}", urlencoding::encode(commit)));
        let tree: GitTree = self
            .client
            .get(route, Some(&[("recursive", "1")]))
            .await?;

        if tree.truncated {
            warn!(commit, "tree listing truncated by GitHub");
            return Err(Error::RemoteAccess(format!(
                "tree of {commit} is too large to list in one request"
            )));
        }

        let prefix = if dir.is_empty() {
            String::new()
        } else {
            format!("{dir}/")
        };

        Ok(tree
            .tree
            .into_iter()
            .filter(|e| e.kind == "blob" && e.path.starts_with(&prefix))
            .map(|e| RemoteFile {
                path: e.path,
                sha: e.sha,
            })
            .collect())
    }

    async fn write_file(
        &self,
        branch: &str,
        path: &str,
        content: &[u8],
        message: &str,
        previous_sha: Option<&str>,
    ) -> Result<()> {
        debug!(branch, path, update = previous_sha.is_some(), "writing file");
        let payload = PutContentPayload {
            message,
            content: BASE64.encode(content),
            branch,
            sha: previous_sha,
        };
        let _: serde_json::Value = self
            .client
            .put(self.contents_route(path), Some(&payload))
            .await?;
        Ok(())
    }

    async fn delete_file(
        &self,
        branch: &str,
        path: &str,
        sha: &str,
        message: &str,
    ) -> Result<()> {
        debug!(branch, path, "deleting file");
        let payload = DeleteContentPayload {
            message,
            sha,
            branch,
        };
        let _: serde_json::Value = self
            .client
            .delete(self.contents_route(path), Some(&payload))
            .await?;
        Ok(())
    }

    async fn create_pr(
        &self,
        head: &str,
        base: &str,
        title: &str,
        body: &str,
    ) -> Result<PullRequest> {
        debug!(head, base, "creating pull request");
        let pr = self
            .client
            .pulls(&self.config.owner, &self.config.repo)
            .create(title, head, base)
            .body(body)
            .send()
            .await?;

        Ok(pr_from_octocrab(&pr))
    }

    async fn find_existing_pr(&self, head_branch: &str) -> Result<Option<PullRequest>> {
        debug!(head_branch, "finding existing PR");
        let head = format!("{}:{}", &self.config.owner, head_branch);

        let prs = self
            .client
            .pulls(&self.config.owner, &self.config.repo)
            .list()
            .head(head)
            .state(octocrab::params::State::Open)
            .send()
            .await?;

        Ok(prs.items.first().map(pr_from_octocrab))
    }

    fn config(&self) -> &PlatformConfig {
        &self.config
    }
}
