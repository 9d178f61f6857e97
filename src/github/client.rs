use crate::github::models::{
    BranchDetailResponse, CommitInfo, ListedBranch, PullRequestResponse, PullRequestSummary, RepoId,
};
use crate::infrastructure::error::ReportError;
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::debug;

pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// 分支保护状态过滤
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProtectedFilter {
    /// 只列出未受保护的分支
    #[default]
    Unprotected,
    /// 只列出受保护的分支
    Protected,
    /// 不过滤
    All,
}

impl ProtectedFilter {
    /// 对应的 `protected` 查询参数，`All` 时不带该参数
    pub fn query_value(&self) -> Option<&'static str> {
        match self {
            ProtectedFilter::Unprotected => Some("false"),
            ProtectedFilter::Protected => Some("true"),
            ProtectedFilter::All => None,
        }
    }
}

impl std::str::FromStr for ProtectedFilter {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "unprotected" | "false" => Ok(ProtectedFilter::Unprotected),
            "protected" | "true" => Ok(ProtectedFilter::Protected),
            "all" => Ok(ProtectedFilter::All),
            other => Err(ReportError::config(format!(
                "Unknown protected filter: {} (expected unprotected, protected or all)",
                other
            ))),
        }
    }
}

/// 分支列表请求参数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListOptions {
    pub per_page: u8,
    pub protected: ProtectedFilter,
}

impl Default for ListOptions {
    fn default() -> Self {
        Self {
            per_page: 100,
            protected: ProtectedFilter::Unprotected,
        }
    }
}

/// 托管平台的三个只读操作
#[async_trait]
pub trait BranchSource: Send + Sync {
    /// 列出仓库分支（仅第一页）
    async fn list_branches(
        &self,
        repo: &RepoId,
        options: &ListOptions,
    ) -> Result<Vec<ListedBranch>, ReportError>;

    /// 获取分支最后一次提交的信息
    async fn get_branch(&self, repo: &RepoId, branch: &str) -> Result<CommitInfo, ReportError>;

    /// 列出 head 为 `owner:branch` 的所有状态的拉取请求
    async fn list_pull_requests(
        &self,
        repo: &RepoId,
        branch: &str,
    ) -> Result<Vec<PullRequestSummary>, ReportError>;
}

/// GitHub REST API 客户端
pub struct GitHubClient {
    client: Client,
    api_url: String,
    token: Option<String>,
}

impl GitHubClient {
    pub fn new(client: Client, api_url: impl Into<String>, token: Option<String>) -> Self {
        Self {
            client,
            api_url: api_url.into().trim_end_matches('/').to_string(),
            token: token.filter(|t| !t.trim().is_empty()),
        }
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    fn repo_url(&self, repo: &RepoId) -> String {
        format!(
            "{}/repos/{}/{}",
            self.api_url,
            urlencoding::encode(&repo.owner),
            urlencoding::encode(&repo.name)
        )
    }

    /// 发送 GET 请求并解码 JSON，非 2xx 状态转换为 `ReportError::Api`
    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<T, ReportError> {
        let mut request = self.client.get(url).query(query);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        debug!(url, ?query, "GET");
        let response = request
            .send()
            .await
            .map_err(|e| ReportError::network(format!("Request failed: {}", e), Some(url.to_string())))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(ReportError::api(status.as_u16(), url, error_message(&text, status)));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| ReportError::network(format!("Failed to read body: {}", e), Some(url.to_string())))?;
        serde_json::from_slice(&body).map_err(|e| ReportError::parsing(e.to_string(), url))
    }
}

/// GitHub 错误体形如 `{"message": "..."}`，取不到时退回到状态描述
fn error_message(body: &str, status: reqwest::StatusCode) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string))
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("unexpected status")
                .to_string()
        })
}

#[async_trait]
impl BranchSource for GitHubClient {
    async fn list_branches(
        &self,
        repo: &RepoId,
        options: &ListOptions,
    ) -> Result<Vec<ListedBranch>, ReportError> {
        let url = format!("{}/branches", self.repo_url(repo));
        let per_page = options.per_page.to_string();
        let mut query = vec![("per_page", per_page.as_str())];
        if let Some(protected) = options.protected.query_value() {
            query.push(("protected", protected));
        }
        self.get_json(&url, &query).await
    }

    async fn get_branch(&self, repo: &RepoId, branch: &str) -> Result<CommitInfo, ReportError> {
        let url = format!(
            "{}/branches/{}",
            self.repo_url(repo),
            urlencoding::encode(branch)
        );
        let detail: BranchDetailResponse = self.get_json(&url, &[]).await?;
        Ok(detail.into())
    }

    async fn list_pull_requests(
        &self,
        repo: &RepoId,
        branch: &str,
    ) -> Result<Vec<PullRequestSummary>, ReportError> {
        let url = format!("{}/pulls", self.repo_url(repo));
        let head = repo.head_ref(branch);
        let prs: Vec<PullRequestResponse> = self
            .get_json(&url, &[("head", head.as_str()), ("state", "all")])
            .await?;
        Ok(prs.into_iter().map(PullRequestSummary::from).collect())
    }
}
