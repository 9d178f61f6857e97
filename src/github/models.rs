use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// 仓库标识
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoId {
    pub owner: String,
    pub name: String,
}

impl RepoId {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }

    /// 拉取请求 `head` 过滤参数：`owner:branch`
    pub fn head_ref(&self, branch: &str) -> String {
        format!("{}:{}", self.owner, branch)
    }
}

impl std::fmt::Display for RepoId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// 分支列表接口返回的条目
///
/// `commit` 保持为原始 JSON，只在降级时用来尽力取出提交日期。
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ListedBranch {
    pub name: String,
    #[serde(default)]
    pub commit: Value,
}

impl ListedBranch {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            commit: Value::Null,
        }
    }

    /// 从列表条目中尽力读取 `commit.commit.author.date`，任何结构不符都返回 None
    pub fn listed_commit_date(&self) -> Option<DateTime<Utc>> {
        self.commit
            .pointer("/commit/author/date")
            .and_then(Value::as_str)
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|d| d.with_timezone(&Utc))
    }
}

/// 分支详情接口响应
#[derive(Debug, Deserialize)]
pub struct BranchDetailResponse {
    pub name: String,
    pub commit: BranchCommit,
}

#[derive(Debug, Deserialize)]
pub struct BranchCommit {
    pub sha: String,
    pub commit: GitCommit,
}

#[derive(Debug, Deserialize)]
pub struct GitCommit {
    pub author: GitSignature,
    pub committer: GitSignature,
}

#[derive(Debug, Deserialize)]
pub struct GitSignature {
    pub name: String,
    pub date: DateTime<Utc>,
}

/// 拉取请求列表接口的单个条目
#[derive(Debug, Deserialize)]
pub struct PullRequestResponse {
    pub number: u64,
    pub user: Option<UserResponse>,
    pub merged_at: Option<DateTime<Utc>>,
    pub closed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct UserResponse {
    pub login: String,
}

/// 分支最后一次提交的信息
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommitInfo {
    pub author_name: String,
    pub author_date: DateTime<Utc>,
    pub committer_name: String,
}

impl From<BranchDetailResponse> for CommitInfo {
    fn from(detail: BranchDetailResponse) -> Self {
        let git = detail.commit.commit;
        Self {
            author_name: git.author.name,
            author_date: git.author.date,
            committer_name: git.committer.name,
        }
    }
}

/// 与分支关联的拉取请求摘要
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PullRequestSummary {
    pub number: u64,
    pub owner_login: String,
    pub merged_at: Option<DateTime<Utc>>,
    pub closed_at: Option<DateTime<Utc>>,
}

impl PullRequestSummary {
    /// 合并时间优先，其次关闭时间，否则为打开状态
    pub fn state(&self) -> PrState {
        if self.merged_at.is_some() {
            PrState::Merged
        } else if self.closed_at.is_some() {
            PrState::Closed
        } else {
            PrState::Open
        }
    }

    pub fn is_merged(&self) -> bool {
        self.merged_at.is_some()
    }
}

impl From<PullRequestResponse> for PullRequestSummary {
    fn from(pr: PullRequestResponse) -> Self {
        Self {
            number: pr.number,
            // 已删除的账号在 GitHub 上显示为 ghost
            owner_login: pr
                .user
                .map(|u| u.login)
                .unwrap_or_else(|| "ghost".to_string()),
            merged_at: pr.merged_at,
            closed_at: pr.closed_at,
        }
    }
}

/// 拉取请求状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PrState {
    Open,
    Closed,
    Merged,
}

impl PrState {
    pub fn as_str(&self) -> &'static str {
        match self {
            PrState::Open => "Open",
            PrState::Closed => "Closed",
            PrState::Merged => "Merged",
        }
    }
}

impl std::fmt::Display for PrState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
