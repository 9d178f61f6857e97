use crate::github::{BranchSource, CommitInfo, ListOptions, ListedBranch, PullRequestSummary, RepoId};
use crate::infrastructure::error::ReportError;
use chrono::{DateTime, Utc};
use futures_util::stream::{self, StreamExt};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// 成功补全的分支记录
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrichedBranchRecord {
    pub name: String,
    pub commit: CommitInfo,
    /// 列表接口返回的第一个拉取请求，没有则为 None
    pub pull_request: Option<PullRequestSummary>,
}

/// 补全失败时的降级记录
#[derive(Debug, Clone)]
pub struct DegradedRecord {
    pub name: String,
    /// 从分支列表条目中尽力读取的提交日期
    pub listed_date: Option<DateTime<Utc>>,
    pub reason: ReportError,
}

/// 单个分支的补全结果
#[derive(Debug, Clone)]
pub enum BranchOutcome {
    Enriched(EnrichedBranchRecord),
    Degraded(DegradedRecord),
}

impl BranchOutcome {
    pub fn name(&self) -> &str {
        match self {
            BranchOutcome::Enriched(record) => &record.name,
            BranchOutcome::Degraded(record) => &record.name,
        }
    }

    /// 最后提交日期：成功时取作者日期，降级时取列表条目中的日期
    pub fn last_commit_date(&self) -> Option<DateTime<Utc>> {
        match self {
            BranchOutcome::Enriched(record) => Some(record.commit.author_date),
            BranchOutcome::Degraded(record) => record.listed_date,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, BranchOutcome::Degraded(_))
    }
}

/// 分支补全器
///
/// 对每个分支并发请求分支详情和拉取请求列表，按分支列表的原始顺序汇总结果。
/// 单个分支失败只会产生降级记录，不会中断其他分支。
/// 关闭拉取请求查询后只请求分支详情。
pub struct BranchEnricher {
    source: Arc<dyn BranchSource>,
    repo: RepoId,
    concurrency: usize,
    fetch_pull_requests: bool,
}

impl BranchEnricher {
    pub fn new(source: Arc<dyn BranchSource>, repo: RepoId, concurrency: usize) -> Self {
        Self {
            source,
            repo,
            concurrency: concurrency.max(1),
            fetch_pull_requests: true,
        }
    }

    /// 是否查询每个分支的拉取请求
    pub fn with_pull_requests(mut self, enabled: bool) -> Self {
        self.fetch_pull_requests = enabled;
        self
    }

    /// 列出分支并逐个补全；只有分支列表请求失败才返回错误
    pub async fn run(&self, options: &ListOptions) -> Result<Vec<BranchOutcome>, ReportError> {
        let branches = self.source.list_branches(&self.repo, options).await?;
        info!(repo = %self.repo, count = branches.len(), "Fetched branch list");
        Ok(self.enrich_all(branches).await)
    }

    /// 并发补全，输出顺序与输入一致
    pub async fn enrich_all(&self, branches: Vec<ListedBranch>) -> Vec<BranchOutcome> {
        let outcomes: Vec<BranchOutcome> = stream::iter(branches)
            .map(|branch| self.enrich_one(branch))
            .buffered(self.concurrency)
            .collect()
            .await;

        let degraded = outcomes.iter().filter(|o| o.is_degraded()).count();
        if degraded > 0 {
            warn!(degraded, total = outcomes.len(), "Some branches could not be enriched");
        }
        outcomes
    }

    async fn enrich_one(&self, branch: ListedBranch) -> BranchOutcome {
        let result = if self.fetch_pull_requests {
            let (detail, prs) = tokio::join!(
                self.source.get_branch(&self.repo, &branch.name),
                self.source.list_pull_requests(&self.repo, &branch.name),
            );
            detail.and_then(|commit| prs.map(|prs| (commit, prs.into_iter().next())))
        } else {
            self.source
                .get_branch(&self.repo, &branch.name)
                .await
                .map(|commit| (commit, None))
        };

        match result {
            Ok((commit, pull_request)) => {
                debug!(branch = %branch.name, has_pull_request = pull_request.is_some(), "Enriched branch");
                BranchOutcome::Enriched(EnrichedBranchRecord {
                    name: branch.name,
                    commit,
                    pull_request,
                })
            }
            Err(reason) => {
                warn!(branch = %branch.name, error = %reason, "Failed to enrich branch");
                BranchOutcome::Degraded(DegradedRecord {
                    listed_date: branch.listed_commit_date(),
                    name: branch.name,
                    reason,
                })
            }
        }
    }
}
