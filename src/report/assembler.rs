use crate::infrastructure::error::ReportError;
use crate::report::enricher::{BranchOutcome, DegradedRecord, EnrichedBranchRecord};
use chrono::{DateTime, SecondsFormat, Utc};
use std::path::PathBuf;

pub const DEFAULT_STALE_DAYS: i64 = 30;

const NONE: &str = "None";
const NO_PR: &str = "No PR";
const ERROR: &str = "Error";
const FAILED_TO_FETCH: &str = "Failed to fetch";

const ENRICHED_COLUMNS: &[&str] = &[
    "Branch",
    "Last Commit Date",
    "Author",
    "Committer",
    "PR Owner",
    "PR Number",
    "PR State",
    "Merged",
    "Status",
];

const BASIC_COLUMNS: &[&str] = &["Branch", "Status"];

/// 报告模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportMode {
    /// 包含提交和拉取请求信息的完整报告
    #[default]
    Enriched,
    /// 只有分支名和活跃状态
    Basic,
}

impl ReportMode {
    pub fn columns(&self) -> &'static [&'static str] {
        match self {
            ReportMode::Enriched => ENRICHED_COLUMNS,
            ReportMode::Basic => BASIC_COLUMNS,
        }
    }

    pub fn default_output(&self) -> PathBuf {
        match self {
            ReportMode::Enriched => PathBuf::from("output").join("branches_with_prs.csv"),
            ReportMode::Basic => PathBuf::from("branches.csv"),
        }
    }
}

impl std::str::FromStr for ReportMode {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "enriched" => Ok(ReportMode::Enriched),
            "basic" => Ok(ReportMode::Basic),
            other => Err(ReportError::config(format!(
                "Unknown report mode: {} (expected enriched or basic)",
                other
            ))),
        }
    }
}

/// 分支活跃状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BranchStatus {
    Active,
    Stale,
    /// 无法取得提交日期
    Unknown,
}

impl BranchStatus {
    /// 距最后一次提交的整天数严格大于阈值时为 stale，未来日期视为 active
    pub fn classify(last_commit: DateTime<Utc>, now: DateTime<Utc>, stale_days: i64) -> Self {
        let days = (now - last_commit).num_days();
        if days > stale_days {
            BranchStatus::Stale
        } else {
            BranchStatus::Active
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BranchStatus::Active => "active",
            BranchStatus::Stale => "stale",
            BranchStatus::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for BranchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for BranchStatus {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "active" => Ok(BranchStatus::Active),
            "stale" => Ok(BranchStatus::Stale),
            other => Err(ReportError::usage(format!(
                "Unknown status filter: {} (expected active or stale)",
                other
            ))),
        }
    }
}

/// 报告中的一行，列顺序即 CSV 列顺序
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRow {
    cells: Vec<(&'static str, String)>,
}

impl ReportRow {
    fn new(columns: &'static [&'static str], values: Vec<String>) -> Self {
        debug_assert_eq!(columns.len(), values.len());
        Self {
            cells: columns.iter().copied().zip(values).collect(),
        }
    }

    pub fn columns(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.cells.iter().map(|(column, _)| *column)
    }

    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|(_, value)| value.as_str())
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.cells
            .iter()
            .find(|(c, _)| *c == column)
            .map(|(_, v)| v.as_str())
    }
}

/// 报告组装器
pub struct ReportAssembler {
    mode: ReportMode,
    stale_days: i64,
    only: Option<BranchStatus>,
    now: DateTime<Utc>,
}

impl ReportAssembler {
    pub fn new(mode: ReportMode, stale_days: i64, now: DateTime<Utc>) -> Self {
        Self {
            mode,
            stale_days,
            only: None,
            now,
        }
    }

    /// 只保留指定状态的行
    pub fn with_status_filter(mut self, only: Option<BranchStatus>) -> Self {
        self.only = only;
        self
    }

    pub fn columns(&self) -> &'static [&'static str] {
        self.mode.columns()
    }

    pub fn assemble(&self, outcomes: &[BranchOutcome]) -> Vec<ReportRow> {
        outcomes
            .iter()
            .filter_map(|outcome| {
                let status = self.status_of(outcome);
                if self.only.is_some_and(|only| only != status) {
                    return None;
                }
                Some(self.row(outcome, status))
            })
            .collect()
    }

    fn status_of(&self, outcome: &BranchOutcome) -> BranchStatus {
        outcome
            .last_commit_date()
            .map(|date| BranchStatus::classify(date, self.now, self.stale_days))
            .unwrap_or(BranchStatus::Unknown)
    }

    fn row(&self, outcome: &BranchOutcome, status: BranchStatus) -> ReportRow {
        let values = match (self.mode, outcome) {
            (ReportMode::Basic, _) => vec![outcome.name().to_string(), status.to_string()],
            (ReportMode::Enriched, BranchOutcome::Enriched(record)) => enriched_values(record, status),
            (ReportMode::Enriched, BranchOutcome::Degraded(record)) => degraded_values(record, status),
        };
        ReportRow::new(self.columns(), values)
    }
}

fn format_date(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn enriched_values(record: &EnrichedBranchRecord, status: BranchStatus) -> Vec<String> {
    let (owner, number, state, merged) = match &record.pull_request {
        Some(pr) => (
            pr.owner_login.clone(),
            pr.number.to_string(),
            pr.state().to_string(),
            if pr.is_merged() { "Yes" } else { "No" }.to_string(),
        ),
        None => (
            NONE.to_string(),
            NONE.to_string(),
            NO_PR.to_string(),
            "No".to_string(),
        ),
    };

    vec![
        record.name.clone(),
        format_date(record.commit.author_date),
        record.commit.author_name.clone(),
        record.commit.committer_name.clone(),
        owner,
        number,
        state,
        merged,
        status.to_string(),
    ]
}

fn degraded_values(record: &DegradedRecord, status: BranchStatus) -> Vec<String> {
    vec![
        record.name.clone(),
        record.listed_date.map(format_date).unwrap_or_default(),
        ERROR.to_string(),
        ERROR.to_string(),
        ERROR.to_string(),
        ERROR.to_string(),
        FAILED_TO_FETCH.to_string(),
        ERROR.to_string(),
        status.to_string(),
    ]
}
