use crate::github::{ListOptions, RepoId};
use crate::report::assembler::{BranchStatus, ReportMode, DEFAULT_STALE_DAYS};
use std::path::PathBuf;

/// 一次报告生成所需的全部参数
#[derive(Debug, Clone)]
pub struct ReportSettings {
    pub repo: RepoId,
    /// 分支列表请求参数
    pub list_options: ListOptions,
    pub mode: ReportMode,
    /// 输出路径，None 时使用模式的默认路径
    pub output_path: Option<PathBuf>,
    pub stale_days: i64,
    /// 只保留指定状态的分支
    pub only: Option<BranchStatus>,
    /// 同时补全的分支数上限
    pub concurrency: usize,
}

impl ReportSettings {
    pub fn new(repo: RepoId) -> Self {
        Self {
            repo,
            list_options: ListOptions::default(),
            mode: ReportMode::default(),
            output_path: None,
            stale_days: DEFAULT_STALE_DAYS,
            only: None,
            concurrency: 16,
        }
    }

    pub fn output_path(&self) -> PathBuf {
        self.output_path
            .clone()
            .unwrap_or_else(|| self.mode.default_output())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_defaults() {
        let settings = ReportSettings::new(RepoId::new("acme", "widgets"));
        assert_eq!(settings.mode, ReportMode::Enriched);
        assert_eq!(settings.stale_days, 30);
        assert_eq!(settings.list_options.per_page, 100);
        assert_eq!(settings.output_path(), PathBuf::from("output/branches_with_prs.csv"));
    }

    #[test]
    fn test_output_path_override() {
        let mut settings = ReportSettings::new(RepoId::new("acme", "widgets"));
        settings.mode = ReportMode::Basic;
        assert_eq!(settings.output_path(), PathBuf::from("branches.csv"));
        settings.output_path = Some(PathBuf::from("/tmp/custom.csv"));
        assert_eq!(settings.output_path(), PathBuf::from("/tmp/custom.csv"));
    }
}
