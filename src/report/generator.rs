use crate::github::BranchSource;
use crate::infrastructure::error::ReportError;
use crate::report::assembler::{ReportAssembler, ReportMode};
use crate::report::config::ReportSettings;
use crate::report::csv::CsvWriter;
use crate::report::enricher::BranchEnricher;
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// 报告生成器：列出分支、补全、组装并写出 CSV
pub struct ReportGenerator {
    source: Arc<dyn BranchSource>,
    settings: ReportSettings,
}

impl ReportGenerator {
    pub fn new(source: Arc<dyn BranchSource>, settings: ReportSettings) -> Self {
        Self { source, settings }
    }

    /// 以当前时间作为判断活跃状态的基准生成报告
    pub async fn generate(&self) -> Result<GeneratedReport, ReportError> {
        self.generate_at(Utc::now()).await
    }

    pub async fn generate_at(&self, now: DateTime<Utc>) -> Result<GeneratedReport, ReportError> {
        let settings = &self.settings;
        let enricher = BranchEnricher::new(
            Arc::clone(&self.source),
            settings.repo.clone(),
            settings.concurrency,
        )
        .with_pull_requests(settings.mode == ReportMode::Enriched);
        let outcomes = enricher.run(&settings.list_options).await?;

        let assembler = ReportAssembler::new(settings.mode, settings.stale_days, now)
            .with_status_filter(settings.only);
        let rows = assembler.assemble(&outcomes);

        let path = settings.output_path();
        let size = CsvWriter::new(&path)
            .write(assembler.columns(), &rows)
            .await?;

        let report = GeneratedReport {
            path,
            branches: outcomes.len(),
            degraded: outcomes.iter().filter(|o| o.is_degraded()).count(),
            rows: rows.len(),
            size,
        };
        info!(
            path = %report.path.display(),
            branches = report.branches,
            degraded = report.degraded,
            rows = report.rows,
            bytes = report.size,
            "Report written"
        );
        Ok(report)
    }
}

/// 生成结果摘要
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedReport {
    /// 报告文件路径
    pub path: PathBuf,
    /// 分支列表中的分支数
    pub branches: usize,
    /// 补全失败的分支数
    pub degraded: usize,
    /// 写入的数据行数
    pub rows: usize,
    /// 文件大小（字节）
    pub size: usize,
}

impl std::fmt::Display for GeneratedReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "CSV file has been generated: {} ({} rows)",
            self.path.display(),
            self.rows
        )
    }
}
