use crate::infrastructure::error::ReportError;
use crate::report::assembler::ReportRow;
use std::path::PathBuf;
use tokio::fs;
use tracing::debug;

/// 按 RFC 4180 转义单个字段：包含逗号、引号或换行时加引号，内部引号加倍
pub fn escape_field(value: &str) -> String {
    if value.contains(&[',', '"', '\r', '\n'][..]) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn push_record<'a>(out: &mut String, fields: impl Iterator<Item = &'a str>) {
    let line = fields.map(escape_field).collect::<Vec<_>>().join(",");
    out.push_str(&line);
    out.push('\n');
}

/// 生成带表头的 CSV 文本
pub fn render(columns: &[&str], rows: &[ReportRow]) -> Result<String, ReportError> {
    let mut out = String::new();
    push_record(&mut out, columns.iter().copied());

    for (index, row) in rows.iter().enumerate() {
        if !row.columns().eq(columns.iter().copied()) {
            return Err(ReportError::parsing(
                format!("row {} does not match the report header", index + 1),
                "report row",
            ));
        }
        push_record(&mut out, row.values());
    }

    Ok(out)
}

/// CSV 写入器
///
/// 先写入同目录下的临时文件，再重命名覆盖目标文件，避免留下写了一半的报告。
pub struct CsvWriter {
    path: PathBuf,
}

impl CsvWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn temp_path(&self) -> Result<PathBuf, ReportError> {
        let name = self.path.file_name().ok_or_else(|| {
            ReportError::file_system(
                format!("Output path {} has no file name", self.path.display()),
                Some(self.path.display().to_string()),
            )
        })?;
        Ok(self
            .path
            .with_file_name(format!(".{}.tmp", name.to_string_lossy())))
    }

    /// 写入 CSV，返回写入的字节数
    pub async fn write(&self, columns: &[&str], rows: &[ReportRow]) -> Result<usize, ReportError> {
        let temp = self.temp_path()?;
        let content = render(columns, rows)?;
        let path_str = self.path.display().to_string();
        let io_err = |action: &str, e: std::io::Error| {
            ReportError::file_system(format!("{} {}: {}", action, path_str, e), Some(path_str.clone()))
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| io_err("Failed to create output directory for", e))?;
        }

        if let Err(e) = fs::write(&temp, content.as_bytes()).await {
            let _ = fs::remove_file(&temp).await;
            return Err(io_err("Failed to write", e));
        }
        if let Err(e) = fs::rename(&temp, &self.path).await {
            let _ = fs::remove_file(&temp).await;
            return Err(io_err("Failed to replace", e));
        }

        debug!(path = %self.path.display(), bytes = content.len(), rows = rows.len(), "Wrote CSV");
        Ok(content.len())
    }
}
