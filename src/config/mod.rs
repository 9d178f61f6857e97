use crate::github::{ListOptions, ProtectedFilter, RepoId, DEFAULT_API_URL};
use crate::infrastructure::error::ReportError;
use crate::infrastructure::network::NetworkConfig;
use crate::report::{BranchStatus, ReportMode, ReportSettings, DEFAULT_STALE_DAYS};
use serde::Deserialize;
use std::env;
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub const TOKEN_ENV: &str = "GITHUB_TOKEN";

const CONFIG_FILE_NAME: &str = "branch-report.toml";

/// 配置文件内容，所有字段可选
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub owner: Option<String>,
    pub repo: Option<String>,
    pub token: Option<String>,
    pub api_url: Option<String>,
    pub per_page: Option<u8>,
    pub protected: Option<String>,
    pub mode: Option<String>,
    pub output: Option<PathBuf>,
    pub stale_days: Option<i64>,
    pub concurrency: Option<usize>,
    pub timeout_secs: Option<u64>,
    pub debug: Option<bool>,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub owner: Option<String>,
    pub repo: Option<String>,
    pub token: Option<String>,
    pub api_url: String,
    pub per_page: u8,
    pub protected: ProtectedFilter,
    pub mode: ReportMode,
    pub output: Option<PathBuf>,
    pub stale_days: i64,
    pub only: Option<BranchStatus>,
    pub concurrency: usize,
    pub timeout_secs: u64,
    pub debug: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            owner: None,
            repo: None,
            token: None,
            api_url: DEFAULT_API_URL.to_string(),
            per_page: 100,
            protected: ProtectedFilter::Unprotected,
            mode: ReportMode::Enriched,
            output: None,
            stale_days: DEFAULT_STALE_DAYS,
            only: None,
            concurrency: 16,
            timeout_secs: 30,
            debug: false,
        }
    }
}

fn parse_value<T: FromStr>(key: &str, value: &str) -> Result<T, ReportError> {
    value
        .trim()
        .parse()
        .map_err(|_| ReportError::config(format!("Invalid value for {}: {}", key, value)))
}

impl Config {
    /// 默认值 < 配置文件 < 环境变量（含 .env）
    pub fn load() -> Result<Self, ReportError> {
        let mut config = Config::default();

        if let Some(path) = Self::find_config_file() {
            config.load_from_file(&path)?;
        }

        // 加载 .env 文件，不覆盖已有的环境变量
        #[cfg(not(test))]
        config.load_from_env_file();
        config.load_from_env()?;

        Ok(config)
    }

    /// 配置文件查找顺序：当前目录，然后是用户主目录
    pub fn config_file_candidates() -> Vec<PathBuf> {
        let mut candidates = vec![PathBuf::from(CONFIG_FILE_NAME)];
        if let Ok(home) = env::var("HOME") {
            candidates.push(PathBuf::from(home).join(".branch-report").join("config.toml"));
        }
        candidates
    }

    fn find_config_file() -> Option<PathBuf> {
        Self::config_file_candidates().into_iter().find(|p| p.is_file())
    }

    pub fn load_from_file(&mut self, path: &Path) -> Result<(), ReportError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ReportError::config(format!("Failed to read config file {}: {}", path.display(), e))
        })?;
        let file: FileConfig = toml::from_str(&content).map_err(|e| {
            ReportError::config(format!("Failed to parse config file {}: {}", path.display(), e))
        })?;
        self.apply_file(file)
    }

    pub fn apply_file(&mut self, file: FileConfig) -> Result<(), ReportError> {
        if file.owner.is_some() {
            self.owner = file.owner;
        }
        if file.repo.is_some() {
            self.repo = file.repo;
        }
        if file.token.is_some() {
            self.token = file.token;
        }
        if let Some(url) = file.api_url {
            self.api_url = url;
        }
        if let Some(per_page) = file.per_page {
            self.per_page = per_page;
        }
        if let Some(protected) = file.protected {
            self.protected = protected.parse()?;
        }
        if let Some(mode) = file.mode {
            self.mode = mode.parse()?;
        }
        if file.output.is_some() {
            self.output = file.output;
        }
        if let Some(days) = file.stale_days {
            self.stale_days = days;
        }
        if let Some(concurrency) = file.concurrency {
            self.concurrency = concurrency;
        }
        if let Some(timeout) = file.timeout_secs {
            self.timeout_secs = timeout;
        }
        if let Some(debug) = file.debug {
            self.debug = debug;
        }
        Ok(())
    }

    pub fn load_from_env_file(&mut self) {
        // 尝试从用户主目录加载
        if let Ok(home) = env::var("HOME") {
            let user_env_path = PathBuf::from(home).join(".branch-report").join(".env");
            if user_env_path.exists() {
                dotenvy::from_path(user_env_path).ok();
            }
        }

        // 尝试从当前目录加载
        dotenvy::dotenv().ok();
    }

    pub fn load_from_env(&mut self) -> Result<(), ReportError> {
        self.apply_env(|key| env::var(key).ok())
    }

    /// 按变量名查找并覆盖配置，便于测试时不依赖进程环境
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ReportError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(owner) = get("BRANCH_REPORT_OWNER") {
            self.owner = Some(owner);
        }
        if let Some(repo) = get("BRANCH_REPORT_REPO") {
            self.repo = Some(repo);
        }
        if let Some(token) = get(TOKEN_ENV) {
            self.token = Some(token);
        }
        if let Some(url) = get("BRANCH_REPORT_API_URL") {
            self.api_url = url;
        }
        if let Some(v) = get("BRANCH_REPORT_PER_PAGE") {
            self.per_page = parse_value("BRANCH_REPORT_PER_PAGE", &v)?;
        }
        if let Some(v) = get("BRANCH_REPORT_PROTECTED") {
            self.protected = v.parse()?;
        }
        if let Some(v) = get("BRANCH_REPORT_MODE") {
            self.mode = v.parse()?;
        }
        if let Some(v) = get("BRANCH_REPORT_OUTPUT") {
            self.output = Some(PathBuf::from(v));
        }
        if let Some(v) = get("BRANCH_REPORT_STALE_DAYS") {
            self.stale_days = parse_value("BRANCH_REPORT_STALE_DAYS", &v)?;
        }
        if let Some(v) = get("BRANCH_REPORT_CONCURRENCY") {
            self.concurrency = parse_value("BRANCH_REPORT_CONCURRENCY", &v)?;
        }
        if let Some(v) = get("BRANCH_REPORT_TIMEOUT") {
            self.timeout_secs = parse_value("BRANCH_REPORT_TIMEOUT", &v)?;
        }
        if let Some(v) = get("BRANCH_REPORT_DEBUG") {
            self.debug = matches!(v.trim().to_lowercase().as_str(), "1" | "true" | "yes" | "on");
        }
        Ok(())
    }

    /// 命令行参数优先级最高
    pub fn update_from_args(&mut self, args: &crate::cli::args::Args) -> Result<(), ReportError> {
        if let Some(owner) = &args.owner {
            self.owner = Some(owner.clone());
        }
        if let Some(repo) = &args.repo {
            self.repo = Some(repo.clone());
        }
        if let Some(token) = &args.token {
            self.token = Some(token.clone());
        }
        if let Some(url) = &args.api_url {
            self.api_url = url.clone();
        }
        if let Some(per_page) = args.per_page {
            self.per_page = per_page;
        }
        if let Some(protected) = &args.protected {
            self.protected = protected.parse()?;
        }
        if let Some(mode) = &args.mode {
            self.mode = mode.parse()?;
        }
        if let Some(output) = &args.output {
            self.output = Some(output.clone());
        }
        if let Some(days) = args.stale_days {
            self.stale_days = days;
        }
        if let Some(only) = &args.only {
            self.only = Some(only.parse()?);
        }
        if let Some(concurrency) = args.concurrency {
            self.concurrency = concurrency;
        }
        if let Some(timeout) = args.timeout {
            self.timeout_secs = timeout;
        }
        if args.debug {
            self.debug = true;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ReportError> {
        if self.owner.as_deref().map_or(true, |o| o.trim().is_empty()) {
            return Err(ReportError::usage(
                "Repository owner is required. Pass --owner/-o or set BRANCH_REPORT_OWNER",
            ));
        }
        if self.repo.as_deref().map_or(true, |r| r.trim().is_empty()) {
            return Err(ReportError::usage(
                "Repository name is required. Pass --repo/-r or set BRANCH_REPORT_REPO",
            ));
        }
        if !(1..=100).contains(&self.per_page) {
            return Err(ReportError::config(format!(
                "per_page must be between 1 and 100, got {}",
                self.per_page
            )));
        }
        if self.concurrency == 0 {
            return Err(ReportError::config("concurrency must be at least 1"));
        }
        if self.stale_days < 0 {
            return Err(ReportError::config(format!(
                "stale_days must not be negative, got {}",
                self.stale_days
            )));
        }
        if self.timeout_secs == 0 {
            return Err(ReportError::config("timeout must be at least 1 second"));
        }
        match url::Url::parse(&self.api_url) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {}
            _ => {
                return Err(ReportError::config(format!("Invalid API URL: {}", self.api_url)));
            }
        }
        if let Some(output) = &self.output {
            if !is_file_path(output) {
                return Err(ReportError::config(format!(
                    "Output must be a file path, got {}",
                    output.display()
                )));
            }
        }
        Ok(())
    }

    pub fn repo_id(&self) -> Result<RepoId, ReportError> {
        match (&self.owner, &self.repo) {
            (Some(owner), Some(repo)) => Ok(RepoId::new(owner.trim(), repo.trim())),
            _ => Err(ReportError::usage("Repository owner and name are required")),
        }
    }

    pub fn report_settings(&self) -> Result<ReportSettings, ReportError> {
        let mut settings = ReportSettings::new(self.repo_id()?);
        settings.list_options = ListOptions {
            per_page: self.per_page,
            protected: self.protected,
        };
        settings.mode = self.mode;
        settings.output_path = self.output.clone();
        settings.stale_days = self.stale_days;
        settings.only = self.only;
        settings.concurrency = self.concurrency;
        Ok(settings)
    }

    pub fn network_config(&self) -> NetworkConfig {
        NetworkConfig::default().with_timeout_secs(self.timeout_secs)
    }
}

/// 输出路径必须指向文件：不能以分隔符结尾，也不能是已存在的目录
fn is_file_path(path: &Path) -> bool {
    let raw = path.to_string_lossy();
    !raw.ends_with('/')
        && !raw.ends_with(std::path::MAIN_SEPARATOR)
        && path.file_name().is_some()
        && !path.is_dir()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::args::Args;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    fn valid() -> Config {
        Config {
            owner: Some("acme".to_string()),
            repo: Some("widgets".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_config_defaults() {
        let config = Config::default();
        assert_eq!(config.api_url, "https://api.github.com");
        assert_eq!(config.per_page, 100);
        assert_eq!(config.protected, ProtectedFilter::Unprotected);
        assert_eq!(config.mode, ReportMode::Enriched);
        assert_eq!(config.stale_days, 30);
        assert_eq!(config.concurrency, 16);
        assert_eq!(config.timeout_secs, 30);
        assert!(config.token.is_none());
        assert!(!config.debug);
    }

    #[test]
    fn test_config_from_env() {
        let mut config = Config::default();
        config
            .apply_env(env_of(&[
                ("BRANCH_REPORT_OWNER", "acme"),
                ("BRANCH_REPORT_REPO", "widgets"),
                ("GITHUB_TOKEN", "env-token"),
                ("BRANCH_REPORT_PER_PAGE", "25"),
                ("BRANCH_REPORT_PROTECTED", "all"),
                ("BRANCH_REPORT_MODE", "basic"),
                ("BRANCH_REPORT_STALE_DAYS", "7"),
                ("BRANCH_REPORT_DEBUG", "true"),
            ]))
            .unwrap();

        assert_eq!(config.owner.as_deref(), Some("acme"));
        assert_eq!(config.repo.as_deref(), Some("widgets"));
        assert_eq!(config.token.as_deref(), Some("env-token"));
        assert_eq!(config.per_page, 25);
        assert_eq!(config.protected, ProtectedFilter::All);
        assert_eq!(config.mode, ReportMode::Basic);
        assert_eq!(config.stale_days, 7);
        assert!(config.debug);
    }

    #[test]
    fn test_invalid_env_value() {
        let mut config = Config::default();
        let result = config.apply_env(env_of(&[("BRANCH_REPORT_CONCURRENCY", "many")]));
        assert!(matches!(result, Err(ReportError::Configuration { .. })));
    }

    #[test]
    fn test_args_override_env_token() {
        let mut config = Config::default();
        config.apply_env(env_of(&[("GITHUB_TOKEN", "env-token")])).unwrap();

        let args = Args {
            owner: Some("acme".to_string()),
            repo: Some("widgets".to_string()),
            token: Some("cli-token".to_string()),
            only: Some("stale".to_string()),
            ..Default::default()
        };
        config.update_from_args(&args).unwrap();
        assert_eq!(config.token.as_deref(), Some("cli-token"));
        assert_eq!(config.only, Some(BranchStatus::Stale));

        // 未指定 --token 时沿用环境变量中的 token
        let mut config = Config::default();
        config.apply_env(env_of(&[("GITHUB_TOKEN", "env-token")])).unwrap();
        config.update_from_args(&Args::default()).unwrap();
        assert_eq!(config.token.as_deref(), Some("env-token"));
    }

    #[test]
    fn test_load_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("branch-report.toml");
        std::fs::write(
            &path,
            r#"
owner = "acme"
repo = "widgets"
per_page = 10
protected = "protected"
output = "reports/out.csv"
concurrency = 2
"#,
        )
        .unwrap();

        let mut config = Config::default();
        config.load_from_file(&path).unwrap();
        assert_eq!(config.owner.as_deref(), Some("acme"));
        assert_eq!(config.per_page, 10);
        assert_eq!(config.protected, ProtectedFilter::Protected);
        assert_eq!(config.output, Some(PathBuf::from("reports/out.csv")));
        assert_eq!(config.concurrency, 2);
        assert_eq!(config.mode, ReportMode::Enriched);
    }

    #[test]
    fn test_load_from_bad_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("branch-report.toml");
        std::fs::write(&path, "per_page = \"lots\"").unwrap();
        let mut config = Config::default();
        assert!(config.load_from_file(&path).is_err());
    }

    #[test]
    fn test_config_validation() {
        assert!(valid().validate().is_ok());

        let missing_owner = Config {
            owner: None,
            ..valid()
        };
        let err = missing_owner.validate().unwrap_err();
        assert!(!err.is_fatal());
        assert_eq!(err.exit_code(), 2);

        let blank_repo = Config {
            repo: Some("  ".to_string()),
            ..valid()
        };
        assert!(!blank_repo.validate().unwrap_err().is_fatal());

        assert!(Config { per_page: 0, ..valid() }.validate().is_err());
        assert!(Config { per_page: 101, ..valid() }.validate().is_err());
        assert!(Config { concurrency: 0, ..valid() }.validate().is_err());
        assert!(Config { stale_days: -1, ..valid() }.validate().is_err());
        assert!(Config { timeout_secs: 0, ..valid() }.validate().is_err());
        assert!(Config {
            api_url: "not a url".to_string(),
            ..valid()
        }
        .validate()
        .is_err());
        assert!(Config {
            api_url: "ftp://example.com".to_string(),
            ..valid()
        }
        .validate()
        .is_err());
    }

    #[test]
    fn test_output_must_be_a_file_path() {
        let dir = TempDir::new().unwrap();
        let with_output = |output: PathBuf| Config {
            output: Some(output),
            ..valid()
        };

        assert!(with_output(PathBuf::from("reports/out.csv")).validate().is_ok());
        assert!(with_output(dir.path().join("out.csv")).validate().is_ok());

        for output in [
            PathBuf::from("out/"),
            PathBuf::from("/"),
            PathBuf::from(".."),
            dir.path().to_path_buf(),
        ] {
            let err = with_output(output.clone()).validate().unwrap_err();
            assert!(
                matches!(err, ReportError::Configuration { .. }),
                "{} should be rejected",
                output.display()
            );
            assert_eq!(err.exit_code(), 2);
        }
    }

    #[test]
    fn test_report_settings() {
        let config = Config {
            per_page: 20,
            protected: ProtectedFilter::All,
            mode: ReportMode::Basic,
            only: Some(BranchStatus::Active),
            concurrency: 3,
            ..valid()
        };
        let settings = config.report_settings().unwrap();
        assert_eq!(settings.repo, RepoId::new("acme", "widgets"));
        assert_eq!(settings.list_options.per_page, 20);
        assert_eq!(settings.list_options.protected, ProtectedFilter::All);
        assert_eq!(settings.output_path(), PathBuf::from("branches.csv"));
        assert_eq!(settings.only, Some(BranchStatus::Active));
        assert_eq!(settings.concurrency, 3);
        assert!(Config::default().report_settings().is_err());
    }

    #[test]
    fn test_config_file_candidates() {
        let candidates = Config::config_file_candidates();
        assert_eq!(candidates[0], PathBuf::from("branch-report.toml"));
    }
}
