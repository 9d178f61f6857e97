use crate::infrastructure::error::ReportError;
use reqwest::{header, Client, ClientBuilder};
use std::time::Duration;

/// 网络客户端配置
#[derive(Debug, Clone)]
pub struct NetworkConfig {
    /// 单个请求的超时时间
    pub timeout: Duration,
    pub connect_timeout: Duration,
    pub user_agent: String,
    pub max_redirects: usize,
    pub pool_max_idle_per_host: usize,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            user_agent: format!("branch-report/{}", env!("CARGO_PKG_VERSION")),
            max_redirects: 10,
            pool_max_idle_per_host: 16,
        }
    }
}

impl NetworkConfig {
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout = Duration::from_secs(secs);
        self
    }
}

/// 构建 HTTP 客户端
///
/// 所有请求都带上 GitHub REST API 要求的 Accept 头和 User-Agent。
pub fn build_client(config: &NetworkConfig) -> Result<Client, ReportError> {
    let mut headers = header::HeaderMap::new();
    headers.insert(
        header::ACCEPT,
        header::HeaderValue::from_static("application/vnd.github+json"),
    );
    headers.insert(
        "X-GitHub-Api-Version",
        header::HeaderValue::from_static("2022-11-28"),
    );

    ClientBuilder::new()
        .timeout(config.timeout)
        .connect_timeout(config.connect_timeout)
        .user_agent(&config.user_agent)
        .default_headers(headers)
        .pool_max_idle_per_host(config.pool_max_idle_per_host)
        .pool_idle_timeout(Duration::from_secs(30))
        .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
        .build()
        .map_err(|e| ReportError::network(format!("Failed to create HTTP client: {}", e), None))
}
