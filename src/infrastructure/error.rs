use thiserror::Error;

/// 分支报告错误类型
#[derive(Error, Debug, Clone)]
pub enum ReportError {
    #[error("usage error: {message}")]
    Usage { message: String },

    #[error("configuration error: {message}")]
    Configuration { message: String },

    #[error("network error: {message}")]
    Network { message: String, url: Option<String> },

    #[error("API error: {status} {url} - {message}")]
    Api { status: u16, url: String, message: String },

    #[error("failed to parse {content_type}: {message}")]
    Parsing { message: String, content_type: String },

    #[error("file system error: {message}")]
    FileSystem { message: String, path: Option<String> },
}

impl ReportError {
    /// 创建用法错误
    pub fn usage(message: impl Into<String>) -> Self {
        ReportError::Usage {
            message: message.into(),
        }
    }

    /// 创建配置错误
    pub fn config(message: impl Into<String>) -> Self {
        ReportError::Configuration {
            message: message.into(),
        }
    }

    /// 创建网络错误
    pub fn network(message: impl Into<String>, url: Option<String>) -> Self {
        ReportError::Network {
            message: message.into(),
            url,
        }
    }

    /// 创建 API 错误（非 2xx 响应）
    pub fn api(status: u16, url: impl Into<String>, message: impl Into<String>) -> Self {
        ReportError::Api {
            status,
            url: url.into(),
            message: message.into(),
        }
    }

    /// 创建解析错误
    pub fn parsing(message: impl Into<String>, content_type: impl Into<String>) -> Self {
        ReportError::Parsing {
            message: message.into(),
            content_type: content_type.into(),
        }
    }

    /// 创建文件系统错误
    pub fn file_system(message: impl Into<String>, path: Option<String>) -> Self {
        ReportError::FileSystem {
            message: message.into(),
            path,
        }
    }

    /// 获取错误类别
    pub fn category(&self) -> ErrorCategory {
        match self {
            ReportError::Usage { .. } => ErrorCategory::Usage,
            ReportError::Configuration { .. } => ErrorCategory::Usage,
            ReportError::Network { .. } => ErrorCategory::Network,
            ReportError::Api { .. } => ErrorCategory::Network,
            ReportError::Parsing { .. } => ErrorCategory::Data,
            ReportError::FileSystem { .. } => ErrorCategory::IO,
        }
    }

    /// 是否为运行期致命错误；用法和配置错误在任何网络请求之前就已终止，不算在内
    pub fn is_fatal(&self) -> bool {
        self.category() != ErrorCategory::Usage
    }

    /// 进程退出码：用法错误为 2，其余致命错误为 1
    pub fn exit_code(&self) -> i32 {
        if self.is_fatal() {
            1
        } else {
            2
        }
    }
}

/// 错误类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    Usage,
    Network,
    Data,
    IO,
}
