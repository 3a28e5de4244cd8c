use std::fmt;

/// jira_gantt 的统一错误类型
#[derive(Debug)]
pub enum GanttError {
    /// 配置错误（在任何网络请求之前触发）
    Config(ConfigError),
    /// 从 Jira 拉取工单失败
    Retrieval(HttpError),
    /// 工单字段解析失败
    Parse(ParseError),
    /// 任务树结构错误
    Tree(TreeError),
    /// 甘特图生成错误
    Report(ReportError),
    /// 发布到 Confluence 失败
    Publish(PublishError),
    /// IO 错误
    Io(std::io::Error),
    /// 其他错误
    Other(String),
}

/// HTTP 调用错误（Jira / Confluence 共用）
#[derive(Debug)]
pub enum HttpError {
    /// 网络请求失败
    NetworkError(String),
    /// 服务端返回错误状态码
    ApiError { status: u16, message: String },
    /// 响应格式无效
    InvalidResponse(String),
}

/// 配置错误
#[derive(Debug)]
pub enum ConfigError {
    /// 配置文件未找到或不可读
    FileNotFound(String),
    /// 配置文件扩展名不支持
    UnknownExtension(String),
    /// 配置解析失败
    ParseFailed(String),
    /// 缺少必需的密钥环境变量
    MissingSecret(String),
    /// 配置值无效
    InvalidValue { field: String, message: String },
}

/// 工单字段解析错误
#[derive(Debug)]
pub enum ParseError {
    /// 开始 / 结束日期无法解析
    InvalidDate {
        key: String,
        field: String,
        value: String,
    },
    /// JSON 解析错误
    JsonError(String),
}

/// 任务树结构错误
#[derive(Debug, PartialEq)]
pub enum TreeError {
    /// 根节点不能挂到其他节点下
    RootReparent,
    /// 挂载会形成环
    Loop { child: String, parent: String },
    /// 重复的任务 key
    DuplicateKey(String),
    /// 节点不存在
    UnknownNode(usize),
}

/// 甘特图生成错误
#[derive(Debug)]
pub enum ReportError {
    /// 模板不存在
    TemplateNotFound(String),
    /// 模板参数与模板不匹配
    InvalidParameters { template: String, message: String },
}

/// 发布错误
#[derive(Debug)]
pub enum PublishError {
    /// 父页面不存在
    ParentPageNotFound { space: String, title: String },
    /// HTTP 调用失败
    Http(HttpError),
}

impl fmt::Display for GanttError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GanttError::Config(e) => write!(f, "Config Error: {}", e),
            GanttError::Retrieval(e) => write!(f, "Retrieval Error: {}", e),
            GanttError::Parse(e) => write!(f, "Parse Error: {}", e),
            GanttError::Tree(e) => write!(f, "Tree Error: {}", e),
            GanttError::Report(e) => write!(f, "Report Error: {}", e),
            GanttError::Publish(e) => write!(f, "Publish Error: {}", e),
            GanttError::Io(e) => write!(f, "IO Error: {}", e),
            GanttError::Other(msg) => write!(f, "Error: {}", msg),
        }
    }
}

impl fmt::Display for HttpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HttpError::NetworkError(msg) => write!(f, "Network error: {}", msg),
            HttpError::ApiError { status, message } => {
                write!(f, "API error (status {}): {}", status, message)
            }
            HttpError::InvalidResponse(msg) => write!(f, "Invalid response: {}", msg),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::FileNotFound(path) => write!(f, "Config file not found: {}", path),
            ConfigError::UnknownExtension(path) => {
                write!(f, "Unknown file extension for configuration: {}", path)
            }
            ConfigError::ParseFailed(msg) => write!(f, "Failed to parse config: {}", msg),
            ConfigError::MissingSecret(name) => {
                write!(f, "Missing secret environment variable: {}", name)
            }
            ConfigError::InvalidValue { field, message } => {
                write!(f, "Invalid config value for '{}': {}", field, message)
            }
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::InvalidDate { key, field, value } => {
                write!(f, "Invalid date '{}' in field '{}' of {}", value, field, key)
            }
            ParseError::JsonError(msg) => write!(f, "JSON parse error: {}", msg),
        }
    }
}

impl fmt::Display for TreeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TreeError::RootReparent => write!(f, "The task forest root cannot have a parent"),
            TreeError::Loop { child, parent } => {
                write!(f, "Attaching {} under {} would create a loop", child, parent)
            }
            TreeError::DuplicateKey(key) => write!(f, "Duplicate task key: {}", key),
            TreeError::UnknownNode(id) => write!(f, "Unknown task node: {}", id),
        }
    }
}

impl fmt::Display for ReportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportError::TemplateNotFound(name) => write!(f, "Template '{}' not found", name),
            ReportError::InvalidParameters { template, message } => {
                write!(f, "Invalid parameters for template '{}': {}", template, message)
            }
        }
    }
}

impl fmt::Display for PublishError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PublishError::ParentPageNotFound { space, title } => {
                write!(f, "Parent page not found: '{}' in space {}", title, space)
            }
            PublishError::Http(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for GanttError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GanttError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl std::error::Error for HttpError {}
impl std::error::Error for ConfigError {}
impl std::error::Error for ParseError {}
impl std::error::Error for TreeError {}
impl std::error::Error for ReportError {}
impl std::error::Error for PublishError {}

// From 转换实现
impl From<std::io::Error> for GanttError {
    fn from(err: std::io::Error) -> Self {
        GanttError::Io(err)
    }
}

impl From<reqwest::Error> for HttpError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            HttpError::NetworkError("Request timeout".to_string())
        } else if err.is_connect() {
            HttpError::NetworkError(format!("Connection failed: {}", err))
        } else if err.is_decode() {
            HttpError::InvalidResponse(err.to_string())
        } else {
            HttpError::NetworkError(err.to_string())
        }
    }
}

impl From<serde_json::Error> for GanttError {
    fn from(err: serde_json::Error) -> Self {
        GanttError::Parse(ParseError::JsonError(err.to_string()))
    }
}

impl From<serde_yaml::Error> for GanttError {
    fn from(err: serde_yaml::Error) -> Self {
        GanttError::Config(ConfigError::ParseFailed(err.to_string()))
    }
}

impl From<ConfigError> for GanttError {
    fn from(err: ConfigError) -> Self {
        GanttError::Config(err)
    }
}

impl From<ParseError> for GanttError {
    fn from(err: ParseError) -> Self {
        GanttError::Parse(err)
    }
}

impl From<TreeError> for GanttError {
    fn from(err: TreeError) -> Self {
        GanttError::Tree(err)
    }
}

impl From<ReportError> for GanttError {
    fn from(err: ReportError) -> Self {
        GanttError::Report(err)
    }
}

impl From<PublishError> for GanttError {
    fn from(err: PublishError) -> Self {
        GanttError::Publish(err)
    }
}

// 便捷的 Result 类型别名
pub type Result<T> = std::result::Result<T, GanttError>;
