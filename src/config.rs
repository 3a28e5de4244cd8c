//! 配置加载
//!
//! 配置文件按扩展名选择解析器（`.yaml` / `.yml` / `.json`），格式：
//! ```yaml
//! server:
//!   jira: https://example.atlassian.net
//!   confluence: https://example.atlassian.net/wiki
//! projects:
//!   - name: Project
//!     jql: "project = PRJ"
//!     report:
//!       space: SPACE
//!       parent_page: Parent page
//!       engine: PlantUML
//!       legend: true
//!     fields:
//!       start_date: Start date
//!       end_date: Due date
//!       progress: Progress
//!       link: is blocked by
//! ```
//! 账号密钥不写在配置文件里，而是从环境变量（或 `.env`）读取：
//! `ATLASSIAN_USER` / `ATLASSIAN_TOKEN`。

use crate::confluence::ConfluenceClient;
use crate::error::{ConfigError, GanttError, Result};
use crate::jira::{FieldResolver, JiraClient};
use dotenv::dotenv;
use reqwest::Url;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::path::Path;
use tracing::{debug, info};

/// 账号环境变量名
pub const USER_ENV: &str = "ATLASSIAN_USER";
/// Token 环境变量名
pub const TOKEN_ENV: &str = "ATLASSIAN_TOKEN";
/// 默认的阻塞链接标签
pub const DEFAULT_LINK: &str = "is blocked by";

const REDACTED: &str = "**********";

/// 不会出现在日志和配置转储中的密钥字符串
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// 取出明文（只在构造 HTTP 客户端时使用）
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Secret({})", REDACTED)
    }
}

impl Serialize for Secret {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(REDACTED)
    }
}

/// Jira / Confluence 共用的账号信息
#[derive(Debug, Clone, Serialize)]
pub struct Secrets {
    pub user: String,
    pub token: Secret,
}

impl Secrets {
    /// 先加载 `.env`，再从进程环境变量读取
    pub fn from_env() -> Result<Self> {
        dotenv().ok();
        Self::from_values(std::env::var(USER_ENV).ok(), std::env::var(TOKEN_ENV).ok())
    }

    /// 空字符串与缺失同等对待
    pub fn from_values(user: Option<String>, token: Option<String>) -> Result<Self> {
        let user = user
            .filter(|v| !v.is_empty())
            .ok_or_else(|| ConfigError::MissingSecret(USER_ENV.to_string()))?;
        let token = token
            .filter(|v| !v.is_empty())
            .ok_or_else(|| ConfigError::MissingSecret(TOKEN_ENV.to_string()))?;
        Ok(Self {
            user,
            token: Secret::new(token),
        })
    }
}

/// 服务器地址
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Server {
    pub jira: String,
    /// 未配置时只生成甘特图，不发布
    #[serde(default)]
    pub confluence: Option<String>,
}

/// 甘特图生成引擎
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ChartEngine {
    /// Confluence 自带的 chart 宏
    #[default]
    #[serde(rename = "Confluence")]
    Confluence,
    /// PlantUML 甘特图，经 plantuml 宏嵌入页面
    #[serde(rename = "PlantUML")]
    PlantUml,
}

impl fmt::Display for ChartEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChartEngine::Confluence => write!(f, "Confluence"),
            ChartEngine::PlantUml => write!(f, "PlantUML"),
        }
    }
}

/// 报告输出位置与样式
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Report {
    pub space: String,
    pub parent_page: String,
    #[serde(default)]
    pub engine: ChartEngine,
    #[serde(default)]
    pub legend: bool,
}

/// 工单字段绑定
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Fields {
    pub start_date: String,
    pub end_date: String,
    #[serde(default)]
    pub progress: Option<String>,
    /// 表示"被阻塞"的链接标签（inward 方向）
    #[serde(default = "default_link")]
    pub link: String,
}

fn default_link() -> String {
    DEFAULT_LINK.to_string()
}

impl Fields {
    /// 查询工单时需要取回的字段列表
    pub fn query_fields(&self) -> Vec<String> {
        let mut fields: Vec<String> = [
            "key",
            "summary",
            self.start_date.as_str(),
            self.end_date.as_str(),
            "parent",
            "subtasks",
            "issuelinks",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        if let Some(progress) = &self.progress {
            fields.push(progress.clone());
        }
        fields
    }
}

/// 单个项目的配置
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Project {
    pub name: String,
    pub jql: String,
    pub report: Report,
    pub fields: Fields,
}

impl Project {
    /// 发布页面的标题
    pub fn page_title(&self) -> String {
        format!("[{}] Gantt", self.name)
    }
}

/// 配置文件内容（不含密钥）
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    pub server: Server,
    #[serde(default)]
    pub projects: Vec<Project>,
}

impl Config {
    /// 按扩展名解析配置文件并校验
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let shown = path.display().to_string();
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());

        let config = match extension.as_deref() {
            Some("yaml") | Some("yml") => {
                info!("解析 YAML 配置: {}", shown);
                let text = read_config_file(path)?;
                Self::from_yaml_str(&text)?
            }
            Some("json") => {
                info!("解析 JSON 配置: {}", shown);
                let text = read_config_file(path)?;
                Self::from_json_str(&text)?
            }
            _ => return Err(ConfigError::UnknownExtension(shown).into()),
        };

        info!("配置解析完成，共 {} 个项目", config.projects.len());
        Ok(config)
    }

    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(text)
            .map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// 结构之外的取值校验
    pub fn validate(&self) -> Result<()> {
        check_url("server.jira", &self.server.jira)?;
        if let Some(confluence) = &self.server.confluence {
            check_url("server.confluence", confluence)?;
        }

        for project in &self.projects {
            let name = &project.name;
            check_not_empty(name, "jql", &project.jql)?;
            check_not_empty(name, "report.space", &project.report.space)?;
            check_not_empty(name, "report.parent_page", &project.report.parent_page)?;
            check_not_empty(name, "fields.start_date", &project.fields.start_date)?;
            check_not_empty(name, "fields.end_date", &project.fields.end_date)?;
            check_not_empty(name, "fields.link", &project.fields.link)?;
            if let Some(progress) = &project.fields.progress {
                check_not_empty(name, "fields.progress", progress)?;
            }
        }
        Ok(())
    }
}

fn read_config_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => ConfigError::FileNotFound(path.display().to_string()).into(),
        _ => GanttError::Io(e),
    })
}

fn check_url(field: &str, value: &str) -> Result<()> {
    let url = Url::parse(value).map_err(|e| ConfigError::InvalidValue {
        field: field.to_string(),
        message: format!("'{}' is not a valid URL: {}", value, e),
    })?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        scheme => Err(ConfigError::InvalidValue {
            field: field.to_string(),
            message: format!("unsupported URL scheme '{}'", scheme),
        }
        .into()),
    }
}

fn check_not_empty(project: &str, field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(ConfigError::InvalidValue {
            field: format!("projects[{}].{}", project, field),
            message: "must not be empty".to_string(),
        }
        .into());
    }
    Ok(())
}

/// 完整的运行配置：密钥 + 配置文件
#[derive(Debug, Clone, Serialize)]
pub struct GlobalConfig {
    pub secrets: Secrets,
    pub config: Config,
}

impl GlobalConfig {
    /// 加载配置文件与环境变量中的密钥
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let config = Config::load(path)?;
        let secrets = Secrets::from_env()?;
        Ok(Self { secrets, config })
    }

    /// JSON 转储，token 已脱敏
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(GanttError::from)
    }

    pub fn jira_client(&self) -> Result<JiraClient> {
        JiraClient::new(
            &self.config.server.jira,
            &self.secrets.user,
            self.secrets.token.expose(),
        )
    }

    /// 未配置 Confluence 地址时返回 `None`
    pub fn confluence_client(&self) -> Result<Option<ConfluenceClient>> {
        self.config
            .server
            .confluence
            .as_deref()
            .map(|url| ConfluenceClient::new(url, &self.secrets.user, self.secrets.token.expose()))
            .transpose()
    }

    /// 把开始日期 / 结束日期 / 进度字段的显示名替换为字段 ID
    pub async fn update_custom_fields(&mut self, resolver: &dyn FieldResolver) -> Result<()> {
        for project in &mut self.config.projects {
            let fields = &mut project.fields;
            fields.start_date = resolver.custom_field_id_from_name(&fields.start_date).await?;
            fields.end_date = resolver.custom_field_id_from_name(&fields.end_date).await?;
            if let Some(progress) = fields.progress.take() {
                fields.progress = Some(resolver.custom_field_id_from_name(&progress).await?);
            }
            debug!("项目 {} 字段绑定: {:?}", project.name, project.fields);
        }
        Ok(())
    }
}
