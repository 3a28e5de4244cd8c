use crate::error::{ConfigError, GanttError, Result};
use crate::http::{build_client, endpoint, send_json};
use crate::jira::types::{JiraField, SearchResponse, Ticket};
use crate::jira::{FieldResolver, TicketSource};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::OnceCell;
use tracing::{debug, info};

/// 单次查询最多返回的工单数
pub const DEFAULT_LIMIT: usize = 1000;
/// 每页请求的工单数
const PAGE_SIZE: usize = 100;

/// Jira REST 客户端（Basic 认证）
pub struct JiraClient {
    client: Client,
    base_url: String,
    username: String,
    password: String,
    limit: usize,
    /// 自定义字段列表，首次解析字段名时拉取
    custom_fields: OnceCell<Vec<JiraField>>,
}

impl JiraClient {
    pub fn new(url: &str, username: &str, password: &str) -> Result<Self> {
        debug!("创建 Jira 客户端");

        if url.is_empty() {
            return Err(invalid("jira.url", "Jira URL is invalid"));
        }
        if username.is_empty() {
            return Err(invalid("jira.username", "Jira username is invalid"));
        }
        if password.is_empty() {
            return Err(invalid("jira.password", "Jira password is invalid"));
        }

        Ok(Self {
            client: build_client()?,
            base_url: url.to_string(),
            username: username.to_string(),
            password: password.to_string(),
            limit: DEFAULT_LIMIT,
            custom_fields: OnceCell::new(),
        })
    }

    /// 单次查询的工单数上限
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit.max(1);
        self
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T> {
        let builder = self
            .client
            .get(endpoint(&self.base_url, path))
            .basic_auth(&self.username, Some(&self.password))
            .query(query);
        send_json(builder).await.map_err(GanttError::Retrieval)
    }

    /// 读取单个工单的某个字段，非字符串值按 JSON 文本返回
    pub async fn ticket_field_value(&self, key: &str, field_name: &str) -> Result<String> {
        let ticket: Ticket = self
            .get(
                &format!("rest/api/2/issue/{}", key),
                &[("fields", field_name.to_string())],
            )
            .await?;
        Ok(match ticket.field(field_name) {
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => String::new(),
        })
    }

    pub async fn ticket_title(&self, key: &str) -> Result<String> {
        self.ticket_field_value(key, "summary").await
    }

    async fn all_custom_fields(&self) -> Result<&[JiraField]> {
        let fields = self
            .custom_fields
            .get_or_try_init(|| async {
                let all: Vec<JiraField> = self.get("rest/api/2/field", &[]).await?;
                let custom: Vec<JiraField> = all.into_iter().filter(|f| f.custom).collect();
                debug!("获取到 {} 个自定义字段", custom.len());
                Ok::<_, GanttError>(custom)
            })
            .await?;
        Ok(fields.as_slice())
    }
}

fn invalid(field: &str, message: &str) -> GanttError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        message: message.to_string(),
    }
    .into()
}

#[async_trait]
impl TicketSource for JiraClient {
    async fn tickets_from_jql(&self, jql: &str, fields: &[String]) -> Result<Vec<Ticket>> {
        info!("JQL 查询: {}", jql);

        let mut tickets: Vec<Ticket> = Vec::new();
        loop {
            let page_size = PAGE_SIZE.min(self.limit - tickets.len());
            let page: SearchResponse = self
                .get(
                    "rest/api/2/search",
                    &[
                        ("jql", jql.to_string()),
                        ("fields", fields.join(",")),
                        ("startAt", tickets.len().to_string()),
                        ("maxResults", page_size.to_string()),
                    ],
                )
                .await?;

            let received = page.issues.len();
            tickets.extend(page.issues);
            debug!(
                "收到 {} 个工单（{}/{}）",
                received,
                tickets.len(),
                page.total
            );

            if received == 0 || tickets.len() >= page.total || tickets.len() >= self.limit {
                break;
            }
        }

        tickets.truncate(self.limit);
        info!("JQL 查询返回 {} 个工单", tickets.len());
        Ok(tickets)
    }
}

#[async_trait]
impl FieldResolver for JiraClient {
    async fn custom_field_id_from_name(&self, name: &str) -> Result<String> {
        let id = self
            .all_custom_fields()
            .await?
            .iter()
            .find(|f| f.name == name)
            .map(|f| f.id.clone())
            .unwrap_or_else(|| name.to_string());
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_with_empty_url() {
        let err = JiraClient::new("", "user", "pass").err().unwrap();
        assert!(err.to_string().contains("Jira URL is invalid"));
    }

    #[test]
    fn test_create_with_empty_username() {
        let err = JiraClient::new("http://test", "", "pass").err().unwrap();
        assert!(err.to_string().contains("Jira username is invalid"));
    }

    #[test]
    fn test_create_with_empty_password() {
        let err = JiraClient::new("http://test", "user", "").err().unwrap();
        assert!(err.to_string().contains("Jira password is invalid"));
    }

    #[test]
    fn test_limit_is_at_least_one() {
        let client = JiraClient::new("http://test", "user", "pass")
            .unwrap()
            .with_limit(0);
        assert_eq!(client.limit, 1);
    }
}
