use crate::confluence::Publisher;
use crate::confluence::types::{ContentPage, ContentSearch, create_page_body, update_page_body};
use crate::error::{ConfigError, GanttError, PublishError, Result};
use crate::http::{build_client, endpoint, send_json};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, info};

const CONTENT_PATH: &str = "rest/api/content";

/// Confluence REST 客户端（Basic 认证）
pub struct ConfluenceClient {
    client: Client,
    base_url: String,
    username: String,
    password: String,
}

impl ConfluenceClient {
    pub fn new(url: &str, username: &str, password: &str) -> Result<Self> {
        debug!("创建 Confluence 客户端");

        if url.is_empty() {
            return Err(invalid("confluence.url", "Confluence URL is invalid"));
        }
        if username.is_empty() {
            return Err(invalid("confluence.username", "Confluence username is invalid"));
        }
        if password.is_empty() {
            return Err(invalid("confluence.password", "Confluence password is invalid"));
        }

        Ok(Self {
            client: build_client()?,
            base_url: url.to_string(),
            username: username.to_string(),
            password: password.to_string(),
        })
    }

    /// 按标题查找页面
    pub async fn find_page(&self, space: &str, title: &str) -> Result<Option<ContentPage>> {
        let builder = self
            .client
            .get(endpoint(&self.base_url, CONTENT_PATH))
            .basic_auth(&self.username, Some(&self.password))
            .query(&[
                ("spaceKey", space),
                ("title", title),
                ("type", "page"),
                ("expand", "version"),
            ]);
        let search: ContentSearch = send_json(builder).await.map_err(PublishError::Http)?;
        Ok(search.results.into_iter().next())
    }

    async fn create_page(&self, space: &str, parent_id: &str, title: &str, body: &str) -> Result<()> {
        let builder = self
            .client
            .post(endpoint(&self.base_url, CONTENT_PATH))
            .basic_auth(&self.username, Some(&self.password))
            .json(&create_page_body(space, parent_id, title, body));
        let _: Value = send_json(builder).await.map_err(PublishError::Http)?;
        info!("已创建页面 '{}'", title);
        Ok(())
    }

    async fn update_page(
        &self,
        page: &ContentPage,
        parent_id: &str,
        title: &str,
        body: &str,
    ) -> Result<()> {
        let builder = self
            .client
            .put(endpoint(
                &self.base_url,
                &format!("{}/{}", CONTENT_PATH, page.id),
            ))
            .basic_auth(&self.username, Some(&self.password))
            .json(&update_page_body(page, parent_id, title, body));
        let _: Value = send_json(builder).await.map_err(PublishError::Http)?;
        info!("已更新页面 '{}'（版本 {}）", title, page.next_version());
        Ok(())
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
impl Publisher for ConfluenceClient {
    async fn create_new_page(
        &self,
        space: &str,
        parent_page: &str,
        title: &str,
        body: &str,
    ) -> Result<()> {
        debug!("发布页面 '{}' 到 {}/{}", title, space, parent_page);

        let parent = self
            .find_page(space, parent_page)
            .await?
            .ok_or_else(|| PublishError::ParentPageNotFound {
                space: space.to_string(),
                title: parent_page.to_string(),
            })?;

        match self.find_page(space, title).await? {
            Some(existing) => self.update_page(&existing, &parent.id, title, body).await,
            None => self.create_page(space, &parent.id, title, body).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_with_empty_url() {
        let err = ConfluenceClient::new("", "user", "pass").err().unwrap();
        assert!(err.to_string().contains("Confluence URL is invalid"));
    }

    #[test]
    fn test_create_with_empty_username() {
        let err = ConfluenceClient::new("http://test", "", "pass").err().unwrap();
        assert!(err.to_string().contains("Confluence username is invalid"));
    }

    #[test]
    fn test_create_with_empty_password() {
        let err = ConfluenceClient::new("http://test", "user", "").err().unwrap();
        assert!(err.to_string().contains("Confluence password is invalid"));
    }
}
