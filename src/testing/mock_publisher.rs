//! Mock 发布者，替代真实 Confluence，记录每一次发布请求。

use crate::confluence::Publisher;
use crate::error::{HttpError, PublishError, Result};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// 一次成功发布的页面
#[derive(Debug, Clone, PartialEq)]
pub struct PublishedPage {
    pub space: String,
    pub parent_page: String,
    pub title: String,
    pub body: String,
}

/// 可脚本化的 Mock 发布者。
///
/// - `with_missing_parent()`：所有发布都返回 "父页面不存在"
/// - `with_failure()`：按顺序消耗的失败响应，耗尽后恢复成功
#[derive(Clone, Default)]
pub struct MockPublisher {
    missing_parent: bool,
    failures: Arc<Mutex<VecDeque<String>>>,
    pages: Arc<Mutex<Vec<PublishedPage>>>,
    calls: Arc<Mutex<usize>>,
}

impl MockPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_missing_parent(mut self) -> Self {
        self.missing_parent = true;
        self
    }

    /// 追加一次失败（`PublishError::Http`，状态码 500）
    pub fn with_failure(self, msg: impl Into<String>) -> Self {
        self.failures.lock().unwrap().push_back(msg.into());
        self
    }

    /// 发布调用总次数（含失败）
    pub fn call_count(&self) -> usize {
        *self.calls.lock().unwrap()
    }

    /// 成功发布的页面
    pub fn pages(&self) -> Vec<PublishedPage> {
        self.pages.lock().unwrap().clone()
    }
}

#[async_trait]
impl Publisher for MockPublisher {
    async fn create_new_page(
        &self,
        space: &str,
        parent_page: &str,
        title: &str,
        body: &str,
    ) -> Result<()> {
        *self.calls.lock().unwrap() += 1;

        if self.missing_parent {
            return Err(PublishError::ParentPageNotFound {
                space: space.to_string(),
                title: parent_page.to_string(),
            }
            .into());
        }
        if let Some(message) = self.failures.lock().unwrap().pop_front() {
            return Err(PublishError::Http(HttpError::ApiError {
                status: 500,
                message,
            })
            .into());
        }

        self.pages.lock().unwrap().push(PublishedPage {
            space: space.to_string(),
            parent_page: parent_page.to_string(),
            title: title.to_string(),
            body: body.to_string(),
        });
        Ok(())
    }
}
