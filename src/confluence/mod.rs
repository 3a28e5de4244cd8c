//! Confluence 页面发布

mod client;
mod types;

pub use client::ConfluenceClient;
pub use types::{ContentPage, ContentSearch, PageVersion};

use crate::error::Result;
use async_trait::async_trait;

/// 把生成好的页面内容写到 wiki
#[async_trait]
pub trait Publisher: Send + Sync {
    /// 在 `space` 中 `parent_page` 下创建（或更新同名）页面，`body` 为 wiki markup。
    ///
    /// 父页面不存在时返回 [`crate::error::PublishError::ParentPageNotFound`]，不会创建中间层级。
    async fn create_new_page(
        &self,
        space: &str,
        parent_page: &str,
        title: &str,
        body: &str,
    ) -> Result<()>;
}
