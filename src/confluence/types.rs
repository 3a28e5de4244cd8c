//! Confluence REST 数据结构

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// `GET /rest/api/content` 的响应
#[derive(Debug, Clone, Deserialize)]
pub struct ContentSearch {
    #[serde(default)]
    pub results: Vec<ContentPage>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentPage {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub version: Option<PageVersion>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageVersion {
    pub number: u64,
}

impl ContentPage {
    /// 更新页面时需要提交的版本号
    pub fn next_version(&self) -> u64 {
        self.version.as_ref().map(|v| v.number).unwrap_or(0) + 1
    }
}

/// 新建页面的请求体
pub(crate) fn create_page_body(space: &str, parent_id: &str, title: &str, wiki: &str) -> Value {
    json!({
        "type": "page",
        "title": title,
        "space": { "key": space },
        "ancestors": [{ "id": parent_id }],
        "body": {
            "wiki": { "value": wiki, "representation": "wiki" }
        }
    })
}

/// 更新页面的请求体
pub(crate) fn update_page_body(page: &ContentPage, parent_id: &str, title: &str, wiki: &str) -> Value {
    json!({
        "id": page.id,
        "type": "page",
        "title": title,
        "ancestors": [{ "id": parent_id }],
        "version": { "number": page.next_version() },
        "body": {
            "wiki": { "value": wiki, "representation": "wiki" }
        }
    })
}
