//! Jira 工单来源
//!
//! 核心流程只依赖 [`TicketSource`] / [`FieldResolver`] 两个 trait，
//! [`JiraClient`] 是基于 REST API 的实现，测试中用 [`crate::testing::MockTicketSource`] 替代。

mod client;
mod types;

pub use client::JiraClient;
pub use types::{IssueLink, IssueLinkType, JiraField, LinkedIssue, SearchResponse, Ticket};

use crate::error::Result;
use async_trait::async_trait;

/// 按 JQL 查询工单
#[async_trait]
pub trait TicketSource: Send + Sync {
    /// 返回匹配的工单，只取回 `fields` 中列出的字段；结果为空不是错误
    async fn tickets_from_jql(&self, jql: &str, fields: &[String]) -> Result<Vec<Ticket>>;
}

/// 自定义字段显示名 → 字段 ID
#[async_trait]
pub trait FieldResolver: Send + Sync {
    /// 没有同名自定义字段时原样返回，调用方需要能接受已经是 ID 的输入
    async fn custom_field_id_from_name(&self, name: &str) -> Result<String>;
}
