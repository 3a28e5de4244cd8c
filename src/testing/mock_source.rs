//! Mock 工单源，替代真实 Jira。
//!
//! 同时实现 [`TicketSource`] 与 [`FieldResolver`]，可以直接交给
//! [`crate::report::ReportRunner`] 和 [`crate::config::GlobalConfig::update_custom_fields`]。
//!
//! ```rust
//! use jira_gantt::jira::{Ticket, TicketSource};
//! use jira_gantt::testing::MockTicketSource;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let source = MockTicketSource::new()
//!     .with_tickets(vec![Ticket::new("PRJ-1")])
//!     .with_failure("Jira unavailable");
//!
//! assert_eq!(source.tickets_from_jql("project = PRJ", &[]).await.unwrap().len(), 1);
//! assert!(source.tickets_from_jql("project = PRJ", &[]).await.is_err());
//! assert_eq!(source.call_count(), 2);
//! # }
//! ```

use crate::error::{GanttError, HttpError, Result};
use crate::jira::{FieldResolver, Ticket, TicketSource};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

#[derive(Clone)]
enum MockTicketResponse {
    Tickets(Vec<Ticket>),
    Failure(String),
}

/// 可脚本化的 Mock 工单源。
///
/// 按顺序返回预设的查询结果；队列只剩最后一个时重复返回它，
/// 从未设置时返回空列表。
#[derive(Clone, Default)]
pub struct MockTicketSource {
    responses: Arc<Mutex<VecDeque<MockTicketResponse>>>,
    custom_fields: Arc<Mutex<HashMap<String, String>>>,
    /// 每次查询的 (JQL, 字段列表)
    queries: Arc<Mutex<Vec<(String, Vec<String>)>>>,
}

impl MockTicketSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加一次查询结果
    pub fn with_tickets(self, tickets: Vec<Ticket>) -> Self {
        self.responses
            .lock()
            .unwrap()
            .push_back(MockTicketResponse::Tickets(tickets));
        self
    }

    /// 追加一次失败的查询（返回 `GanttError::Retrieval`）
    pub fn with_failure(self, msg: impl Into<String>) -> Self {
        self.responses
            .lock()
            .unwrap()
            .push_back(MockTicketResponse::Failure(msg.into()));
        self
    }

    /// 登记一个自定义字段：显示名 → 字段 ID
    pub fn with_custom_field(self, name: impl Into<String>, id: impl Into<String>) -> Self {
        self.custom_fields
            .lock()
            .unwrap()
            .insert(name.into(), id.into());
        self
    }

    pub fn call_count(&self) -> usize {
        self.queries.lock().unwrap().len()
    }

    pub fn queries(&self) -> Vec<(String, Vec<String>)> {
        self.queries.lock().unwrap().clone()
    }

    fn next_response(&self) -> Option<MockTicketResponse> {
        let mut queue = self.responses.lock().unwrap();
        if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        }
    }
}

#[async_trait]
impl TicketSource for MockTicketSource {
    async fn tickets_from_jql(&self, jql: &str, fields: &[String]) -> Result<Vec<Ticket>> {
        self.queries
            .lock()
            .unwrap()
            .push((jql.to_string(), fields.to_vec()));

        match self.next_response() {
            Some(MockTicketResponse::Tickets(tickets)) => Ok(tickets),
            Some(MockTicketResponse::Failure(msg)) => {
                Err(GanttError::Retrieval(HttpError::NetworkError(msg)))
            }
            None => Ok(Vec::new()),
        }
    }
}

#[async_trait]
impl FieldResolver for MockTicketSource {
    async fn custom_field_id_from_name(&self, name: &str) -> Result<String> {
        Ok(self
            .custom_fields
            .lock()
            .unwrap()
            .get(name)
            .cloned()
            .unwrap_or_else(|| name.to_string()))
    }
}
