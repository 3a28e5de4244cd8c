//! 测试基础设施
//!
//! 在不依赖真实 Jira / Confluence 的情况下测试整条流水线。
//!
//! | 类型 | 用途 |
//! |------|------|
//! | [`MockTicketSource`] | 替代 Jira：预设查询结果 / 失败，解析自定义字段名 |
//! | [`MockPublisher`] | 替代 Confluence：记录发布的页面，模拟父页面缺失或接口失败 |
//!
//! # 设计原则
//!
//! - **零网络请求**：所有 Mock 都完全在内存中运行
//! - **可脚本化**：通过 `with_tickets()` / `with_failure()` 精确控制返回值
//! - **可观测**：通过 `call_count()` / `queries()` / `pages()` 检查调用情况
//! - **线程安全**：内部使用 `Arc<Mutex<_>>`，克隆后共享同一份记录
//!
//! # 使用示例
//!
//! ```rust
//! use jira_gantt::config::{ChartEngine, Fields, Project, Report};
//! use jira_gantt::jira::Ticket;
//! use jira_gantt::report::{ProjectOutcome, ReportRunner};
//! use jira_gantt::testing::{MockPublisher, MockTicketSource};
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let source = Arc::new(MockTicketSource::new().with_tickets(vec![
//!     Ticket::new("PRJ-1")
//!         .with_summary("Design")
//!         .with_field("start", json!("2024-01-01"))
//!         .with_field("end", json!("2024-01-05")),
//! ]));
//! let publisher = Arc::new(MockPublisher::new());
//! let runner = ReportRunner::new(source).with_publisher(publisher.clone());
//!
//! let project = Project {
//!     name: "Demo".to_string(),
//!     jql: "project = PRJ".to_string(),
//!     report: Report {
//!         space: "SPACE".to_string(),
//!         parent_page: "Plans".to_string(),
//!         engine: ChartEngine::Confluence,
//!         legend: false,
//!     },
//!     fields: Fields {
//!         start_date: "start".to_string(),
//!         end_date: "end".to_string(),
//!         progress: None,
//!         link: "is blocked by".to_string(),
//!     },
//! };
//!
//! let report = runner.generate_report(&project).await;
//! assert!(matches!(report.outcome, ProjectOutcome::Published));
//! assert_eq!(publisher.pages()[0].title, "[Demo] Gantt");
//! # }
//! ```

mod mock_publisher;
mod mock_source;

pub use mock_publisher::{MockPublisher, PublishedPage};
pub use mock_source::MockTicketSource;
