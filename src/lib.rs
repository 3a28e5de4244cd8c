pub mod config;
pub mod confluence;
pub mod error;
mod http;
pub mod jira;
pub mod report;
pub mod tasks;
pub mod testing;

pub mod prelude {
    pub use crate::config::{ChartEngine, Config, GlobalConfig, Project};
    pub use crate::confluence::{ConfluenceClient, Publisher};
    pub use crate::error::{GanttError, Result};
    pub use crate::jira::{FieldResolver, JiraClient, Ticket, TicketSource};
    pub use crate::report::{FailurePolicy, GanttChart, ProjectOutcome, ProjectReport, ReportRunner};
    pub use crate::tasks::{NodeRef, Task, TaskForest, create_tasks_from_tickets};
}
