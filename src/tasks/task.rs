//! 任务定义

use crate::tasks::forest::NodeRef;
use chrono::NaiveDate;

/// 任务在 [`crate::tasks::TaskForest`] 中的下标
pub type TaskId = usize;

/// 一个工单在甘特图中的排期信息及其在树中的位置
#[derive(Debug, Clone, PartialEq)]
pub struct Task {
    /// 工单 key（如 `PRJ-12`）
    pub key: String,
    pub summary: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// 完成度百分比，不做范围校验
    pub progress_in_percent: f64,
    /// 阻塞本任务的任务 key 列表
    pub blocking_tasks: Vec<String>,
    pub(crate) parent: Option<TaskId>,
    pub(crate) children: Vec<TaskId>,
}

impl Task {
    pub fn new(
        key: impl Into<String>,
        summary: impl Into<String>,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Self {
        Self {
            key: key.into(),
            summary: summary.into(),
            start_date,
            end_date,
            progress_in_percent: 0.0,
            blocking_tasks: Vec::new(),
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn with_progress(mut self, progress_in_percent: f64) -> Self {
        self.progress_in_percent = progress_in_percent;
        self
    }

    pub fn with_blocking_tasks(mut self, keys: Vec<String>) -> Self {
        self.blocking_tasks = keys;
        self
    }

    /// 父节点；顶层任务的父节点是森林根
    pub fn parent(&self) -> NodeRef {
        self.parent.map(NodeRef::Task).unwrap_or(NodeRef::Root)
    }

    /// 按挂载顺序排列的子任务
    pub fn children(&self) -> &[TaskId] {
        &self.children
    }

    pub fn is_completed(&self) -> bool {
        self.progress_in_percent >= 100.0
    }
}
