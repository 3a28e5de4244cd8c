//! 工单列表 → 任务森林

use crate::config::Fields;
use crate::error::{ParseError, Result};
use crate::jira::Ticket;
use crate::tasks::forest::{NodeRef, TaskForest};
use crate::tasks::task::{Task, TaskId};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::Value;
use std::collections::HashSet;
use tracing::{debug, warn};

/// 带有已解析日期的工单
struct Scheduled<'a> {
    ticket: &'a Ticket,
    start: NaiveDate,
    end: NaiveDate,
}

/// 根据 `fields` 的字段绑定把工单组织成任务森林。
///
/// - 开始或结束日期为空的工单被丢弃
/// - 其余工单按 (开始, 结束, key) 排序后依次插入
/// - 父 / 子 / 阻塞关系只在已取回的工单之间建立；父任务必须排在前面，
///   子任务也只能是已经插入的任务
pub fn create_tasks_from_tickets(tickets: &[Ticket], fields: &Fields) -> Result<TaskForest> {
    let mut scheduled = Vec::with_capacity(tickets.len());
    for ticket in tickets {
        let (Some(start), Some(end)) = (
            ticket.field(&fields.start_date),
            ticket.field(&fields.end_date),
        ) else {
            debug!("{} 缺少开始或结束日期，跳过", ticket.key);
            continue;
        };
        scheduled.push(Scheduled {
            ticket,
            start: date_field(&ticket.key, &fields.start_date, start)?,
            end: date_field(&ticket.key, &fields.end_date, end)?,
        });
    }

    scheduled.sort_by(|a, b| {
        (a.start, a.end, &a.ticket.key).cmp(&(b.start, b.end, &b.ticket.key))
    });

    let retrieved: HashSet<&str> = scheduled.iter().map(|s| s.ticket.key.as_str()).collect();
    let mut forest = TaskForest::new();

    for item in &scheduled {
        let ticket = item.ticket;
        if forest.find_task_by_key(&ticket.key).is_some() {
            warn!("重复的工单 {}，只保留第一条", ticket.key);
            continue;
        }

        let parent = ticket
            .parent_key()
            .and_then(|key| resolve(&forest, &retrieved, &ticket.key, key, "父任务"))
            .map(NodeRef::Task)
            .unwrap_or(NodeRef::Root);

        let children: Vec<TaskId> = ticket
            .subtask_keys()
            .into_iter()
            .filter_map(|key| resolve(&forest, &retrieved, &ticket.key, key, "子任务"))
            .collect();

        let task = Task::new(ticket.key.as_str(), ticket.summary(), item.start, item.end)
            .with_progress(progress(ticket, fields))
            .with_blocking_tasks(blocking_tasks(ticket, &fields.link, &retrieved));

        let id = forest.insert(task, parent)?;
        for child in children {
            if let Err(e) = forest.set_parent(NodeRef::Task(child), NodeRef::Task(id)) {
                warn!("{} 的子任务挂载被忽略: {}", ticket.key, e);
            }
        }
    }

    Ok(forest)
}

/// 在已插入的任务中查找 `key`。排在后面的工单只能告警，不在本次结果里的引用直接忽略。
fn resolve(
    forest: &TaskForest,
    retrieved: &HashSet<&str>,
    owner: &str,
    key: &str,
    relation: &str,
) -> Option<TaskId> {
    if let Some(id) = forest.find_task_by_key(key) {
        return Some(id);
    }
    if retrieved.contains(key) {
        warn!(
            "{} 的{} {} 排在其后（开始日期更晚），关系被忽略",
            owner, relation, key
        );
    } else {
        debug!("{} 的{} {} 不在查询结果中", owner, relation, key);
    }
    None
}

/// 通过 inward 方向为 `label` 的链接阻塞本工单、且在查询结果中的工单
fn blocking_tasks(ticket: &Ticket, label: &str, retrieved: &HashSet<&str>) -> Vec<String> {
    ticket
        .links()
        .into_iter()
        .filter(|link| link.link_type.inward == label)
        .filter_map(|link| link.inward_issue.map(|issue| issue.key))
        .filter(|key| {
            let known = retrieved.contains(key.as_str());
            if !known {
                debug!("{} 的阻塞工单 {} 不在查询结果中", ticket.key, key);
            }
            known
        })
        .collect()
}

fn progress(ticket: &Ticket, fields: &Fields) -> f64 {
    let Some(name) = fields.progress.as_deref() else {
        return 0.0;
    };
    if ticket.field(name).is_none() {
        return 0.0;
    }
    ticket.number_field(name).unwrap_or_else(|| {
        warn!("{} 的进度字段 {} 不是数值，按 0 处理", ticket.key, name);
        0.0
    })
}

fn date_field(key: &str, field: &str, value: &Value) -> Result<NaiveDate> {
    let parsed = value.as_str().and_then(parse_date);
    parsed.ok_or_else(|| {
        ParseError::InvalidDate {
            key: key.to_string(),
            field: field.to_string(),
            value: match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            },
        }
        .into()
    })
}

/// 支持 `YYYY-MM-DD`、RFC 3339 以及 Jira 的 `2024-01-01T10:00:00.000+0000`，只保留日期部分
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(text).ok().map(|d| d.date_naive()))
        .or_else(|| {
            DateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f%z")
                .ok()
                .map(|d| d.date_naive())
        })
        .or_else(|| {
            NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f")
                .ok()
                .map(|d| d.date())
        })
}
