//! 内置页面模板
//!
//! | 名称 | 参数 | 输出 |
//! |------|------|------|
//! | `confluencechart` | [`TemplateParams::Chart`] | Confluence `{chart:type=gantt}` 宏 |
//! | `plantuml` | [`TemplateParams::Chart`] | `@startgantt … @endgantt` |
//! | `plantumlmacro` | [`TemplateParams::Macro`] | 嵌入 `{plantuml}` 宏的 PlantUML 文本 |

use crate::error::{ReportError, Result};
use crate::tasks::Task;
use chrono::NaiveDate;
use std::collections::HashSet;
use std::fmt::Write;

pub const CONFLUENCE_CHART: &str = "confluencechart";
pub const PLANTUML: &str = "plantuml";
pub const PLANTUML_MACRO: &str = "plantumlmacro";

const CONFLUENCE_DATE_FORMAT: &str = "%d/%m/%Y";
const PLANTUML_DATE_FORMAT: &str = "%Y-%m-%d";

/// 完成度对应的颜色与图例文字
const COMPLETED_COLOR: &str = "LightGreen/Green";
const IN_PROGRESS_COLOR: &str = "LightBlue/Blue";
const NOT_STARTED_COLOR: &str = "LightGray/Gray";

/// 模板参数
#[derive(Debug, Clone, Copy)]
pub enum TemplateParams<'a> {
    /// 先序排列的任务
    Chart { tasks: &'a [&'a Task], legend: bool },
    /// 已生成的 PlantUML 文本
    Macro { plantuml: &'a str },
}

/// 按名称渲染模板
pub trait TemplateRenderer: Send + Sync {
    fn render(&self, name: &str, params: &TemplateParams<'_>) -> Result<String>;
}

/// 编译进二进制的模板集合
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinTemplates;

impl TemplateRenderer for BuiltinTemplates {
    fn render(&self, name: &str, params: &TemplateParams<'_>) -> Result<String> {
        match (name, params) {
            (CONFLUENCE_CHART, TemplateParams::Chart { tasks, legend }) => {
                Ok(confluence_chart(tasks, *legend))
            }
            (PLANTUML, TemplateParams::Chart { tasks, legend }) => Ok(plantuml(tasks, *legend)),
            (PLANTUML_MACRO, TemplateParams::Macro { plantuml }) => Ok(plantuml_macro(plantuml)),
            (CONFLUENCE_CHART | PLANTUML | PLANTUML_MACRO, _) => {
                Err(ReportError::InvalidParameters {
                    template: name.to_string(),
                    message: "unexpected parameter kind".to_string(),
                }
                .into())
            }
            _ => Err(ReportError::TemplateNotFound(name.to_string()).into()),
        }
    }
}

fn confluence_chart(tasks: &[&Task], legend: bool) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{{chart:type=gantt|legend={}|dateFormat=dd/MM/yyyy}}",
        legend
    );
    out.push_str("|| Plan || Start || End || Status ||\n");
    for task in tasks {
        let _ = writeln!(
            out,
            "| {} | {} | {} | {}% |",
            escape_wiki(&label(task)),
            format_date(task.start_date, CONFLUENCE_DATE_FORMAT),
            format_date(task.end_date, CONFLUENCE_DATE_FORMAT),
            format_percent(task.progress_in_percent)
        );
    }
    out.push_str("{chart}\n");
    out
}

fn plantuml(tasks: &[&Task], legend: bool) -> String {
    let mut out = String::from("@startgantt\n");

    if let Some(start) = tasks.iter().map(|t| t.start_date).min() {
        let _ = writeln!(
            out,
            "Project starts {}",
            format_date(start, PLANTUML_DATE_FORMAT)
        );
    }

    for task in tasks {
        let key = escape_plantuml(&task.key);
        let _ = writeln!(
            out,
            "[{}] as [{}] starts {} and ends {}",
            escape_plantuml(&label(task)),
            key,
            format_date(task.start_date, PLANTUML_DATE_FORMAT),
            format_date(task.end_date, PLANTUML_DATE_FORMAT)
        );
        let _ = writeln!(
            out,
            "[{}] is {}% completed",
            key,
            whole_percent(task.progress_in_percent)
        );
        let _ = writeln!(out, "[{}] is colored in {}", key, color(task));
    }

    // 依赖边必须在所有任务声明之后
    let declared: HashSet<&str> = tasks.iter().map(|t| t.key.as_str()).collect();
    for task in tasks {
        for blocker in &task.blocking_tasks {
            if declared.contains(blocker.as_str()) {
                let _ = writeln!(
                    out,
                    "[{}] -> [{}]",
                    escape_plantuml(blocker),
                    escape_plantuml(&task.key)
                );
            }
        }
    }

    if legend {
        out.push_str("legend\n");
        let _ = writeln!(out, "|<back:{}> </back>| Completed |", legend_color(COMPLETED_COLOR));
        let _ = writeln!(out, "|<back:{}> </back>| In progress |", legend_color(IN_PROGRESS_COLOR));
        let _ = writeln!(out, "|<back:{}> </back>| Not started |", legend_color(NOT_STARTED_COLOR));
        out.push_str("end legend\n");
    }

    out.push_str("@endgantt\n");
    out
}

fn plantuml_macro(diagram: &str) -> String {
    format!("{{plantuml}}\n{}\n{{plantuml}}\n", diagram.trim_end())
}

fn label(task: &Task) -> String {
    if task.summary.is_empty() {
        task.key.clone()
    } else {
        format!("{} - {}", task.key, task.summary)
    }
}

fn color(task: &Task) -> &'static str {
    if task.is_completed() {
        COMPLETED_COLOR
    } else if task.progress_in_percent > 0.0 {
        IN_PROGRESS_COLOR
    } else {
        NOT_STARTED_COLOR
    }
}

fn legend_color(color: &str) -> &str {
    color.split('/').next().unwrap_or(color)
}

fn format_date(date: NaiveDate, format: &str) -> String {
    date.format(format).to_string()
}

/// 整数不带小数位：`40` 而不是 `40.0`
pub(crate) fn format_percent(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.0}", value)
    } else {
        format!("{}", value)
    }
}

/// PlantUML 只接受整数完成度
pub(crate) fn whole_percent(value: f64) -> i64 {
    if value.is_finite() { value.round() as i64 } else { 0 }
}

/// Confluence wiki markup 中有特殊含义的字符加反斜杠，换行折成空格
pub(crate) fn escape_wiki(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '|' | '{' | '}' | '[' | ']' | '\\' => {
                out.push('\\');
                out.push(c);
            }
            '\r' | '\n' => out.push(' '),
            _ => out.push(c),
        }
    }
    out
}

/// PlantUML 中方括号界定任务名，替换为 HTML 实体
pub(crate) fn escape_plantuml(text: &str) -> String {
    text.replace('[', "&#91;")
        .replace(']', "&#93;")
        .replace(['\r', '\n'], " ")
}
