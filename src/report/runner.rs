//! 逐个项目执行：拉取工单 → 建树 → 生成甘特图 → 发布

use crate::config::{Config, Project};
use crate::confluence::Publisher;
use crate::error::{GanttError, Result};
use crate::jira::TicketSource;
use crate::report::{BuiltinTemplates, GanttChart, TemplateRenderer, generate_gantt};
use crate::tasks::create_tasks_from_tickets;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{Instrument, debug, error, info, info_span, warn};

/// 某个项目失败后是否继续处理后面的项目
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    #[default]
    Continue,
    Abort,
}

/// 单个项目的处理结果
#[derive(Debug)]
pub enum ProjectOutcome {
    /// 已生成并发布
    Published,
    /// 已生成，未配置发布
    Generated,
    /// 已生成但发布失败，图表保留
    PublishFailed { chart: GanttChart, error: GanttError },
    /// 拉取 / 解析 / 生成失败
    Failed(GanttError),
}

#[derive(Debug)]
pub struct ProjectReport {
    pub project: String,
    /// 进入甘特图的任务数
    pub task_count: usize,
    pub outcome: ProjectOutcome,
}

impl ProjectReport {
    pub fn is_success(&self) -> bool {
        matches!(
            self.outcome,
            ProjectOutcome::Published | ProjectOutcome::Generated
        )
    }
}

/// 生成结果（发布之前）
struct Generated {
    chart: GanttChart,
    body: String,
    task_count: usize,
}

pub struct ReportRunner {
    source: Arc<dyn TicketSource>,
    publisher: Option<Arc<dyn Publisher>>,
    templates: Box<dyn TemplateRenderer>,
    policy: FailurePolicy,
    output_dir: Option<PathBuf>,
}

impl ReportRunner {
    pub fn new(source: Arc<dyn TicketSource>) -> Self {
        Self {
            source,
            publisher: None,
            templates: Box::new(BuiltinTemplates),
            policy: FailurePolicy::default(),
            output_dir: None,
        }
    }

    /// 未设置发布者时只生成不发布
    pub fn with_publisher(mut self, publisher: Arc<dyn Publisher>) -> Self {
        self.publisher = Some(publisher);
        self
    }

    pub fn with_templates(mut self, templates: Box<dyn TemplateRenderer>) -> Self {
        self.templates = templates;
        self
    }

    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// 每个项目的页面正文另存为 `<dir>/<项目名>.wiki`
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    /// 依次处理所有项目
    pub async fn generate_all_reports(&self, config: &Config) -> Vec<ProjectReport> {
        info!("开始生成 {} 个项目的甘特图", config.projects.len());

        let mut reports = Vec::with_capacity(config.projects.len());
        for project in &config.projects {
            let span = info_span!("project", name = %project.name);
            let report = self.generate_report(project).instrument(span).await;
            let success = report.is_success();
            reports.push(report);

            if !success && self.policy == FailurePolicy::Abort {
                warn!("项目 {} 失败，停止处理剩余项目", project.name);
                break;
            }
        }

        let succeeded = reports.iter().filter(|r| r.is_success()).count();
        info!("甘特图生成结束：{}/{} 成功", succeeded, reports.len());
        reports
    }

    /// 处理单个项目，错误收进 [`ProjectOutcome`] 而不是向上传播
    pub async fn generate_report(&self, project: &Project) -> ProjectReport {
        let generated = match self.generate(project).await {
            Ok(generated) => generated,
            Err(e) => {
                error!("生成失败: {}", e);
                return ProjectReport {
                    project: project.name.clone(),
                    task_count: 0,
                    outcome: ProjectOutcome::Failed(e),
                };
            }
        };

        let task_count = generated.task_count;
        let outcome = match &self.publisher {
            None => {
                info!("已生成甘特图（{} 个任务），未发布", task_count);
                ProjectOutcome::Generated
            }
            Some(publisher) => {
                let title = project.page_title();
                match publisher
                    .create_new_page(
                        &project.report.space,
                        &project.report.parent_page,
                        &title,
                        &generated.body,
                    )
                    .await
                {
                    Ok(()) => {
                        info!("已发布 '{}'（{} 个任务）", title, task_count);
                        ProjectOutcome::Published
                    }
                    Err(e) => {
                        error!("发布 '{}' 失败: {}", title, e);
                        ProjectOutcome::PublishFailed {
                            chart: generated.chart,
                            error: e,
                        }
                    }
                }
            }
        };

        ProjectReport {
            project: project.name.clone(),
            task_count,
            outcome,
        }
    }

    async fn generate(&self, project: &Project) -> Result<Generated> {
        let fields = project.fields.query_fields();
        debug!("JQL: {} 字段: {:?}", project.jql, fields);

        let tickets = self.source.tickets_from_jql(&project.jql, &fields).await?;
        info!("取回 {} 个工单", tickets.len());

        let forest = create_tasks_from_tickets(&tickets, &project.fields)?;
        debug!("任务树:\n{}", forest.render_tree());

        let tasks = forest.to_pre_order_list();
        let chart = generate_gantt(
            project.report.engine,
            &tasks,
            project.report.legend,
            self.templates.as_ref(),
        )?;
        let body = chart.page_body(self.templates.as_ref())?;

        // 另存失败不影响发布
        if let Some(dir) = &self.output_dir {
            match write_page(dir, &project.name, &body).await {
                Ok(path) => info!("页面正文已写入 {}", path.display()),
                Err(e) => warn!("页面正文写入 {} 失败: {}", dir.display(), e),
            }
        }

        Ok(Generated {
            chart,
            body,
            task_count: tasks.len(),
        })
    }
}

async fn write_page(dir: &Path, project: &str, body: &str) -> Result<PathBuf> {
    tokio::fs::create_dir_all(dir).await?;
    let path = dir.join(format!("{}.wiki", file_stem(project)));
    tokio::fs::write(&path, body).await?;
    Ok(path)
}

/// 项目名转成安全的文件名
fn file_stem(project: &str) -> String {
    let stem: String = project
        .trim()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if stem.is_empty() {
        "project".to_string()
    } else {
        stem
    }
}
