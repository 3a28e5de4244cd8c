//! 甘特图生成与发布

mod runner;
mod templates;

pub use runner::{FailurePolicy, ProjectOutcome, ProjectReport, ReportRunner};
pub use templates::{
    BuiltinTemplates, CONFLUENCE_CHART, PLANTUML, PLANTUML_MACRO, TemplateParams,
    TemplateRenderer,
};

use crate::config::ChartEngine;
use crate::error::Result;
use crate::tasks::Task;

/// 生成好的甘特图，每种引擎只携带自己需要的内容
#[derive(Debug, Clone, PartialEq)]
pub enum GanttChart {
    /// `{chart:type=gantt}` 宏，可直接作为页面正文
    Confluence { chart: String },
    /// PlantUML 文本，发布前需要包进 `{plantuml}` 宏
    PlantUml { diagram: String },
}

impl GanttChart {
    pub fn engine(&self) -> ChartEngine {
        match self {
            GanttChart::Confluence { .. } => ChartEngine::Confluence,
            GanttChart::PlantUml { .. } => ChartEngine::PlantUml,
        }
    }

    /// 图表原文
    pub fn text(&self) -> &str {
        match self {
            GanttChart::Confluence { chart } => chart,
            GanttChart::PlantUml { diagram } => diagram,
        }
    }

    /// 发布到 Confluence 的页面正文（wiki markup）
    pub fn page_body(&self, templates: &dyn TemplateRenderer) -> Result<String> {
        match self {
            GanttChart::Confluence { chart } => Ok(chart.clone()),
            GanttChart::PlantUml { diagram } => {
                templates.render(PLANTUML_MACRO, &TemplateParams::Macro { plantuml: diagram })
            }
        }
    }
}

/// 用 `engine` 对应的模板渲染先序排列的任务
pub fn generate_gantt(
    engine: ChartEngine,
    tasks: &[&Task],
    legend: bool,
    templates: &dyn TemplateRenderer,
) -> Result<GanttChart> {
    let params = TemplateParams::Chart { tasks, legend };
    match engine {
        ChartEngine::Confluence => Ok(GanttChart::Confluence {
            chart: templates.render(CONFLUENCE_CHART, &params)?,
        }),
        ChartEngine::PlantUml => Ok(GanttChart::PlantUml {
            diagram: templates.render(PLANTUML, &params)?,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{GanttError, ReportError};
    use chrono::NaiveDate;

    fn sample() -> Task {
        let day = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        Task::new("PRJ-7", "Release", day, day).with_progress(50.0)
    }

    #[test]
    fn test_confluence_chart_is_page_body() {
        let task = sample();
        let chart =
            generate_gantt(ChartEngine::Confluence, &[&task], false, &BuiltinTemplates).unwrap();

        assert_eq!(chart.engine(), ChartEngine::Confluence);
        assert!(chart.text().starts_with("{chart:type=gantt|legend=false"));
        assert_eq!(chart.page_body(&BuiltinTemplates).unwrap(), chart.text());
    }

    #[test]
    fn test_plantuml_wrapped_in_macro() {
        let task = sample();
        let chart =
            generate_gantt(ChartEngine::PlantUml, &[&task], false, &BuiltinTemplates).unwrap();

        assert_eq!(chart.engine(), ChartEngine::PlantUml);
        assert!(chart.text().starts_with("@startgantt\n"));

        let body = chart.page_body(&BuiltinTemplates).unwrap();
        assert!(body.starts_with("{plantuml}\n@startgantt\n"));
        assert!(body.ends_with("@endgantt\n{plantuml}\n"));
    }

    struct NoTemplates;

    impl TemplateRenderer for NoTemplates {
        fn render(&self, name: &str, _params: &TemplateParams<'_>) -> Result<String> {
            Err(ReportError::TemplateNotFound(name.to_string()).into())
        }
    }

    #[test]
    fn test_missing_template_is_report_error() {
        let err = generate_gantt(ChartEngine::PlantUml, &[], true, &NoTemplates).unwrap_err();
        assert!(matches!(
            err,
            GanttError::Report(ReportError::TemplateNotFound(ref name)) if name == "plantuml"
        ));
    }
}
