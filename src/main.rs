use clap::{CommandFactory, Parser};
use jira_gantt::config::GlobalConfig;
use jira_gantt::error::Result;
use jira_gantt::report::{FailurePolicy, ProjectOutcome, ProjectReport, ReportRunner};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// 从 Jira 工单生成甘特图并发布到 Confluence
#[derive(Parser, Debug)]
#[command(name = "jira_gantt", version, about, long_about = None)]
struct Cli {
    /// 配置文件（.yaml / .yml / .json）
    config: Option<PathBuf>,

    /// 输出调试日志
    #[arg(short, long)]
    verbose: bool,

    /// 任一项目失败即停止
    #[arg(long)]
    fail_fast: bool,

    /// 只生成，不发布到 Confluence
    #[arg(long)]
    no_publish: bool,

    /// 页面正文另存到该目录
    #[arg(long, value_name = "DIR")]
    output_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let Some(config_path) = cli.config.clone() else {
        let mut cmd = Cli::command();
        cmd.print_help().ok();
        println!();
        return ExitCode::from(2);
    };

    let default_filter = if cli.verbose {
        "jira_gantt=debug"
    } else {
        "jira_gantt=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| default_filter.into()))
        .init();

    match run(&cli, config_path).await {
        Ok(reports) => summarize(&reports),
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: &Cli, config_path: PathBuf) -> Result<Vec<ProjectReport>> {
    info!("加载配置 {}", config_path.display());
    let mut global = GlobalConfig::load(&config_path)?;
    debug!("配置:\n{}", global.to_json()?);

    let jira = Arc::new(global.jira_client()?);
    global.update_custom_fields(jira.as_ref()).await?;

    let policy = if cli.fail_fast {
        FailurePolicy::Abort
    } else {
        FailurePolicy::Continue
    };
    let mut runner = ReportRunner::new(jira).with_failure_policy(policy);

    if cli.no_publish {
        info!("--no-publish：只生成甘特图");
    } else {
        match global.confluence_client()? {
            Some(confluence) => runner = runner.with_publisher(Arc::new(confluence)),
            None => warn!("未配置 Confluence 地址，只生成甘特图"),
        }
    }
    if let Some(dir) = &cli.output_dir {
        runner = runner.with_output_dir(dir.clone());
    }

    Ok(runner.generate_all_reports(&global.config).await)
}

fn summarize(reports: &[ProjectReport]) -> ExitCode {
    for report in reports {
        match &report.outcome {
            ProjectOutcome::Published => {
                info!("[{}] 已发布（{} 个任务）", report.project, report.task_count)
            }
            ProjectOutcome::Generated => {
                info!("[{}] 已生成（{} 个任务）", report.project, report.task_count)
            }
            ProjectOutcome::PublishFailed { error, .. } => {
                warn!("[{}] 已生成但未发布: {}", report.project, error)
            }
            ProjectOutcome::Failed(error) => error!("[{}] 失败: {}", report.project, error),
        }
    }

    if reports.iter().all(ProjectReport::is_success) {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
