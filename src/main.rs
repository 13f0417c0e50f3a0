use std::process::ExitCode;

use render_job_submit::orchestrator::exit_code;
use render_job_submit::{logger, App, AppResult, ChromiumLauncher, Config, RunReport};
use tracing::error;

#[tokio::main]
async fn main() -> ExitCode {
    // 加载配置
    let config = Config::from_env();

    // 初始化日志
    logger::init(config.verbose_logging);

    let result = run(config).await;
    if let Err(e) = &result {
        error!("❌ 任务终止: {}", e);
    }

    ExitCode::from(exit_code(&result))
}

async fn run(config: Config) -> AppResult<RunReport> {
    App::initialize(config).await?.run(&ChromiumLauncher).await
}
