/// 日志工具模块
///
/// 提供日志格式化和输出的辅助函数
use tracing::{info, warn};

use crate::config::Config;
use crate::models::job::Job;
use crate::workflow::step::{CompletionOutcome, RunReport, Step, StepOutcome};

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 自动渲染任务");
    info!("🌐 编辑器: {}", config.editor_url);
    info!("📁 工作目录: {}", config.work_dir.display());
    info!("🔐 登录凭据: {}", if config.credentials().is_some() { "已提供" } else { "未提供" });
    info!("{}", "=".repeat(60));
}

/// 记录任务摘要
pub fn log_job(job: &Job) {
    info!("📋 项目: {}", job.project_name);
    if let Some(template) = &job.template {
        info!("📋 模板: {}", template);
    }
    info!("📋 素材: {} 个", job.asset_urls.len());
    info!("📋 字幕: {} 条", job.captions().len());
    info!("📋 产物: {}", job.output_file_name());
}

/// 记录步骤开始
pub fn log_step_start(step: Step) {
    info!("\n{}", "─".repeat(60));
    info!("{} 开始", step);
}

/// 记录步骤结果
pub fn log_step_outcome(step: Step, outcome: &StepOutcome) {
    match outcome {
        StepOutcome::Succeeded => info!("{} ✓ 完成", step),
        StepOutcome::Skipped { reason } => warn!("{} ⚠️ 跳过: {}", step, reason),
        StepOutcome::Aborted { reason } => tracing::error!("{} ❌ 终止: {}", step, reason),
    }
}

/// 打印最终统计信息
pub fn print_final_report(report: &RunReport) {
    let succeeded = report
        .steps
        .iter()
        .filter(|r| r.outcome == StepOutcome::Succeeded)
        .count();

    info!("\n{}", "=".repeat(60));
    info!("📊 任务结束");
    info!("完成时间: {}", chrono::Local::now().format("%Y-%m-%d %H:%M:%S"));
    info!("{}", "=".repeat(60));
    info!("✅ 成功步骤: {}/{}", succeeded, report.steps.len());
    info!("🎞️ 选中缩略图: {}", report.thumbnails_selected);
    info!("💬 字幕尝试: {}", report.caption_attempts);

    match &report.completion {
        CompletionOutcome::Downloaded { path, bytes } => {
            info!("📦 产物: {} ({} 字节)", path.display(), bytes)
        }
        CompletionOutcome::NotReached => warn!("📦 未到达导出完成检测"),
        CompletionOutcome::TimedOut => warn!("📦 导出完成标志未出现，没有产物"),
        CompletionOutcome::MissingReference => warn!("📦 找到完成标志但没有下载地址，没有产物"),
        CompletionOutcome::DownloadFailed { reason } => warn!("📦 产物下载失败: {}", reason),
    }

    if let Some(record) = report.aborted_step() {
        tracing::error!("❌ 任务在 {} 终止", record.step);
    }
    info!("{}", "=".repeat(60));
}

/// 截断长文本用于日志显示
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
