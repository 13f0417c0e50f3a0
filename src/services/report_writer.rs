//! 运行报告写入服务 - 业务能力层
//!
//! 只负责"把报告写成 JSON"，不关心流程

use std::path::PathBuf;

use anyhow::{Context, Result};
use tokio::fs;
use tracing::debug;

use crate::workflow::RunReport;

/// 报告文件名
pub const REPORT_FILE_NAME: &str = "run_report.json";

/// 运行报告写入器
pub struct ReportWriter {
    report_path: PathBuf,
}

impl ReportWriter {
    /// 在指定目录下写入 `run_report.json`
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            report_path: dir.into().join(REPORT_FILE_NAME),
        }
    }

    /// 写入报告，返回文件路径
    pub async fn write(&self, report: &RunReport) -> Result<PathBuf> {
        if let Some(parent) = self.report_path.parent() {
            fs::create_dir_all(parent)
                .await
                .with_context(|| format!("无法创建目录: {}", parent.display()))?;
        }

        let json = serde_json::to_vec_pretty(report)?;
        fs::write(&self.report_path, json)
            .await
            .with_context(|| format!("无法写入报告: {}", self.report_path.display()))?;

        debug!("运行报告已写入: {}", self.report_path.display());
        Ok(self.report_path.clone())
    }
}
