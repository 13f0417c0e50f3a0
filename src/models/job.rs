use chrono::Local;
use serde::{Deserialize, Serialize};

use crate::error::PayloadError;
use crate::models::caption::{parse_script, CaptionEntry, ScriptText};

/// 未指定项目名时使用的名称
pub const DEFAULT_PROJECT_NAME: &str = "Auto Render";

/// 一次渲染任务
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    #[serde(default = "default_project_name")]
    pub project_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
    #[serde(default)]
    pub asset_urls: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script_text: Option<ScriptText>,
    #[serde(default)]
    pub sfx: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_name: Option<String>,
}

fn default_project_name() -> String {
    DEFAULT_PROJECT_NAME.to_string()
}

impl Job {
    /// 解析并校验任务 JSON
    pub fn from_json(json: &str) -> Result<Self, PayloadError> {
        let job: Job = serde_json::from_str(json)?;
        job.validate()?;
        Ok(job)
    }

    /// 校验素材列表非空且每一项都不是空白
    pub fn validate(&self) -> Result<(), PayloadError> {
        if self.asset_urls.is_empty() {
            return Err(PayloadError::MissingAssets);
        }
        if let Some(index) = self.asset_urls.iter().position(|u| u.trim().is_empty()) {
            return Err(PayloadError::BlankAssetUrl { index });
        }
        Ok(())
    }

    /// 解析后的字幕列表（未提供脚本时为空）
    pub fn captions(&self) -> Vec<CaptionEntry> {
        self.script_text.as_ref().map(parse_script).unwrap_or_default()
    }

    /// 产物文件名：去掉路径部分，空白时使用时间戳名称
    pub fn output_file_name(&self) -> String {
        self.output_name
            .as_deref()
            .and_then(sanitize_file_name)
            .unwrap_or_else(default_output_name)
    }
}

/// 基于当前时间生成的默认产物名
pub fn default_output_name() -> String {
    format!("render-{}.mp4", Local::now().format("%Y%m%d-%H%M%S"))
}

fn sanitize_file_name(name: &str) -> Option<String> {
    let last = name.rsplit(|c: char| c == '/' || c == '\\').next().unwrap_or_default().trim();
    if last.is_empty() || last == "." || last == ".." {
        None
    } else {
        Some(last.to_string())
    }
}
