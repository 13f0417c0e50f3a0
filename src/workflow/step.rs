//! 步骤与结果类型

use std::fmt::Display;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::models::job::Job;

/// 流程中的固定步骤（按执行顺序）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    Bootstrap,
    Authenticate,
    CreateProject,
    UploadAssets,
    PopulateTimeline,
    InsertCaptions,
    ApplyEffects,
    TriggerExport,
    AwaitCompletion,
}

impl Step {
    pub const ALL: [Step; 9] = [
        Step::Bootstrap,
        Step::Authenticate,
        Step::CreateProject,
        Step::UploadAssets,
        Step::PopulateTimeline,
        Step::InsertCaptions,
        Step::ApplyEffects,
        Step::TriggerExport,
        Step::AwaitCompletion,
    ];

    /// 从 1 开始的序号
    pub fn ordinal(self) -> usize {
        Self::ALL.iter().position(|s| *s == self).map_or(0, |i| i + 1)
    }
}

impl Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Step::Bootstrap => "打开编辑器",
            Step::Authenticate => "登录",
            Step::CreateProject => "创建项目",
            Step::UploadAssets => "上传素材",
            Step::PopulateTimeline => "填充时间线",
            Step::InsertCaptions => "插入字幕",
            Step::ApplyEffects => "音效",
            Step::TriggerExport => "触发导出",
            Step::AwaitCompletion => "等待导出完成",
        };
        write!(f, "[步骤 {}/{} {}]", self.ordinal(), Self::ALL.len(), label)
    }
}

/// 单个步骤的结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StepOutcome {
    /// 成功
    Succeeded,
    /// 失败但不影响后续步骤
    Skipped { reason: String },
    /// 致命失败，终止整个任务
    Aborted { reason: String },
}

impl StepOutcome {
    pub fn skipped(reason: impl Into<String>) -> Self {
        Self::Skipped {
            reason: reason.into(),
        }
    }

    pub fn aborted(reason: impl Into<String>) -> Self {
        Self::Aborted {
            reason: reason.into(),
        }
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self, StepOutcome::Aborted { .. })
    }
}

/// 步骤执行记录
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepRecord {
    pub step: Step,
    #[serde(flatten)]
    pub outcome: StepOutcome,
}

/// 导出完成检测的结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CompletionOutcome {
    /// 流程在此之前已终止
    NotReached,
    /// 产物已下载
    Downloaded { path: PathBuf, bytes: u64 },
    /// 完成标志在时限内没有出现
    TimedOut,
    /// 完成标志出现，但拿不到可用的下载地址
    MissingReference,
    /// 拿到了下载地址，但下载或写入失败
    DownloadFailed { reason: String },
}

/// 一次运行的完整报告
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub project: String,
    pub output_name: String,
    pub staged_assets: Vec<PathBuf>,
    pub steps: Vec<StepRecord>,
    pub thumbnails_selected: usize,
    pub caption_attempts: usize,
    pub completion: CompletionOutcome,
}

impl RunReport {
    pub fn new(job: &Job, staged_assets: Vec<PathBuf>) -> Self {
        Self {
            project: job.project_name.clone(),
            output_name: job.output_file_name(),
            staged_assets,
            steps: Vec::new(),
            thumbnails_selected: 0,
            caption_attempts: 0,
            completion: CompletionOutcome::NotReached,
        }
    }

    pub fn record(&mut self, step: Step, outcome: StepOutcome) {
        self.steps.push(StepRecord { step, outcome });
    }

    pub fn outcome_of(&self, step: Step) -> Option<&StepOutcome> {
        self.steps.iter().find(|r| r.step == step).map(|r| &r.outcome)
    }

    /// 第一个致命失败的步骤
    pub fn aborted_step(&self) -> Option<&StepRecord> {
        self.steps.iter().find(|r| r.outcome.is_fatal())
    }

    /// 下载到的产物路径
    pub fn artifact(&self) -> Option<&Path> {
        match &self.completion {
            CompletionOutcome::Downloaded { path, .. } => Some(path),
            _ => None,
        }
    }

    /// 进程退出码：有致命步骤为 1，其余（包括软失败）为 0
    pub fn exit_code(&self) -> u8 {
        if self.aborted_step().is_some() {
            1
        } else {
            0
        }
    }
}
