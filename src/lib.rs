//! # Render Job Submit
//!
//! 通过模拟界面操作驱动网页版视频编辑器，把一份任务描述渲染成视频文件。
//!
//! ## 架构设计
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有浏览器页面，只暴露能力
//! - `EditorSurface` - 页面能力抽象；`CdpSurface` 是 chromiumoxide 实现
//!
//! ### ② 业务能力层（Services）
//! - `ElementLocator` - 按 `LocatorProfile` 查找控件
//! - `AssetStager` - 下载素材到本地
//! - `ReportWriter` - 写运行报告
//!
//! ### ③ 流程层（Workflow）
//! - `RenderFlow` - 登录 → 建项目 → 上传 → 时间线 → 字幕 → 导出 → 下载
//! - `StepOutcome` - 每一步的结果（成功 / 跳过 / 终止）
//!
//! ### ④ 编排层（Orchestration）
//! - `App` - 加载任务、暂存素材、管理浏览器会话、输出报告

pub mod browser;
pub mod clients;
pub mod config;
pub mod error;
pub mod infrastructure;
pub mod logger;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use browser::{ChromiumLauncher, SessionLauncher};
pub use config::Config;
pub use error::{AppError, AppResult};
pub use infrastructure::EditorSurface;
pub use models::{Job, LocatorProfile};
pub use orchestrator::App;
pub use workflow::{CompletionOutcome, RunReport, Step, StepOutcome};
