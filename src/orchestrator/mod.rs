//! 编排层（Orchestration Layer）
//!
//! ## 层次关系
//!
//! ```text
//! render_processor::App (任务 → 素材 → 会话 → 报告)
//!     ↓
//! workflow::RenderFlow (按顺序执行界面步骤)
//!     ↓
//! services (能力层：定位 / 暂存 / 报告)
//!     ↓
//! infrastructure (基础设施：EditorSurface / JsExecutor)
//! ```
//!
//! 只有编排层持有浏览器会话，并负责在结束时关闭它。

pub mod render_processor;

pub use render_processor::{exit_code, App};
