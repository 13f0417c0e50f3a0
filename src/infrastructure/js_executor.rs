//! JS 执行器 - 基础设施层
//!
//! 只暴露"在页面里执行 JS"的能力，不认识任务和步骤

use anyhow::Result;
use chromiumoxide::Page;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value as JsonValue;

/// 页面加载状态快照
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadSnapshot {
    /// `document.readyState == "complete"`
    pub complete: bool,
    /// 已加载的资源条目数
    pub resources: u64,
}

/// JS 执行器
pub struct JsExecutor {
    page: Page,
}

impl JsExecutor {
    pub fn new(page: Page) -> Self {
        Self { page }
    }

    /// 获取 page 的引用（用于其他操作）
    pub fn page(&self) -> &Page {
        &self.page
    }

    /// 执行 JS 代码并返回 JSON 结果
    pub async fn eval(&self, js_code: impl Into<String>) -> Result<JsonValue> {
        let result = self.page.evaluate(js_code.into()).await?;
        let json_value = result.into_value()?;
        Ok(json_value)
    }

    /// 执行 JS 代码并反序列化为指定类型
    pub async fn eval_as<T: DeserializeOwned>(&self, js_code: impl Into<String>) -> Result<T> {
        let json_value = self.eval(js_code).await?;
        let typed_value = serde_json::from_value(json_value)?;
        Ok(typed_value)
    }

    /// 读取页面加载状态，用于判断网络是否空闲
    pub async fn load_snapshot(&self) -> Result<LoadSnapshot> {
        self.eval_as(
            r#"
            (() => ({
                complete: document.readyState === "complete",
                resources: performance.getEntriesByType("resource").length
            }))()
            "#,
        )
        .await
    }
}
