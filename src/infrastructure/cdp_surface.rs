//! 基于 chromiumoxide 的页面实现 - 基础设施层
//!
//! 持有唯一的 Browser / Page 资源

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::dom::SetFileInputFilesParams;
use chromiumoxide::element::Element;
use chromiumoxide::{Browser, Page};
use tokio::fs;
use tokio::task::JoinHandle;
use tokio::time::{sleep, timeout, Instant};
use tracing::{debug, warn};

use crate::config::{IDLE_QUIET_WINDOW, LOCATOR_POLL_INTERVAL};
use crate::infrastructure::js_executor::JsExecutor;
use crate::infrastructure::surface::EditorSurface;

/// 聚焦并选中已有内容，之后的输入会覆盖选区
const SELECT_CONTENT_JS: &str = r#"
function() {
    this.focus();
    if (this.isContentEditable) {
        const range = document.createRange();
        range.selectNodeContents(this);
        const selection = window.getSelection();
        selection.removeAllRanges();
        selection.addRange(range);
    } else if (typeof this.select === "function") {
        this.select();
    }
}
"#;

/// chromiumoxide 页面
pub struct CdpSurface {
    browser: Browser,
    executor: JsExecutor,
    handler: JoinHandle<()>,
    /// 浏览器是否由本进程启动（连接到外部浏览器时不关闭它）
    owned: bool,
}

impl CdpSurface {
    pub fn new(browser: Browser, page: Page, handler: JoinHandle<()>, owned: bool) -> Self {
        Self {
            browser,
            executor: JsExecutor::new(page),
            handler,
            owned,
        }
    }

    fn page(&self) -> &Page {
        self.executor.page()
    }
}

#[async_trait]
impl EditorSurface for CdpSurface {
    type Element = Element;

    async fn navigate(&self, url: &str) -> Result<()> {
        self.page()
            .goto(url)
            .await
            .with_context(|| format!("导航到 {} 失败", url))?;
        Ok(())
    }

    async fn wait_for_idle(&self, limit: Duration) -> Result<()> {
        let idle = async {
            let mut last_count = None;
            let mut stable_since = Instant::now();
            loop {
                let snapshot = self.executor.load_snapshot().await?;
                if last_count != Some(snapshot.resources) {
                    last_count = Some(snapshot.resources);
                    stable_since = Instant::now();
                } else if snapshot.complete && stable_since.elapsed() >= IDLE_QUIET_WINDOW {
                    debug!("网络空闲，资源数: {}", snapshot.resources);
                    return Ok::<(), anyhow::Error>(());
                }
                sleep(LOCATOR_POLL_INTERVAL).await;
            }
        };

        timeout(limit, idle)
            .await
            .map_err(|_| anyhow!("等待网络空闲超时 ({:?})", limit))?
    }

    async fn wait_for_navigation(&self, limit: Duration) -> Result<()> {
        timeout(limit, self.page().wait_for_navigation())
            .await
            .map_err(|_| anyhow!("等待页面跳转超时 ({:?})", limit))??;
        Ok(())
    }

    async fn query_all(&self, selector: &str) -> Result<Vec<Element>> {
        // 没有匹配时 chromiumoxide 可能返回错误，这里统一视为空列表
        match self.page().find_elements(selector).await {
            Ok(elements) => Ok(elements),
            Err(e) => {
                debug!("查询 `{}` 无结果: {}", selector, e);
                Ok(Vec::new())
            }
        }
    }

    async fn inner_text(&self, element: &Element) -> Result<String> {
        Ok(element.inner_text().await?.unwrap_or_default())
    }

    async fn attribute(&self, element: &Element, name: &str) -> Result<Option<String>> {
        Ok(element.attribute(name).await?)
    }

    async fn click(&self, element: &Element) -> Result<()> {
        element.click().await?;
        Ok(())
    }

    async fn type_text(&self, element: &Element, text: &str) -> Result<()> {
        element.click().await?;
        element.call_js_fn(SELECT_CONTENT_JS, false).await?;
        element.type_str(text).await?;
        Ok(())
    }

    async fn press_enter(&self, element: &Element) -> Result<()> {
        element.press_key("Enter").await?;
        Ok(())
    }

    async fn attach_files(&self, element: &Element, files: &[PathBuf]) -> Result<()> {
        let mut absolute = Vec::with_capacity(files.len());
        for path in files {
            let resolved = fs::canonicalize(path).await.unwrap_or_else(|_| path.clone());
            absolute.push(resolved.to_string_lossy().into_owned());
        }

        let params = SetFileInputFilesParams::builder()
            .files(absolute)
            .backend_node_id(element.backend_node_id.clone())
            .build()
            .map_err(|e| anyhow!("构造上传参数失败: {}", e))?;

        self.page().execute(params).await.context("提交文件失败")?;
        Ok(())
    }

    async fn current_url(&self) -> Result<Option<String>> {
        Ok(self.page().url().await?)
    }

    async fn cookie_header(&self) -> Result<Option<String>> {
        let cookies = self.page().get_cookies().await?;
        if cookies.is_empty() {
            return Ok(None);
        }
        let header = cookies
            .iter()
            .map(|c| format!("{}={}", c.name, c.value))
            .collect::<Vec<_>>()
            .join("; ");
        Ok(Some(header))
    }

    async fn close(mut self) -> Result<()> {
        if self.owned {
            if let Err(e) = self.browser.close().await {
                warn!("关闭浏览器失败: {}", e);
            }
            if let Err(e) = self.browser.wait().await {
                warn!("等待浏览器进程退出失败: {}", e);
            }
        } else {
            debug!("浏览器为外部实例，仅断开连接");
        }
        self.handler.abort();
        Ok(())
    }
}
