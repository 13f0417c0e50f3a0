//! 会话启动
//!
//! 编排层只通过 `SessionLauncher` 拿到页面，方便测试替换

use async_trait::async_trait;

use crate::browser::{connection, headless};
use crate::config::Config;
use crate::error::BrowserError;
use crate::infrastructure::{CdpSurface, EditorSurface};

/// 创建浏览器会话
#[async_trait]
pub trait SessionLauncher: Send + Sync {
    type Surface: EditorSurface;

    async fn launch(&self, config: &Config) -> Result<Self::Surface, BrowserError>;
}

/// chromiumoxide 会话：配置了调试端口时连接已有浏览器，否则启动新浏览器
#[derive(Debug, Default, Clone, Copy)]
pub struct ChromiumLauncher;

#[async_trait]
impl SessionLauncher for ChromiumLauncher {
    type Surface = CdpSurface;

    async fn launch(&self, config: &Config) -> Result<CdpSurface, BrowserError> {
        let surface = match config.browser_debug_port {
            Some(port) => {
                let (browser, page, handle) =
                    connection::connect_to_browser_and_page(port, Some(&config.editor_url))
                        .await
                        .map_err(|e| BrowserError::LaunchFailed(e.to_string()))?;
                CdpSurface::new(browser, page, handle, false)
            }
            None => {
                let (browser, page, handle) = headless::launch_browser(config)
                    .await
                    .map_err(|e| BrowserError::LaunchFailed(e.to_string()))?;
                CdpSurface::new(browser, page, handle, true)
            }
        };
        Ok(surface)
    }
}
