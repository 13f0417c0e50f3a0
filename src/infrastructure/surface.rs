//! 页面能力抽象 - 基础设施层
//!
//! 步骤逻辑只依赖这个 trait，不直接接触 chromiumoxide，
//! 生产环境用 `CdpSurface`，测试里可以换成内存实现。

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;

/// 被驱动的编辑器页面
#[async_trait]
pub trait EditorSurface: Send + Sync {
    /// 页面元素句柄
    type Element: Send + Sync;

    /// 导航到指定地址（等待页面加载）
    async fn navigate(&self, url: &str) -> Result<()>;

    /// 等待网络空闲，超时返回错误
    async fn wait_for_idle(&self, timeout: Duration) -> Result<()>;

    /// 等待一次页面跳转完成，超时返回错误
    async fn wait_for_navigation(&self, timeout: Duration) -> Result<()>;

    /// 查询所有匹配 CSS 选择器的元素
    async fn query_all(&self, selector: &str) -> Result<Vec<Self::Element>>;

    /// 元素的可见文字
    async fn inner_text(&self, element: &Self::Element) -> Result<String>;

    /// 元素属性
    async fn attribute(&self, element: &Self::Element, name: &str) -> Result<Option<String>>;

    /// 点击元素
    async fn click(&self, element: &Self::Element) -> Result<()>;

    /// 聚焦元素、清空已有内容并输入文字
    async fn type_text(&self, element: &Self::Element, text: &str) -> Result<()>;

    /// 在元素上按回车
    async fn press_enter(&self, element: &Self::Element) -> Result<()>;

    /// 给文件输入框一次性提交多个文件
    async fn attach_files(&self, element: &Self::Element, files: &[PathBuf]) -> Result<()>;

    /// 当前页面地址
    async fn current_url(&self) -> Result<Option<String>>;

    /// 当前会话的 Cookie 请求头（用于下载产物）
    async fn cookie_header(&self) -> Result<Option<String>>;

    /// 关闭会话
    async fn close(self) -> Result<()>
    where
        Self: Sized;
}
