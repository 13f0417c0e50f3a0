//! 元素定位服务 - 业务能力层
//!
//! 只负责"按配置找到控件"，不关心找到之后做什么

use anyhow::{Context, Result};
use std::time::Duration;
use tokio::time::{sleep, timeout};
use tracing::debug;

use crate::config::LOCATOR_POLL_INTERVAL;
use crate::infrastructure::EditorSurface;
use crate::models::locator::{Locator, LocatorChain};

/// 元素定位器
///
/// - 按顺序尝试 `LocatorChain` 中的每种方式，第一个有结果的生效
/// - 文字匹配在 Rust 侧用正则完成，页面只负责按 CSS 给出候选
/// - 等待操作是一次有上限的 `timeout`，内部按固定间隔轮询
pub struct ElementLocator<'a, S: EditorSurface> {
    surface: &'a S,
}

impl<'a, S: EditorSurface> ElementLocator<'a, S> {
    pub fn new(surface: &'a S) -> Self {
        Self { surface }
    }

    /// 解析单个定位方式，返回全部匹配元素
    pub async fn resolve(&self, locator: &Locator) -> Result<Vec<S::Element>> {
        let matcher = locator
            .text_matcher()
            .with_context(|| format!("定位规则无效: {}", locator))?;
        let candidates = self.surface.query_all(locator.scope()).await?;

        let Some(matcher) = matcher else {
            return Ok(candidates);
        };

        let mut matched = Vec::new();
        for element in candidates {
            match self.surface.inner_text(&element).await {
                Ok(text) if matcher.is_match(text.trim()) => matched.push(element),
                Ok(_) => {}
                Err(e) => debug!("读取元素文字失败: {}", e),
            }
        }
        Ok(matched)
    }

    /// 立即查找第一个匹配元素
    pub async fn find(&self, chain: &LocatorChain) -> Result<Option<S::Element>> {
        Ok(self.find_all(chain).await?.into_iter().next())
    }

    /// 立即查找：返回第一个有结果的定位方式的全部元素
    pub async fn find_all(&self, chain: &LocatorChain) -> Result<Vec<S::Element>> {
        for locator in chain.iter() {
            let found = self.resolve(locator).await?;
            if !found.is_empty() {
                debug!("{} 命中 {} 个元素", locator, found.len());
                return Ok(found);
            }
        }
        Ok(Vec::new())
    }

    /// 在时限内等待元素出现，超时返回 `None`
    pub async fn wait_for(&self, chain: &LocatorChain, limit: Duration) -> Result<Option<S::Element>> {
        Ok(self.wait_for_all(chain, limit).await?.into_iter().next())
    }

    /// 在时限内等待至少一个元素出现，超时返回空列表
    pub async fn wait_for_all(&self, chain: &LocatorChain, limit: Duration) -> Result<Vec<S::Element>> {
        if chain.is_empty() {
            return Ok(Vec::new());
        }

        let poll = async {
            loop {
                let found = self.find_all(chain).await?;
                if !found.is_empty() {
                    return Ok::<_, anyhow::Error>(found);
                }
                sleep(LOCATOR_POLL_INTERVAL).await;
            }
        };

        match timeout(limit, poll).await {
            Ok(result) => result,
            Err(_) => {
                debug!("等待元素超时 ({:?})", limit);
                Ok(Vec::new())
            }
        }
    }
}
