/// HTTP 下载客户端
///
/// 素材下载和产物下载共用
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{COOKIE, USER_AGENT};
use reqwest::Client;
use tracing::debug;

use crate::error::FetchError;

const AGENT: &str = concat!("render_job_submit/", env!("CARGO_PKG_VERSION"));

/// 获取远程资源
#[async_trait]
pub trait HttpFetch: Send + Sync {
    /// 下载完整响应体；非 2xx 状态码视为错误
    async fn fetch(&self, url: &str, cookie: Option<&str>) -> Result<Vec<u8>, FetchError>;
}

/// 基于 reqwest 的实现
#[derive(Clone)]
pub struct ReqwestFetcher {
    client: Client,
}

impl ReqwestFetcher {
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Transport(e.to_string()))?;
        Ok(Self { client })
    }

    /// 使用自定义客户端
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpFetch for ReqwestFetcher {
    async fn fetch(&self, url: &str, cookie: Option<&str>) -> Result<Vec<u8>, FetchError> {
        let parsed = reqwest::Url::parse(url).map_err(|e| FetchError::InvalidUrl(format!("{} ({})", url, e)))?;

        let mut request = self.client.get(parsed).header(USER_AGENT, AGENT);
        if let Some(cookie) = cookie {
            request = request.header(COOKIE, cookie);
        }

        let response = request
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        let status = response.status();
        debug!("GET {} -> {}", url, status);
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;
        Ok(bytes.to_vec())
    }
}
