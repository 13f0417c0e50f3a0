//! 错误类型
//!
//! `AppError` 只描述会终止整个任务的致命错误；
//! 其余步骤失败通过 `StepOutcome::Skipped` 记录，不走错误通道。

use std::path::PathBuf;
use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 任务描述错误
    #[error("任务描述错误: {0}")]
    Payload(#[from] PayloadError),
    /// 素材下载错误
    #[error("素材错误: {0}")]
    Asset(#[from] AssetError),
    /// 浏览器相关错误
    #[error("浏览器错误: {0}")]
    Browser(#[from] BrowserError),
    /// HTTP 客户端初始化错误
    #[error("HTTP 客户端错误: {0}")]
    Http(#[from] FetchError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
    /// 文件操作错误
    #[error("文件错误: {0}")]
    File(#[from] FileError),
}

/// 任务描述错误
#[derive(Debug, Error)]
pub enum PayloadError {
    /// 任务文件不存在或无法读取
    #[error("无法读取任务文件 {path}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// JSON 解析失败
    #[error("任务 JSON 解析失败: {0}")]
    InvalidJson(#[from] serde_json::Error),
    /// 缺少素材列表
    #[error("assetUrls 缺失或为空")]
    MissingAssets,
    /// 素材地址为空白
    #[error("assetUrls[{index}] 为空")]
    BlankAssetUrl { index: usize },
}

/// 素材下载错误
#[derive(Debug, Error)]
pub enum AssetError {
    /// 下载失败（网络错误或非成功状态码）
    #[error("下载素材 #{index} 失败 ({url}): {source}")]
    DownloadFailed {
        index: usize,
        url: String,
        #[source]
        source: FetchError,
    },
    /// 写入本地文件失败
    #[error("写入素材 #{index} 到 {path} 失败: {source}")]
    WriteFailed {
        index: usize,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// HTTP 获取错误
#[derive(Debug, Error)]
pub enum FetchError {
    /// 服务端返回非成功状态码
    #[error("HTTP 状态码 {status}")]
    Status { status: u16 },
    /// 网络/传输错误
    #[error("请求失败: {0}")]
    Transport(String),
    /// 地址无法解析
    #[error("无效地址: {0}")]
    InvalidUrl(String),
}

/// 浏览器相关错误
#[derive(Debug, Error)]
pub enum BrowserError {
    /// 启动或连接浏览器失败
    #[error("启动浏览器失败: {0}")]
    LaunchFailed(String),
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 定位配置文件无法读取
    #[error("无法读取定位配置 {path}: {source}")]
    ProfileUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// 定位配置文件格式错误
    #[error("定位配置 {path} 解析失败: {source}")]
    ProfileInvalid {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// 文件操作错误
#[derive(Debug, Error)]
pub enum FileError {
    /// 创建目录失败
    #[error("无法创建目录 {path}: {source}")]
    CreateDirFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
