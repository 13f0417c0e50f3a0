//! 素材暂存服务 - 业务能力层
//!
//! 只负责"把素材下载到本地"，任何一个失败都终止整个任务

use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::{debug, info};

use crate::clients::HttpFetch;
use crate::error::{AppError, AssetError, FileError};

/// 素材暂存器
pub struct AssetStager<'a, F: HttpFetch + ?Sized> {
    fetcher: &'a F,
    dir: PathBuf,
}

impl<'a, F: HttpFetch + ?Sized> AssetStager<'a, F> {
    pub fn new(fetcher: &'a F, dir: impl Into<PathBuf>) -> Self {
        Self {
            fetcher,
            dir: dir.into(),
        }
    }

    /// 按顺序下载所有素材，返回与输入顺序一致的本地路径
    pub async fn stage(&self, urls: &[String]) -> Result<Vec<PathBuf>, AppError> {
        fs::create_dir_all(&self.dir)
            .await
            .map_err(|source| FileError::CreateDirFailed {
                path: self.dir.clone(),
                source,
            })?;

        let mut staged = Vec::with_capacity(urls.len());
        for (i, url) in urls.iter().enumerate() {
            let index = i + 1;
            info!("⬇️ 下载素材 {}/{}: {}", index, urls.len(), url);

            let bytes = self
                .fetcher
                .fetch(url, None)
                .await
                .map_err(|source| AssetError::DownloadFailed {
                    index,
                    url: url.clone(),
                    source,
                })?;

            let path = self.dir.join(staged_file_name(index, url));
            fs::write(&path, &bytes)
                .await
                .map_err(|source| AssetError::WriteFailed {
                    index,
                    path: path.clone(),
                    source,
                })?;

            debug!("素材 #{} 已保存: {} ({} 字节)", index, path.display(), bytes.len());
            staged.push(path);
        }

        info!("✓ {} 个素材已就绪", staged.len());
        Ok(staged)
    }
}

/// 本地文件名：`asset_NN` 加上地址里的扩展名
pub fn staged_file_name(index: usize, url: &str) -> String {
    let extension = reqwest::Url::parse(url)
        .ok()
        .and_then(|u| {
            u.path_segments()
                .and_then(|mut segments| segments.next_back().map(str::to_string))
        })
        .and_then(|segment| {
            Path::new(&segment)
                .extension()
                .and_then(|e| e.to_str())
                .map(str::to_ascii_lowercase)
        })
        .filter(|e| (1..=5).contains(&e.len()) && e.chars().all(|c| c.is_ascii_alphanumeric()));

    match extension {
        Some(ext) => format!("asset_{:02}.{}", index, ext),
        None => format!("asset_{:02}", index),
    }
}
