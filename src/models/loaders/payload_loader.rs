use std::path::Path;

use serde_json::Value;
use tokio::fs;

use crate::error::{ConfigError, PayloadError};
use crate::models::job::Job;
use crate::models::locator::LocatorProfile;

/// 事件信封里可能承载任务的字段
const ENVELOPE_KEYS: [&str; 2] = ["client_payload", "inputs"];

/// workflow_dispatch 的输入只能是标量，这些列表字段会以字符串形式出现
const SCALAR_LIST_KEYS: [&str; 2] = ["assetUrls", "sfx"];

/// 从文件加载任务
///
/// 文件可以直接是任务对象，也可以是带 `client_payload` / `inputs` 的触发事件。
pub async fn load_job(path: &Path) -> Result<Job, PayloadError> {
    let content = fs::read_to_string(path)
        .await
        .map_err(|source| PayloadError::Unreadable {
            path: path.to_path_buf(),
            source,
        })?;

    parse_job_document(&content)
}

/// 解析任务文本（支持事件信封）
pub fn parse_job_document(content: &str) -> Result<Job, PayloadError> {
    let mut document: Value = serde_json::from_str(content)?;

    for key in ENVELOPE_KEYS {
        if let Some(inner) = document.get_mut(key).filter(|v| v.is_object()) {
            tracing::debug!("从事件字段 `{}` 中读取任务", key);
            document = inner.take();
            if key == "inputs" {
                expand_scalar_lists(&mut document);
            }
            break;
        }
    }

    let job: Job = serde_json::from_value(document)?;
    job.validate()?;
    Ok(job)
}

/// 把字符串形式的列表字段展开为 JSON 数组
///
/// 字符串本身是 JSON 数组时按 JSON 解析，否则按逗号或换行拆分。
fn expand_scalar_lists(document: &mut Value) {
    for key in SCALAR_LIST_KEYS {
        let Some(field) = document.get_mut(key) else {
            continue;
        };
        let Value::String(text) = field else {
            continue;
        };
        *field = split_list(text);
    }
}

fn split_list(text: &str) -> Value {
    let trimmed = text.trim();
    if let Ok(list @ Value::Array(_)) = serde_json::from_str::<Value>(trimmed) {
        return list;
    }

    Value::Array(
        trimmed
            .split(|c: char| c == ',' || c == '\n')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(|item| Value::String(item.to_string()))
            .collect(),
    )
}

/// 加载定位配置；未指定文件时使用内置默认值
pub async fn load_locator_profile(path: Option<&Path>) -> Result<LocatorProfile, ConfigError> {
    let Some(path) = path else {
        return Ok(LocatorProfile::default());
    };

    let content = fs::read_to_string(path)
        .await
        .map_err(|source| ConfigError::ProfileUnreadable {
            path: path.to_path_buf(),
            source,
        })?;

    let profile = LocatorProfile::from_toml_str(&content).map_err(|source| ConfigError::ProfileInvalid {
        path: path.to_path_buf(),
        source,
    })?;

    tracing::info!("已加载定位配置: {}", path.display());
    Ok(profile)
}
