//! 字幕脚本
//!
//! `scriptText` 可以是结构化的 `{time, text}` 列表，也可以是字符串：
//! 字符串先按 JSON 列表解析，失败时整段文本作为一条字幕。
//! 其他形状的值不会让任务失败，只会丢弃无法使用的部分。

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

/// 字幕时间点：秒数或原样保留的时间戳字符串
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CaptionTime {
    Seconds(f64),
    Stamp(String),
}

/// 单条字幕
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptionEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<CaptionTime>,
    #[serde(default)]
    pub text: String,
}

impl CaptionEntry {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            time: None,
            text: text.into(),
        }
    }
}

/// 任务中的原始字幕脚本
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScriptText {
    Entries(Vec<CaptionEntry>),
    Raw(String),
    /// 其余任意 JSON（字符串列表、单个对象、字段类型不对的条目等）
    Loose(Value),
}

/// 将字幕脚本解析为字幕列表，空白字幕会被丢弃
pub fn parse_script(script: &ScriptText) -> Vec<CaptionEntry> {
    let entries = match script {
        ScriptText::Entries(entries) => entries.clone(),
        ScriptText::Raw(raw) => parse_raw(raw),
        ScriptText::Loose(value) => parse_value(value),
    };

    entries
        .into_iter()
        .filter(|entry| !entry.text.trim().is_empty())
        .collect()
}

fn parse_raw(raw: &str) -> Vec<CaptionEntry> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }

    match serde_json::from_str::<Value>(trimmed) {
        Ok(Value::Array(items)) => items.iter().filter_map(entry_from_value).collect(),
        _ => vec![CaptionEntry::new(trimmed)],
    }
}

fn parse_value(value: &Value) -> Vec<CaptionEntry> {
    match value {
        Value::Array(items) => items.iter().filter_map(entry_from_value).collect(),
        Value::Object(_) => entry_from_value(value).into_iter().collect(),
        other => {
            warn!("⚠️ 无法识别的字幕脚本，已忽略: {}", other);
            Vec::new()
        }
    }
}

/// 单个列表元素：字符串、`{time, text}` 对象，或至少带字符串 `text` 的对象
fn entry_from_value(value: &Value) -> Option<CaptionEntry> {
    match value {
        Value::String(text) => Some(CaptionEntry::new(text.as_str())),
        Value::Object(fields) => {
            if let Ok(entry) = serde_json::from_value::<CaptionEntry>(value.clone()) {
                return Some(entry);
            }
            match fields.get("text") {
                Some(Value::String(text)) => {
                    warn!("⚠️ 字幕时间无法识别，已忽略: {}", value);
                    Some(CaptionEntry::new(text.as_str()))
                }
                _ => {
                    warn!("⚠️ 字幕条目缺少文字，已忽略: {}", value);
                    None
                }
            }
        }
        other => {
            warn!("⚠️ 无法识别的字幕条目，已忽略: {}", other);
            None
        }
    }
}
