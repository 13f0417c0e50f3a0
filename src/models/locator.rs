//! 控件定位描述
//!
//! 目标编辑器的界面不受我们控制，所有选择器和文字匹配都集中在 `LocatorProfile`，
//! 步骤逻辑只引用配置里的字段名。界面改版时只需要改这里（或提供 TOML 覆盖文件）。

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

/// 单个定位方式
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Locator {
    /// CSS 选择器，取第一个匹配元素
    Css { selector: String },
    /// 在 `scope` 选中的元素中，按可见文字匹配 `pattern`（不区分大小写的正则）
    Text { scope: String, pattern: String },
}

impl Locator {
    pub fn css(selector: impl Into<String>) -> Self {
        Self::Css {
            selector: selector.into(),
        }
    }

    pub fn text(scope: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self::Text {
            scope: scope.into(),
            pattern: pattern.into(),
        }
    }

    /// 需要查询的 CSS 范围
    pub fn scope(&self) -> &str {
        match self {
            Locator::Css { selector } => selector,
            Locator::Text { scope, .. } => scope,
        }
    }

    /// 编译文字匹配规则；CSS 定位返回 `None`
    pub fn text_matcher(&self) -> Result<Option<Regex>, regex::Error> {
        match self {
            Locator::Css { .. } => Ok(None),
            Locator::Text { pattern, .. } => RegexBuilder::new(pattern)
                .case_insensitive(true)
                .build()
                .map(Some),
        }
    }
}

impl std::fmt::Display for Locator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Locator::Css { selector } => write!(f, "css({})", selector),
            Locator::Text { scope, pattern } => write!(f, "text({} ~ /{}/)", scope, pattern),
        }
    }
}

/// 按顺序尝试的一组定位方式
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocatorChain(pub Vec<Locator>);

impl LocatorChain {
    pub fn new(locators: Vec<Locator>) -> Self {
        Self(locators)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Locator> {
        self.0.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// 编辑器各控件的定位配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocatorProfile {
    pub login_button: LocatorChain,
    pub email_input: LocatorChain,
    pub password_input: LocatorChain,
    pub login_submit: LocatorChain,
    pub new_project: LocatorChain,
    pub file_input: LocatorChain,
    pub upload_trigger: LocatorChain,
    pub media_thumbnail: LocatorChain,
    pub text_panel: LocatorChain,
    pub add_text: LocatorChain,
    pub active_text_surface: LocatorChain,
    pub export_button: LocatorChain,
    pub export_confirm: LocatorChain,
    pub completion_indicator: LocatorChain,
    /// 完成标志上按顺序读取的下载地址属性
    pub download_attributes: Vec<String>,
}

const CLICKABLE: &str = "button, [role=button], a";

impl Default for LocatorProfile {
    fn default() -> Self {
        Self {
            login_button: LocatorChain::new(vec![
                Locator::css("[data-testid=login-button]"),
                Locator::text(CLICKABLE, r"^\s*(log ?in|sign ?in)\s*$"),
            ]),
            email_input: LocatorChain::new(vec![Locator::css(
                "input[type=email], input[name=email], input[name=signUsername]",
            )]),
            password_input: LocatorChain::new(vec![Locator::css("input[type=password]")]),
            login_submit: LocatorChain::new(vec![
                Locator::css("button[type=submit]"),
                Locator::text(CLICKABLE, r"^\s*(continue|next|log ?in|sign ?in)\s*$"),
            ]),
            new_project: LocatorChain::new(vec![Locator::text(
                CLICKABLE,
                r"new project|create new|create project|blank project",
            )]),
            file_input: LocatorChain::new(vec![Locator::css("input[type=file]")]),
            upload_trigger: LocatorChain::new(vec![
                Locator::css("[data-testid=upload-button]"),
                Locator::text(CLICKABLE, r"upload|import"),
            ]),
            media_thumbnail: LocatorChain::new(vec![
                Locator::css("[data-testid=media-item]"),
                Locator::css("[class*=material-item], [class*=media-item]"),
            ]),
            text_panel: LocatorChain::new(vec![
                Locator::css("[data-testid=text-panel]"),
                Locator::text(CLICKABLE, r"^\s*(text|captions?)\s*$"),
            ]),
            add_text: LocatorChain::new(vec![
                Locator::css("[data-testid=add-text]"),
                Locator::text(CLICKABLE, r"add text|default text|add heading"),
            ]),
            active_text_surface: LocatorChain::new(vec![
                Locator::css("[contenteditable=true]:focus, textarea:focus"),
                Locator::css("[contenteditable=true]"),
                Locator::css("textarea"),
            ]),
            export_button: LocatorChain::new(vec![
                Locator::css("[data-testid=export-button]"),
                Locator::text(CLICKABLE, r"^\s*(export|download)\s*$"),
            ]),
            export_confirm: LocatorChain::new(vec![Locator::text(
                "[role=dialog] button, .modal button",
                r"^\s*(export|confirm|start export)\s*$",
            )]),
            completion_indicator: LocatorChain::new(vec![
                Locator::css("[data-testid=export-complete]"),
                Locator::css("a[download]"),
                Locator::text(CLICKABLE, r"download (video|file)|export complete"),
            ]),
            download_attributes: vec![
                "href".to_string(),
                "data-href".to_string(),
                "data-url".to_string(),
                "data-download-url".to_string(),
                "download-url".to_string(),
            ],
        }
    }
}

impl LocatorProfile {
    /// 从 TOML 文本解析；未出现的字段沿用默认值
    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}
