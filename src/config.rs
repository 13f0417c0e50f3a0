//! 程序配置
//!
//! 所有字段都有默认值，可通过环境变量覆盖；无法解析的值回退到默认值。

use std::path::PathBuf;
use std::time::Duration;

// ========== 流程常量 ==========

/// 时间线上最多选中的素材缩略图数量
pub const MAX_THUMBNAILS: usize = 12;
/// 最多插入的字幕条数
pub const MAX_CAPTIONS: usize = 6;

/// 元素定位轮询间隔
pub const LOCATOR_POLL_INTERVAL: Duration = Duration::from_millis(250);
/// 可选控件的短查找时间（登录按钮、面板按钮等）
pub const SHORT_LOOKUP: Duration = Duration::from_secs(5);
/// 等待上传素材渲染为缩略图
pub const THUMBNAIL_WAIT: Duration = Duration::from_secs(60);
/// 等待导出完成标志（服务端渲染时间）
pub const COMPLETION_TIMEOUT: Duration = Duration::from_secs(120);
/// 登录提交后等待页面跳转
pub const NAVIGATION_TIMEOUT: Duration = Duration::from_secs(30);
/// 等待网络空闲的上限
pub const IDLE_TIMEOUT: Duration = Duration::from_secs(30);
/// 资源数保持不变多久视为网络空闲
pub const IDLE_QUIET_WINDOW: Duration = Duration::from_millis(500);
/// 点击后等待界面稳定
pub const UI_SETTLE_PAUSE: Duration = Duration::from_millis(1500);
/// 文件提交后等待上传开始处理
pub const UPLOAD_SETTLE_PAUSE: Duration = Duration::from_secs(5);
/// 两条字幕之间的停顿
pub const CAPTION_PAUSE: Duration = Duration::from_millis(800);
/// 导出对话框确认按钮的等待时间
pub const EXPORT_DIALOG_WAIT: Duration = Duration::from_secs(5);

/// 程序配置
#[derive(Clone)]
pub struct Config {
    /// 编辑器入口地址
    pub editor_url: String,
    /// 登录邮箱
    pub email: Option<String>,
    /// 登录密码
    pub password: Option<String>,
    /// 浏览器可执行文件路径，为空时由 chromiumoxide 自动探测
    pub chrome_path: Option<PathBuf>,
    /// 已运行浏览器的调试端口，设置后改为连接而不是启动
    pub browser_debug_port: Option<u16>,
    /// 是否无头模式
    pub headless: bool,
    /// 任务描述文件路径
    pub payload_path: PathBuf,
    /// 工作目录（素材与产物都放在这里）
    pub work_dir: PathBuf,
    /// 定位配置 TOML 文件
    pub locator_profile: Option<PathBuf>,
    /// 单次 HTTP 请求超时
    pub http_timeout: Duration,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            editor_url: "https://www.capcut.com/editor".to_string(),
            email: None,
            password: None,
            chrome_path: None,
            browser_debug_port: None,
            headless: true,
            payload_path: PathBuf::from("job.json"),
            work_dir: std::env::temp_dir().join("render_job"),
            locator_profile: None,
            http_timeout: Duration::from_secs(300),
            verbose_logging: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 从任意键值来源构建配置，方便测试
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let default = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Self {
            editor_url: non_empty("EDITOR_URL").unwrap_or(default.editor_url),
            email: non_empty("EDITOR_EMAIL"),
            password: non_empty("EDITOR_PASSWORD"),
            chrome_path: non_empty("CHROME_PATH").map(PathBuf::from),
            browser_debug_port: non_empty("BROWSER_DEBUG_PORT").and_then(|v| v.parse().ok()),
            headless: non_empty("HEADLESS").and_then(|v| v.parse().ok()).unwrap_or(default.headless),
            payload_path: non_empty("JOB_PAYLOAD_PATH")
                .or_else(|| non_empty("GITHUB_EVENT_PATH"))
                .map(PathBuf::from)
                .unwrap_or(default.payload_path),
            work_dir: non_empty("WORK_DIR").map(PathBuf::from).unwrap_or(default.work_dir),
            locator_profile: non_empty("LOCATOR_PROFILE").map(PathBuf::from),
            http_timeout: non_empty("HTTP_TIMEOUT_SECS")
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(default.http_timeout),
            verbose_logging: non_empty("VERBOSE_LOGGING").and_then(|v| v.parse().ok()).unwrap_or(default.verbose_logging),
        }
    }

    /// 素材暂存目录
    pub fn assets_dir(&self) -> PathBuf {
        self.work_dir.join("assets")
    }

    /// 产物输出目录
    pub fn output_dir(&self) -> PathBuf {
        self.work_dir.join("output")
    }

    /// 运行报告目录，与产物目录分开，产物名不会覆盖报告
    pub fn report_dir(&self) -> PathBuf {
        self.work_dir.join("reports")
    }

    /// 是否同时提供了账号和密码
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (&self.email, &self.password) {
            (Some(email), Some(password)) => Some((email.as_str(), password.as_str())),
            _ => None,
        }
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("editor_url", &self.editor_url)
            .field("email", &self.email.as_ref().map(|_| "***"))
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("chrome_path", &self.chrome_path)
            .field("browser_debug_port", &self.browser_debug_port)
            .field("headless", &self.headless)
            .field("payload_path", &self.payload_path)
            .field("work_dir", &self.work_dir)
            .field("locator_profile", &self.locator_profile)
            .field("http_timeout", &self.http_timeout)
            .field("verbose_logging", &self.verbose_logging)
            .finish()
    }
}
