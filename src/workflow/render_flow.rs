//! 渲染流程 - 流程层
//!
//! 核心职责：在编辑器页面上按固定顺序执行一次渲染任务
//!
//! 流程顺序：
//! 1. 打开编辑器 → 登录 → 创建项目
//! 2. 上传素材（找不到上传控件时终止）
//! 3. 填充时间线 → 插入字幕 → 音效（不执行）
//! 4. 触发导出 → 等待完成标志并下载产物
//!
//! 除打开编辑器和上传素材外，每一步的失败都只记录为 `Skipped`，流程继续。

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use tokio::fs;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::clients::HttpFetch;
use crate::config::{
    Config, CAPTION_PAUSE, COMPLETION_TIMEOUT, EXPORT_DIALOG_WAIT, IDLE_TIMEOUT, MAX_CAPTIONS,
    MAX_THUMBNAILS, NAVIGATION_TIMEOUT, SHORT_LOOKUP, THUMBNAIL_WAIT, UI_SETTLE_PAUSE,
    UPLOAD_SETTLE_PAUSE,
};
use crate::infrastructure::EditorSurface;
use crate::models::caption::CaptionEntry;
use crate::models::job::Job;
use crate::models::locator::LocatorProfile;
use crate::services::ElementLocator;
use crate::utils::logging::{log_step_outcome, log_step_start, truncate_text};
use crate::workflow::step::{CompletionOutcome, RunReport, Step, StepOutcome};

/// 渲染流程
///
/// - 不持有浏览器资源，只借用页面
/// - 控件怎么找由 `LocatorProfile` 决定，这里只决定找哪个、找到后做什么
pub struct RenderFlow<'a, S: EditorSurface, F: HttpFetch + ?Sized> {
    surface: &'a S,
    locator: ElementLocator<'a, S>,
    profile: &'a LocatorProfile,
    config: &'a Config,
    fetcher: &'a F,
}

impl<'a, S: EditorSurface, F: HttpFetch + ?Sized> RenderFlow<'a, S, F> {
    pub fn new(surface: &'a S, profile: &'a LocatorProfile, config: &'a Config, fetcher: &'a F) -> Self {
        Self {
            surface,
            locator: ElementLocator::new(surface),
            profile,
            config,
            fetcher,
        }
    }

    /// 依次执行全部步骤，结果写入 `report`；遇到致命步骤立即停止
    pub async fn run(&self, job: &Job, files: &[PathBuf], report: &mut RunReport) {
        for step in Step::ALL {
            log_step_start(step);

            let outcome = match step {
                Step::Bootstrap => self.bootstrap().await,
                Step::Authenticate => soften(self.authenticate().await),
                Step::CreateProject => soften(self.create_project().await),
                Step::UploadAssets => self.upload_assets(files).await,
                Step::PopulateTimeline => {
                    let (outcome, selected) = self.populate_timeline().await;
                    report.thumbnails_selected = selected;
                    outcome
                }
                Step::InsertCaptions => {
                    let (outcome, attempts) = self.insert_captions(&job.captions()).await;
                    report.caption_attempts = attempts;
                    outcome
                }
                Step::ApplyEffects => self.apply_effects(&job.sfx),
                Step::TriggerExport => soften(self.trigger_export().await),
                Step::AwaitCompletion => {
                    let completion = self.await_completion(&report.output_name).await;
                    let outcome = completion_step_outcome(&completion);
                    report.completion = completion;
                    outcome
                }
            };

            log_step_outcome(step, &outcome);
            let fatal = outcome.is_fatal();
            report.record(step, outcome);
            if fatal {
                break;
            }
        }
    }

    /// 打开编辑器并等待网络空闲；导航失败是致命的
    pub async fn bootstrap(&self) -> StepOutcome {
        let url = &self.config.editor_url;
        if let Err(e) = self.surface.navigate(url).await {
            return StepOutcome::aborted(format!("导航到 {} 失败: {:#}", url, e));
        }
        if let Err(e) = self.surface.wait_for_idle(IDLE_TIMEOUT).await {
            warn!("⚠️ 页面未进入空闲状态，继续执行: {:#}", e);
        }
        info!("✓ 已打开编辑器: {}", url);
        StepOutcome::Succeeded
    }

    /// 登录（尽力而为）
    pub async fn authenticate(&self) -> Result<StepOutcome> {
        match self.locator.wait_for(&self.profile.login_button, SHORT_LOOKUP).await? {
            Some(button) => {
                self.surface.click(&button).await.context("点击登录入口失败")?;
                info!("已点击登录入口");
                sleep(UI_SETTLE_PAUSE).await;
            }
            None => info!("未找到登录入口，假定已处于登录状态"),
        }

        let Some((email, password)) = self.config.credentials() else {
            return Ok(StepOutcome::skipped("未提供账号或密码，跳过登录"));
        };

        let Some(email_field) = self.locator.wait_for(&self.profile.email_input, SHORT_LOOKUP).await? else {
            return Ok(StepOutcome::skipped("页面上没有登录表单"));
        };
        self.surface.type_text(&email_field, email).await.context("输入邮箱失败")?;

        // 部分登录页先输邮箱再显示密码框
        if let Some(submit) = self.locator.find(&self.profile.login_submit).await? {
            if self.locator.find(&self.profile.password_input).await?.is_none() {
                self.surface.click(&submit).await.context("提交邮箱失败")?;
                sleep(UI_SETTLE_PAUSE).await;
            }
        }

        let Some(password_field) = self.locator.wait_for(&self.profile.password_input, SHORT_LOOKUP).await? else {
            return Ok(StepOutcome::skipped("未找到密码输入框"));
        };
        self.surface
            .type_text(&password_field, password)
            .await
            .context("输入密码失败")?;

        match self.locator.find(&self.profile.login_submit).await? {
            Some(submit) => self.surface.click(&submit).await.context("提交登录失败")?,
            None => self.surface.press_enter(&password_field).await.context("提交登录失败")?,
        }

        if let Err(e) = self.surface.wait_for_navigation(NAVIGATION_TIMEOUT).await {
            warn!("⚠️ 登录后未检测到页面跳转: {:#}", e);
        }
        info!("✓ 已提交登录");
        Ok(StepOutcome::Succeeded)
    }

    /// 创建新项目（尽力而为）
    pub async fn create_project(&self) -> Result<StepOutcome> {
        let Some(button) = self.locator.wait_for(&self.profile.new_project, SHORT_LOOKUP).await? else {
            return Ok(StepOutcome::skipped("未找到新建项目按钮"));
        };
        self.surface.click(&button).await.context("点击新建项目失败")?;
        sleep(UI_SETTLE_PAUSE).await;
        info!("✓ 已新建项目");
        Ok(StepOutcome::Succeeded)
    }

    /// 上传素材：先直接找文件输入框，找不到再点上传按钮后重找；都失败则终止
    pub async fn upload_assets(&self, files: &[PathBuf]) -> StepOutcome {
        let input = match self.find_file_input().await {
            Ok(Some(input)) => input,
            Ok(None) => return StepOutcome::aborted("未找到上传控件"),
            Err(e) => return StepOutcome::aborted(format!("查找上传控件失败: {:#}", e)),
        };

        if let Err(e) = self.surface.attach_files(&input, files).await {
            return StepOutcome::aborted(format!("提交素材文件失败: {:#}", e));
        }

        info!("✓ 已提交 {} 个素材文件", files.len());
        sleep(UPLOAD_SETTLE_PAUSE).await;
        StepOutcome::Succeeded
    }

    async fn find_file_input(&self) -> Result<Option<S::Element>> {
        if let Some(input) = self.locator.wait_for(&self.profile.file_input, SHORT_LOOKUP).await? {
            return Ok(Some(input));
        }

        debug!("未直接找到文件输入框，尝试上传按钮");
        let Some(trigger) = self.locator.wait_for(&self.profile.upload_trigger, SHORT_LOOKUP).await? else {
            return Ok(None);
        };
        if let Err(e) = self.surface.click(&trigger).await {
            warn!("⚠️ 点击上传按钮失败: {:#}", e);
        }
        sleep(UI_SETTLE_PAUSE).await;

        self.locator.wait_for(&self.profile.file_input, SHORT_LOOKUP).await
    }

    /// 等待素材缩略图出现并依次选中，返回 (结果, 选中数量)
    pub async fn populate_timeline(&self) -> (StepOutcome, usize) {
        let thumbnails = match self.locator.wait_for_all(&self.profile.media_thumbnail, THUMBNAIL_WAIT).await {
            Ok(found) => found,
            Err(e) => return (StepOutcome::skipped(format!("查找缩略图失败: {:#}", e)), 0),
        };
        if thumbnails.is_empty() {
            return (StepOutcome::skipped("素材缩略图未出现"), 0);
        }

        let total = thumbnails.len().min(MAX_THUMBNAILS);
        info!("找到 {} 个缩略图，选中前 {} 个", thumbnails.len(), total);

        let mut selected = 0;
        for (i, thumbnail) in thumbnails.iter().take(MAX_THUMBNAILS).enumerate() {
            match self.surface.click(thumbnail).await {
                Ok(()) => selected += 1,
                Err(e) => warn!("⚠️ 选中第 {} 个缩略图失败: {:#}", i + 1, e),
            }
        }

        if selected == 0 {
            return (StepOutcome::skipped("缩略图全部选中失败"), 0);
        }
        info!("✓ 已选中 {}/{} 个缩略图", selected, total);
        (StepOutcome::Succeeded, selected)
    }

    /// 插入字幕，返回 (结果, 尝试次数)
    pub async fn insert_captions(&self, captions: &[CaptionEntry]) -> (StepOutcome, usize) {
        if captions.is_empty() {
            return (StepOutcome::skipped("未提供字幕脚本"), 0);
        }

        match self.locator.wait_for(&self.profile.text_panel, SHORT_LOOKUP).await {
            Ok(Some(panel)) => {
                if let Err(e) = self.surface.click(&panel).await {
                    warn!("⚠️ 打开文字面板失败: {:#}", e);
                }
                sleep(UI_SETTLE_PAUSE).await;
            }
            Ok(None) => warn!("⚠️ 未找到文字面板，直接尝试添加文字"),
            Err(e) => warn!("⚠️ 查找文字面板失败: {:#}", e),
        }

        let mut attempts = 0;
        let mut inserted = 0;
        for (i, entry) in captions.iter().take(MAX_CAPTIONS).enumerate() {
            attempts += 1;
            match self.insert_caption(entry).await {
                Ok(()) => {
                    inserted += 1;
                    info!("✓ 字幕 {}: {}", i + 1, truncate_text(&entry.text, 40));
                }
                Err(e) => warn!("⚠️ 字幕 {} 插入失败: {:#}", i + 1, e),
            }
            sleep(CAPTION_PAUSE).await;
        }

        if captions.len() > MAX_CAPTIONS {
            info!("字幕共 {} 条，只插入前 {} 条", captions.len(), MAX_CAPTIONS);
        }

        let outcome = if inserted > 0 {
            StepOutcome::Succeeded
        } else {
            StepOutcome::skipped(format!("{} 条字幕全部插入失败", attempts))
        };
        (outcome, attempts)
    }

    async fn insert_caption(&self, entry: &CaptionEntry) -> Result<()> {
        let Some(add) = self.locator.wait_for(&self.profile.add_text, SHORT_LOOKUP).await? else {
            bail!("未找到添加文字按钮");
        };
        self.surface.click(&add).await.context("点击添加文字失败")?;
        sleep(UI_SETTLE_PAUSE).await;

        let Some(editor) = self
            .locator
            .wait_for(&self.profile.active_text_surface, SHORT_LOOKUP)
            .await?
        else {
            bail!("未找到文字输入区域");
        };
        self.surface
            .type_text(&editor, &entry.text)
            .await
            .context("输入字幕失败")?;
        Ok(())
    }

    /// 音效：当前不执行任何界面操作
    pub fn apply_effects(&self, sfx: &[String]) -> StepOutcome {
        if !sfx.is_empty() {
            info!("收到 {} 个音效引用，当前版本不处理: {:?}", sfx.len(), sfx);
        }
        StepOutcome::skipped("音效步骤未启用")
    }

    /// 触发导出（尽力而为），找不到按钮也继续等待完成标志
    pub async fn trigger_export(&self) -> Result<StepOutcome> {
        let Some(button) = self.locator.wait_for(&self.profile.export_button, SHORT_LOOKUP).await? else {
            return Ok(StepOutcome::skipped("未找到导出按钮"));
        };
        self.surface.click(&button).await.context("点击导出失败")?;
        info!("✓ 已点击导出");

        match self.locator.wait_for(&self.profile.export_confirm, EXPORT_DIALOG_WAIT).await {
            Ok(Some(confirm)) => {
                if let Err(e) = self.surface.click(&confirm).await {
                    warn!("⚠️ 点击导出确认失败: {:#}", e);
                } else {
                    info!("✓ 已确认导出设置");
                }
            }
            Ok(None) => debug!("没有导出确认对话框"),
            Err(e) => warn!("⚠️ 查找导出确认按钮失败: {:#}", e),
        }
        Ok(StepOutcome::Succeeded)
    }

    /// 等待完成标志并下载产物
    pub async fn await_completion(&self, output_name: &str) -> CompletionOutcome {
        info!("⏳ 等待导出完成 (最长 {:?})...", COMPLETION_TIMEOUT);

        let indicator = match self
            .locator
            .wait_for(&self.profile.completion_indicator, COMPLETION_TIMEOUT)
            .await
        {
            Ok(Some(indicator)) => indicator,
            Ok(None) => return CompletionOutcome::TimedOut,
            Err(e) => {
                warn!("⚠️ 查找完成标志失败: {:#}", e);
                return CompletionOutcome::TimedOut;
            }
        };

        let Some(reference) = self.read_reference(&indicator).await else {
            return CompletionOutcome::MissingReference;
        };

        let base = self.surface.current_url().await.ok().flatten();
        let Some(url) = resolve_reference(&reference, base.as_deref()) else {
            warn!("⚠️ 下载地址不可用: {}", reference);
            return CompletionOutcome::MissingReference;
        };

        match self.download_artifact(&url, output_name).await {
            Ok(outcome) => outcome,
            Err(e) => CompletionOutcome::DownloadFailed {
                reason: format!("{:#}", e),
            },
        }
    }

    async fn read_reference(&self, indicator: &S::Element) -> Option<String> {
        for name in &self.profile.download_attributes {
            match self.surface.attribute(indicator, name).await {
                Ok(Some(value)) if !value.trim().is_empty() => {
                    debug!("从属性 `{}` 读取到下载地址", name);
                    return Some(value.trim().to_string());
                }
                Ok(_) => {}
                Err(e) => debug!("读取属性 `{}` 失败: {}", name, e),
            }
        }
        None
    }

    async fn download_artifact(&self, url: &str, output_name: &str) -> Result<CompletionOutcome> {
        info!("⬇️ 下载产物: {}", url);
        let cookie = self.surface.cookie_header().await.unwrap_or_else(|e| {
            debug!("读取 Cookie 失败: {}", e);
            None
        });

        let bytes = self.fetcher.fetch(url, cookie.as_deref()).await?;

        let dir = self.config.output_dir();
        fs::create_dir_all(&dir)
            .await
            .with_context(|| format!("无法创建输出目录: {}", dir.display()))?;
        let path = dir.join(output_name);
        fs::write(&path, &bytes)
            .await
            .with_context(|| format!("无法写入产物: {}", path.display()))?;

        info!("✅ 产物已保存: {} ({} 字节)", path.display(), bytes.len());
        Ok(CompletionOutcome::Downloaded {
            path,
            bytes: bytes.len() as u64,
        })
    }
}

/// 把 `anyhow` 错误降级为软失败
fn soften(result: Result<StepOutcome>) -> StepOutcome {
    result.unwrap_or_else(|e| StepOutcome::skipped(format!("{:#}", e)))
}

fn completion_step_outcome(completion: &CompletionOutcome) -> StepOutcome {
    match completion {
        CompletionOutcome::Downloaded { .. } => StepOutcome::Succeeded,
        CompletionOutcome::NotReached => StepOutcome::skipped("未执行"),
        CompletionOutcome::TimedOut => StepOutcome::skipped("完成标志未在时限内出现"),
        CompletionOutcome::MissingReference => StepOutcome::skipped("完成标志上没有可用的下载地址"),
        CompletionOutcome::DownloadFailed { reason } => StepOutcome::skipped(format!("产物下载失败: {}", reason)),
    }
}

/// 把下载地址解析为可直接请求的 http(s) 地址；相对地址基于当前页面解析
pub fn resolve_reference(reference: &str, base: Option<&str>) -> Option<String> {
    use reqwest::Url;

    let url = match Url::parse(reference) {
        Ok(url) => url,
        Err(_) => Url::parse(base?).ok()?.join(reference).ok()?,
    };

    matches!(url.scheme(), "http" | "https").then(|| url.to_string())
}
