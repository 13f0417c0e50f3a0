//! 渲染任务处理器 - 编排层
//!
//! ## 职责
//!
//! 1. **任务加载**：读取并校验任务描述（失败即终止）
//! 2. **素材暂存**：下载全部素材（任何一个失败即终止，此时还没有启动浏览器）
//! 3. **资源管理**：启动浏览器会话，流程结束后关闭
//! 4. **向下委托**：步骤细节交给 `workflow::RenderFlow`
//! 5. **运行报告**：写入 `run_report.json` 并输出统计

use tracing::{info, warn};

use crate::browser::SessionLauncher;
use crate::clients::{HttpFetch, ReqwestFetcher};
use crate::config::Config;
use crate::error::AppResult;
use crate::infrastructure::EditorSurface;
use crate::models::locator::LocatorProfile;
use crate::models::{load_job, load_locator_profile};
use crate::services::{AssetStager, ReportWriter};
use crate::utils::logging::{log_job, log_startup, print_final_report};
use crate::workflow::{RenderFlow, RunReport};

/// 应用主结构
pub struct App<F: HttpFetch = ReqwestFetcher> {
    config: Config,
    profile: LocatorProfile,
    fetcher: F,
}

impl App<ReqwestFetcher> {
    /// 初始化应用：加载定位配置、创建 HTTP 客户端
    pub async fn initialize(config: Config) -> AppResult<Self> {
        let profile = load_locator_profile(config.locator_profile.as_deref()).await?;
        let fetcher = ReqwestFetcher::new(config.http_timeout)?;
        Ok(Self::with_parts(config, profile, fetcher))
    }
}

impl<F: HttpFetch> App<F> {
    pub fn with_parts(config: Config, profile: LocatorProfile, fetcher: F) -> Self {
        Self {
            config,
            profile,
            fetcher,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// 运行一次完整任务
    ///
    /// 返回 `Err` 表示在浏览器流程开始前就失败了（任务描述、素材、启动浏览器）；
    /// 流程中的致命步骤体现在 `RunReport::exit_code()` 上。
    pub async fn run<L: SessionLauncher>(&self, launcher: &L) -> AppResult<RunReport> {
        log_startup(&self.config);

        let job = load_job(&self.config.payload_path).await?;
        log_job(&job);

        let staged = AssetStager::new(&self.fetcher, self.config.assets_dir())
            .stage(&job.asset_urls)
            .await?;

        let surface = launcher.launch(&self.config).await?;
        let mut report = RunReport::new(&job, staged.clone());

        RenderFlow::new(&surface, &self.profile, &self.config, &self.fetcher)
            .run(&job, &staged, &mut report)
            .await;

        info!("🔚 关闭浏览器会话");
        if let Err(e) = surface.close().await {
            warn!("⚠️ 关闭浏览器会话失败: {:#}", e);
        }

        match ReportWriter::new(self.config.report_dir()).write(&report).await {
            Ok(path) => info!("📝 运行报告: {}", path.display()),
            Err(e) => warn!("⚠️ 写入运行报告失败: {:#}", e),
        }

        print_final_report(&report);
        Ok(report)
    }
}

/// 运行结果对应的进程退出码
pub fn exit_code(result: &AppResult<RunReport>) -> u8 {
    match result {
        Ok(report) => report.exit_code(),
        Err(_) => 1,
    }
}
