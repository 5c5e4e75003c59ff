//! 应用生命周期 - 编排层
//!
//! ## 核心功能
//!
//! 1. **应用初始化**：准备目录、连接或启动浏览器、创建 JsExecutor
//! 2. **操作员交互**：确定语言和题目范围，等待确认
//! 3. **运行一轮**：委托 `PassRunner`，Ctrl-C 时在当前题目结束后停止
//! 4. **全局统计**：输出本轮结果
//!
//! 只有本模块持有 Browser。

use std::fs;

use anyhow::{Context, Result};
use chromiumoxide::Browser;
use tracing::{info, warn};

use crate::browser;
use crate::config::Config;
use crate::infrastructure::JsExecutor;
use crate::operator::Operator;
use crate::orchestrator::pass_runner::{PassRunner, PassSummary};
use crate::services::FailureLog;
use crate::surface::BrowserSurface;
use crate::utils::logging::{log_pass_start, log_startup, print_final_stats};
use crate::workflow::TargetFlow;

/// 应用主结构
pub struct App {
    config: Config,
    _browser: Browser,
    surface: BrowserSurface,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        log_startup(&config);

        provision_dirs(&config)?;

        // 有调试端口时连接已打开的浏览器，否则启动新浏览器
        let (browser, page) = match config.browser_debug_port {
            Some(port) => browser::connect_to_browser_and_page(port, &config.target_url).await?,
            None => browser::launch_browser(&config.target_url, config.headless).await?,
        };

        // 创建 JsExecutor（持有 page）
        let surface = BrowserSurface::new(JsExecutor::new(page));

        Ok(Self {
            config,
            _browser: browser,
            surface,
        })
    }

    /// 运行应用主逻辑
    pub async fn run(&self) -> Result<PassSummary> {
        let mut operator = Operator::stdin();
        let language = operator.choose_language(self.config.language.as_deref()).await?;
        let ids = operator.choose_ids(language, self.config.id_range.as_deref()).await?;
        operator.wait_ready(language).await?;

        let flow = TargetFlow::new(&self.config)?;
        let runner = PassRunner::new(
            flow,
            FailureLog::new(&self.config.failure_log_file),
            self.config.inter_id_pause(),
        );
        install_ctrl_c(&runner);

        log_pass_start(language, &ids);
        let summary = runner.run(&self.surface, language, &ids).await;

        print_final_stats(&summary, &self.config);

        Ok(summary)
    }
}

/// 创建题目和图片目录
fn provision_dirs(config: &Config) -> Result<()> {
    fs::create_dir_all(&config.questions_dir)
        .with_context(|| format!("无法创建目录: {}", config.questions_dir.display()))?;
    fs::create_dir_all(&config.images_dir)
        .with_context(|| format!("无法创建目录: {}", config.images_dir.display()))?;

    info!("📁 目录已就绪");
    info!("   📝 题目: {}", config.questions_dir.display());
    info!("   🖼️  图片: {}", config.images_dir.display());
    Ok(())
}

/// Ctrl-C 时设置取消标志，当前题目处理完后停止
fn install_ctrl_c(runner: &PassRunner) {
    let cancel = runner.cancel_flag();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("\n⛔ 收到 Ctrl-C，当前题目完成后停止");
            cancel.store(true, std::sync::atomic::Ordering::SeqCst);
        }
    });
}
