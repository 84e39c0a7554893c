//! 应用入口 - 编排层
//!
//! ## 职责
//!
//! 1. **应用初始化**：连接（或启动）浏览器、创建 JsExecutor、等待页面就绪
//! 2. **组装流水线**：页面文档 + 答案服务 + OCR 加载器
//! 3. **资源管理**：持有 Browser，保证页面在整个运行期间有效
//! 4. **全局统计**：输出两条流水线的处理结果

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chromiumoxide::Browser;
use tracing::info;

use crate::browser;
use crate::config::Config;
use crate::document::PageDocument;
use crate::infrastructure::JsExecutor;
use crate::orchestrator::pipeline::{GroupStats, Pipeline, RunReport};
use crate::services::{CapabilityLoader, HttpAnswerResolver, TesseractPageBackend};
use crate::utils::logging::log_startup;

/// 应用主结构
pub struct App {
    config: Config,
    _browser: Browser,
    executor: JsExecutor,
}

impl App {
    /// 初始化应用，返回时页面已就绪
    pub async fn initialize(config: Config) -> Result<Self> {
        log_startup(&config);

        let (browser, page) = if config.headless {
            browser::launch_headless_browser(
                &config.target_url,
                config.chrome_executable.as_deref(),
            )
            .await?
        } else {
            browser::connect_to_browser_and_page(
                config.browser_debug_port,
                Some(&config.target_url),
                config.target_title.as_deref(),
            )
            .await?
        };

        let executor = JsExecutor::new(page);
        if config.bypass_csp {
            executor
                .bypass_csp()
                .await
                .context("关闭页面 CSP 失败")?;
        }
        PageDocument::new(executor.clone())
            .wait_until_ready(
                Duration::from_millis(config.ready_poll_ms),
                Duration::from_secs(config.ready_timeout_secs),
            )
            .await
            .context("页面未能就绪")?;

        Ok(Self {
            config,
            _browser: browser,
            executor,
        })
    }

    /// 运行一次完整流水线
    ///
    /// 消耗自身：每次页面加载只运行一次。
    pub async fn run(self) -> Result<RunReport> {
        let document = Arc::new(PageDocument::new(self.executor.clone()));
        let resolver = Arc::new(HttpAnswerResolver::new(&self.config));
        let loader = CapabilityLoader::new(Arc::new(TesseractPageBackend::new(
            self.executor.clone(),
            &self.config,
        )));

        info!("🚦 页面已就绪，开始处理题目...");
        let report = Pipeline::new(document, resolver, loader).run().await;

        print_final_stats(&report);
        Ok(report)
    }
}

// ========== 日志辅助函数 ==========

fn log_group(name: &str, stats: &GroupStats) {
    info!(
        "{}: 找到 {}, 已标注 {}, 跳过 {}, 失败 {}",
        name, stats.located, stats.annotated, stats.skipped, stats.failed
    );
}

fn print_final_stats(report: &RunReport) {
    info!("\n{}", "=".repeat(60));
    info!("📊 全部处理完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    log_group("📝 文本题", &report.text);
    match &report.image {
        Some(stats) => log_group("🖼️ 图片题", stats),
        None => info!("🖼️ 图片题: OCR 未加载，未处理"),
    }
    info!("{}", "=".repeat(60));
}
