//! JS 执行器 - 基础设施层
//!
//! 持有唯一的 page 资源，只暴露"执行 JS"的能力

use std::time::Duration;

use chromiumoxide::cdp::browser_protocol::page::SetBypassCspParams;
use chromiumoxide::Page;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use tokio::time::{sleep, Instant};
use tracing::debug;

use crate::error::{AppResult, BrowserError};
use crate::infrastructure::poll::poll_until;

/// JS 执行器
///
/// 职责：
/// - 持有唯一的 Page 资源
/// - 暴露 eval() 能力，async 脚本的 Promise 会被等待
/// - 不认识题目 / 答案
#[derive(Clone)]
pub struct JsExecutor {
    page: Page,
}

impl JsExecutor {
    pub fn new(page: Page) -> Self {
        Self { page }
    }

    /// 关闭页面的内容安全策略并重新加载，之后注入的外部脚本不会被拦截
    ///
    /// CSP 在文档加载时生效，所以必须重新加载一次。
    pub async fn bypass_csp(&self) -> AppResult<()> {
        self.page.execute(SetBypassCspParams::new(true)).await?;
        self.page.reload().await?;
        debug!("已关闭页面 CSP 并重新加载");
        Ok(())
    }

    /// 执行 JS 代码并返回 JSON 结果
    pub async fn eval(&self, js_code: impl Into<String>) -> AppResult<JsonValue> {
        let result = self.page.evaluate(js_code.into()).await?;
        // 脚本没有返回值时 into_value 会失败，按 null 处理
        Ok(result.into_value().unwrap_or(JsonValue::Null))
    }

    /// 执行 JS 代码并反序列化为指定类型
    pub async fn eval_as<T: DeserializeOwned>(&self, js_code: impl Into<String>) -> AppResult<T> {
        let json_value = self.eval(js_code).await?;
        let typed_value = serde_json::from_value(json_value)?;
        Ok(typed_value)
    }

    /// 轮询一个返回布尔值的表达式，直到为 true 或超时
    pub async fn wait_until(
        &self,
        js_condition: &str,
        poll: Duration,
        timeout: Duration,
    ) -> AppResult<()> {
        let started = Instant::now();
        loop {
            let satisfied: bool = self.eval_as(js_condition).await.unwrap_or(false);
            if satisfied {
                debug!("条件满足，用时 {:?}", started.elapsed());
                return Ok(());
            }
            if started.elapsed() >= timeout {
                return Err(BrowserError::ReadyTimeout {
                    waited_secs: timeout.as_secs(),
                }
                .into());
            }
            sleep(poll).await;
        }
    }

    /// 反复执行 `js_code`，返回第一个非 null 结果
    ///
    /// 每次只是一条短命令，适合查询页面内长任务的进度。
    pub async fn poll_value(&self, js_code: &str, interval: Duration) -> AppResult<JsonValue> {
        poll_until(interval, || {
            let js_code = js_code.to_string();
            async move {
                let value = self.eval(js_code).await?;
                Ok((!value.is_null()).then_some(value))
            }
        })
        .await
    }
}
