//! 轮询 - 基础设施层
//!
//! 页面内的长任务（脚本加载、OCR 识别）由页面自己异步执行，
//! Rust 侧只发短命令查询进度，单条 CDP 命令不会因任务耗时而超时。

use std::future::Future;
use std::time::Duration;

use tokio::time::sleep;

use crate::error::AppResult;

/// 反复调用 `check`，直到它给出值或返回错误
///
/// 不设截止时间，调用方需保证任务最终会结束。
pub async fn poll_until<T, F, Fut>(interval: Duration, mut check: F) -> AppResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = AppResult<Option<T>>>,
{
    loop {
        if let Some(value) = check().await? {
            return Ok(value);
        }
        sleep(interval).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use tokio::time::Instant;

    #[tokio::test(start_paused = true)]
    async fn test_waits_past_command_timeout() {
        let started = Instant::now();
        let value = poll_until(Duration::from_millis(250), || async move {
            if started.elapsed() >= Duration::from_secs(45) {
                Ok(Some("done"))
            } else {
                Ok(None)
            }
        })
        .await
        .unwrap();

        assert_eq!(value, "done");
        assert!(started.elapsed() >= Duration::from_secs(45));
    }

    #[tokio::test(start_paused = true)]
    async fn test_error_stops_polling() {
        let mut calls = 0;
        let result: AppResult<()> = poll_until(Duration::from_millis(250), || {
            calls += 1;
            let attempt = calls;
            async move {
                if attempt == 3 {
                    Err(AppError::recognize_failed("img", "worker crashed"))
                } else {
                    Ok(None)
                }
            }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls, 3);
    }
}
