/// 日志工具模块
///
/// 提供日志格式化和输出的辅助函数
use tracing::info;

use crate::config::Config;

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!(
        "🚀 程序启动 - {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("🌐 目标页面: {}", config.target_url);
    info!("📡 答案服务: {}", config.resolver_endpoint);
    info!(
        "🧭 浏览器: {}",
        if config.headless {
            "无头模式".to_string()
        } else {
            format!("调试端口 {}", config.browser_debug_port)
        }
    );
    info!("🔓 关闭页面 CSP: {}", if config.bypass_csp { "是" } else { "否" });
    info!("{}", "=".repeat(60));
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大字符数
///
/// # 返回
/// 返回截断后的文本（单行）
pub fn truncate_text(text: &str, max_len: usize) -> String {
    let single_line = text.replace('\n', " ");
    if single_line.chars().count() > max_len {
        single_line.chars().take(max_len).collect::<String>() + "..."
    } else {
        single_line
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_text() {
        assert_eq!(truncate_text("short", 10), "short");
        assert_eq!(truncate_text("abcdefghijk", 5), "abcde...");
        assert_eq!(truncate_text("中文题干很长很长", 4), "中文题干...");
        assert_eq!(truncate_text("a\nb", 10), "a b");
    }
}
