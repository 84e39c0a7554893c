use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;

use crate::error::{AppResult, ConfigError};

/// 配置文件路径的环境变量
pub const CONFIG_PATH_ENV: &str = "FORMS_ANSWER_CONFIG";
/// 默认配置文件
pub const DEFAULT_CONFIG_PATH: &str = "forms_answer.toml";

/// 程序配置
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 浏览器调试端口
    pub browser_debug_port: u16,
    /// 题目页面 URL
    pub target_url: String,
    /// 优先复用标题包含该字符串的标签页
    pub target_title: Option<String>,
    /// 是否自行启动无头浏览器（否则连接到调试端口）
    pub headless: bool,
    /// 无头模式下的浏览器可执行文件
    pub chrome_executable: Option<String>,
    /// 答案服务地址
    pub resolver_endpoint: String,
    /// Tesseract.js 脚本地址
    pub ocr_script_url: String,
    /// 注入前关闭页面 CSP（需要重新加载一次页面）
    pub bypass_csp: bool,
    /// 等待页面就绪的最长时间（秒）
    pub ready_timeout_secs: u64,
    /// 页面就绪轮询间隔（毫秒）
    pub ready_poll_ms: u64,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            browser_debug_port: 9222,
            target_url: "https://docs.google.com/forms".to_string(),
            target_title: None,
            headless: false,
            chrome_executable: None,
            resolver_endpoint: "http://localhost:5000/get-answer".to_string(),
            ocr_script_url: "https://cdn.jsdelivr.net/npm/tesseract.js@5/dist/tesseract.min.js"
                .to_string(),
            bypass_csp: true,
            ready_timeout_secs: 30,
            ready_poll_ms: 200,
            verbose_logging: false,
        }
    }
}

impl Config {
    /// 读取配置文件（不存在时使用默认值），再用环境变量覆盖
    pub fn load() -> AppResult<Self> {
        let path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.into());
        let base = if Path::new(&path).exists() {
            Self::from_toml_file(&path)?
        } else {
            Self::default()
        };
        base.with_env_overrides(|name| std::env::var(name).ok())
    }

    /// 从 TOML 文件读取配置，缺省字段使用默认值
    pub fn from_toml_file(path: &str) -> AppResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFailed {
            path: path.to_string(),
            source,
        })?;
        Self::from_toml_str(&content, path)
    }

    fn from_toml_str(content: &str, path: &str) -> AppResult<Self> {
        let config = toml::from_str(content).map_err(|source| ConfigError::TomlParseFailed {
            path: path.to_string(),
            source,
        })?;
        Ok(config)
    }

    /// 仅使用环境变量覆盖默认配置
    pub fn from_env() -> AppResult<Self> {
        Self::default().with_env_overrides(|name| std::env::var(name).ok())
    }

    fn with_env_overrides(self, lookup: impl Fn(&str) -> Option<String>) -> AppResult<Self> {
        let base = self;
        Ok(Self {
            browser_debug_port: parse_var(&lookup, "BROWSER_DEBUG_PORT", "u16")?
                .unwrap_or(base.browser_debug_port),
            target_url: lookup("TARGET_URL").unwrap_or(base.target_url),
            target_title: lookup("TARGET_TITLE").or(base.target_title),
            headless: parse_var(&lookup, "HEADLESS", "bool")?.unwrap_or(base.headless),
            chrome_executable: lookup("CHROME_EXECUTABLE").or(base.chrome_executable),
            resolver_endpoint: lookup("RESOLVER_ENDPOINT").unwrap_or(base.resolver_endpoint),
            ocr_script_url: lookup("OCR_SCRIPT_URL").unwrap_or(base.ocr_script_url),
            bypass_csp: parse_var(&lookup, "BYPASS_CSP", "bool")?.unwrap_or(base.bypass_csp),
            ready_timeout_secs: parse_var(&lookup, "READY_TIMEOUT_SECS", "u64")?
                .unwrap_or(base.ready_timeout_secs),
            ready_poll_ms: parse_var(&lookup, "READY_POLL_MS", "u64")?
                .unwrap_or(base.ready_poll_ms),
            verbose_logging: parse_var(&lookup, "VERBOSE_LOGGING", "bool")?
                .unwrap_or(base.verbose_logging),
        })
    }
}

fn parse_var<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    var_name: &str,
    expected_type: &str,
) -> AppResult<Option<T>> {
    match lookup(var_name) {
        None => Ok(None),
        Some(value) => match value.trim().parse() {
            Ok(parsed) => Ok(Some(parsed)),
            Err(_) => Err(ConfigError::EnvVarParseFailed {
                var_name: var_name.to_string(),
                value,
                expected_type: expected_type.to_string(),
            }
            .into()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_default_endpoint() {
        let config = Config::default();
        assert_eq!(config.resolver_endpoint, "http://localhost:5000/get-answer");
        assert!(!config.headless);
        assert!(config.bypass_csp);
    }

    #[test]
    fn test_csp_bypass_can_be_disabled() {
        let config = Config::default()
            .with_env_overrides(lookup_from(&[("BYPASS_CSP", "false")]))
            .unwrap();
        assert!(!config.bypass_csp);

        let config = Config::from_toml_str("bypass_csp = false\n", "inline.toml").unwrap();
        assert!(!config.bypass_csp);
    }

    #[test]
    fn test_env_overrides() {
        let config = Config::default()
            .with_env_overrides(lookup_from(&[
                ("BROWSER_DEBUG_PORT", "2001"),
                ("HEADLESS", "true"),
                ("RESOLVER_ENDPOINT", "http://127.0.0.1:8080/get-answer"),
            ]))
            .unwrap();

        assert_eq!(config.browser_debug_port, 2001);
        assert!(config.headless);
        assert_eq!(config.resolver_endpoint, "http://127.0.0.1:8080/get-answer");
        assert_eq!(config.ready_poll_ms, 200);
    }

    #[test]
    fn test_invalid_env_value_is_rejected() {
        let err = Config::default()
            .with_env_overrides(lookup_from(&[("READY_TIMEOUT_SECS", "soon")]))
            .unwrap_err();
        assert!(err.to_string().contains("READY_TIMEOUT_SECS"));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = Config::from_toml_str(
            "target_url = \"https://docs.google.com/forms/d/abc/viewform\"\nheadless = true\n",
            "inline.toml",
        )
        .unwrap();

        assert_eq!(config.target_url, "https://docs.google.com/forms/d/abc/viewform");
        assert!(config.headless);
        assert_eq!(config.browser_debug_port, 9222);
    }

    #[test]
    fn test_bad_toml_reports_path() {
        let err = Config::from_toml_str("headless = \"maybe\"", "broken.toml").unwrap_err();
        assert!(err.to_string().contains("broken.toml"));
    }
}
