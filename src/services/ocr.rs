//! OCR 能力 - 业务能力层
//!
//! ## 组成
//! - [`OcrBackend`]：可注入、可识别的 OCR 后端（页面内 Tesseract.js 或测试替身）
//! - [`CapabilityLoader`]：保证每次页面加载只注入一次，并把结果记下来
//! - [`OcrHandle`]：只有加载成功才能拿到，图片流程必须持有它

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::sync::OnceCell;
use tracing::{debug, error, info};

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::infrastructure::JsExecutor;

/// 识别语言，固定为英文
pub const OCR_LANGUAGE: &str = "eng";

/// `recognize` 的返回结构：`{ data: { text } }`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Recognition {
    pub data: RecognitionData,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecognitionData {
    #[serde(default)]
    pub text: String,
}

impl Recognition {
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            data: RecognitionData { text: text.into() },
        }
    }
}

/// OCR 后端
#[async_trait]
pub trait OcrBackend: Send + Sync {
    /// 把 OCR 能力注入执行环境，可调用后返回
    async fn inject(&self) -> AppResult<()>;

    /// 识别一张图片
    async fn recognize(&self, image_src: &str, language: &str) -> AppResult<Recognition>;
}

/// OCR 能力加载器
pub struct CapabilityLoader {
    backend: Arc<dyn OcrBackend>,
    outcome: OnceCell<Result<(), String>>,
}

impl CapabilityLoader {
    pub fn new(backend: Arc<dyn OcrBackend>) -> Self {
        Self {
            backend,
            outcome: OnceCell::new(),
        }
    }

    /// 加载 OCR 能力
    ///
    /// 只有第一次调用会真正注入，之后返回同样的结果。
    pub async fn load(&self) -> AppResult<OcrHandle> {
        let outcome = self
            .outcome
            .get_or_init(|| async {
                info!("📦 正在加载 OCR 能力...");
                match self.backend.inject().await {
                    Ok(()) => {
                        info!("✓ OCR 能力已就绪");
                        Ok(())
                    }
                    Err(e) => {
                        error!("❌ OCR 能力加载失败: {}", e);
                        Err(e.to_string())
                    }
                }
            })
            .await;

        match outcome {
            Ok(()) => Ok(OcrHandle {
                backend: Arc::clone(&self.backend),
            }),
            Err(reason) => Err(AppError::capability_load_failed(reason.clone())),
        }
    }
}

/// 已加载的 OCR 能力
#[derive(Clone)]
pub struct OcrHandle {
    backend: Arc<dyn OcrBackend>,
}

impl OcrHandle {
    /// 识别图片，返回原始文本（未 trim）
    pub async fn recognize(&self, image_src: &str) -> AppResult<String> {
        debug!("OCR 识别: {}", image_src);
        let recognition = self.backend.recognize(image_src, OCR_LANGUAGE).await?;
        Ok(recognition.data.text)
    }
}

/// 查询页面内 OCR 任务进度的间隔
pub const OCR_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// 页面内的 Tesseract.js
///
/// 注入和识别都在页面内后台执行，结果写到 window 上，由 Rust 侧轮询读取。
pub struct TesseractPageBackend {
    executor: JsExecutor,
    script_url: String,
    next_job: AtomicU64,
}

impl TesseractPageBackend {
    pub fn new(executor: JsExecutor, config: &Config) -> Self {
        Self {
            executor,
            script_url: config.ocr_script_url.clone(),
            next_job: AtomicU64::new(0),
        }
    }
}

/// 开始加载脚本，立即返回
fn inject_start_js(script_url: &str) -> AppResult<String> {
    Ok(format!(
        r#"
        (() => {{
            if (typeof Tesseract !== 'undefined') {{
                window.__formsAnswerOcrLoad = 'present';
                return true;
            }}
            if (window.__formsAnswerOcrLoad === 'pending') return true;
            window.__formsAnswerOcrLoad = 'pending';
            const script = document.createElement('script');
            script.src = {};
            script.onload = () => {{
                window.__formsAnswerOcrLoad = typeof Tesseract !== 'undefined' ? 'loaded' : 'missing';
            }};
            script.onerror = () => {{ window.__formsAnswerOcrLoad = 'error'; }};
            document.head.appendChild(script);
            return true;
        }})()
        "#,
        serde_json::to_string(script_url)?
    ))
}

/// 加载未结束时返回 null；页面被重新加载后状态丢失，返回 'lost'
const INJECT_POLL_JS: &str = r#"
    (() => {
        const state = window.__formsAnswerOcrLoad;
        if (state === 'pending') return null;
        return state || 'lost';
    })()
"#;

/// 开始一次识别，立即返回
fn recognize_start_js(job: u64, image_src: &str, language: &str) -> AppResult<String> {
    Ok(format!(
        r#"
        (() => {{
            const jobs = window.__formsAnswerOcrJobs = window.__formsAnswerOcrJobs || {{}};
            const fail = (error) => {{ jobs[{job}] = {{ error: String(error && error.message || error) }}; }};
            jobs[{job}] = null;
            try {{
                Tesseract.recognize({src}, {lang})
                    .then(({{ data }}) => {{ jobs[{job}] = {{ data: {{ text: data.text }} }}; }})
                    .catch(fail);
            }} catch (error) {{
                fail(error);
            }}
            return true;
        }})()
        "#,
        job = job,
        src = serde_json::to_string(image_src)?,
        lang = serde_json::to_string(language)?
    ))
}

/// 识别未结束时返回 null；结束后取出结果并删除
fn recognize_poll_js(job: u64) -> String {
    format!(
        r#"
        (() => {{
            const jobs = window.__formsAnswerOcrJobs || {{}};
            if (!({job} in jobs)) return {{ error: 'recognition job lost' }};
            const result = jobs[{job}];
            if (result === null) return null;
            delete jobs[{job}];
            return result;
        }})()
        "#,
        job = job
    )
}

#[async_trait]
impl OcrBackend for TesseractPageBackend {
    async fn inject(&self) -> AppResult<()> {
        self.executor.eval(inject_start_js(&self.script_url)?).await?;
        let state = self
            .executor
            .poll_value(INJECT_POLL_JS, OCR_POLL_INTERVAL)
            .await?;

        debug!("Tesseract.js 注入状态: {}", state);
        match state.as_str() {
            Some("present") | Some("loaded") => Ok(()),
            Some("missing") => Err(AppError::capability_load_failed(
                "脚本已加载但未暴露 Tesseract",
            )),
            _ => Err(AppError::capability_load_failed(format!(
                "无法加载脚本 {}",
                self.script_url
            ))),
        }
    }

    async fn recognize(&self, image_src: &str, language: &str) -> AppResult<Recognition> {
        let job = self.next_job.fetch_add(1, Ordering::Relaxed);
        self.executor
            .eval(recognize_start_js(job, image_src, language)?)
            .await?;

        let value = self
            .executor
            .poll_value(&recognize_poll_js(job), OCR_POLL_INTERVAL)
            .await?;
        if let Some(reason) = value.get("error").and_then(|v| v.as_str()) {
            return Err(AppError::recognize_failed(image_src, reason));
        }
        Ok(serde_json::from_value(value)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    struct CountingBackend {
        injections: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl OcrBackend for CountingBackend {
        async fn inject(&self) -> AppResult<()> {
            self.injections.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(AppError::capability_load_failed("script onerror"))
            } else {
                Ok(())
            }
        }

        async fn recognize(&self, _image_src: &str, language: &str) -> AppResult<Recognition> {
            Ok(Recognition::from_text(format!(" lang={} ", language)))
        }
    }

    fn loader(fail: bool) -> (Arc<CountingBackend>, CapabilityLoader) {
        let backend = Arc::new(CountingBackend {
            injections: AtomicUsize::new(0),
            fail,
        });
        let loader = CapabilityLoader::new(backend.clone());
        (backend, loader)
    }

    #[tokio::test]
    async fn test_load_injects_once() {
        let (backend, loader) = loader(false);
        let handle = loader.load().await.unwrap();
        loader.load().await.unwrap();

        assert_eq!(backend.injections.load(Ordering::SeqCst), 1);
        assert_eq!(handle.recognize("img").await.unwrap(), " lang=eng ");
    }

    #[tokio::test]
    async fn test_failed_load_is_remembered() {
        let (backend, loader) = loader(true);
        assert!(loader.load().await.is_err());
        assert!(loader.load().await.is_err());
        assert_eq!(backend.injections.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_recognition_shape() {
        let value = serde_json::json!({ "data": { "text": "hello\n" } });
        let recognition: Recognition = serde_json::from_value(value).unwrap();
        assert_eq!(recognition.data.text, "hello\n");
    }

    #[test]
    fn test_page_scripts_return_immediately() {
        let start = recognize_start_js(7, "https://x/a.png", OCR_LANGUAGE).unwrap();
        assert!(!start.contains("await"));
        assert!(start.contains("jobs[7] = null"));
        assert!(start.contains("\"https://x/a.png\""));

        let inject = inject_start_js("https://cdn/tesseract.min.js").unwrap();
        assert!(!inject.contains("await"));
        assert!(!INJECT_POLL_JS.contains("await"));
        assert!(!recognize_poll_js(7).contains("await"));
    }

    #[test]
    fn test_image_src_is_escaped() {
        let start = recognize_start_js(0, "x\"); alert(1); (\"", "eng").unwrap();
        assert!(start.contains(r#""x\"); alert(1); (\"""#));
    }
}
