use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 浏览器相关错误
    #[error("浏览器错误: {0}")]
    Browser(#[from] BrowserError),
    /// OCR 能力加载 / 识别错误
    #[error("OCR错误: {0}")]
    Capability(#[from] CapabilityError),
    /// 答案服务错误
    #[error("答案服务错误: {0}")]
    Resolver(#[from] ResolverError),
    /// 文档读写错误
    #[error("文档错误: {0}")]
    Document(#[from] DocumentError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
}

/// 浏览器相关错误
#[derive(Debug, Error)]
pub enum BrowserError {
    /// 执行脚本失败
    #[error("执行脚本失败: {source}")]
    ScriptExecutionFailed {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 脚本返回值无法解析
    #[error("脚本返回值解析失败: {source}")]
    ResultParseFailed {
        #[source]
        source: serde_json::Error,
    },
    /// 等待页面就绪超时
    #[error("等待页面就绪超时 ({waited_secs} 秒)")]
    ReadyTimeout { waited_secs: u64 },
}

/// OCR 能力错误
#[derive(Debug, Error)]
pub enum CapabilityError {
    /// 注入 OCR 脚本失败
    #[error("OCR 能力加载失败: {reason}")]
    LoadFailed { reason: String },
    /// 单张图片识别失败
    #[error("图片识别失败 ({image_src}): {reason}")]
    RecognizeFailed { image_src: String, reason: String },
}

/// 答案服务错误
#[derive(Debug, Error)]
pub enum ResolverError {
    /// 网络请求失败
    #[error("请求失败 ({endpoint}): {source}")]
    RequestFailed {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    /// 服务返回非成功状态码
    #[error("服务返回错误状态 ({endpoint}): {status}")]
    BadStatus { endpoint: String, status: u16 },
    /// 响应体不是合法 JSON
    #[error("响应解析失败 ({endpoint}): {source}")]
    BodyParseFailed {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    /// 响应体是合法 JSON 但不是对象
    #[error("答案服务 {endpoint} 返回的不是 JSON 对象: {body}")]
    UnexpectedBody { endpoint: String, body: String },
}

/// 文档读写错误
#[derive(Debug, Error)]
pub enum DocumentError {
    /// 题目节点已不存在
    #[error("题目节点 #{index} 不存在")]
    UnitMissing { index: usize },

    /// 扁平快照中的父节点下标无效
    #[error("快照第 {index} 项的父节点无效")]
    MalformedSnapshot { index: usize },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 环境变量解析失败
    #[error("环境变量 {var_name} 解析失败: 值 '{value}' 无法转换为 {expected_type}")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: String,
    },
    /// 配置文件读取失败
    #[error("读取配置文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// TOML 解析失败
    #[error("TOML解析失败 ({path}): {source}")]
    TomlParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

// ========== 从常见错误类型转换 ==========

impl From<chromiumoxide::error::CdpError> for AppError {
    fn from(err: chromiumoxide::error::CdpError) -> Self {
        AppError::Browser(BrowserError::ScriptExecutionFailed {
            source: Box::new(err),
        })
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Browser(BrowserError::ResultParseFailed { source: err })
    }
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建 OCR 加载失败错误
    pub fn capability_load_failed(reason: impl Into<String>) -> Self {
        AppError::Capability(CapabilityError::LoadFailed {
            reason: reason.into(),
        })
    }

    /// 创建图片识别失败错误
    pub fn recognize_failed(image_src: impl Into<String>, reason: impl Into<String>) -> Self {
        AppError::Capability(CapabilityError::RecognizeFailed {
            image_src: image_src.into(),
            reason: reason.into(),
        })
    }

    /// 题目节点缺失属于"跳过"而不是失败
    pub fn is_missing_unit(&self) -> bool {
        matches!(self, AppError::Document(DocumentError::UnitMissing { .. }))
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
