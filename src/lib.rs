//! # Forms Answer
//!
//! 在已渲染的答题页面中找出题目（文字或图片），向答案服务查询答案，
//! 并把答案标注回页面
//!
//! ## 架构设计
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - `JsExecutor`，唯一的 page owner，提供 eval() 能力
//! - `document/` - `DocumentSurface`：页面快照 + 追加标注（浏览器 / 内存两种实现）
//!
//! ### ② 业务能力层（Services）
//! - `locator` - 找出题目节点、题干、选项、图片
//! - `normalizer` - 生成发给答案服务的问题字符串
//! - `resolver` - 答案服务客户端
//! - `ocr` - OCR 能力加载与识别
//! - `annotator` - 追加标注块
//!
//! ### ③ 流程层（Workflow）
//! - `QuestionFlow` - 单个题目的完整流程
//!
//! ### ④ 编排层（Orchestration）
//! - `Pipeline` - OCR 加载 + 文本 / 图片两组独立任务
//! - `App` - 浏览器连接、页面就绪、最终统计

pub mod browser;
pub mod config;
pub mod document;
pub mod error;
pub mod infrastructure;
pub mod logger;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::Config;
pub use document::{DocumentSurface, MemoryDocument, PageDocument};
pub use error::{AppError, AppResult};
pub use infrastructure::JsExecutor;
pub use models::{AnnotationBlock, AnswerResult, BlockKind, ImageCandidate, QuestionUnit, UnitId};
pub use orchestrator::{App, GroupStats, Pipeline, PipelineState, RunReport};
pub use workflow::{ProcessResult, QuestionCtx, QuestionFlow};
