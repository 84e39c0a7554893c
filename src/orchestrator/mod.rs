//! 编排层（Orchestration Layer）
//!
//! ## 模块划分
//!
//! ### `app` - 应用入口
//! - 管理浏览器资源（Browser、JsExecutor）
//! - 等待页面就绪后触发流水线
//! - 输出全局统计信息
//!
//! ### `pipeline` - 页面流水线
//! - 加载 OCR 能力
//! - 为每个题目派生独立任务（文本题 / 图片题）
//! - 汇总任务结果
//!
//! ## 层次关系
//!
//! ```text
//! app (浏览器 + 页面)
//!     ↓
//! pipeline (Vec<QuestionUnit> / Vec<ImageCandidate>)
//!     ↓
//! workflow::QuestionFlow (处理单个题目)
//!     ↓
//! services (能力层：locate / normalize / resolve / ocr / annotate)
//!     ↓
//! document + infrastructure (DocumentSurface / JsExecutor)
//! ```

pub mod app;
pub mod pipeline;

pub use app::App;
pub use pipeline::{GroupStats, Pipeline, PipelineState, RunReport};
