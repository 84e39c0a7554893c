pub mod question_ctx;
pub mod question_flow;

pub use question_ctx::{PipelineMode, QuestionCtx};
pub use question_flow::{ProcessResult, QuestionFlow};
