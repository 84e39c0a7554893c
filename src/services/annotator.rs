//! 标注写入 - 业务能力层
//!
//! 只往题目节点末尾追加新节点，不修改、不删除已有内容

use std::sync::Arc;

use tracing::debug;

use crate::document::DocumentSurface;
use crate::error::AppResult;
use crate::models::{AnnotationBlock, BlockKind, UnitId};

#[derive(Clone)]
pub struct Annotator {
    surface: Arc<dyn DocumentSurface>,
}

impl Annotator {
    pub fn new(surface: Arc<dyn DocumentSurface>) -> Self {
        Self { surface }
    }

    /// 追加 `Answer: ...`
    pub async fn annotate_answer(&self, unit: UnitId, answer_text: &str) -> AppResult<()> {
        self.append(unit, AnnotationBlock::new(BlockKind::Answer, answer_text))
            .await
    }

    /// 追加 `Extracted Text: ...`（图片模式，先于答案块）
    pub async fn annotate_extracted_text(&self, unit: UnitId, ocr_text: &str) -> AppResult<()> {
        self.append(unit, AnnotationBlock::new(BlockKind::ExtractedText, ocr_text))
            .await
    }

    async fn append(&self, unit: UnitId, block: AnnotationBlock) -> AppResult<()> {
        debug!("题目 #{} 追加标注: {:?}", unit, block.kind);
        self.surface.append_block(unit, &block).await
    }
}
