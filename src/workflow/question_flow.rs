//! 题目处理流程 - 流程层
//!
//! 核心职责：定义"一道题"的完整处理流程
//!
//! 文本题：定位结果 → 归一化 → 答案服务 → 写入答案
//! 图片题：OCR → 归一化 → 答案服务 → 写入识别文本 → 写入答案

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::error::AppResult;
use crate::models::{AnswerResult, ImageCandidate, QuestionUnit};
use crate::services::{normalize_ocr, normalize_unit, AnswerResolver, Annotator, OcrHandle};
use crate::utils::logging::truncate_text;
use crate::workflow::question_ctx::QuestionCtx;

/// 题目处理结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessResult {
    /// 已写入标注
    Annotated,
    /// 跳过（没有可提问的内容，或节点已消失）
    Skipped,
}

/// 题目处理流程
///
/// - 不持有页面，只依赖业务能力
/// - 每个题目在独立任务里运行，可以廉价 clone
#[derive(Clone)]
pub struct QuestionFlow {
    resolver: Arc<dyn AnswerResolver>,
    annotator: Annotator,
}

impl QuestionFlow {
    pub fn new(resolver: Arc<dyn AnswerResolver>, annotator: Annotator) -> Self {
        Self {
            resolver,
            annotator,
        }
    }

    /// 处理一道文本题
    pub async fn run_text(&self, unit: &QuestionUnit, ctx: &QuestionCtx) -> AppResult<ProcessResult> {
        let Some(query) = normalize_unit(unit) else {
            debug!("{} 没有题干和选项，跳过", ctx);
            return Ok(ProcessResult::Skipped);
        };
        info!("{} 🔍 提问: {}", ctx, truncate_text(&query, 80));

        let answer = self.resolver.resolve(&query).await?;
        log_answer(ctx, &answer);

        self.finish(ctx, self.annotator.annotate_answer(ctx.unit, &answer.text).await)
    }

    /// 处理一张题目图片
    pub async fn run_image(
        &self,
        ocr: &OcrHandle,
        candidate: &ImageCandidate,
        ctx: &QuestionCtx,
    ) -> AppResult<ProcessResult> {
        debug!("{} 🖼️ 识别图片: {}", ctx, candidate.src);
        let raw = ocr.recognize(&candidate.src).await?;

        let Some(ocr_text) = normalize_ocr(&raw) else {
            debug!("{} OCR 结果为空，跳过", ctx);
            return Ok(ProcessResult::Skipped);
        };
        info!("{} 📝 识别文本: {}", ctx, truncate_text(&ocr_text, 80));

        let answer = self.resolver.resolve(&ocr_text).await?;
        log_answer(ctx, &answer);

        if let Err(e) = self
            .annotator
            .annotate_extracted_text(candidate.unit, &ocr_text)
            .await
        {
            return self.finish(ctx, Err(e));
        }
        self.finish(
            ctx,
            self.annotator.annotate_answer(candidate.unit, &answer.text).await,
        )
    }

    /// 节点消失视为跳过，其余错误交给调用方记录
    fn finish(&self, ctx: &QuestionCtx, appended: AppResult<()>) -> AppResult<ProcessResult> {
        match appended {
            Ok(()) => Ok(ProcessResult::Annotated),
            Err(e) if e.is_missing_unit() => {
                debug!("{} {}，跳过", ctx, e);
                Ok(ProcessResult::Skipped)
            }
            Err(e) => Err(e),
        }
    }
}

fn log_answer(ctx: &QuestionCtx, answer: &AnswerResult) {
    if answer.found {
        info!("{} ✓ 答案: {}", ctx, truncate_text(&answer.text, 80));
    } else {
        warn!("{} ⚠️ 答案服务没有给出答案，写入: {}", ctx, answer.text);
    }
}
