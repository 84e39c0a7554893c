//! 流水线编排 - 编排层
//!
//! ## 状态
//!
//! `Idle → LoadingOcr → Ready → Done`
//!
//! ## 并发模型
//!
//! - 文本流水线不依赖 OCR，快照后立即为每个题目派生独立任务
//! - OCR 加载与文本任务同时进行，成功后才派生图片任务
//! - 每个任务自行捕获并记录错误，互不影响
//! - 标注在各自任务完成时立即写入，最后的汇总只用于统计

use std::sync::Arc;

use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use crate::document::DocumentSurface;
use crate::services::{locate_all, locate_image_units, AnswerResolver, Annotator, CapabilityLoader, OcrHandle};
use crate::workflow::{PipelineMode, ProcessResult, QuestionCtx, QuestionFlow};

/// 流水线状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    LoadingOcr,
    Ready,
    Done,
}

/// 单个题目任务的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Annotated,
    Skipped,
    Failed,
}

impl From<ProcessResult> for Outcome {
    fn from(result: ProcessResult) -> Self {
        match result {
            ProcessResult::Annotated => Outcome::Annotated,
            ProcessResult::Skipped => Outcome::Skipped,
        }
    }
}

/// 一条流水线的统计
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct GroupStats {
    pub located: usize,
    pub annotated: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl GroupStats {
    fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Annotated => self.annotated += 1,
            Outcome::Skipped => self.skipped += 1,
            Outcome::Failed => self.failed += 1,
        }
    }
}

/// 一次完整运行的汇总
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunReport {
    pub text: GroupStats,
    /// OCR 加载失败时为 None
    pub image: Option<GroupStats>,
    pub ocr_loaded: bool,
}

/// 已派生但尚未汇总的一组任务
struct TaskGroup {
    mode: PipelineMode,
    located: usize,
    tasks: JoinSet<Outcome>,
}

impl TaskGroup {
    fn empty(mode: PipelineMode) -> Self {
        Self {
            mode,
            located: 0,
            tasks: JoinSet::new(),
        }
    }

    async fn join(mut self) -> GroupStats {
        let mut stats = GroupStats {
            located: self.located,
            ..Default::default()
        };
        while let Some(joined) = self.tasks.join_next().await {
            match joined {
                Ok(outcome) => stats.record(outcome),
                Err(e) => {
                    error!("[{}] 任务执行失败: {}", self.mode, e);
                    stats.record(Outcome::Failed);
                }
            }
        }
        stats
    }
}

/// 页面流水线
///
/// `run` 消耗自身，同一个流水线只能运行一次。
pub struct Pipeline {
    surface: Arc<dyn DocumentSurface>,
    flow: QuestionFlow,
    loader: CapabilityLoader,
    state: PipelineState,
}

impl Pipeline {
    pub fn new(
        surface: Arc<dyn DocumentSurface>,
        resolver: Arc<dyn AnswerResolver>,
        loader: CapabilityLoader,
    ) -> Self {
        let annotator = Annotator::new(Arc::clone(&surface));
        Self {
            surface,
            flow: QuestionFlow::new(resolver, annotator),
            loader,
            state: PipelineState::Idle,
        }
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// 运行两条流水线，等待所有题目任务结束后返回统计
    pub async fn run(mut self) -> RunReport {
        self.enter(PipelineState::LoadingOcr);
        let text_group = self.spawn_text_group().await;

        let ocr = self.loader.load().await;
        self.enter(PipelineState::Ready);

        let image_group = match ocr {
            Ok(handle) => Some(self.spawn_image_group(handle).await),
            Err(e) => {
                warn!("⚠️ 跳过图片题: {}", e);
                None
            }
        };

        let text = text_group.join().await;
        let image = match image_group {
            Some(group) => Some(group.join().await),
            None => None,
        };

        self.enter(PipelineState::Done);
        RunReport {
            text,
            ocr_loaded: image.is_some(),
            image,
        }
    }

    fn enter(&mut self, next: PipelineState) {
        debug!("流水线状态: {:?} → {:?}", self.state, next);
        self.state = next;
    }

    async fn spawn_text_group(&self) -> TaskGroup {
        let mut group = TaskGroup::empty(PipelineMode::Text);
        let root = match self.surface.snapshot().await {
            Ok(root) => root,
            Err(e) => {
                error!("❌ 读取文档失败，文本题未处理: {}", e);
                return group;
            }
        };

        let units = locate_all(&root);
        info!("📋 文本题: 找到 {} 个题目节点", units.len());
        group.located = units.len();

        for (index, unit) in units.into_iter().enumerate() {
            let ctx = QuestionCtx::new(PipelineMode::Text, unit.id, index + 1);
            let flow = self.flow.clone();
            group.tasks.spawn(async move {
                match flow.run_text(&unit, &ctx).await {
                    Ok(result) => result.into(),
                    Err(e) => {
                        error!("{} ❌ 处理失败: {}", ctx, e);
                        Outcome::Failed
                    }
                }
            });
        }
        group
    }

    async fn spawn_image_group(&self, ocr: OcrHandle) -> TaskGroup {
        let mut group = TaskGroup::empty(PipelineMode::Image);
        let root = match self.surface.snapshot().await {
            Ok(root) => root,
            Err(e) => {
                error!("❌ 读取文档失败，图片题未处理: {}", e);
                return group;
            }
        };

        let candidates = locate_image_units(&root);
        info!("🖼️ 图片题: 找到 {} 张图片", candidates.len());
        group.located = candidates.len();

        for (index, candidate) in candidates.into_iter().enumerate() {
            let ctx = QuestionCtx::new(PipelineMode::Image, candidate.unit, index + 1);
            let flow = self.flow.clone();
            let ocr = ocr.clone();
            group.tasks.spawn(async move {
                match flow.run_image(&ocr, &candidate, &ctx).await {
                    Ok(result) => result.into(),
                    Err(e) => {
                        error!("{} ❌ 处理失败: {}", ctx, e);
                        Outcome::Failed
                    }
                }
            });
        }
        group
    }
}
