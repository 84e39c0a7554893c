//! 题目处理上下文
//!
//! 封装"我正在处理哪条流水线的哪个题目节点"这一信息

use std::fmt::Display;

use crate::models::UnitId;

/// 流水线类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineMode {
    Text,
    Image,
}

impl Display for PipelineMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PipelineMode::Text => write!(f, "文本题"),
            PipelineMode::Image => write!(f, "图片题"),
        }
    }
}

/// 题目处理上下文
#[derive(Debug, Clone)]
pub struct QuestionCtx {
    pub mode: PipelineMode,
    /// 目标题目节点
    pub unit: UnitId,
    /// 本条流水线中的序号（从1开始，仅用于日志）
    pub seq: usize,
}

impl QuestionCtx {
    pub fn new(mode: PipelineMode, unit: UnitId, seq: usize) -> Self {
        Self { mode, unit, seq }
    }
}

impl Display for QuestionCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{} {} 节点#{}]", self.mode, self.seq, self.unit)
    }
}
