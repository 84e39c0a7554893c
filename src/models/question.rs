//! 题目相关数据结构

use std::fmt;

/// 题目节点在文档中的编号
///
/// 即 `querySelectorAll("[role='listitem']")` 中的下标。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UnitId(pub usize);

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 文本模式下定位到的一道题
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionUnit {
    pub id: UnitId,
    /// heading 的文本（已 trim，可能为空）
    pub label: String,
    /// 已格式化的选项，如 `1) Paris`
    pub options: Vec<String>,
}

/// 图片模式下的候选图片
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageCandidate {
    pub src: String,
    /// 最近的 listitem 祖先
    pub unit: UnitId,
}

/// 答案服务返回的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerResult {
    pub text: String,
    /// 服务是否真的给出了答案
    pub found: bool,
}

impl AnswerResult {
    pub const FALLBACK: &'static str = "No answer found";

    pub fn found(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            found: true,
        }
    }

    pub fn fallback() -> Self {
        Self {
            text: Self::FALLBACK.to_string(),
            found: false,
        }
    }
}

/// 标注块类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    /// OCR 提取出的文字（仅图片模式）
    ExtractedText,
    /// 答案
    Answer,
}

const ANSWER_STYLE: &str = "margin-top: 8px; font-size: 14px; color: #1b5e20; \
background: #e8f5e9; border: 1px solid #4caf50; padding: 6px; border-radius: 4px;";

const EXTRACTED_TEXT_STYLE: &str = "margin-top: 8px; font-size: 12px; color: #333; \
background: #f9f9f9; border: 1px solid #ddd; padding: 6px; border-radius: 4px;";

impl BlockKind {
    pub fn prefix(self) -> &'static str {
        match self {
            BlockKind::ExtractedText => "Extracted Text: ",
            BlockKind::Answer => "Answer: ",
        }
    }

    pub fn style(self) -> &'static str {
        match self {
            BlockKind::ExtractedText => EXTRACTED_TEXT_STYLE,
            BlockKind::Answer => ANSWER_STYLE,
        }
    }
}

/// 追加到题目节点下的标注块
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotationBlock {
    pub kind: BlockKind,
    /// 完整文本（含前缀）
    pub text: String,
}

impl AnnotationBlock {
    pub fn new(kind: BlockKind, body: &str) -> Self {
        Self {
            kind,
            text: format!("{}{}", kind.prefix(), body),
        }
    }

    pub fn style(&self) -> &'static str {
        self.kind.style()
    }
}
