//! 文档访问层
//!
//! 流水线只通过 [`DocumentSurface`] 读写文档：
//! - `PageDocument`：真实浏览器页面（CDP）
//! - `MemoryDocument`：内存中的文档树，用于离线运行与测试

pub mod memory;
pub mod page;

use async_trait::async_trait;

use crate::error::AppResult;
use crate::models::{AnnotationBlock, Element, UnitId};

pub use memory::MemoryDocument;
pub use page::PageDocument;

/// 可被读取快照、可被追加标注的文档
#[async_trait]
pub trait DocumentSurface: Send + Sync {
    /// 当前文档树（body）的快照
    async fn snapshot(&self) -> AppResult<Element>;

    /// 在第 `unit` 个题目节点末尾追加一个标注块
    ///
    /// 节点不存在时返回 `DocumentError::UnitMissing`。
    async fn append_block(&self, unit: UnitId, block: &AnnotationBlock) -> AppResult<()>;
}
