use std::sync::Mutex;

use async_trait::async_trait;

use crate::document::DocumentSurface;
use crate::error::{AppResult, DocumentError};
use crate::models::dom::ROLE_LIST_ITEM;
use crate::models::{AnnotationBlock, DomNode, Element, UnitId};

/// 内存文档
///
/// 标注块会真实地插入树中，同时按追加顺序记录一份日志。
pub struct MemoryDocument {
    root: Mutex<Element>,
    appended: Mutex<Vec<(UnitId, AnnotationBlock)>>,
}

impl MemoryDocument {
    pub fn new(root: Element) -> Self {
        Self {
            root: Mutex::new(root),
            appended: Mutex::new(Vec::new()),
        }
    }

    /// 按追加顺序返回所有标注块
    pub fn appended(&self) -> Vec<(UnitId, AnnotationBlock)> {
        lock(&self.appended).clone()
    }

    /// 某个题目节点收到的标注块
    pub fn blocks_for(&self, unit: UnitId) -> Vec<AnnotationBlock> {
        lock(&self.appended)
            .iter()
            .filter(|(id, _)| *id == unit)
            .map(|(_, block)| block.clone())
            .collect()
    }

    pub fn tree(&self) -> Element {
        lock(&self.root).clone()
    }
}

// 锁中毒只可能来自测试中的 panic，直接取回内部数据
fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[async_trait]
impl DocumentSurface for MemoryDocument {
    async fn snapshot(&self) -> AppResult<Element> {
        Ok(self.tree())
    }

    async fn append_block(&self, unit: UnitId, block: &AnnotationBlock) -> AppResult<()> {
        let mut root = lock(&self.root);
        let mut seen = 0;
        let target = nth_list_item(&mut root, unit.0, &mut seen)
            .ok_or(DocumentError::UnitMissing { index: unit.0 })?;

        let mut node = Element::new("div").with_text(block.text.clone());
        node.style = Some(block.style().to_string());
        target.children.push(DomNode::Element(node));

        lock(&self.appended).push((unit, block.clone()));
        Ok(())
    }
}

fn nth_list_item<'a>(el: &'a mut Element, n: usize, seen: &mut usize) -> Option<&'a mut Element> {
    for child in el.children.iter_mut() {
        if let DomNode::Element(inner) = child {
            if inner.has_role(ROLE_LIST_ITEM) {
                if *seen == n {
                    return Some(inner);
                }
                *seen += 1;
            }
            if let Some(found) = nth_list_item(inner, n, seen) {
                return Some(found);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BlockKind;

    fn two_units() -> Element {
        Element::new("body")
            .with_child(Element::new("div").with_role("listitem").with_text("Q1"))
            .with_child(
                Element::new("div")
                    .with_role("list")
                    .with_child(Element::new("div").with_role("listitem").with_text("Q2")),
            )
    }

    #[tokio::test]
    async fn test_append_goes_to_nth_unit() {
        let doc = MemoryDocument::new(two_units());
        let block = AnnotationBlock::new(BlockKind::Answer, "B");
        doc.append_block(UnitId(1), &block).await.unwrap();

        let tree = doc.tree();
        let units = tree.find_descendants(&|el| el.has_role("listitem"));
        assert_eq!(units[0].children.len(), 1);
        assert_eq!(units[1].inner_text(), "Q2Answer: B");
        assert_eq!(doc.blocks_for(UnitId(1)), vec![block]);
    }

    #[tokio::test]
    async fn test_missing_unit_is_reported() {
        let doc = MemoryDocument::new(two_units());
        let block = AnnotationBlock::new(BlockKind::Answer, "B");
        let err = doc.append_block(UnitId(5), &block).await.unwrap_err();
        assert!(err.is_missing_unit());
        assert!(doc.appended().is_empty());
    }
}
