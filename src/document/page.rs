//! 浏览器页面文档
//!
//! 通过 [`JsExecutor`] 读取快照、追加标注块。

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::document::DocumentSurface;
use crate::error::{AppResult, DocumentError};
use crate::infrastructure::JsExecutor;
use crate::models::{AnnotationBlock, Element, FlatNode, UnitId};

/// 只收集 listitem 及其后代，按先序输出扁平列表
const SNAPSHOT_JS: &str = r#"
(() => {
    const nodes = [];
    const stack = [{ node: document.body, parent: null, inside: false }];
    while (stack.length > 0) {
        const { node, parent, inside } = stack.pop();
        if (node.nodeType === Node.TEXT_NODE) {
            if (inside) nodes.push({ type: 'text', parent, text: node.textContent });
            continue;
        }
        if (node.nodeType !== Node.ELEMENT_NODE) continue;
        const tag = node.tagName.toLowerCase();
        if (tag === 'script' || tag === 'style' || tag === 'noscript') continue;

        const role = node.getAttribute('role');
        let index = parent;
        let within = inside;
        if (inside || role === 'listitem') {
            nodes.push({
                type: 'element',
                parent,
                tag,
                role,
                src: tag === 'img' ? (node.src || null) : null,
            });
            index = nodes.length - 1;
            within = true;
        }
        const children = node.childNodes;
        for (let i = children.length - 1; i >= 0; i--) {
            stack.push({ node: children[i], parent: index, inside: within });
        }
    }
    return nodes;
})()
"#;

const READY_JS: &str = "document.readyState !== 'loading'";

/// 真实浏览器页面
pub struct PageDocument {
    executor: JsExecutor,
}

impl PageDocument {
    pub fn new(executor: JsExecutor) -> Self {
        Self { executor }
    }

    /// 等待 DOMContentLoaded（readyState 离开 loading）
    pub async fn wait_until_ready(&self, poll: Duration, timeout: Duration) -> AppResult<()> {
        info!("⏳ 等待页面就绪...");
        self.executor.wait_until(READY_JS, poll, timeout).await?;
        info!("✓ 页面已就绪");
        Ok(())
    }
}

#[async_trait]
impl DocumentSurface for PageDocument {
    async fn snapshot(&self) -> AppResult<Element> {
        let nodes: Vec<FlatNode> = self.executor.eval_as(SNAPSHOT_JS).await?;
        let count = nodes.len();
        let root = Element::from_flat(nodes)?;
        debug!("页面快照完成，共 {} 个节点，顶层题目节点 {} 个", count, root.children.len());
        Ok(root)
    }

    async fn append_block(&self, unit: UnitId, block: &AnnotationBlock) -> AppResult<()> {
        let js_code = format!(
            r#"
            (() => {{
                const unit = document.querySelectorAll("[role='listitem']")[{}];
                if (!unit) return false;
                const node = document.createElement('div');
                node.textContent = {};
                node.style.cssText = {};
                unit.appendChild(node);
                return true;
            }})()
            "#,
            unit.0,
            serde_json::to_string(&block.text)?,
            serde_json::to_string(block.style())?,
        );

        let appended: bool = self.executor.eval_as(js_code).await?;
        if appended {
            Ok(())
        } else {
            Err(DocumentError::UnitMissing { index: unit.0 }.into())
        }
    }
}
