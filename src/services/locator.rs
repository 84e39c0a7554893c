//! 题目定位 - 业务能力层
//!
//! 在文档快照中找出题目节点及其题干 / 选项 / 图片

use std::collections::HashSet;

use tracing::debug;

use crate::models::dom::{ROLE_HEADING, ROLE_LIST_ITEM, ROLE_RADIO_GROUP};
use crate::models::{DomNode, Element, ImageCandidate, QuestionUnit, UnitId};

/// 选项缺少 span 时的占位文本
pub const MISSING_OPTION: &str = "Option not found";

/// 文本模式：按文档顺序返回所有题目节点
///
/// 题干和选项都为空的节点同样返回，由归一化阶段决定是否跳过。
pub fn locate_all(root: &Element) -> Vec<QuestionUnit> {
    let units: Vec<QuestionUnit> = list_items(root)
        .into_iter()
        .enumerate()
        .map(|(index, el)| QuestionUnit {
            id: UnitId(index),
            label: extract_label(el),
            options: extract_options(el),
        })
        .collect();

    debug!("定位到 {} 个题目节点", units.len());
    units
}

/// 图片模式：每个题目节点取一张代表图片
///
/// 图片归属于最近的 listitem 祖先；同一节点有多张图片时只保留先序遍历中的第一张，
/// 保证每个节点最多收到一个识别文本块和一个答案块。
pub fn locate_image_units(root: &Element) -> Vec<ImageCandidate> {
    let mut all = Vec::new();
    let mut counter = 0;
    walk_images(root, None, &mut counter, &mut all);

    let mut seen = HashSet::new();
    let total = all.len();
    let found: Vec<ImageCandidate> = all
        .into_iter()
        .filter(|candidate| seen.insert(candidate.unit))
        .collect();
    debug!("定位到 {} 张题目图片，{} 个题目节点含图片", total, found.len());
    found
}

fn list_items(root: &Element) -> Vec<&Element> {
    root.find_descendants(&|el| el.has_role(ROLE_LIST_ITEM))
}

fn extract_label(unit: &Element) -> String {
    unit.find_descendant(&|el| el.has_role(ROLE_HEADING))
        .map(|heading| heading.inner_text().trim().to_string())
        .unwrap_or_default()
}

fn extract_options(unit: &Element) -> Vec<String> {
    let Some(group) = unit.find_descendant(&|el| el.has_role(ROLE_RADIO_GROUP)) else {
        return Vec::new();
    };

    group
        .find_descendants(&|el| el.tag == "label")
        .into_iter()
        .enumerate()
        .map(|(index, label)| {
            let text = label
                .find_descendant(&|el| el.tag == "span")
                .map(|span| span.inner_text().trim().to_string())
                .unwrap_or_else(|| MISSING_OPTION.to_string());
            format!("{}) {}", index + 1, text)
        })
        .collect()
}

/// `nearest` 为当前最近的 listitem 编号，`counter` 为已遇到的 listitem 数
fn walk_images(
    el: &Element,
    nearest: Option<UnitId>,
    counter: &mut usize,
    found: &mut Vec<ImageCandidate>,
) {
    for child in &el.children {
        let DomNode::Element(inner) = child else {
            continue;
        };

        let mut scope = nearest;
        if inner.has_role(ROLE_LIST_ITEM) {
            scope = Some(UnitId(*counter));
            *counter += 1;
        }

        if inner.tag == "img" {
            match (scope, inner.src.as_deref()) {
                (Some(unit), Some(src)) if !src.is_empty() => found.push(ImageCandidate {
                    src: src.to_string(),
                    unit,
                }),
                (Some(unit), _) => debug!("题目 #{} 中的图片没有 src，跳过", unit),
                (None, _) => {}
            }
        }

        walk_images(inner, scope, counter, found);
    }
}
