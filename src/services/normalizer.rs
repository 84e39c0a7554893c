//! 题目归一化 - 业务能力层
//!
//! 把题干 + 选项（或 OCR 文本）转换成发给答案服务的问题字符串

use crate::models::QuestionUnit;

/// 选择题提示语
pub const MCQ_PHRASE: &str = "Choose from one of these MCQ Options: ";

/// 文本模式
///
/// - 有选项：`label + " " + MCQ_PHRASE + options.join(", ")`
/// - 无选项：`label`
/// - 题干为空且无选项：None
pub fn normalize_text(label: &str, options: &[String]) -> Option<String> {
    if options.is_empty() {
        let label = label.trim();
        return (!label.is_empty()).then(|| label.to_string());
    }
    Some(format!("{} {}{}", label, MCQ_PHRASE, options.join(", ")))
}

pub fn normalize_unit(unit: &QuestionUnit) -> Option<String> {
    normalize_text(&unit.label, &unit.options)
}

/// 图片模式：trim 后为空则不产生问题
pub fn normalize_ocr(ocr_text: &str) -> Option<String> {
    let text = ocr_text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opts(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_label_only() {
        assert_eq!(
            normalize_text("What is 2 + 2?", &[]).as_deref(),
            Some("What is 2 + 2?")
        );
    }

    #[test]
    fn test_mcq_query() {
        let query = normalize_text("Capital of France?", &opts(&["1) Paris", "2) London"]));
        assert_eq!(
            query.as_deref(),
            Some("Capital of France? Choose from one of these MCQ Options: 1) Paris, 2) London")
        );
    }

    #[test]
    fn test_option_count_matches() {
        let options = opts(&["1) a", "2) b", "3) Option not found", "4) d"]);
        let query = normalize_text("Pick", &options).unwrap();
        let list = query.split(MCQ_PHRASE).nth(1).unwrap();
        let entries: Vec<&str> = list.split(", ").collect();

        assert_eq!(entries.len(), 4);
        for (i, entry) in entries.iter().enumerate() {
            assert!(entry.starts_with(&format!("{}) ", i + 1)));
        }
    }

    #[test]
    fn test_empty_label_without_options_is_skipped() {
        assert_eq!(normalize_text("", &[]), None);
        assert_eq!(normalize_text("   ", &[]), None);
    }

    #[test]
    fn test_empty_label_with_options_still_queries() {
        let query = normalize_text("", &opts(&["1) x"])).unwrap();
        assert_eq!(query, " Choose from one of these MCQ Options: 1) x");
    }

    #[test]
    fn test_ocr_is_trimmed() {
        assert_eq!(normalize_ocr("  2+2=?\n").as_deref(), Some("2+2=?"));
        assert_eq!(normalize_ocr(" \n\t "), None);
    }
}
