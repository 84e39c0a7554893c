//! 答案服务客户端 - 业务能力层
//!
//! 只负责"问题 → 答案"这一次请求，不重试、不缓存

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value as JsonValue;
use tracing::debug;

use crate::config::Config;
use crate::error::{AppResult, ResolverError};
use crate::models::AnswerResult;

/// 答案解析能力
#[async_trait]
pub trait AnswerResolver: Send + Sync {
    async fn resolve(&self, query: &str) -> AppResult<AnswerResult>;
}

#[derive(Serialize)]
struct AnswerRequest<'a> {
    question: &'a str,
}

/// 基于 HTTP 的答案服务客户端
///
/// `POST {endpoint}`，请求体 `{"question": ...}`，成功响应体 `{"answer": ...}`。
#[derive(Clone)]
pub struct HttpAnswerResolver {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpAnswerResolver {
    pub fn new(config: &Config) -> Self {
        Self::with_endpoint(config.resolver_endpoint.clone())
    }

    pub fn with_endpoint(endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl AnswerResolver for HttpAnswerResolver {
    async fn resolve(&self, query: &str) -> AppResult<AnswerResult> {
        debug!("请求答案服务: {} ({} 字符)", self.endpoint, query.chars().count());

        // reqwest 的 .json() 会自动设置 Content-Type: application/json
        let response = self
            .client
            .post(&self.endpoint)
            .json(&AnswerRequest { question: query })
            .send()
            .await
            .map_err(|source| ResolverError::RequestFailed {
                endpoint: self.endpoint.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ResolverError::BadStatus {
                endpoint: self.endpoint.clone(),
                status: status.as_u16(),
            }
            .into());
        }

        let body: JsonValue =
            response
                .json()
                .await
                .map_err(|source| ResolverError::BodyParseFailed {
                    endpoint: self.endpoint.clone(),
                    source,
                })?;

        extract_answer(&body).ok_or_else(|| {
            ResolverError::UnexpectedBody {
                endpoint: self.endpoint.clone(),
                body: body.to_string(),
            }
            .into()
        })
    }
}

/// 取出 `answer` 字段；缺失或为假值（null / "" / false / 0）时回退
///
/// 响应体不是 JSON 对象时返回 None，该题不写入任何标注。
pub fn extract_answer(body: &JsonValue) -> Option<AnswerResult> {
    if !body.is_object() {
        return None;
    }
    let answer = match body.get("answer") {
        None | Some(JsonValue::Null) | Some(JsonValue::Bool(false)) => AnswerResult::fallback(),
        Some(JsonValue::String(s)) if s.is_empty() => AnswerResult::fallback(),
        Some(JsonValue::String(s)) => AnswerResult::found(s.clone()),
        Some(JsonValue::Number(n)) if n.as_f64() == Some(0.0) => AnswerResult::fallback(),
        Some(other) => AnswerResult::found(other.to_string()),
    };
    Some(answer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_string_answer() {
        let answer = extract_answer(&json!({ "answer": "Paris" }));
        assert_eq!(answer, Some(AnswerResult::found("Paris")));
    }

    #[test]
    fn test_missing_or_falsy_answer_falls_back() {
        for body in [
            json!({}),
            json!({ "error": "busy" }),
            json!({ "answer": null }),
            json!({ "answer": "" }),
            json!({ "answer": false }),
            json!({ "answer": 0 }),
        ] {
            let answer = extract_answer(&body).unwrap();
            assert_eq!(answer.text, "No answer found", "body: {}", body);
            assert!(!answer.found);
        }
    }

    #[test]
    fn test_non_string_answer_is_rendered() {
        assert_eq!(extract_answer(&json!({ "answer": 4 })).unwrap().text, "4");
        assert_eq!(extract_answer(&json!({ "answer": true })).unwrap().text, "true");
    }

    #[test]
    fn test_non_object_body_has_no_answer() {
        for body in [json!(null), json!("Paris"), json!(["Paris"]), json!(42)] {
            assert_eq!(extract_answer(&body), None, "body: {}", body);
        }
    }

    #[test]
    fn test_request_body_shape() {
        let body = serde_json::to_value(AnswerRequest { question: "Q?" }).unwrap();
        assert_eq!(body, json!({ "question": "Q?" }));
    }
}
