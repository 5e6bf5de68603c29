//! 자연어 명령 해석기
//!
//! 사용자 요청과 최근 대화를 텍스트 생성기에 보내고, 응답 JSON을 `Action`으로 분류합니다.
//! 파일 시스템에는 접근하지 않습니다.

use super::llm_client::{ChatMessage, TextGenerator};
use super::prompts::system_directive;
use crate::models::command::{Action, ActionParams};
use crate::models::conversation::ConversationEntry;
use crate::models::panel_state::PanelSnapshot;
use crate::utils::error::Result;
use serde_json::{Map, Value};
use std::sync::Arc;

/// 해석 결과
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interpretation {
    pub action: Action,
    /// 모델이 사용자에게 보여주려고 한 설명 (`message` 필드)
    pub message: String,
    /// 원본 응답 텍스트
    pub raw: String,
}

/// 명령 해석기
#[derive(Clone)]
pub struct CommandInterpreter {
    generator: Arc<dyn TextGenerator>,
}

impl CommandInterpreter {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    /// 요청 해석
    ///
    /// 엔드포인트 호출 실패만 `Err`입니다. 응답 형식 오류는 `Action::Error`로 반환됩니다.
    pub async fn interpret(
        &self,
        user_message: &str,
        panels: &PanelSnapshot,
        history: &[ConversationEntry],
    ) -> Result<Interpretation> {
        let messages = build_messages(user_message, panels, history);
        let raw = self.generator.generate(&messages).await?;
        tracing::debug!(response = %raw, "interpreter response");
        Ok(parse_response(&raw))
    }
}

/// 시스템 지시문, 과거 대화(user/assistant 교대), 새 요청 순서로 메시지 구성
pub fn build_messages(
    user_message: &str,
    panels: &PanelSnapshot,
    history: &[ConversationEntry],
) -> Vec<ChatMessage> {
    let mut messages = Vec::with_capacity(history.len() * 2 + 2);
    messages.push(ChatMessage::system(system_directive(panels)));

    for entry in history {
        messages.push(ChatMessage::user(entry.user_message.as_str()));
        if let Some(response) = entry.ai_response.as_deref().filter(|r| !r.is_empty()) {
            messages.push(ChatMessage::assistant(response));
        }
    }

    messages.push(ChatMessage::user(user_message));
    messages
}

/// 응답 텍스트를 해석 결과로 변환
pub fn parse_response(raw: &str) -> Interpretation {
    let (action, message) = match extract_object(raw) {
        Some(object) => classify(&object),
        None => (
            Action::error(format!(
                "response is not a JSON command: {}",
                preview(raw)
            )),
            String::new(),
        ),
    };

    Interpretation {
        action,
        message,
        raw: raw.to_string(),
    }
}

fn classify(object: &Map<String, Value>) -> (Action, String) {
    let message = match object.get("message") {
        Some(Value::String(message)) => message.trim().to_string(),
        _ => {
            return (
                Action::error("response has no 'message' field"),
                String::new(),
            )
        }
    };

    let Some(Value::String(action)) = object.get("action") else {
        return (Action::error("response has no 'action' field"), message);
    };

    let params = match object.get("params") {
        None | Some(Value::Null) => ActionParams::new(),
        Some(Value::Object(map)) => match flatten_params(map) {
            Ok(params) => params,
            Err(reason) => return (Action::error(reason), message),
        },
        Some(_) => return (Action::error("'params' must be an object"), message),
    };

    (Action::from_params(action, &params, &message), message)
}

/// 파라미터 값은 문자열로 변환 (중첩 구조는 거부)
fn flatten_params(map: &Map<String, Value>) -> std::result::Result<ActionParams, String> {
    let mut params = ActionParams::new();
    for (key, value) in map {
        let text = match value {
            Value::String(s) => s.clone(),
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Null => continue,
            Value::Array(_) | Value::Object(_) => {
                return Err(format!(
                    "parameter '{}' must be a single value; list several files in separate commands",
                    key
                ))
            }
        };
        params.insert(key.clone(), text);
    }
    Ok(params)
}

fn extract_object(raw: &str) -> Option<Map<String, Value>> {
    let trimmed = raw.trim();
    if let Ok(Value::Object(object)) = serde_json::from_str(trimmed) {
        return Some(object);
    }

    match serde_json::from_str(&strip_code_fence(trimmed)) {
        Ok(Value::Object(object)) => Some(object),
        _ => None,
    }
}

// 코드 펜스(```json / ```) 제거
fn strip_code_fence(text: &str) -> String {
    let mut result = text.trim();
    if let Some(rest) = result.strip_prefix("```") {
        result = rest;
        if let Some(rest) = result.strip_prefix("json") {
            result = rest;
        }
    } else if let Some(rest) = result.strip_prefix("json") {
        result = rest;
    }

    result = result.trim();
    if let Some(rest) = result.strip_suffix("```") {
        result = rest;
    }
    result.trim().to_string()
}

fn preview(raw: &str) -> String {
    let mut text: String = raw.trim().chars().take(120).collect();
    if raw.trim().chars().count() > 120 {
        text.push_str("...");
    }
    text
}
