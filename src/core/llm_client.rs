//! 텍스트 생성 엔드포인트 클라이언트
//!
//! OpenAI 호환 `/chat/completions` API를 호출합니다.
//! 인터프리터는 `TextGenerator` 트레이트에만 의존하므로 테스트에서는 가짜 구현을 주입합니다.

use crate::config::AssistantConfig;
use crate::utils::error::{DualPilotError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// 메시지 역할
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// 대화 메시지 한 건
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// 텍스트 생성기
///
/// 메시지 목록을 받아 어시스턴트 응답 본문 하나를 반환합니다.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, messages: &[ChatMessage]) -> Result<String>;
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// OpenAI 호환 HTTP 클라이언트
pub struct ChatCompletionClient {
    client: Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
    api_key_env: String,
    temperature: f32,
}

impl ChatCompletionClient {
    /// 설정으로부터 클라이언트 생성
    ///
    /// API 키는 설정에 지정된 환경 변수에서 읽습니다. 키가 없어도 생성은 성공하고,
    /// 요청 시점에 `InterpreterFailure`로 보고합니다.
    pub fn from_config(config: &AssistantConfig) -> Result<Self> {
        let api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty());
        Self::new(config, api_key)
    }

    pub fn new(config: &AssistantConfig, api_key: Option<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| {
                DualPilotError::InterpreterFailure(format!("failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            endpoint: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
            model: config.model.clone(),
            api_key,
            api_key_env: config.api_key_env.clone(),
            temperature: config.temperature,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }
}

#[async_trait]
impl TextGenerator for ChatCompletionClient {
    async fn generate(&self, messages: &[ChatMessage]) -> Result<String> {
        let Some(api_key) = &self.api_key else {
            return Err(DualPilotError::InterpreterFailure(format!(
                "no API key: set the {} environment variable",
                self.api_key_env
            )));
        };

        let request = ChatRequest {
            model: &self.model,
            messages,
            temperature: self.temperature,
            stream: false,
        };

        tracing::debug!(endpoint = %self.endpoint, messages = messages.len(), "sending chat request");
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| DualPilotError::InterpreterFailure(format!("request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DualPilotError::InterpreterFailure(format!(
                "API error ({}): {}",
                status,
                body.chars().take(200).collect::<String>()
            )));
        }

        let parsed: ChatResponse = response.json().await.map_err(|e| {
            DualPilotError::InterpreterFailure(format!("failed to parse response: {}", e))
        })?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| DualPilotError::InterpreterFailure("empty response".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roles_serialize_lowercase() {
        let json = serde_json::to_string(&ChatMessage::assistant("ok")).unwrap();
        assert_eq!(json, r#"{"role":"assistant","content":"ok"}"#);
    }

    #[test]
    fn test_endpoint_joins_base_url() {
        let mut config = AssistantConfig::default();
        config.base_url = "https://example.invalid/v1/".to_string();
        let client = ChatCompletionClient::new(&config, None).unwrap();
        assert_eq!(client.endpoint(), "https://example.invalid/v1/chat/completions");
    }

    #[tokio::test]
    async fn test_missing_api_key_is_interpreter_failure() {
        let client = ChatCompletionClient::new(&AssistantConfig::default(), None).unwrap();
        assert!(!client.has_api_key());
        match client.generate(&[ChatMessage::user("hi")]).await {
            Err(DualPilotError::InterpreterFailure(reason)) => {
                assert!(reason.contains("DUALPILOT_API_KEY"))
            }
            other => panic!("expected InterpreterFailure, got {:?}", other),
        }
    }

    #[test]
    fn test_response_content_is_extracted() {
        let parsed: ChatResponse = serde_json::from_str(
            r#"{"choices":[{"index":0,"message":{"role":"assistant","content":"{\"action\":\"error\"}"}}]}"#,
        )
        .unwrap();
        assert_eq!(
            parsed.choices[0].message.content.as_deref(),
            Some(r#"{"action":"error"}"#)
        );
    }
}
