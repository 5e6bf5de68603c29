use crate::models::command::{ActionKind, ActionParams};
use chrono::{DateTime, Local};

/// 실행 상태
///
/// `Pending`에서 `Success` 또는 `Error`로 한 번만 전이합니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryStatus {
    Pending,
    Success,
    Error,
}

impl EntryStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            EntryStatus::Pending => "pending",
            EntryStatus::Success => "success",
            EntryStatus::Error => "error",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(EntryStatus::Pending),
            "success" => Some(EntryStatus::Success),
            "error" => Some(EntryStatus::Error),
            _ => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        self != EntryStatus::Pending
    }
}

/// 대화 기록 한 건
#[derive(Debug, Clone, PartialEq)]
pub struct ConversationEntry {
    pub id: i64,
    pub timestamp: DateTime<Local>,
    pub user_message: String,
    pub ai_response: Option<String>,
    /// 저장된 action 이름 (문법 밖의 값도 그대로 기록)
    pub action: Option<String>,
    pub params: Option<ActionParams>,
    pub status: EntryStatus,
    pub error_message: Option<String>,
}

/// 부분 업데이트 (지정된 필드만 변경)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConversationUpdate {
    pub ai_response: Option<String>,
    pub action: Option<String>,
    pub params: Option<ActionParams>,
    pub status: Option<EntryStatus>,
    pub error_message: Option<String>,
}

impl ConversationUpdate {
    /// 해석 결과 기록
    pub fn interpreted(ai_response: &str, action: ActionKind, params: ActionParams) -> Self {
        Self {
            ai_response: Some(ai_response.to_string()),
            action: Some(action.as_str().to_string()),
            params: Some(params),
            ..Self::default()
        }
    }

    pub fn succeeded() -> Self {
        Self {
            status: Some(EntryStatus::Success),
            ..Self::default()
        }
    }

    pub fn failed(error_message: impl Into<String>) -> Self {
        Self {
            status: Some(EntryStatus::Error),
            error_message: Some(error_message.into()),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.ai_response.is_none()
            && self.action.is_none()
            && self.params.is_none()
            && self.status.is_none()
            && self.error_message.is_none()
    }
}
