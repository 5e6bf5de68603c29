//! 자연어 명령 문법
//!
//! 인터프리터가 해석한 응답은 이 모듈의 `Action`으로만 표현됩니다.
//! 알 수 없는 action이나 필수 파라미터 누락은 기본값으로 보정하지 않고 `Action::Error`가 됩니다.

use crate::models::panel_state::PanelSide;
use crate::utils::error::{DualPilotError, Result};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Component, Path};

/// 액션 파라미터 (문자열 → 문자열)
pub type ActionParams = BTreeMap<String, String>;

/// 액션 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    Copy,
    Move,
    Delete,
    CreateFolder,
    CreateFile,
    Rename,
    Error,
}

impl ActionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ActionKind::Copy => "copy",
            ActionKind::Move => "move",
            ActionKind::Delete => "delete",
            ActionKind::CreateFolder => "create_folder",
            ActionKind::CreateFile => "create_file",
            ActionKind::Rename => "rename",
            ActionKind::Error => "error",
        }
    }

    /// 문법에 정의된 이름만 허용
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "copy" => Some(ActionKind::Copy),
            "move" => Some(ActionKind::Move),
            "delete" => Some(ActionKind::Delete),
            "create_folder" => Some(ActionKind::CreateFolder),
            "create_file" => Some(ActionKind::CreateFile),
            "rename" => Some(ActionKind::Rename),
            "error" => Some(ActionKind::Error),
            _ => None,
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 검증된 파일 작업 명령
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Copy {
        pattern: String,
        from: PanelSide,
        to: PanelSide,
    },
    Move {
        pattern: String,
        from: PanelSide,
        to: PanelSide,
    },
    Delete {
        pattern: String,
        from: PanelSide,
    },
    CreateFolder {
        name: String,
    },
    CreateFile {
        name: String,
        content: String,
    },
    Rename {
        old_name: String,
        new_name: String,
    },
    Error {
        reason: String,
    },
}

impl Action {
    pub fn kind(&self) -> ActionKind {
        match self {
            Action::Copy { .. } => ActionKind::Copy,
            Action::Move { .. } => ActionKind::Move,
            Action::Delete { .. } => ActionKind::Delete,
            Action::CreateFolder { .. } => ActionKind::CreateFolder,
            Action::CreateFile { .. } => ActionKind::CreateFile,
            Action::Rename { .. } => ActionKind::Rename,
            Action::Error { .. } => ActionKind::Error,
        }
    }

    /// action 이름과 파라미터로부터 액션 생성
    ///
    /// 검증 실패는 `Action::Error`로 반환합니다.
    pub(crate) fn from_params(action: &str, params: &ActionParams, message: &str) -> Action {
        let Some(kind) = ActionKind::parse(action.trim()) else {
            return Action::error(format!("unknown action '{}'", action));
        };

        match Self::build(kind, params, message) {
            Ok(action) => action,
            Err(reason) => Action::error(format!("invalid '{}' command: {}", kind, reason)),
        }
    }

    /// 종류별 필수 파라미터 확인
    ///
    /// `create_file`의 `content`는 선택 사항이며, 없으면 빈 파일을 만듭니다.
    fn build(
        kind: ActionKind,
        params: &ActionParams,
        message: &str,
    ) -> std::result::Result<Action, String> {
        let action = match kind {
            ActionKind::Copy => Action::Copy {
                pattern: required(params, &["pattern"])?,
                from: side(params, "from")?,
                to: side(params, "to")?,
            },
            ActionKind::Move => Action::Move {
                pattern: required(params, &["pattern"])?,
                from: side(params, "from")?,
                to: side(params, "to")?,
            },
            ActionKind::Delete => Action::Delete {
                pattern: required(params, &["pattern"])?,
                from: side(params, "from")?,
            },
            ActionKind::CreateFolder => Action::CreateFolder {
                name: required(params, &["name"])?,
            },
            ActionKind::CreateFile => Action::CreateFile {
                name: required(params, &["name"])?,
                content: params.get("content").cloned().unwrap_or_default(),
            },
            ActionKind::Rename => Action::Rename {
                old_name: required(params, &["old_name", "old"])?,
                new_name: required(params, &["new_name", "new"])?,
            },
            ActionKind::Error => {
                let reason = if message.trim().is_empty() {
                    "the assistant could not map the request to a file operation".to_string()
                } else {
                    message.trim().to_string()
                };
                Action::Error { reason }
            }
        };
        Ok(action)
    }

    pub fn error(reason: impl Into<String>) -> Action {
        Action::Error {
            reason: reason.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Action::Error { .. })
    }

    /// 배치 작업의 글로브 패턴
    pub fn batch_pattern(&self) -> Option<&str> {
        match self {
            Action::Copy { pattern, .. }
            | Action::Move { pattern, .. }
            | Action::Delete { pattern, .. } => Some(pattern),
            _ => None,
        }
    }

    /// 히스토리에 저장할 정규화된 파라미터
    pub fn params(&self) -> ActionParams {
        let mut params = ActionParams::new();
        let mut put = |key: &str, value: &str| {
            params.insert(key.to_string(), value.to_string());
        };
        match self {
            Action::Copy { pattern, from, to } | Action::Move { pattern, from, to } => {
                put("pattern", pattern);
                put("from", from.as_str());
                put("to", to.as_str());
            }
            Action::Delete { pattern, from } => {
                put("pattern", pattern);
                put("from", from.as_str());
            }
            Action::CreateFolder { name } => put("name", name),
            Action::CreateFile { name, content } => {
                put("name", name);
                put("content", content);
            }
            Action::Rename { old_name, new_name } => {
                put("old_name", old_name);
                put("new_name", new_name);
            }
            Action::Error { .. } => {}
        }
        params
    }
}

fn required(params: &ActionParams, keys: &[&str]) -> std::result::Result<String, String> {
    keys.iter()
        .filter_map(|key| params.get(*key))
        .map(|value| value.trim())
        .find(|value| !value.is_empty())
        .map(str::to_string)
        .ok_or_else(|| format!("missing parameter '{}'", keys[0]))
}

fn side(params: &ActionParams, key: &str) -> std::result::Result<PanelSide, String> {
    let value = required(params, &[key])?;
    value.parse::<PanelSide>().map_err(|_| {
        format!("parameter '{}' must be 'left' or 'right', got '{}'", key, value)
    })
}

/// 단일 패턴 검사
///
/// 쉼표나 "and"로 연결된 여러 파일 이름은 거부합니다. 파일 시스템은 확인하지 않습니다.
pub fn ensure_single_pattern(pattern: &str) -> Result<()> {
    let lowered = pattern.to_lowercase();
    let joined_by_word = lowered
        .split_whitespace()
        .any(|word| word == "and" || word == "и");

    if pattern.contains(',') || pattern.contains(';') || joined_by_word {
        return Err(DualPilotError::InvalidCommand(format!(
            "'{}' names several files; use one file name or a single glob pattern (e.g. *.txt) per command",
            pattern
        )));
    }
    Ok(())
}

/// 단일 경로 요소 이름인지 검사 (구분자, `.`, `..` 불가)
pub fn ensure_plain_name(name: &str) -> Result<()> {
    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) if !name.contains(['/', '\\']) => Ok(()),
        _ => Err(DualPilotError::InvalidCommand(format!(
            "'{}' is not a plain file name",
            name
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> ActionParams {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_copy_from_params() {
        let action = Action::from_params(
            "copy",
            &params(&[("pattern", "*.txt"), ("from", "left"), ("to", "right")]),
            "copying",
        );
        assert_eq!(
            action,
            Action::Copy {
                pattern: "*.txt".to_string(),
                from: PanelSide::Left,
                to: PanelSide::Right,
            }
        );
        assert_eq!(action.batch_pattern(), Some("*.txt"));
    }

    #[test]
    fn test_unknown_action_is_error() {
        let action = Action::from_params("teleport", &params(&[("pattern", "*")]), "");
        match action {
            Action::Error { reason } => assert!(reason.contains("teleport")),
            other => panic!("expected Error, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_pattern_is_not_defaulted() {
        let action = Action::from_params("delete", &params(&[("from", "left")]), "");
        match action {
            Action::Error { reason } => assert!(reason.contains("pattern")),
            other => panic!("expected Error, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_side_is_error() {
        let action = Action::from_params(
            "move",
            &params(&[("pattern", "a.txt"), ("from", "left/right"), ("to", "right")]),
            "",
        );
        assert!(action.is_error());
    }

    #[test]
    fn test_rename_accepts_short_aliases() {
        let action = Action::from_params("rename", &params(&[("old", "a"), ("new", "b")]), "");
        assert_eq!(
            action,
            Action::Rename {
                old_name: "a".to_string(),
                new_name: "b".to_string(),
            }
        );
        assert_eq!(action.params().get("old_name").map(String::as_str), Some("a"));
    }

    #[test]
    fn test_error_action_carries_message() {
        let action = Action::from_params("error", &ActionParams::new(), "one file at a time");
        assert_eq!(action, Action::error("one file at a time"));
    }

    #[test]
    fn test_create_file_content_is_optional() {
        let action = Action::from_params("create_file", &params(&[("name", "x.txt")]), "");
        assert_eq!(
            action,
            Action::CreateFile {
                name: "x.txt".to_string(),
                content: String::new(),
            }
        );
    }

    #[test]
    fn test_ensure_single_pattern() {
        assert!(ensure_single_pattern("*.txt").is_ok());
        assert!(ensure_single_pattern("report final.pdf").is_ok());
        assert!(ensure_single_pattern("brand.png").is_ok());
        assert!(ensure_single_pattern("a.txt, b.txt").is_err());
        assert!(ensure_single_pattern("a.txt and b.txt").is_err());
        assert!(ensure_single_pattern("a.txt AND b.txt").is_err());
    }

    #[test]
    fn test_ensure_plain_name() {
        assert!(ensure_plain_name("notes.txt").is_ok());
        assert!(ensure_plain_name("..").is_err());
        assert!(ensure_plain_name(".").is_err());
        assert!(ensure_plain_name("a/b").is_err());
        assert!(ensure_plain_name("/etc").is_err());
        assert!(ensure_plain_name("").is_err());
    }
}
