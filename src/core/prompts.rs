//! 인터프리터 지시문

use crate::models::panel_state::PanelSnapshot;

const ACTION_GRAMMAR: &str = r#"Reply with ONLY one JSON object, in one of these shapes:
- copy: {"action": "copy", "params": {"pattern": "*.txt", "from": "left|right", "to": "left|right"}, "message": "what I am doing"}
- move: {"action": "move", "params": {"pattern": "*.txt", "from": "left|right", "to": "left|right"}, "message": "what I am doing"}
- delete: {"action": "delete", "params": {"pattern": "*.txt", "from": "left|right"}, "message": "what I am doing"}
- create_folder: {"action": "create_folder", "params": {"name": "folder_name"}, "message": "what I am doing"}
- create_file: {"action": "create_file", "params": {"name": "file_name", "content": "text"}, "message": "what I am doing"}
- rename: {"action": "rename", "params": {"old_name": "old.txt", "new_name": "new.txt"}, "message": "what I am doing"}

If the request is unclear, or names several files, reply with action "error" and explain in "message"."#;

const SINGLE_PATTERN_RULE: &str = r#"IMPORTANT: copy, move, delete and rename work on ONE file name or ONE pattern per command.
- If the user lists several specific files (file1.txt and file2.txt), return "error" and ask for one file at a time.
- Use glob patterns (*.txt, file?.doc) for group operations.
- For a specific file, give its full name as the pattern.
- create_folder, create_file and rename act on the active panel."#;

/// 패널 정보, 액션 문법, 단일 패턴 규칙을 담은 시스템 지시문
pub fn system_directive(panels: &PanelSnapshot) -> String {
    format!(
        "You are the assistant of a dual-panel file manager.\n\
         Left panel: {}\n\
         Right panel: {}\n\
         Active panel: {}\n\n\
         {}\n\n\
         {}\n",
        panels.left_path.display(),
        panels.right_path.display(),
        panels.active,
        SINGLE_PATTERN_RULE,
        ACTION_GRAMMAR
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::panel_state::PanelSide;
    use std::path::PathBuf;

    #[test]
    fn test_directive_mentions_panels_and_grammar() {
        let snapshot = PanelSnapshot {
            left_path: PathBuf::from("/home/user/docs"),
            right_path: PathBuf::from("/tmp"),
            active: PanelSide::Right,
        };
        let directive = system_directive(&snapshot);

        assert!(directive.contains("Left panel: /home/user/docs"));
        assert!(directive.contains("Right panel: /tmp"));
        assert!(directive.contains("Active panel: right"));
        for action in ["copy", "move", "delete", "create_folder", "create_file", "rename", "error"] {
            assert!(directive.contains(&format!("\"{}\"", action)), "missing {}", action);
        }
        assert!(directive.contains("ONE pattern"));
    }
}
