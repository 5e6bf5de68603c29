//! 콘솔 명령 파서
//!
//! 인자는 셸 인용 규칙(`shlex`)으로 나눕니다. `ai <요청>` 또는 `?<요청>`은 그대로 파이프라인에 넘깁니다.

use crate::models::SortMode;
use crate::utils::error::{DualPilotError, Result};

pub const DEFAULT_HISTORY_COUNT: usize = 20;

pub const HELP_TEXT: &str = "\
Panels:
  ls                      show both panels
  cd <path>               change the active panel directory
  up                      go to the parent directory
  open <name>             open a folder in the active panel ('..' goes up)
  switch                  switch the active panel
  sort <name|size|date> [asc|desc]
  find [text|glob]        filter the active panel (no argument clears)
Files (active panel, copy/move target is the other panel):
  copy <name>   move <name>   rm <name>
  mkdir <name>  touch <name> [content]  rename <old> <new>
Assistant:
  ai <request>  or  ?<request>
  history [n]   clear-history
Other:
  config   help   quit";

/// 콘솔 명령
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    List,
    Cd(String),
    Up,
    Open(String),
    Switch,
    Sort(SortMode),
    Find(String),
    Copy(String),
    Move(String),
    Remove(String),
    Mkdir(String),
    Touch { name: String, content: String },
    Rename { old_name: String, new_name: String },
    History(usize),
    ClearHistory,
    /// 적용 중인 설정 출력
    Config,
    Help,
    Quit,
    /// 자연어 요청
    Ask(String),
}

impl ConsoleCommand {
    /// 입력 한 줄 파싱. 빈 줄은 `None`
    pub fn parse(line: &str) -> Result<Option<Self>> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }

        if let Some(request) = line.strip_prefix('?') {
            return Self::ask(request).map(Some);
        }
        if let Some(request) = line.strip_prefix("ai ") {
            return Self::ask(request).map(Some);
        }

        let words = shlex::split(line)
            .ok_or_else(|| DualPilotError::InvalidCommand("unbalanced quotes".to_string()))?;
        let Some((name, args)) = words.split_first() else {
            return Ok(None);
        };

        let command = match name.as_str() {
            "ls" | "list" => {
                no_args(name, args)?;
                ConsoleCommand::List
            }
            "cd" => ConsoleCommand::Cd(one_arg(name, args)?),
            "up" | ".." => {
                no_args(name, args)?;
                ConsoleCommand::Up
            }
            "open" => ConsoleCommand::Open(one_arg(name, args)?),
            "switch" | "tab" => {
                no_args(name, args)?;
                ConsoleCommand::Switch
            }
            "sort" => ConsoleCommand::Sort(parse_sort(args)?),
            "find" => ConsoleCommand::Find(args.join(" ")),
            "copy" | "cp" => ConsoleCommand::Copy(one_arg(name, args)?),
            "move" | "mv" => ConsoleCommand::Move(one_arg(name, args)?),
            "rm" | "delete" => ConsoleCommand::Remove(one_arg(name, args)?),
            "mkdir" => ConsoleCommand::Mkdir(one_arg(name, args)?),
            "touch" => match args.split_first() {
                Some((file, content)) => ConsoleCommand::Touch {
                    name: file.clone(),
                    content: content.join(" "),
                },
                None => return Err(usage(name, "<name> [content]")),
            },
            "rename" => match args {
                [old_name, new_name] => ConsoleCommand::Rename {
                    old_name: old_name.clone(),
                    new_name: new_name.clone(),
                },
                _ => return Err(usage(name, "<old> <new>")),
            },
            "history" => match args {
                [] => ConsoleCommand::History(DEFAULT_HISTORY_COUNT),
                [count] => ConsoleCommand::History(count.parse().map_err(|_| {
                    DualPilotError::InvalidCommand(format!("'{}' is not a number", count))
                })?),
                _ => return Err(usage(name, "[n]")),
            },
            "clear-history" => ConsoleCommand::ClearHistory,
            "config" => ConsoleCommand::Config,
            "help" => ConsoleCommand::Help,
            "quit" | "exit" | "q" => ConsoleCommand::Quit,
            "ai" => return Self::ask(&args.join(" ")).map(Some),
            other => {
                return Err(DualPilotError::InvalidCommand(format!(
                    "unknown command '{}' (type 'help')",
                    other
                )))
            }
        };
        Ok(Some(command))
    }

    fn ask(request: &str) -> Result<Self> {
        let request = request.trim();
        if request.is_empty() {
            return Err(DualPilotError::InvalidCommand("empty request".to_string()));
        }
        Ok(ConsoleCommand::Ask(request.to_string()))
    }
}

fn usage(name: &str, args: &str) -> DualPilotError {
    DualPilotError::InvalidCommand(format!("usage: {} {}", name, args))
}

fn no_args(name: &str, args: &[String]) -> Result<()> {
    if args.is_empty() {
        Ok(())
    } else {
        Err(usage(name, ""))
    }
}

fn one_arg(name: &str, args: &[String]) -> Result<String> {
    match args {
        [arg] => Ok(arg.clone()),
        _ => Err(usage(name, "<name>")),
    }
}

fn parse_sort(args: &[String]) -> Result<SortMode> {
    let (key, order) = match args {
        [key] => (key.as_str(), "asc"),
        [key, order] => (key.as_str(), order.as_str()),
        _ => return Err(usage("sort", "<name|size|date> [asc|desc]")),
    };
    format!("{}_{}", key, order)
        .parse()
        .map_err(|e: DualPilotError| DualPilotError::InvalidCommand(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{SortBy, SortOrder};

    fn parse(line: &str) -> ConsoleCommand {
        ConsoleCommand::parse(line).unwrap().unwrap()
    }

    #[test]
    fn test_blank_line() {
        assert_eq!(ConsoleCommand::parse("   ").unwrap(), None);
    }

    #[test]
    fn test_quoted_arguments() {
        assert_eq!(
            parse(r#"rename "old report.txt" 'new report.txt'"#),
            ConsoleCommand::Rename {
                old_name: "old report.txt".to_string(),
                new_name: "new report.txt".to_string(),
            }
        );
        assert_eq!(parse("cd \"My Documents\""), ConsoleCommand::Cd("My Documents".to_string()));
    }

    #[test]
    fn test_ask_keeps_raw_text() {
        assert_eq!(
            parse("ai copy \"all\" txt files, please"),
            ConsoleCommand::Ask("copy \"all\" txt files, please".to_string())
        );
        assert_eq!(parse("?delete *.log"), ConsoleCommand::Ask("delete *.log".to_string()));
        assert!(ConsoleCommand::parse("?   ").is_err());
    }

    #[test]
    fn test_sort() {
        assert_eq!(
            parse("sort size desc"),
            ConsoleCommand::Sort(SortMode::new(SortBy::Size, SortOrder::Descending))
        );
        assert_eq!(
            parse("sort date"),
            ConsoleCommand::Sort(SortMode::new(SortBy::Modified, SortOrder::Ascending))
        );
        assert!(matches!(
            ConsoleCommand::parse("sort color"),
            Err(DualPilotError::InvalidCommand(_))
        ));
    }

    #[test]
    fn test_touch_with_content() {
        assert_eq!(
            parse("touch notes.txt hello world"),
            ConsoleCommand::Touch {
                name: "notes.txt".to_string(),
                content: "hello world".to_string(),
            }
        );
    }

    #[test]
    fn test_find_without_argument_clears() {
        assert_eq!(parse("find"), ConsoleCommand::Find(String::new()));
        assert_eq!(parse("find *.rs"), ConsoleCommand::Find("*.rs".to_string()));
    }

    #[test]
    fn test_history_count() {
        assert_eq!(parse("history"), ConsoleCommand::History(DEFAULT_HISTORY_COUNT));
        assert_eq!(parse("history 6"), ConsoleCommand::History(6));
        assert!(ConsoleCommand::parse("history six").is_err());
    }

    #[test]
    fn test_errors() {
        assert!(ConsoleCommand::parse("frobnicate").is_err());
        assert!(ConsoleCommand::parse("copy").is_err());
        assert!(ConsoleCommand::parse("copy a b").is_err());
        assert!(ConsoleCommand::parse("cd \"unterminated").is_err());
    }
}
