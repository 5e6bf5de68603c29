use crate::config::AppConfig;
use crate::core::interpreter::CommandInterpreter;
use crate::core::llm_client::TextGenerator;
use crate::core::pipeline::{CommandPipeline, CommandTicket, Delivery, PipelineOutcome};
use crate::core::FileOperationExecutor;
use crate::models::{PanelPair, PanelSide, PanelState};
use crate::system::{ConversationStore, FileSystem};
use crate::utils::error::{DualPilotError, Result};
use crate::utils::formatter::{format_date, format_size, format_timestamp, pluralize};
use std::fmt::Write as _;
use std::path::Path;
use std::sync::Arc;

pub mod console;
mod navigation;
mod operations;

use console::{ConsoleCommand, HELP_TEXT};

/// 콘솔 명령 처리 결과
pub enum Response {
    /// 화면에 출력할 텍스트
    Text(String),
    /// 자연어 명령이 제출됨 (결과는 티켓으로 전달)
    Submitted(CommandTicket),
    Quit,
}

/// 애플리케이션 상태
///
/// 두 패널과 명령 파이프라인을 소유하는 포그라운드 호스트입니다.
pub struct App {
    pub panels: PanelPair,
    config: AppConfig,
    filesystem: FileSystem,
    pipeline: CommandPipeline,
    should_quit: bool,
}

impl App {
    /// 설정과 시작 경로로 앱 생성
    pub fn new(
        config: &AppConfig,
        left: &Path,
        right: &Path,
        generator: Arc<dyn TextGenerator>,
    ) -> Result<Self> {
        let filesystem = FileSystem::new();
        let sort_mode = config.sort_mode()?;
        let panels = PanelPair::new(
            PanelState::open(&filesystem, left, sort_mode)?,
            PanelState::open(&filesystem, right, sort_mode)?,
        );

        let store = ConversationStore::open(&config.history_path())?;
        let pipeline = CommandPipeline::new(
            store,
            CommandInterpreter::new(generator),
            FileOperationExecutor::new(FileSystem::new()),
            config.assistant.context_size,
        );

        tracing::info!(
            left = %panels.path(PanelSide::Left).display(),
            right = %panels.path(PanelSide::Right).display(),
            "app started"
        );

        Ok(Self {
            panels,
            config: config.clone(),
            filesystem,
            pipeline,
            should_quit: false,
        })
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    pub fn pipeline(&self) -> &CommandPipeline {
        &self.pipeline
    }

    /// 입력 한 줄 처리
    pub fn handle_line(&mut self, line: &str) -> Result<Option<Response>> {
        match ConsoleCommand::parse(line)? {
            Some(command) => self.dispatch(command).map(Some),
            None => Ok(None),
        }
    }

    /// 콘솔 명령 실행
    pub fn dispatch(&mut self, command: ConsoleCommand) -> Result<Response> {
        let text = match command {
            ConsoleCommand::List => self.render_panels(),
            ConsoleCommand::Cd(path) => {
                self.change_directory(Path::new(&path))?;
                self.render_active()
            }
            ConsoleCommand::Up => {
                self.go_parent()?;
                self.render_active()
            }
            ConsoleCommand::Open(name) => {
                self.activate_entry(&name)?;
                self.render_active()
            }
            ConsoleCommand::Switch => {
                self.switch_panel();
                format!("Active panel: {}", self.panels.active_side())
            }
            ConsoleCommand::Sort(mode) => {
                self.set_sort_mode(mode);
                self.render_active()
            }
            ConsoleCommand::Find(query) => {
                self.set_search(&query);
                self.render_active()
            }
            ConsoleCommand::Copy(name) => self.copy_to_other_panel(&name)?,
            ConsoleCommand::Move(name) => self.move_to_other_panel(&name)?,
            ConsoleCommand::Remove(name) => self.delete_entry(&name)?,
            ConsoleCommand::Mkdir(name) => self.make_directory(&name)?,
            ConsoleCommand::Touch { name, content } => self.make_file(&name, &content)?,
            ConsoleCommand::Rename { old_name, new_name } => {
                self.rename_entry(&old_name, &new_name)?
            }
            ConsoleCommand::History(count) => self.render_history(count)?,
            ConsoleCommand::ClearHistory => {
                self.ensure_idle()?;
                self.pipeline.store().clear()?;
                "History cleared".to_string()
            }
            ConsoleCommand::Config => self.config.to_toml()?.trim_end().to_string(),
            ConsoleCommand::Help => HELP_TEXT.to_string(),
            ConsoleCommand::Quit => {
                self.quit();
                return Ok(Response::Quit);
            }
            ConsoleCommand::Ask(request) => return self.submit(&request).map(Response::Submitted),
        };
        Ok(Response::Text(text))
    }

    /// 자연어 명령 제출
    pub fn submit(&mut self, request: &str) -> Result<CommandTicket> {
        self.pipeline.submit(request, &self.panels)
    }

    /// 해석 결과 반영 (포그라운드에서 호출)
    pub fn complete(&mut self, delivery: Delivery) -> Result<PipelineOutcome> {
        self.pipeline.finish(delivery, &mut self.panels)
    }

    /// 종료 시 진행 중인 명령을 실패로 기록
    pub fn abandon(&mut self, ticket: CommandTicket) -> Result<PipelineOutcome> {
        self.pipeline.abandon(ticket)
    }

    /// 파일 작업 전 확인: 자연어 명령 진행 중이면 거부
    fn ensure_idle(&self) -> Result<()> {
        if self.pipeline.is_busy() {
            return Err(DualPilotError::CommandInFlight);
        }
        Ok(())
    }

    fn refresh_panels(&mut self) {
        if let Err(err) = self.panels.refresh_all(&self.filesystem) {
            tracing::warn!(error = %err, "panel refresh failed");
        }
    }

    // === 출력 ===

    pub fn render_panels(&self) -> String {
        let mut out = String::new();
        for side in [PanelSide::Left, PanelSide::Right] {
            out.push_str(&self.render_panel(side));
            out.push('\n');
        }
        out
    }

    pub fn render_active(&self) -> String {
        self.render_panel(self.panels.active_side())
    }

    fn render_panel(&self, side: PanelSide) -> String {
        let panel = self.panels.side(side);
        let marker = if side == self.panels.active_side() { '*' } else { ' ' };
        let mut out = String::new();

        let _ = writeln!(
            out,
            "{} [{}] {}  ({})",
            marker,
            side,
            panel.current_path().display(),
            panel.sort_mode()
        );
        if !panel.search().is_empty() {
            let _ = writeln!(out, "  search: {}", panel.search());
        }

        for entry in panel.visible_entries() {
            let (name, size) = if entry.is_directory {
                (format!("{}/", entry.name), "<DIR>".to_string())
            } else {
                (entry.name.clone(), format_size(entry.size_bytes))
            };
            let _ = writeln!(
                out,
                "  {:<40} {:>10}  {}",
                name,
                size,
                format_date(entry.modified_at)
            );
        }

        let cache = panel.cache();
        let _ = write!(
            out,
            "  {}, {}, {}",
            pluralize(cache.dir_count(), "folder", "folders"),
            pluralize(cache.file_count(), "file", "files"),
            format_size(cache.total_size())
        );
        out
    }

    /// 최근 대화 기록 (오래된 것 먼저)
    pub fn render_history(&self, count: usize) -> Result<String> {
        let entries = self.pipeline.store().recent_context(count)?;
        if entries.is_empty() {
            return Ok("No history".to_string());
        }

        let mut out = String::new();
        for entry in entries {
            let _ = writeln!(
                out,
                "#{} {} [{}] {}",
                entry.id,
                format_timestamp(&entry.timestamp),
                entry.status.as_str(),
                entry.user_message
            );
            if let Some(response) = &entry.ai_response {
                let _ = writeln!(out, "    AI: {}", response);
            }
            if let Some(error) = &entry.error_message {
                let _ = writeln!(out, "    error: {}", error);
            }
        }
        Ok(out.trim_end().to_string())
    }

    /// 파이프라인 결과 출력 문자열
    pub fn describe_outcome(outcome: &PipelineOutcome) -> String {
        match outcome {
            PipelineOutcome::Succeeded {
                message, summary, ..
            } => {
                if message.is_empty() {
                    format!("OK: {}", summary)
                } else {
                    format!("AI: {}\nOK: {}", message, summary)
                }
            }
            PipelineOutcome::Failed { reason, .. } => format!("Error: {}", reason),
        }
    }
}
