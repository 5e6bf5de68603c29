//! 명령 파이프라인
//!
//! Idle → Pending → Interpreting → Executing → {Succeeded, Failed}
//!
//! `submit`은 기록을 남기고 해석 작업을 백그라운드 태스크로 띄운 뒤 `CommandTicket`을 돌려줍니다.
//! 호출 측(포그라운드)은 티켓으로 결과를 한 번 받아 `finish`에 넘깁니다.
//! 패널과 파일 시스템은 `finish`에서만, 포그라운드에서만 변경됩니다.

use super::executor::FileOperationExecutor;
use super::interpreter::{CommandInterpreter, Interpretation};
use crate::models::command::{ensure_plain_name, ensure_single_pattern, Action};
use crate::models::conversation::ConversationUpdate;
use crate::models::panel_state::{PanelPair, PanelSnapshot};
use crate::system::history_store::ConversationStore;
use crate::utils::error::{DualPilotError, Result};
use std::fmt;
use tokio::sync::oneshot;

/// 파이프라인 상태
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    Pending,
    Interpreting,
    Executing,
    Succeeded,
    Failed,
}

impl PipelineState {
    /// 입력이 잠긴 상태인지
    pub fn is_busy(self) -> bool {
        matches!(
            self,
            PipelineState::Pending | PipelineState::Interpreting | PipelineState::Executing
        )
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineState::Idle => "idle",
            PipelineState::Pending => "pending",
            PipelineState::Interpreting => "interpreting",
            PipelineState::Executing => "executing",
            PipelineState::Succeeded => "succeeded",
            PipelineState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// 해석 작업이 전달한 결과
///
/// `CommandTicket::recv`로만 만들어지며, 같은 파이프라인의 `finish`에 한 번 넘깁니다.
pub struct Delivery {
    entry_id: i64,
    /// 요청 시점의 패널 정보 (해석기에 전달된 것과 동일)
    panels: PanelSnapshot,
    result: Result<Interpretation>,
}

impl Delivery {
    pub fn entry_id(&self) -> i64 {
        self.entry_id
    }
}

/// 진행 중인 명령 핸들
pub struct CommandTicket {
    entry_id: i64,
    panels: PanelSnapshot,
    receiver: oneshot::Receiver<Result<Interpretation>>,
}

impl CommandTicket {
    pub fn entry_id(&self) -> i64 {
        self.entry_id
    }

    /// 해석 결과 대기
    ///
    /// 취소에 안전합니다 (`tokio::select!`에서 반복 호출 가능). 완료 후에는 다시 호출하지 마세요.
    pub async fn recv(&mut self) -> Delivery {
        let result = match (&mut self.receiver).await {
            Ok(result) => result,
            Err(_) => Err(DualPilotError::InterpreterFailure(
                "interpreter task ended without a result".to_string(),
            )),
        };
        Delivery {
            entry_id: self.entry_id,
            panels: self.panels.clone(),
            result,
        }
    }
}

/// 명령 처리 결과
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineOutcome {
    Succeeded {
        entry_id: i64,
        /// 모델의 설명
        message: String,
        /// 실행 결과 요약
        summary: String,
    },
    Failed {
        entry_id: i64,
        reason: String,
    },
}

impl PipelineOutcome {
    pub fn entry_id(&self) -> i64 {
        match self {
            PipelineOutcome::Succeeded { entry_id, .. } | PipelineOutcome::Failed { entry_id, .. } => {
                *entry_id
            }
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, PipelineOutcome::Succeeded { .. })
    }
}

/// 앱 종료로 버려진 명령의 기록 사유
pub const ABANDONED_REASON: &str = "abandoned: the application exited before the command finished";

/// 명령 파이프라인
pub struct CommandPipeline {
    store: ConversationStore,
    interpreter: CommandInterpreter,
    executor: FileOperationExecutor,
    context_size: usize,
    state: PipelineState,
    /// 해석 중인 기록 id
    in_flight: Option<i64>,
}

impl CommandPipeline {
    pub fn new(
        store: ConversationStore,
        interpreter: CommandInterpreter,
        executor: FileOperationExecutor,
        context_size: usize,
    ) -> Self {
        Self {
            store,
            interpreter,
            executor,
            context_size,
            state: PipelineState::Idle,
            in_flight: None,
        }
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    pub fn is_busy(&self) -> bool {
        self.state.is_busy()
    }

    pub fn store(&self) -> &ConversationStore {
        &self.store
    }

    pub fn executor(&self) -> &FileOperationExecutor {
        &self.executor
    }

    /// 요청 제출
    ///
    /// 컨텍스트를 먼저 읽고 PENDING 기록을 추가한 뒤 해석 태스크를 띄웁니다.
    /// tokio 런타임 안에서 호출해야 합니다.
    pub fn submit(&mut self, text: &str, panels: &PanelPair) -> Result<CommandTicket> {
        if self.state.is_busy() {
            tracing::warn!(state = %self.state, "command rejected while another is in flight");
            return Err(DualPilotError::CommandInFlight);
        }

        let text = text.trim();
        if text.is_empty() {
            return Err(DualPilotError::InvalidCommand("empty request".to_string()));
        }

        let history = self.store.recent_context(self.context_size)?;
        let entry_id = self.store.append(text)?;
        self.state = PipelineState::Pending;
        tracing::info!(entry_id, "command submitted");

        let snapshot = panels.snapshot();
        let (sender, receiver) = oneshot::channel();
        let interpreter = self.interpreter.clone();
        let request = text.to_string();
        let task_snapshot = snapshot.clone();
        tokio::spawn(async move {
            let result = interpreter
                .interpret(&request, &task_snapshot, &history)
                .await;
            // 수신 측이 사라졌으면 결과를 버림
            let _ = sender.send(result);
        });

        self.state = PipelineState::Interpreting;
        self.in_flight = Some(entry_id);
        Ok(CommandTicket {
            entry_id,
            panels: snapshot,
            receiver,
        })
    }

    /// 해석 결과를 받아 검증, 실행, 기록까지 마무리
    ///
    /// 해석 중인 명령의 결과가 아니면 아무것도 실행하지 않고 `StaleDelivery`를 반환합니다.
    pub fn finish(&mut self, delivery: Delivery, panels: &mut PanelPair) -> Result<PipelineOutcome> {
        let Delivery {
            entry_id,
            panels: snapshot,
            result,
        } = delivery;
        self.take_in_flight(entry_id)?;

        let interpretation = match result {
            Ok(interpretation) => interpretation,
            Err(err) => return Ok(self.fail(entry_id, err.to_string())),
        };

        let Interpretation {
            action, message, ..
        } = interpretation;

        self.record(
            entry_id,
            &ConversationUpdate::interpreted(&message, action.kind(), action.params()),
        );

        if let Action::Error { reason } = &action {
            return Ok(self.fail(entry_id, reason.clone()));
        }
        if let Err(err) = validate(&action) {
            return Ok(self.fail(entry_id, err.to_string()));
        }

        self.state = PipelineState::Executing;
        tracing::info!(entry_id, action = %action.kind(), "executing command");

        let outcome = match self.executor.execute(&action, &snapshot) {
            Ok(summary) => {
                if let Err(err) = panels.refresh_all(self.executor.filesystem()) {
                    tracing::warn!(error = %err, "panel refresh after command failed");
                }
                self.record(entry_id, &ConversationUpdate::succeeded());
                self.state = PipelineState::Succeeded;
                tracing::info!(entry_id, %summary, "command succeeded");
                PipelineOutcome::Succeeded {
                    entry_id,
                    message,
                    summary,
                }
            }
            Err(err) => self.fail(entry_id, err.to_string()),
        };
        Ok(outcome)
    }

    /// 제출부터 마무리까지 한 번에 실행
    pub async fn run(&mut self, text: &str, panels: &mut PanelPair) -> Result<PipelineOutcome> {
        let mut ticket = self.submit(text, panels)?;
        let delivery = ticket.recv().await;
        self.finish(delivery, panels)
    }

    /// 결과를 기다리지 않고 진행 중인 명령을 실패로 기록 (앱 종료 시)
    ///
    /// 해석 태스크의 결과는 버려지며 파일 시스템은 건드리지 않습니다.
    pub fn abandon(&mut self, ticket: CommandTicket) -> Result<PipelineOutcome> {
        let entry_id = ticket.entry_id();
        self.take_in_flight(entry_id)?;
        drop(ticket);
        Ok(self.fail(entry_id, ABANDONED_REASON.to_string()))
    }

    fn take_in_flight(&mut self, entry_id: i64) -> Result<()> {
        if self.state != PipelineState::Interpreting || self.in_flight != Some(entry_id) {
            tracing::warn!(entry_id, state = %self.state, "ignoring result for a command that is not in flight");
            return Err(DualPilotError::StaleDelivery { entry_id });
        }
        self.in_flight = None;
        Ok(())
    }

    fn fail(&mut self, entry_id: i64, reason: String) -> PipelineOutcome {
        self.record(entry_id, &ConversationUpdate::failed(reason.as_str()));
        self.state = PipelineState::Failed;
        tracing::warn!(entry_id, %reason, "command failed");
        PipelineOutcome::Failed { entry_id, reason }
    }

    fn record(&self, entry_id: i64, update: &ConversationUpdate) {
        if let Err(err) = self.store.update(entry_id, update) {
            tracing::error!(entry_id, error = %err, "failed to record command result");
        }
    }
}

/// 실행 전 텍스트 검증 (파일 시스템은 보지 않음)
fn validate(action: &Action) -> Result<()> {
    if let Some(pattern) = action.batch_pattern() {
        ensure_single_pattern(pattern)?;
    }
    match action {
        Action::CreateFolder { name } | Action::CreateFile { name, .. } => ensure_plain_name(name),
        Action::Rename { old_name, new_name } => {
            ensure_plain_name(old_name)?;
            ensure_plain_name(new_name)
        }
        _ => Ok(()),
    }
}
