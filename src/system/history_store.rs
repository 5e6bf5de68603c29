//! 대화 기록 저장소
//!
//! 단일 테이블 SQLite 로그. 요청마다 PENDING 행을 추가하고 결과가 나오면 같은 행을 갱신합니다.
//! 컨텍스트 조회는 최근 N건을 시간순(오래된 것 먼저)으로 반환합니다.

use crate::models::command::ActionParams;
use crate::models::conversation::{ConversationEntry, ConversationUpdate, EntryStatus};
use crate::utils::error::{DualPilotError, Result};
use chrono::{DateTime, Local};
use rusqlite::types::{Type, Value};
use rusqlite::{params_from_iter, Connection, Row};
use std::path::{Path, PathBuf};

/// SQLite 기반 대화 기록 저장소
pub struct ConversationStore {
    db_path: PathBuf,
}

impl ConversationStore {
    /// 데이터베이스 열기 (없으면 생성)
    pub fn open(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| DualPilotError::from_io(e, parent))?;
            }
        }

        let store = Self {
            db_path: db_path.to_path_buf(),
        };
        store.conn()?.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS chat_history (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                timestamp TEXT NOT NULL,
                user_message TEXT NOT NULL,
                ai_response TEXT,
                action TEXT,
                params TEXT,
                status TEXT NOT NULL DEFAULT 'pending',
                error_message TEXT
            );
            "#,
        )?;

        tracing::debug!(path = %store.db_path.display(), "history store opened");
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.db_path
    }

    fn conn(&self) -> Result<Connection> {
        Ok(Connection::open(&self.db_path)?)
    }

    /// PENDING 상태로 새 요청 추가
    ///
    /// 반환값: 이후 갱신에 사용할 id
    pub fn append(&self, user_message: &str) -> Result<i64> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO chat_history (timestamp, user_message, status) VALUES (?1, ?2, ?3)",
            rusqlite::params![
                Local::now().to_rfc3339(),
                user_message,
                EntryStatus::Pending.as_str()
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// 부분 업데이트
    ///
    /// 지정된 필드만 변경합니다. 필드가 없으면 아무것도 하지 않습니다.
    /// 상태 변경은 아직 PENDING인 행에만 적용되며, 반환값은 행이 갱신되었는지 여부입니다.
    pub fn update(&self, entry_id: i64, update: &ConversationUpdate) -> Result<bool> {
        if update.is_empty() {
            return Ok(false);
        }
        // PENDING으로 되돌리는 갱신은 무시
        if update.status.is_some_and(|status| !status.is_terminal()) {
            tracing::warn!(entry_id, "refusing to reset a history entry to pending");
            return Ok(false);
        }

        let mut columns: Vec<&str> = Vec::new();
        let mut values: Vec<Value> = Vec::new();

        if let Some(ai_response) = &update.ai_response {
            columns.push("ai_response = ?");
            values.push(Value::Text(ai_response.clone()));
        }
        if let Some(action) = &update.action {
            columns.push("action = ?");
            values.push(Value::Text(action.clone()));
        }
        if let Some(params) = &update.params {
            columns.push("params = ?");
            values.push(Value::Text(encode_params(params)?));
        }
        if let Some(status) = update.status {
            columns.push("status = ?");
            values.push(Value::Text(status.as_str().to_string()));
        }
        if let Some(error_message) = &update.error_message {
            columns.push("error_message = ?");
            values.push(Value::Text(error_message.clone()));
        }

        let mut query = format!("UPDATE chat_history SET {} WHERE id = ?", columns.join(", "));
        values.push(Value::Integer(entry_id));
        if update.status.is_some() {
            query.push_str(" AND status = 'pending'");
        }

        let changed = self.conn()?.execute(&query, params_from_iter(values.iter()))?;
        if changed == 0 {
            tracing::warn!(entry_id, "history update matched no pending entry");
        }
        Ok(changed > 0)
    }

    /// 최근 N건을 시간순(오래된 것 먼저)으로 반환
    pub fn recent_context(&self, count: usize) -> Result<Vec<ConversationEntry>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT id, timestamp, user_message, ai_response, action, params, status, error_message
            FROM chat_history
            ORDER BY id DESC
            LIMIT ?1
            "#,
        )?;

        let limit = i64::try_from(count).unwrap_or(i64::MAX);
        let mut history = stmt
            .query_map([limit], row_to_entry)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        history.reverse();
        Ok(history)
    }

    /// id로 한 건 조회
    pub fn get(&self, entry_id: i64) -> Result<Option<ConversationEntry>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT id, timestamp, user_message, ai_response, action, params, status, error_message
            FROM chat_history
            WHERE id = ?1
            "#,
        )?;
        let mut rows = stmt.query_map([entry_id], row_to_entry)?;
        Ok(rows.next().transpose()?)
    }

    /// 전체 삭제
    pub fn clear(&self) -> Result<()> {
        let removed = self.conn()?.execute("DELETE FROM chat_history", [])?;
        tracing::info!(removed, "history cleared");
        Ok(())
    }
}

fn encode_params(params: &ActionParams) -> Result<String> {
    serde_json::to_string(params)
        .map_err(|e| DualPilotError::InvalidCommand(format!("unserializable params: {}", e)))
}

fn row_to_entry(row: &Row<'_>) -> rusqlite::Result<ConversationEntry> {
    let timestamp: String = row.get(1)?;
    let timestamp = DateTime::parse_from_rfc3339(&timestamp)
        .map(|t| t.with_timezone(&Local))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(1, Type::Text, Box::new(e)))?;

    let params: Option<String> = row.get(5)?;
    let params = params
        .map(|json| serde_json::from_str::<ActionParams>(&json))
        .transpose()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(5, Type::Text, Box::new(e)))?;

    let status: String = row.get(6)?;
    let status = EntryStatus::parse(&status).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            6,
            Type::Text,
            format!("unknown status '{}'", status).into(),
        )
    })?;

    Ok(ConversationEntry {
        id: row.get(0)?,
        timestamp,
        user_message: row.get(2)?,
        ai_response: row.get(3)?,
        action: row.get(4)?,
        params,
        status,
        error_message: row.get(7)?,
    })
}
