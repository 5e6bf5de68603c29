//! 설정 파일 (TOML)
//!
//! 위치: `DUALPILOT_CONFIG` 환경 변수, 없으면 `<config_dir>/dualpilot/config.toml`.
//! 파일이 없으면 기본값을 사용하고, 형식이 잘못되면 에러를 반환합니다.

use crate::models::directory_cache::SortMode;
use crate::utils::error::{DualPilotError, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

const CONFIG_ENV: &str = "DUALPILOT_CONFIG";
const APP_DIR: &str = "dualpilot";

/// 어시스턴트(텍스트 생성 엔드포인트) 설정
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistantConfig {
    pub base_url: String,
    pub model: String,
    /// API 키를 읽을 환경 변수 이름 (키 자체는 파일에 저장하지 않음)
    pub api_key_env: String,
    pub temperature: f32,
    pub timeout_secs: u64,
    /// 해석기에 전달할 최근 대화 수
    pub context_size: usize,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.deepseek.com".to_string(),
            model: "deepseek-chat".to_string(),
            api_key_env: "DUALPILOT_API_KEY".to_string(),
            temperature: 0.3,
            timeout_secs: 60,
            context_size: 6,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    pub db_path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelsConfig {
    pub sort: String,
}

impl Default for PanelsConfig {
    fn default() -> Self {
        Self {
            sort: SortMode::default().as_str().to_string(),
        }
    }
}

/// 전체 설정
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub assistant: AssistantConfig,
    pub history: HistoryConfig,
    pub panels: PanelsConfig,
}

impl AppConfig {
    /// 기본 위치에서 설정 읽기
    pub fn load() -> Result<Self> {
        match Self::default_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    /// 지정한 파일에서 설정 읽기
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no config file, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(DualPilotError::from_io(e, path)),
        };
        let config = Self::parse(&content)
            .map_err(|e| DualPilotError::Config(format!("{}: {}", path.display(), e)))?;
        tracing::info!(path = %path.display(), "config loaded");
        Ok(config)
    }

    /// TOML 문자열 파싱 및 검증
    pub fn parse(content: &str) -> Result<Self> {
        let config: AppConfig =
            toml::from_str(content).map_err(|e| DualPilotError::Config(e.to_string()))?;
        config.sort_mode()?;
        if config.assistant.timeout_secs == 0 {
            return Err(DualPilotError::Config(
                "assistant.timeout_secs must be greater than 0".to_string(),
            ));
        }
        Ok(config)
    }

    pub fn default_path() -> Option<PathBuf> {
        if let Ok(custom) = env::var(CONFIG_ENV) {
            let trimmed = custom.trim();
            if !trimmed.is_empty() {
                return Some(PathBuf::from(trimmed));
            }
        }
        dirs::config_dir().map(|dir| dir.join(APP_DIR).join("config.toml"))
    }

    pub fn sort_mode(&self) -> Result<SortMode> {
        self.panels.sort.parse()
    }

    /// 대화 기록 DB 경로
    pub fn history_path(&self) -> PathBuf {
        if let Some(path) = &self.history.db_path {
            return path.clone();
        }
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR)
            .join("chat_history.db")
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| DualPilotError::Config(e.to_string()))
    }
}
