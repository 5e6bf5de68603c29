//! 파일 작업 실행기
//!
//! 패턴 기반 배치 작업(복사/이동/삭제)과 단일 항목 작업(폴더/파일 생성, 이름 변경)을 수행합니다.
//! 배치 작업은 항상 디스크를 새로 읽고, 첫 번째 항목 실패에서 중단합니다 (이미 처리된 항목은 되돌리지 않음).

use crate::models::command::{ensure_plain_name, Action};
use crate::models::file_entry::DirectoryEntry;
use crate::models::panel_state::PanelSnapshot;
use crate::system::filesystem::FileSystem;
use crate::utils::error::{DualPilotError, Result};
use crate::utils::formatter::pluralize;
use crate::utils::glob::glob_match;
use std::fs;
use std::path::{Path, PathBuf};

/// 배치 작업 유형
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchOperation {
    Copy,
    Move,
    Delete,
}

impl BatchOperation {
    /// 에러 메시지용 동사
    pub fn verb(self) -> &'static str {
        match self {
            BatchOperation::Copy => "copy",
            BatchOperation::Move => "move",
            BatchOperation::Delete => "delete",
        }
    }

    fn past_tense(self) -> &'static str {
        match self {
            BatchOperation::Copy => "Copied",
            BatchOperation::Move => "Moved",
            BatchOperation::Delete => "Deleted",
        }
    }
}

/// 배치 작업 결과
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchReport {
    pub operation: BatchOperation,
    pub pattern: String,
    /// 처리된 항목 이름 (처리 순서)
    pub items: Vec<String>,
}

impl BatchReport {
    pub fn summary(&self) -> String {
        format!(
            "{} {} matching '{}'",
            self.operation.past_tense(),
            pluralize(self.items.len(), "item", "items"),
            self.pattern
        )
    }
}

/// 실행기
pub struct FileOperationExecutor {
    filesystem: FileSystem,
}

impl FileOperationExecutor {
    pub fn new(filesystem: FileSystem) -> Self {
        Self { filesystem }
    }

    pub fn filesystem(&self) -> &FileSystem {
        &self.filesystem
    }

    /// 검증된 액션 실행
    ///
    /// 배치 작업의 패널은 스냅샷의 경로로, 생성/이름 변경은 활성 패널 경로로 해석합니다.
    /// 반환값: 사람이 읽을 수 있는 결과 요약
    pub fn execute(&self, action: &Action, panels: &PanelSnapshot) -> Result<String> {
        let active_dir = panels.path(panels.active);
        tracing::info!(action = %action.kind(), "executing action");

        match action {
            Action::Copy { pattern, from, to } => self
                .copy_pattern(pattern, panels.path(*from), panels.path(*to))
                .map(|report| report.summary()),
            Action::Move { pattern, from, to } => self
                .move_pattern(pattern, panels.path(*from), panels.path(*to))
                .map(|report| report.summary()),
            Action::Delete { pattern, from } => self
                .delete_pattern(pattern, panels.path(*from))
                .map(|report| report.summary()),
            Action::CreateFolder { name } => {
                let path = self.create_folder(active_dir, name)?;
                Ok(format!("Created folder {}", path.display()))
            }
            Action::CreateFile { name, content } => {
                let path = self.create_file(active_dir, name, content)?;
                Ok(format!("Created file {}", path.display()))
            }
            Action::Rename { old_name, new_name } => {
                let path = self.rename(active_dir, old_name, new_name)?;
                Ok(format!("Renamed '{}' to {}", old_name, path.display()))
            }
            Action::Error { reason } => Err(DualPilotError::InvalidCommand(reason.clone())),
        }
    }

    // === 패턴 배치 작업 ===

    /// 패턴과 일치하는 항목을 대상 디렉토리로 복사
    ///
    /// 디렉토리는 재귀 복사되며 기존 디렉토리에 병합됩니다. 파일은 덮어씁니다.
    pub fn copy_pattern(&self, pattern: &str, source_dir: &Path, dest_dir: &Path) -> Result<BatchReport> {
        self.ensure_directory(dest_dir)?;
        self.run_batch(BatchOperation::Copy, pattern, source_dir, |entry| {
            self.copy_entry(&entry.full_path, dest_dir).map(|_| ())
        })
    }

    /// 패턴과 일치하는 항목을 대상 디렉토리로 이동
    pub fn move_pattern(&self, pattern: &str, source_dir: &Path, dest_dir: &Path) -> Result<BatchReport> {
        self.ensure_directory(dest_dir)?;
        self.run_batch(BatchOperation::Move, pattern, source_dir, |entry| {
            self.move_entry(&entry.full_path, dest_dir).map(|_| ())
        })
    }

    /// 패턴과 일치하는 항목 삭제 (디렉토리는 재귀 삭제)
    pub fn delete_pattern(&self, pattern: &str, dir: &Path) -> Result<BatchReport> {
        self.run_batch(BatchOperation::Delete, pattern, dir, |entry| {
            self.filesystem.delete_path(&entry.full_path)
        })
    }

    /// 디스크를 새로 읽어 패턴과 일치하는 항목 선택 (이름순)
    pub fn select_matches(&self, pattern: &str, dir: &Path) -> Result<Vec<DirectoryEntry>> {
        let mut matches: Vec<DirectoryEntry> = self
            .filesystem
            .read_directory(dir)?
            .into_iter()
            .filter(|entry| glob_match(pattern, &entry.name))
            .collect();
        matches.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(matches)
    }

    fn run_batch<F>(
        &self,
        operation: BatchOperation,
        pattern: &str,
        source_dir: &Path,
        mut apply: F,
    ) -> Result<BatchReport>
    where
        F: FnMut(&DirectoryEntry) -> Result<()>,
    {
        let matches = self.select_matches(pattern, source_dir)?;
        if matches.is_empty() {
            return Err(DualPilotError::NoMatch {
                pattern: pattern.to_string(),
            });
        }

        let mut items = Vec::with_capacity(matches.len());
        for entry in &matches {
            tracing::debug!(operation = operation.verb(), item = %entry.name, "batch item");
            apply(entry).map_err(|source| DualPilotError::BatchItemFailed {
                operation: operation.verb(),
                item: entry.name.clone(),
                source: Box::new(source),
            })?;
            items.push(entry.name.clone());
        }

        Ok(BatchReport {
            operation,
            pattern: pattern.to_string(),
            items,
        })
    }

    // === 단일 항목 작업 ===

    /// 항목 하나를 대상 디렉토리로 복사
    ///
    /// 반환값: 복사된 항목 경로
    pub fn copy_entry(&self, source: &Path, dest_dir: &Path) -> Result<PathBuf> {
        let dest = Self::destination_for(source, dest_dir)?;
        if fs::symlink_metadata(source).is_err() {
            return Err(DualPilotError::NotFound {
                path: source.to_path_buf(),
            });
        }

        if source.is_dir() {
            if self.filesystem.is_recursive_path(source, dest_dir) {
                return Err(DualPilotError::RecursiveCopy {
                    src: source.to_path_buf(),
                    dest: dest.clone(),
                });
            }
            self.filesystem.copy_directory(source, &dest)?;
        } else {
            self.filesystem.copy_file(source, &dest)?;
        }
        Ok(dest)
    }

    /// 항목 하나를 대상 디렉토리로 이동 (대상에 같은 이름이 있으면 실패)
    pub fn move_entry(&self, source: &Path, dest_dir: &Path) -> Result<PathBuf> {
        let dest = Self::destination_for(source, dest_dir)?;
        if source.is_dir() && self.filesystem.is_recursive_path(source, dest_dir) {
            return Err(DualPilotError::RecursiveCopy {
                src: source.to_path_buf(),
                dest,
            });
        }
        self.filesystem.move_path(source, &dest)?;
        Ok(dest)
    }

    /// 항목 하나 삭제
    pub fn delete_entry(&self, path: &Path) -> Result<()> {
        self.filesystem.delete_path(path)
    }

    /// 새 폴더 생성 (이미 있으면 실패)
    pub fn create_folder(&self, dir: &Path, name: &str) -> Result<PathBuf> {
        ensure_plain_name(name)?;
        let path = dir.join(name);
        self.filesystem.create_directory(&path)?;
        tracing::info!(path = %path.display(), "folder created");
        Ok(path)
    }

    /// 새 파일 생성 (이미 있으면 실패)
    pub fn create_file(&self, dir: &Path, name: &str, content: &str) -> Result<PathBuf> {
        ensure_plain_name(name)?;
        let path = dir.join(name);
        self.filesystem.create_file(&path, content)?;
        tracing::info!(path = %path.display(), bytes = content.len(), "file created");
        Ok(path)
    }

    /// 같은 디렉토리 안에서 이름 변경
    pub fn rename(&self, dir: &Path, old_name: &str, new_name: &str) -> Result<PathBuf> {
        ensure_plain_name(old_name)?;
        ensure_plain_name(new_name)?;
        let src = dir.join(old_name);
        let dest = dir.join(new_name);
        self.filesystem.rename_path(&src, &dest)?;
        tracing::info!(from = %src.display(), to = %dest.display(), "renamed");
        Ok(dest)
    }

    fn ensure_directory(&self, dir: &Path) -> Result<()> {
        let metadata = fs::metadata(dir).map_err(|e| DualPilotError::from_io(e, dir))?;
        if metadata.is_dir() {
            Ok(())
        } else {
            Err(DualPilotError::NotADirectory {
                path: dir.to_path_buf(),
            })
        }
    }

    fn destination_for(source: &Path, dest_dir: &Path) -> Result<PathBuf> {
        let name = source.file_name().ok_or_else(|| {
            DualPilotError::InvalidCommand(format!("'{}' has no file name", source.display()))
        })?;
        Ok(dest_dir.join(name))
    }
}

impl Default for FileOperationExecutor {
    fn default() -> Self {
        Self::new(FileSystem::new())
    }
}
