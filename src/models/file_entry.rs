use crate::utils::formatter::format_size;
use std::path::PathBuf;
use std::time::SystemTime;

/// 상위 디렉토리 참조 엔트리 이름
pub const PARENT_ENTRY_NAME: &str = "..";

/// 디렉토리 엔트리
///
/// 로드 시점의 스냅샷입니다. 파일 시스템이 바뀌어도 자동 갱신되지 않습니다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryEntry {
    /// 파일/디렉토리 이름
    pub name: String,
    /// 전체 경로
    pub full_path: PathBuf,
    /// 디렉토리 여부
    pub is_directory: bool,
    /// 바이트 단위 크기 (디렉토리는 0)
    pub size_bytes: u64,
    /// 수정 시간 (읽을 수 없으면 UNIX_EPOCH)
    pub modified_at: SystemTime,
}

impl DirectoryEntry {
    /// 새 파일 엔트리 생성
    pub fn file(name: String, full_path: PathBuf, size_bytes: u64, modified_at: SystemTime) -> Self {
        Self {
            name,
            full_path,
            is_directory: false,
            size_bytes,
            modified_at,
        }
    }

    /// 새 디렉토리 엔트리 생성
    pub fn directory(name: String, full_path: PathBuf, modified_at: SystemTime) -> Self {
        Self {
            name,
            full_path,
            is_directory: true,
            size_bytes: 0,
            modified_at,
        }
    }

    /// 상위 디렉토리 참조(`..`) 엔트리 생성
    pub fn parent_reference(parent: PathBuf) -> Self {
        Self::directory(PARENT_ENTRY_NAME.to_string(), parent, SystemTime::UNIX_EPOCH)
    }

    pub fn is_parent_reference(&self) -> bool {
        self.name == PARENT_ENTRY_NAME
    }

    /// 표시 문자열: 파일은 "이름 (크기)", 디렉토리는 이름만
    pub fn display_name(&self) -> String {
        if self.is_directory {
            self.name.clone()
        } else {
            format!("{} ({})", self.name, format_size(self.size_bytes))
        }
    }
}
