use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DualPilotError {
    #[error("Not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("Access denied: {}", path.display())]
    AccessDenied { path: PathBuf },

    #[error("Already exists: {}", path.display())]
    AlreadyExists { path: PathBuf },

    #[error("Not a directory: {}", path.display())]
    NotADirectory { path: PathBuf },

    #[error("Source and destination are the same: {}", path.display())]
    SameSourceAndDest { path: PathBuf },

    #[error("Cannot copy a directory into itself: {} -> {}", src.display(), dest.display())]
    RecursiveCopy { src: PathBuf, dest: PathBuf },

    #[error("No entries match pattern '{pattern}'")]
    NoMatch { pattern: String },

    #[error("Invalid command: {0}")]
    InvalidCommand(String),

    #[error("Interpreter failure: {0}")]
    InterpreterFailure(String),

    /// 배치 작업 중 한 항목 실패 (배치 전체 실패로 보고)
    #[error("Failed to {operation} '{item}': {source}")]
    BatchItemFailed {
        operation: &'static str,
        item: String,
        #[source]
        source: Box<DualPilotError>,
    },

    #[error("Another command is still in progress")]
    CommandInFlight,

    /// 진행 중인 명령과 맞지 않는 결과 (이미 처리됐거나 다른 요청의 것)
    #[error("No command in flight for entry #{entry_id}")]
    StaleDelivery { entry_id: i64 },

    #[error("History store error: {0}")]
    History(#[from] rusqlite::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl DualPilotError {
    /// io::Error를 경로 정보가 포함된 에러로 변환
    pub fn from_io(err: io::Error, path: &Path) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => DualPilotError::NotFound {
                path: path.to_path_buf(),
            },
            io::ErrorKind::PermissionDenied => DualPilotError::AccessDenied {
                path: path.to_path_buf(),
            },
            io::ErrorKind::AlreadyExists => DualPilotError::AlreadyExists {
                path: path.to_path_buf(),
            },
            _ => DualPilotError::Io(err),
        }
    }
}

pub type Result<T> = std::result::Result<T, DualPilotError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_io_maps_kinds() {
        let path = Path::new("/tmp/x");
        let err = DualPilotError::from_io(io::Error::from(io::ErrorKind::PermissionDenied), path);
        assert!(matches!(err, DualPilotError::AccessDenied { .. }));

        let err = DualPilotError::from_io(io::Error::from(io::ErrorKind::NotFound), path);
        assert!(matches!(err, DualPilotError::NotFound { .. }));

        let err = DualPilotError::from_io(io::Error::other("boom"), path);
        assert!(matches!(err, DualPilotError::Io(_)));
    }

    #[test]
    fn test_batch_failure_message_names_item_and_cause() {
        let err = DualPilotError::BatchItemFailed {
            operation: "copy",
            item: "a.txt".to_string(),
            source: Box::new(DualPilotError::AccessDenied {
                path: PathBuf::from("/dest/a.txt"),
            }),
        };
        let message = err.to_string();
        assert!(message.contains("copy"));
        assert!(message.contains("a.txt"));
        assert!(message.contains("Access denied: /dest/a.txt"));
    }
}
