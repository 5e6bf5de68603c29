use crate::models::file_entry::DirectoryEntry;
use crate::utils::error::{DualPilotError, Result};
use std::fs;
use std::io::Write;
use std::path::{Component, Path, PathBuf};
use std::time::SystemTime;

/// 디렉토리 목록 조회 인터페이스
///
/// 패널 캐시는 이 인터페이스로만 디스크를 읽습니다.
pub trait DirectoryLister {
    fn list(&self, path: &Path) -> Result<Vec<DirectoryEntry>>;
}

/// 경로를 절대 경로로 바꾸고 `.`/`..`를 정리 (디스크 접근 없음)
pub fn normalize_path(path: &Path) -> Result<PathBuf> {
    let absolute = std::path::absolute(path).map_err(|e| DualPilotError::from_io(e, path))?;
    let mut normalized = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    Ok(normalized)
}

/// 두 경로가 디스크의 같은 항목을 가리키는지 확인
///
/// 심볼릭 링크로 열린 패널이나 하드 링크도 같은 항목으로 봅니다.
/// 어느 한쪽이 없으면 `false`.
pub fn is_same_entry(a: &Path, b: &Path) -> bool {
    if a == b {
        return true;
    }
    if let (Ok(ca), Ok(cb)) = (fs::canonicalize(a), fs::canonicalize(b)) {
        if ca == cb {
            return true;
        }
    }
    same_inode(a, b)
}

#[cfg(unix)]
fn same_inode(a: &Path, b: &Path) -> bool {
    use std::os::unix::fs::MetadataExt;
    match (fs::metadata(a), fs::metadata(b)) {
        (Ok(ma), Ok(mb)) => ma.dev() == mb.dev() && ma.ino() == mb.ino(),
        _ => false,
    }
}

#[cfg(not(unix))]
fn same_inode(_a: &Path, _b: &Path) -> bool {
    false
}

/// 파일 시스템 모듈
pub struct FileSystem;

impl FileSystem {
    /// 새 파일 시스템 인스턴스 생성
    pub fn new() -> Self {
        Self
    }

    /// 디렉토리 읽기
    ///
    /// 주어진 경로의 디렉토리를 읽어서 엔트리 리스트를 반환합니다 (정렬 없음).
    pub fn read_directory(&self, path: &Path) -> Result<Vec<DirectoryEntry>> {
        // 1. 경로 존재 확인
        let metadata = fs::metadata(path).map_err(|e| DualPilotError::from_io(e, path))?;

        // 2. 디렉토리 여부 확인
        if !metadata.is_dir() {
            return Err(DualPilotError::NotADirectory {
                path: path.to_path_buf(),
            });
        }

        // 3. 디렉토리 읽기
        let read_dir = fs::read_dir(path).map_err(|e| DualPilotError::from_io(e, path))?;

        let mut entries = Vec::new();
        for entry in read_dir {
            // 에러 발생 시 해당 엔트리는 스킵
            let Ok(entry) = entry else { continue };

            let entry_path = entry.path();
            let name = entry.file_name().to_string_lossy().to_string();

            // 목록 조회 후 사라진 파일은 크기/시간 0으로 취급
            let Ok(metadata) = fs::metadata(&entry_path) else {
                entries.push(DirectoryEntry::file(
                    name,
                    entry_path,
                    0,
                    SystemTime::UNIX_EPOCH,
                ));
                continue;
            };

            let modified = metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH);
            if metadata.is_dir() {
                entries.push(DirectoryEntry::directory(name, entry_path, modified));
            } else {
                entries.push(DirectoryEntry::file(
                    name,
                    entry_path,
                    metadata.len(),
                    modified,
                ));
            }
        }

        Ok(entries)
    }

    /// 파일 복사 (대상이 있으면 덮어쓰기)
    ///
    /// 반환값: 복사된 바이트 수
    #[allow(clippy::unused_self)]
    pub fn copy_file(&self, src: &Path, dest: &Path) -> Result<u64> {
        // 소스와 대상이 동일한지 확인 (링크 포함, 덮어쓰면 원본이 잘림)
        if is_same_entry(src, dest) {
            return Err(DualPilotError::SameSourceAndDest {
                path: src.to_path_buf(),
            });
        }

        if !src.exists() {
            return Err(DualPilotError::NotFound {
                path: src.to_path_buf(),
            });
        }

        fs::copy(src, dest).map_err(|e| DualPilotError::from_io(e, dest))
    }

    /// 디렉토리 재귀 복사
    ///
    /// 대상 디렉토리가 이미 있으면 내용을 병합합니다.
    /// 반환값: 복사된 총 바이트 수
    pub fn copy_directory(&self, src: &Path, dest: &Path) -> Result<u64> {
        if is_same_entry(src, dest) {
            return Err(DualPilotError::SameSourceAndDest {
                path: src.to_path_buf(),
            });
        }

        if !src.is_dir() {
            return Err(DualPilotError::NotADirectory {
                path: src.to_path_buf(),
            });
        }

        // 대상 디렉토리 생성
        fs::create_dir_all(dest).map_err(|e| DualPilotError::from_io(e, dest))?;

        let mut total_bytes = 0u64;

        for entry in fs::read_dir(src).map_err(|e| DualPilotError::from_io(e, src))? {
            let entry = entry.map_err(|e| DualPilotError::from_io(e, src))?;
            let entry_path = entry.path();
            let dest_path = dest.join(entry.file_name());

            if entry_path.is_dir() {
                total_bytes += self.copy_directory(&entry_path, &dest_path)?;
            } else {
                total_bytes += self.copy_file(&entry_path, &dest_path)?;
            }
        }

        Ok(total_bytes)
    }

    /// 파일/디렉토리 복사 (종류에 따라 분기)
    pub fn copy_path(&self, src: &Path, dest: &Path) -> Result<u64> {
        if src.is_dir() {
            self.copy_directory(src, dest)
        } else {
            self.copy_file(src, dest)
        }
    }

    /// 파일/디렉토리 이동
    ///
    /// 먼저 rename을 시도하고, 실패하면 복사 후 삭제합니다.
    /// 대상이 이미 있으면 실패합니다.
    pub fn move_path(&self, src: &Path, dest: &Path) -> Result<()> {
        if is_same_entry(src, dest) {
            return Err(DualPilotError::SameSourceAndDest {
                path: src.to_path_buf(),
            });
        }

        if fs::symlink_metadata(src).is_err() {
            return Err(DualPilotError::NotFound {
                path: src.to_path_buf(),
            });
        }

        if dest.exists() {
            return Err(DualPilotError::AlreadyExists {
                path: dest.to_path_buf(),
            });
        }

        // 같은 파일시스템 내에서는 rename이 빠름
        if fs::rename(src, dest).is_ok() {
            return Ok(());
        }

        // rename 실패 시 복사 후 삭제
        self.copy_path(src, dest)?;
        self.delete_path(src)?;
        Ok(())
    }

    /// 파일/디렉토리 영구 삭제 (디렉토리는 재귀)
    #[allow(clippy::unused_self)]
    pub fn delete_path(&self, path: &Path) -> Result<()> {
        let metadata = fs::symlink_metadata(path).map_err(|e| DualPilotError::from_io(e, path))?;

        let result = if metadata.is_dir() {
            fs::remove_dir_all(path)
        } else {
            fs::remove_file(path)
        };
        result.map_err(|e| DualPilotError::from_io(e, path))
    }

    /// 새 디렉토리 생성
    #[allow(clippy::unused_self)]
    pub fn create_directory(&self, path: &Path) -> Result<()> {
        if path.exists() {
            return Err(DualPilotError::AlreadyExists {
                path: path.to_path_buf(),
            });
        }

        fs::create_dir(path).map_err(|e| DualPilotError::from_io(e, path))
    }

    /// 새 파일 생성 (이미 있으면 실패)
    #[allow(clippy::unused_self)]
    pub fn create_file(&self, path: &Path, content: &str) -> Result<()> {
        let mut file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)
            .map_err(|e| DualPilotError::from_io(e, path))?;

        file.write_all(content.as_bytes())
            .map_err(|e| DualPilotError::from_io(e, path))
    }

    /// 파일/디렉토리 이름 변경
    #[allow(clippy::unused_self)]
    pub fn rename_path(&self, src: &Path, dest: &Path) -> Result<()> {
        if fs::symlink_metadata(src).is_err() {
            return Err(DualPilotError::NotFound {
                path: src.to_path_buf(),
            });
        }

        if dest.exists() {
            return Err(DualPilotError::AlreadyExists {
                path: dest.to_path_buf(),
            });
        }

        fs::rename(src, dest).map_err(|e| DualPilotError::from_io(e, src))
    }

    /// 디렉토리를 자기 자신(또는 하위) 안으로 복사하려는지 검사
    #[allow(clippy::unused_self)]
    pub fn is_recursive_path(&self, source: &Path, dest: &Path) -> bool {
        if !source.is_dir() {
            return false;
        }
        let Ok(canonical_source) = source.canonicalize() else {
            return false;
        };
        let Ok(canonical_dest) = dest.canonicalize() else {
            return false;
        };
        canonical_dest.starts_with(&canonical_source)
    }
}

impl DirectoryLister for FileSystem {
    fn list(&self, path: &Path) -> Result<Vec<DirectoryEntry>> {
        self.read_directory(path)
    }
}

impl Default for FileSystem {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_read_directory() {
        let fs_instance = FileSystem::new();
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("test.txt"), "test content").unwrap();
        fs::create_dir(temp.path().join("sub")).unwrap();

        let entries = fs_instance.read_directory(temp.path()).unwrap();
        assert_eq!(entries.len(), 2);

        let file_entry = entries.iter().find(|e| e.name == "test.txt").unwrap();
        assert!(!file_entry.is_directory);
        assert_eq!(file_entry.size_bytes, 12);

        let dir_entry = entries.iter().find(|e| e.name == "sub").unwrap();
        assert!(dir_entry.is_directory);
        assert_eq!(dir_entry.size_bytes, 0);
    }

    #[test]
    fn test_read_nonexistent_directory() {
        let fs_instance = FileSystem::new();
        let result = fs_instance.read_directory(Path::new("/nonexistent/path/12345"));

        match result {
            Err(DualPilotError::NotFound { .. }) => {}
            other => panic!("Expected NotFound error, got {:?}", other),
        }
    }

    #[test]
    fn test_read_file_as_directory() {
        let fs_instance = FileSystem::new();
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("plain.txt");
        fs::write(&file, "x").unwrap();

        assert!(matches!(
            fs_instance.read_directory(&file),
            Err(DualPilotError::NotADirectory { .. })
        ));
    }

    #[test]
    fn test_normalize_path() {
        let normalized = normalize_path(Path::new("/a/b/../c/./d")).unwrap();
        assert_eq!(normalized, PathBuf::from("/a/c/d"));

        let relative = normalize_path(Path::new("x")).unwrap();
        assert!(relative.is_absolute());
    }

    #[test]
    fn test_copy_directory_merges_into_existing() {
        let fs_instance = FileSystem::new();
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("src");
        let dest = temp.path().join("dest");
        fs::create_dir_all(src.join("nested")).unwrap();
        fs::write(src.join("nested").join("a.txt"), "aaa").unwrap();
        fs::create_dir_all(&dest).unwrap();
        fs::write(dest.join("existing.txt"), "keep").unwrap();

        let bytes = fs_instance.copy_directory(&src, &dest).unwrap();

        assert_eq!(bytes, 3);
        assert!(dest.join("nested").join("a.txt").exists());
        assert!(dest.join("existing.txt").exists());
    }

    #[test]
    fn test_copy_file_same_source_and_dest() {
        let fs_instance = FileSystem::new();
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("a.txt");
        fs::write(&file, "x").unwrap();

        assert!(matches!(
            fs_instance.copy_file(&file, &file),
            Err(DualPilotError::SameSourceAndDest { .. })
        ));
    }

    #[test]
    fn test_copy_file_hard_link_is_same_entry() {
        let fs_instance = FileSystem::new();
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("a.txt");
        let linked = temp.path().join("b.txt");
        fs::write(&file, "precious").unwrap();
        fs::hard_link(&file, &linked).unwrap();

        assert!(is_same_entry(&file, &linked));
        assert!(matches!(
            fs_instance.copy_file(&file, &linked),
            Err(DualPilotError::SameSourceAndDest { .. })
        ));
        assert_eq!(fs::read_to_string(&file).unwrap(), "precious");
        assert!(!is_same_entry(&file, &temp.path().join("missing.txt")));
    }

    #[cfg(unix)]
    #[test]
    fn test_copy_file_through_symlinked_directory() {
        let fs_instance = FileSystem::new();
        let temp = TempDir::new().unwrap();
        let real = temp.path().join("real");
        fs::create_dir_all(&real).unwrap();
        fs::write(real.join("a.txt"), "precious").unwrap();
        let link = temp.path().join("link");
        std::os::unix::fs::symlink(&real, &link).unwrap();

        assert!(matches!(
            fs_instance.copy_file(&real.join("a.txt"), &link.join("a.txt")),
            Err(DualPilotError::SameSourceAndDest { .. })
        ));
        assert!(matches!(
            fs_instance.move_path(&real.join("a.txt"), &link.join("a.txt")),
            Err(DualPilotError::SameSourceAndDest { .. })
        ));
        assert_eq!(fs::read_to_string(real.join("a.txt")).unwrap(), "precious");
    }

    #[test]
    fn test_move_path_refuses_to_overwrite() {
        let fs_instance = FileSystem::new();
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("a.txt");
        let dest = temp.path().join("b.txt");
        fs::write(&src, "a").unwrap();
        fs::write(&dest, "b").unwrap();

        assert!(matches!(
            fs_instance.move_path(&src, &dest),
            Err(DualPilotError::AlreadyExists { .. })
        ));
        assert_eq!(fs::read_to_string(&dest).unwrap(), "b");
        assert!(src.exists());
    }

    #[test]
    fn test_delete_path_recursive() {
        let fs_instance = FileSystem::new();
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("tree");
        fs::create_dir_all(dir.join("a").join("b")).unwrap();
        fs::write(dir.join("a").join("b").join("leaf.txt"), "x").unwrap();

        fs_instance.delete_path(&dir).unwrap();
        assert!(!dir.exists());

        assert!(matches!(
            fs_instance.delete_path(&dir),
            Err(DualPilotError::NotFound { .. })
        ));
    }

    #[test]
    fn test_create_directory() {
        let fs_instance = FileSystem::new();
        let temp = TempDir::new().unwrap();
        let new_dir = temp.path().join("new_folder");

        assert!(fs_instance.create_directory(&new_dir).is_ok());
        assert!(new_dir.is_dir());

        // 이미 존재하면 에러
        match fs_instance.create_directory(&new_dir) {
            Err(DualPilotError::AlreadyExists { .. }) => {}
            other => panic!("Expected AlreadyExists error, got {:?}", other),
        }
    }

    #[test]
    fn test_create_file_writes_content_once() {
        let fs_instance = FileSystem::new();
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("hello.txt");

        fs_instance.create_file(&path, "hello").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "hello");

        assert!(matches!(
            fs_instance.create_file(&path, "again"),
            Err(DualPilotError::AlreadyExists { .. })
        ));
        assert_eq!(fs::read_to_string(&path).unwrap(), "hello");
    }

    #[test]
    fn test_rename_path() {
        let fs_instance = FileSystem::new();
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("old.txt");
        let dest = temp.path().join("new.txt");
        fs::write(&src, "test").unwrap();

        assert!(fs_instance.rename_path(&src, &dest).is_ok());
        assert!(!src.exists());
        assert!(dest.exists());

        // 이미 존재하는 대상
        let src2 = temp.path().join("another.txt");
        fs::write(&src2, "x").unwrap();
        match fs_instance.rename_path(&src2, &dest) {
            Err(DualPilotError::AlreadyExists { .. }) => {}
            other => panic!("Expected AlreadyExists error, got {:?}", other),
        }
        assert!(src2.exists());

        // 없는 소스
        assert!(matches!(
            fs_instance.rename_path(&temp.path().join("ghost.txt"), &temp.path().join("z.txt")),
            Err(DualPilotError::NotFound { .. })
        ));
    }

    #[test]
    fn test_is_recursive_path() {
        let fs_instance = FileSystem::new();
        let temp = TempDir::new().unwrap();
        let parent = temp.path().join("parent");
        let child = parent.join("child");
        let other = temp.path().join("other");
        fs::create_dir_all(&child).unwrap();
        fs::create_dir_all(&other).unwrap();

        assert!(fs_instance.is_recursive_path(&parent, &child));
        assert!(fs_instance.is_recursive_path(&parent, &parent));
        assert!(!fs_instance.is_recursive_path(&parent, &other));
    }
}
