use crate::models::file_entry::DirectoryEntry;
use crate::system::filesystem::DirectoryLister;
use crate::utils::error::{DualPilotError, Result};
use crate::utils::glob::search_match;
use std::cmp::Ordering;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// 정렬 기준
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortBy {
    /// 이름
    Name,
    /// 크기
    Size,
    /// 수정 날짜
    Modified,
}

/// 정렬 순서
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    /// 오름차순
    Ascending,
    /// 내림차순
    Descending,
}

/// 정렬 모드 (기준 × 순서)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortMode {
    pub by: SortBy,
    pub order: SortOrder,
}

impl SortMode {
    pub const fn new(by: SortBy, order: SortOrder) -> Self {
        Self { by, order }
    }

    pub fn as_str(&self) -> &'static str {
        match (self.by, self.order) {
            (SortBy::Name, SortOrder::Ascending) => "name_asc",
            (SortBy::Name, SortOrder::Descending) => "name_desc",
            (SortBy::Size, SortOrder::Ascending) => "size_asc",
            (SortBy::Size, SortOrder::Descending) => "size_desc",
            (SortBy::Modified, SortOrder::Ascending) => "date_asc",
            (SortBy::Modified, SortOrder::Descending) => "date_desc",
        }
    }
}

impl Default for SortMode {
    fn default() -> Self {
        Self::new(SortBy::Name, SortOrder::Ascending)
    }
}

impl fmt::Display for SortMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortMode {
    type Err = DualPilotError;

    fn from_str(s: &str) -> Result<Self> {
        let (by, order) = s
            .trim()
            .split_once('_')
            .ok_or_else(|| DualPilotError::Config(format!("invalid sort mode: {}", s)))?;
        let by = match by.to_ascii_lowercase().as_str() {
            "name" => SortBy::Name,
            "size" => SortBy::Size,
            "date" => SortBy::Modified,
            _ => return Err(DualPilotError::Config(format!("invalid sort key: {}", by))),
        };
        let order = match order.to_ascii_lowercase().as_str() {
            "asc" => SortOrder::Ascending,
            "desc" => SortOrder::Descending,
            _ => return Err(DualPilotError::Config(format!("invalid sort order: {}", order))),
        };
        Ok(Self::new(by, order))
    }
}

/// 디렉토리 캐시
///
/// 디렉토리를 한 번 읽어 메모리에 보관합니다. 정렬/검색은 디스크에 접근하지 않습니다.
/// 디렉토리가 항상 파일보다 앞에 오며, 루트가 아니면 `..` 엔트리가 맨 앞에 옵니다.
#[derive(Debug, Clone)]
pub struct DirectoryCache {
    root_path: PathBuf,
    entries: Vec<DirectoryEntry>,
    sort_mode: SortMode,
}

impl DirectoryCache {
    /// 디렉토리 로드
    pub fn load(lister: &dyn DirectoryLister, path: &Path, sort_mode: SortMode) -> Result<Self> {
        let mut entries = lister.list(path)?;
        sort_entries(&mut entries, sort_mode);

        if let Some(parent) = path.parent() {
            entries.insert(0, DirectoryEntry::parent_reference(parent.to_path_buf()));
        }

        Ok(Self {
            root_path: path.to_path_buf(),
            entries,
            sort_mode,
        })
    }

    pub fn root_path(&self) -> &Path {
        &self.root_path
    }

    /// 캐시된 엔트리 (정렬 순서)
    pub fn entries(&self) -> &[DirectoryEntry] {
        &self.entries
    }

    pub fn sort_mode(&self) -> SortMode {
        self.sort_mode
    }

    /// 정렬 모드 변경 (메모리 내 재정렬만 수행)
    pub fn set_sort_mode(&mut self, sort_mode: SortMode) {
        self.sort_mode = sort_mode;
        let has_parent = self.has_parent_reference();
        let body = if has_parent {
            &mut self.entries[1..]
        } else {
            &mut self.entries[..]
        };
        let mut listed = body.to_vec();
        sort_entries(&mut listed, sort_mode);
        body.clone_from_slice(&listed);
    }

    /// 검색어로 필터링
    ///
    /// 빈 검색어는 캐시 전체를 순서 그대로 반환합니다. 그 외에는 이름 또는 표시 문자열이
    /// 검색어와 일치하는 항목만 반환합니다 (대소문자 무시, `..` 제외).
    pub fn filter(&self, query: &str) -> Vec<&DirectoryEntry> {
        if query.is_empty() {
            return self.entries.iter().collect();
        }

        self.entries
            .iter()
            .filter(|entry| !entry.is_parent_reference())
            .filter(|entry| {
                search_match(query, &entry.name) || search_match(query, &entry.display_name())
            })
            .collect()
    }

    /// 이름으로 엔트리 찾기
    pub fn find(&self, name: &str) -> Option<&DirectoryEntry> {
        self.entries
            .iter()
            .find(|entry| !entry.is_parent_reference() && entry.name == name)
    }

    /// 파일 개수 반환
    pub fn file_count(&self) -> usize {
        self.entries.iter().filter(|e| !e.is_directory).count()
    }

    /// 디렉토리 개수 반환 (`..` 제외)
    pub fn dir_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| e.is_directory && !e.is_parent_reference())
            .count()
    }

    /// 전체 크기 반환 (바이트)
    pub fn total_size(&self) -> u64 {
        self.entries.iter().map(|e| e.size_bytes).sum()
    }

    fn has_parent_reference(&self) -> bool {
        self.entries
            .first()
            .is_some_and(DirectoryEntry::is_parent_reference)
    }
}

/// 엔트리 정렬: 디렉토리 먼저, 디렉토리와 파일은 각각 따로 정렬
///
/// 크기/날짜 정렬에서 디렉토리는 이름 오름차순을 사용합니다.
pub fn sort_entries(entries: &mut Vec<DirectoryEntry>, mode: SortMode) {
    let (mut dirs, mut files): (Vec<_>, Vec<_>) =
        entries.drain(..).partition(|entry| entry.is_directory);

    match mode.by {
        SortBy::Name => dirs.sort_by(|a, b| apply_order(compare_names(a, b), mode.order)),
        SortBy::Size | SortBy::Modified => dirs.sort_by(compare_names),
    }

    files.sort_by(|a, b| {
        let primary = match mode.by {
            SortBy::Name => compare_names(a, b),
            SortBy::Size => a.size_bytes.cmp(&b.size_bytes),
            SortBy::Modified => a.modified_at.cmp(&b.modified_at),
        };
        apply_order(primary, mode.order).then_with(|| compare_names(a, b))
    });

    entries.extend(dirs);
    entries.extend(files);
}

fn compare_names(a: &DirectoryEntry, b: &DirectoryEntry) -> Ordering {
    a.name.to_lowercase().cmp(&b.name.to_lowercase())
}

fn apply_order(ordering: Ordering, order: SortOrder) -> Ordering {
    match order {
        SortOrder::Ascending => ordering,
        SortOrder::Descending => ordering.reverse(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::time::{Duration, SystemTime};

    /// 호출 횟수를 세는 가짜 리스터
    struct CountingLister {
        entries: Vec<DirectoryEntry>,
        calls: Cell<usize>,
    }

    impl CountingLister {
        fn new(entries: Vec<DirectoryEntry>) -> Self {
            Self {
                entries,
                calls: Cell::new(0),
            }
        }
    }

    impl DirectoryLister for CountingLister {
        fn list(&self, _path: &Path) -> Result<Vec<DirectoryEntry>> {
            self.calls.set(self.calls.get() + 1);
            Ok(self.entries.clone())
        }
    }

    fn at(secs: u64) -> SystemTime {
        SystemTime::UNIX_EPOCH + Duration::from_secs(secs)
    }

    fn sample_entries() -> Vec<DirectoryEntry> {
        let root = PathBuf::from("/data");
        vec![
            DirectoryEntry::file("b.txt".into(), root.join("b.txt"), 300, at(10)),
            DirectoryEntry::directory("Zeta".into(), root.join("Zeta"), at(5)),
            DirectoryEntry::file("a.txt".into(), root.join("a.txt"), 100, at(30)),
            DirectoryEntry::directory("alpha".into(), root.join("alpha"), at(50)),
            DirectoryEntry::file("C.log".into(), root.join("C.log"), 200, at(20)),
        ]
    }

    fn names(cache: &DirectoryCache) -> Vec<&str> {
        cache.entries().iter().map(|e| e.name.as_str()).collect()
    }

    const ALL_MODES: [&str; 6] = [
        "name_asc",
        "name_desc",
        "size_asc",
        "size_desc",
        "date_asc",
        "date_desc",
    ];

    #[test]
    fn test_sort_mode_parse_and_display() {
        for mode in ALL_MODES {
            let parsed: SortMode = mode.parse().unwrap();
            assert_eq!(parsed.to_string(), mode);
        }
        assert!("size".parse::<SortMode>().is_err());
        assert!("color_asc".parse::<SortMode>().is_err());
    }

    #[test]
    fn test_load_puts_parent_reference_first() {
        let lister = CountingLister::new(sample_entries());
        let cache = DirectoryCache::load(&lister, Path::new("/data"), SortMode::default()).unwrap();

        assert_eq!(names(&cache), vec!["..", "alpha", "Zeta", "a.txt", "b.txt", "C.log"]);
        assert_eq!(cache.entries()[0].full_path, PathBuf::from("/"));
        assert_eq!(lister.calls.get(), 1);
    }

    #[test]
    fn test_root_has_no_parent_reference() {
        let lister = CountingLister::new(sample_entries());
        let cache = DirectoryCache::load(&lister, Path::new("/"), SortMode::default()).unwrap();
        assert_eq!(cache.entries()[0].name, "alpha");
    }

    #[test]
    fn test_directories_always_before_files() {
        for mode in ALL_MODES {
            let lister = CountingLister::new(sample_entries());
            let cache =
                DirectoryCache::load(&lister, Path::new("/data"), mode.parse().unwrap()).unwrap();
            let first_file = cache
                .entries()
                .iter()
                .position(|e| !e.is_directory)
                .unwrap();
            assert!(
                cache.entries()[first_file..].iter().all(|e| !e.is_directory),
                "directory after file in mode {}",
                mode
            );
        }
    }

    #[test]
    fn test_size_and_date_sort_order_files_only() {
        let lister = CountingLister::new(sample_entries());
        let mut cache =
            DirectoryCache::load(&lister, Path::new("/data"), "size_desc".parse().unwrap())
                .unwrap();
        assert_eq!(names(&cache), vec!["..", "alpha", "Zeta", "b.txt", "C.log", "a.txt"]);

        cache.set_sort_mode("date_asc".parse().unwrap());
        assert_eq!(names(&cache), vec!["..", "alpha", "Zeta", "b.txt", "C.log", "a.txt"]);

        cache.set_sort_mode("date_desc".parse().unwrap());
        assert_eq!(names(&cache), vec!["..", "alpha", "Zeta", "a.txt", "C.log", "b.txt"]);
    }

    #[test]
    fn test_name_desc_reverses_both_groups() {
        let lister = CountingLister::new(sample_entries());
        let cache =
            DirectoryCache::load(&lister, Path::new("/data"), "name_desc".parse().unwrap())
                .unwrap();
        assert_eq!(names(&cache), vec!["..", "Zeta", "alpha", "C.log", "b.txt", "a.txt"]);
    }

    #[test]
    fn test_resort_never_touches_lister() {
        let lister = CountingLister::new(sample_entries());
        let mut cache =
            DirectoryCache::load(&lister, Path::new("/data"), SortMode::default()).unwrap();

        for mode in ALL_MODES {
            cache.set_sort_mode(mode.parse().unwrap());
            let _ = cache.filter("txt");
        }
        assert_eq!(lister.calls.get(), 1);
        assert_eq!(cache.entries()[0].name, "..");
    }

    #[test]
    fn test_empty_filter_returns_cache_in_order() {
        let lister = CountingLister::new(sample_entries());
        let cache = DirectoryCache::load(&lister, Path::new("/data"), SortMode::default()).unwrap();

        let filtered: Vec<&DirectoryEntry> = cache.filter("");
        let all: Vec<&DirectoryEntry> = cache.entries().iter().collect();
        assert_eq!(filtered, all);
    }

    #[test]
    fn test_filter_matches_name_or_display_string() {
        let lister = CountingLister::new(sample_entries());
        let cache = DirectoryCache::load(&lister, Path::new("/data"), SortMode::default()).unwrap();

        let by_name: Vec<&str> = cache.filter("*.TXT").iter().map(|e| e.name.as_str()).collect();
        assert_eq!(by_name, vec!["a.txt", "b.txt"]);

        // 표시 문자열의 크기 부분으로도 검색
        let by_size: Vec<&str> = cache.filter("300.0").iter().map(|e| e.name.as_str()).collect();
        assert_eq!(by_size, vec!["b.txt"]);

        assert!(cache.filter("nothing-like-this").is_empty());
    }

    #[test]
    fn test_counts_and_find() {
        let lister = CountingLister::new(sample_entries());
        let cache = DirectoryCache::load(&lister, Path::new("/data"), SortMode::default()).unwrap();

        assert_eq!(cache.dir_count(), 2);
        assert_eq!(cache.file_count(), 3);
        assert_eq!(cache.total_size(), 600);
        assert!(cache.find("a.txt").is_some());
        assert!(cache.find("..").is_none());
    }
}
