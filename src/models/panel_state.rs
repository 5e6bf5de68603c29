use crate::models::directory_cache::{DirectoryCache, SortMode};
use crate::models::file_entry::DirectoryEntry;
use crate::system::filesystem::{normalize_path, DirectoryLister};
use crate::utils::error::{DualPilotError, Result};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// 패널 위치
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PanelSide {
    Left,
    Right,
}

impl PanelSide {
    /// 반대편 패널
    pub fn other(self) -> Self {
        match self {
            PanelSide::Left => PanelSide::Right,
            PanelSide::Right => PanelSide::Left,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PanelSide::Left => "left",
            PanelSide::Right => "right",
        }
    }
}

impl fmt::Display for PanelSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PanelSide {
    type Err = DualPilotError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "left" => Ok(PanelSide::Left),
            "right" => Ok(PanelSide::Right),
            other => Err(DualPilotError::InvalidCommand(format!(
                "panel side must be 'left' or 'right', got '{}'",
                other
            ))),
        }
    }
}

/// 패널 상태
///
/// 디렉토리 캐시와 검색어를 보관합니다. 캐시는 이동/새로고침 시 통째로 교체됩니다.
#[derive(Debug, Clone)]
pub struct PanelState {
    cache: DirectoryCache,
    search: String,
}

impl PanelState {
    /// 경로를 열어 패널 생성
    pub fn open(lister: &dyn DirectoryLister, path: &Path, sort_mode: SortMode) -> Result<Self> {
        let path = normalize_path(path)?;
        Ok(Self {
            cache: DirectoryCache::load(lister, &path, sort_mode)?,
            search: String::new(),
        })
    }

    pub fn current_path(&self) -> &Path {
        self.cache.root_path()
    }

    pub fn cache(&self) -> &DirectoryCache {
        &self.cache
    }

    pub fn sort_mode(&self) -> SortMode {
        self.cache.sort_mode()
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    /// 경로 변경
    ///
    /// 상대 경로는 현재 경로 기준으로 해석합니다. 실패 시 기존 상태를 유지합니다.
    pub fn navigate(&mut self, lister: &dyn DirectoryLister, path: &Path) -> Result<()> {
        let target = normalize_path(&self.current_path().join(path))?;
        self.cache = DirectoryCache::load(lister, &target, self.cache.sort_mode())?;
        self.search.clear();
        Ok(())
    }

    /// 상위 디렉토리로 이동. 루트이면 false 반환
    pub fn go_parent(&mut self, lister: &dyn DirectoryLister) -> Result<bool> {
        let Some(parent) = self.current_path().parent().map(Path::to_path_buf) else {
            return Ok(false);
        };
        self.navigate(lister, &parent)?;
        Ok(true)
    }

    /// 파일 목록 새로고침
    ///
    /// 검색어는 유지됩니다.
    pub fn refresh(&mut self, lister: &dyn DirectoryLister) -> Result<()> {
        let path = self.current_path().to_path_buf();
        self.cache = DirectoryCache::load(lister, &path, self.cache.sort_mode())?;
        Ok(())
    }

    /// 정렬 모드 변경 (디스크 접근 없음)
    pub fn set_sort_mode(&mut self, sort_mode: SortMode) {
        self.cache.set_sort_mode(sort_mode);
    }

    pub fn set_search(&mut self, query: &str) {
        self.search = query.to_string();
    }

    pub fn clear_search(&mut self) {
        self.search.clear();
    }

    /// 현재 검색어가 적용된 엔트리 목록
    pub fn visible_entries(&self) -> Vec<&DirectoryEntry> {
        self.cache.filter(&self.search)
    }

    /// 현재 디렉토리 안의 항목 경로
    pub fn child_path(&self, name: &str) -> PathBuf {
        self.current_path().join(name)
    }
}

/// 인터프리터로 넘기는 패널 정보 (경로와 활성 패널만)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelSnapshot {
    pub left_path: PathBuf,
    pub right_path: PathBuf,
    pub active: PanelSide,
}

impl PanelSnapshot {
    pub fn path(&self, side: PanelSide) -> &Path {
        match side {
            PanelSide::Left => &self.left_path,
            PanelSide::Right => &self.right_path,
        }
    }
}

/// 좌/우 패널 쌍
#[derive(Debug, Clone)]
pub struct PanelPair {
    left: PanelState,
    right: PanelState,
    active: PanelSide,
}

impl PanelPair {
    pub fn new(left: PanelState, right: PanelState) -> Self {
        Self {
            left,
            right,
            active: PanelSide::Left,
        }
    }

    pub fn side(&self, side: PanelSide) -> &PanelState {
        match side {
            PanelSide::Left => &self.left,
            PanelSide::Right => &self.right,
        }
    }

    pub fn side_mut(&mut self, side: PanelSide) -> &mut PanelState {
        match side {
            PanelSide::Left => &mut self.left,
            PanelSide::Right => &mut self.right,
        }
    }

    pub fn active_side(&self) -> PanelSide {
        self.active
    }

    pub fn set_active(&mut self, side: PanelSide) {
        self.active = side;
    }

    /// 활성 패널 전환 (Tab)
    pub fn switch_active(&mut self) {
        self.active = self.active.other();
    }

    pub fn active(&self) -> &PanelState {
        self.side(self.active)
    }

    pub fn active_mut(&mut self) -> &mut PanelState {
        self.side_mut(self.active)
    }

    pub fn inactive(&self) -> &PanelState {
        self.side(self.active.other())
    }

    pub fn path(&self, side: PanelSide) -> &Path {
        self.side(side).current_path()
    }

    pub fn snapshot(&self) -> PanelSnapshot {
        PanelSnapshot {
            left_path: self.left.current_path().to_path_buf(),
            right_path: self.right.current_path().to_path_buf(),
            active: self.active,
        }
    }

    /// 양쪽 패널 새로고침
    ///
    /// 두 패널 모두 시도한 뒤 첫 번째 에러를 반환합니다.
    pub fn refresh_all(&mut self, lister: &dyn DirectoryLister) -> Result<()> {
        let left = self.left.refresh(lister);
        let right = self.right.refresh(lister);
        left.and(right)
    }
}
