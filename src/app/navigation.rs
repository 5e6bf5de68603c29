use super::*;
use crate::models::file_entry::PARENT_ENTRY_NAME;
use crate::models::SortMode;

impl App {
    // === 패널 이동 ===

    /// 활성 패널 경로 변경 (상대 경로는 현재 경로 기준)
    pub fn change_directory(&mut self, path: &Path) -> Result<()> {
        self.panels.active_mut().navigate(&self.filesystem, path)?;
        tracing::debug!(path = %self.panels.active().current_path().display(), "navigated");
        Ok(())
    }

    /// 상위 디렉토리로 이동
    pub fn go_parent(&mut self) -> Result<bool> {
        self.panels.active_mut().go_parent(&self.filesystem)
    }

    /// 항목 열기
    ///
    /// `..`은 상위로, 디렉토리는 해당 경로로 이동합니다. 파일은 열 수 없습니다.
    pub fn activate_entry(&mut self, name: &str) -> Result<()> {
        if name == PARENT_ENTRY_NAME {
            self.go_parent()?;
            return Ok(());
        }

        let entry = self
            .panels
            .active()
            .cache()
            .find(name)
            .cloned()
            .ok_or_else(|| DualPilotError::NotFound {
                path: self.panels.active().child_path(name),
            })?;

        if !entry.is_directory {
            return Err(DualPilotError::NotADirectory {
                path: entry.full_path,
            });
        }
        self.change_directory(&entry.full_path)
    }

    /// 활성 패널 전환
    pub fn switch_panel(&mut self) {
        self.panels.switch_active();
    }

    // === 정렬/검색 (디스크 접근 없음) ===

    pub fn set_sort_mode(&mut self, mode: SortMode) {
        self.panels.active_mut().set_sort_mode(mode);
    }

    /// 검색어 설정. 빈 문자열이면 검색 해제
    pub fn set_search(&mut self, query: &str) {
        let panel = self.panels.active_mut();
        if query.trim().is_empty() {
            panel.clear_search();
        } else {
            panel.set_search(query.trim());
        }
    }
}
