use super::*;
use crate::models::command::ensure_plain_name;
use std::path::PathBuf;

impl App {
    // === 단일 항목 파일 작업 ===
    //
    // 대상은 활성 패널의 항목이고, 복사/이동 목적지는 반대편 패널 경로입니다.
    // 자연어 명령이 진행 중이면 거부합니다.

    /// 활성 패널 항목을 반대편 패널로 복사
    pub fn copy_to_other_panel(&mut self, name: &str) -> Result<String> {
        self.ensure_idle()?;
        let source = self.selected_path(name)?;
        let dest_dir = self.panels.inactive().current_path().to_path_buf();
        let dest = self.pipeline.executor().copy_entry(&source, &dest_dir)?;
        self.refresh_panels();
        Ok(format!("Copied '{}' to {}", name, dest.display()))
    }

    /// 활성 패널 항목을 반대편 패널로 이동
    pub fn move_to_other_panel(&mut self, name: &str) -> Result<String> {
        self.ensure_idle()?;
        let source = self.selected_path(name)?;
        let dest_dir = self.panels.inactive().current_path().to_path_buf();
        let dest = self.pipeline.executor().move_entry(&source, &dest_dir)?;
        self.refresh_panels();
        Ok(format!("Moved '{}' to {}", name, dest.display()))
    }

    /// 영구 삭제 (디렉토리는 재귀)
    pub fn delete_entry(&mut self, name: &str) -> Result<String> {
        self.ensure_idle()?;
        let target = self.selected_path(name)?;
        self.pipeline.executor().delete_entry(&target)?;
        self.refresh_panels();
        Ok(format!("Deleted '{}'", name))
    }

    pub fn make_directory(&mut self, name: &str) -> Result<String> {
        self.ensure_idle()?;
        let dir = self.panels.active().current_path().to_path_buf();
        let path = self.pipeline.executor().create_folder(&dir, name)?;
        self.refresh_panels();
        Ok(format!("Created folder {}", path.display()))
    }

    pub fn make_file(&mut self, name: &str, content: &str) -> Result<String> {
        self.ensure_idle()?;
        let dir = self.panels.active().current_path().to_path_buf();
        let path = self.pipeline.executor().create_file(&dir, name, content)?;
        self.refresh_panels();
        Ok(format!("Created file {}", path.display()))
    }

    pub fn rename_entry(&mut self, old_name: &str, new_name: &str) -> Result<String> {
        self.ensure_idle()?;
        let dir = self.panels.active().current_path().to_path_buf();
        let path = self.pipeline.executor().rename(&dir, old_name, new_name)?;
        self.refresh_panels();
        Ok(format!("Renamed '{}' to {}", old_name, path.display()))
    }

    /// 활성 패널 안의 항목 경로 (`..` 불가)
    fn selected_path(&self, name: &str) -> Result<PathBuf> {
        ensure_plain_name(name)?;
        Ok(self.panels.active().child_path(name))
    }
}
