use crate::Result;
use eoka::Page;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub const AGE_GATE: &str = "1_age_gate";
pub const ERROR_MODAL: &str = "error_modal";
pub const HOME_HERO: &str = "2_home_hero";
pub const VIDEO_GRID: &str = "3_video_grid";
pub const ERROR_HOME: &str = "error_home";

/// Screenshot sink. Files are overwritten on every run.
#[derive(Debug, Clone)]
pub struct Artifacts {
    dir: PathBuf,
}

impl Artifacts {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the PNG for a screenshot name.
    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{}.png", name))
    }

    /// Capture the viewport to `<dir>/<name>.png`.
    pub async fn capture(&self, page: &Page, name: &str) -> Result<PathBuf> {
        let data = page.screenshot().await?;
        self.write(name, &data)
    }

    /// Capture evidence for a failed stage. A failure here is logged and
    /// dropped so it never hides the stage error.
    pub async fn capture_failure(&self, page: &Page, name: &str) -> Option<PathBuf> {
        match self.capture(page, name).await {
            Ok(path) => Some(path),
            Err(e) => {
                warn!("Failed to save screenshot {}: {}", name, e);
                None
            }
        }
    }

    fn write(&self, name: &str, data: &[u8]) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.path(name);
        std::fs::write(&path, data)?;
        info!("screenshot: {}", path.display());
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_naming() {
        let artifacts = Artifacts::new("/tmp/verification");
        assert_eq!(
            artifacts.path(AGE_GATE),
            PathBuf::from("/tmp/verification/1_age_gate.png")
        );
        assert_eq!(
            artifacts.path(ERROR_HOME),
            PathBuf::from("/tmp/verification/error_home.png")
        );
    }

    #[test]
    fn test_write_creates_dir_and_overwrites() {
        let tmp = tempfile::tempdir().unwrap();
        let artifacts = Artifacts::new(tmp.path().join("nested"));

        let path = artifacts.write(HOME_HERO, b"first").unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"first");

        artifacts.write(HOME_HERO, b"2nd").unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"2nd");
    }
}
