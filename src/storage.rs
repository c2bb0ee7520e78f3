use crate::error::AppError;
use async_trait::async_trait;
use std::fs;
use std::path::PathBuf;

#[async_trait]
pub trait ReportSink: Send + Sync {
    /// Persists one rendered report and returns where it went.
    async fn write_report(&self, file_name: &str, content: &str) -> Result<String, AppError>;
}

pub struct FsReportSink {
    dir: PathBuf,
}

impl FsReportSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl ReportSink for FsReportSink {
    async fn write_report(&self, file_name: &str, content: &str) -> Result<String, AppError> {
        fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(file_name);
        fs::write(&path, content)?;
        Ok(path.display().to_string())
    }
}
