use crate::domain::ports::Storage;
use crate::utils::error::{EtlError, Result};
use std::path::{Path, PathBuf};

/// 匯出檔案存放在本機目錄
#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
}

impl LocalStorage {
    /// 由組裝層呼叫一次，目錄不存在時建立
    pub fn init(base_path: impl AsRef<Path>) -> Result<Self> {
        let base_path = base_path.as_ref().to_path_buf();
        std::fs::create_dir_all(&base_path)?;
        tracing::debug!("📁 Export directory ready: {}", base_path.display());
        Ok(Self { base_path })
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }
}

impl Storage for LocalStorage {
    async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
        if path.is_empty() || path.contains(['/', '\\']) || path.contains("..") {
            return Err(EtlError::invalid_parameter(
                "filename",
                format!("'{}' is not a plain file name", path),
            ));
        }

        let full_path = self.base_path.join(path);
        tokio::fs::write(&full_path, data).await?;
        tracing::debug!("💾 Wrote {} bytes to {}", data.len(), full_path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_init_creates_directory_and_writes() {
        let temp_dir = TempDir::new().unwrap();
        let export_dir = temp_dir.path().join("nested").join("exports");

        let storage = LocalStorage::init(&export_dir).unwrap();
        assert!(export_dir.is_dir());

        storage.write_file("report.zip", b"data").await.unwrap();
        assert_eq!(std::fs::read(export_dir.join("report.zip")).unwrap(), b"data");
    }

    #[tokio::test]
    async fn test_rejects_path_like_names() {
        let temp_dir = TempDir::new().unwrap();
        let storage = LocalStorage::init(temp_dir.path()).unwrap();

        assert!(storage.write_file("../escape.zip", b"x").await.is_err());
        assert!(storage.write_file("sub/file.zip", b"x").await.is_err());
        assert!(storage.write_file("", b"x").await.is_err());
    }
}
