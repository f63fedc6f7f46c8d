use crate::domain::model::{ExportArtifact, ExportOutcome, Workbook};
use crate::domain::ports::{ArtifactEncoder, Storage};
use crate::utils::error::Result;
use async_trait::async_trait;

/// 匯出流程：extract 取資料，transform 轉成工作表，load 由 EtlEngine 統一處理
#[async_trait]
pub trait Pipeline: Send + Sync {
    type Data: Send;

    /// 用於預設檔名，例如 "media"
    fn kind(&self) -> &str;

    async fn extract(&self) -> Result<Self::Data>;

    fn item_count(&self, data: &Self::Data) -> usize;

    fn transform(&self, data: Self::Data) -> Result<Workbook>;
}

pub struct EtlEngine<S: Storage, E: ArtifactEncoder> {
    storage: S,
    encoder: E,
    download_base_url: String,
}

impl<S: Storage, E: ArtifactEncoder> EtlEngine<S, E> {
    pub fn new(storage: S, encoder: E, download_base_url: impl Into<String>) -> Self {
        Self {
            storage,
            encoder,
            download_base_url: download_base_url.into(),
        }
    }

    pub fn extension(&self) -> &'static str {
        self.encoder.extension()
    }

    /// `file_stem` 不含副檔名；同名檔案會被覆蓋
    pub async fn run<P: Pipeline>(&self, pipeline: &P, file_stem: &str) -> Result<ExportOutcome> {
        tracing::info!("🚀 Starting {} export", pipeline.kind());

        // Extract
        let data = pipeline.extract().await?;
        let total_items = pipeline.item_count(&data);
        tracing::info!("📥 Extracted {} {} items", total_items, pipeline.kind());

        if total_items == 0 {
            tracing::info!("📭 Nothing to export for {}", pipeline.kind());
            return Ok(ExportOutcome::Empty);
        }

        // Transform
        let workbook = pipeline.transform(data)?;
        tracing::info!("🔄 Built {} sheet(s)", workbook.sheets.len());

        // Load
        let bytes = self.encoder.encode(&workbook)?;
        let filename = format!("{}.{}", file_stem, self.encoder.extension());
        self.storage.write_file(&filename, &bytes).await?;
        tracing::info!("💾 Saved {} ({} bytes)", filename, bytes.len());

        Ok(ExportOutcome::Created(ExportArtifact {
            total_items,
            download_url: format!(
                "{}/{}",
                self.download_base_url.trim_end_matches('/'),
                filename
            ),
            filename,
        }))
    }
}
