use crate::domain::model::{MetapropertyMap, PageRequest, Record, Workbook};
use crate::utils::error::Result;
use async_trait::async_trait;

/// 上游資產管理系統的讀取能力
#[async_trait]
pub trait MediaSource: Send + Sync {
    /// 回傳單一頁；空陣列代表已經沒有資料
    async fn list_media(&self, request: &PageRequest) -> Result<Vec<Record>>;

    async fn get_media(&self, id: &str) -> Result<Option<Record>>;

    async fn list_metaproperties(&self, options: bool, count: bool) -> Result<MetapropertyMap>;
}

pub trait Storage: Send + Sync {
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// 把工作表序列化成可下載的檔案
pub trait ArtifactEncoder: Send + Sync {
    fn extension(&self) -> &'static str;

    fn encode(&self, workbook: &Workbook) -> Result<Vec<u8>>;
}
