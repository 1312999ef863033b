use crate::domain::model::{RawResponse, ReportResult};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn output_path(&self) -> &str;
    /// 報表檔名，已展開 `{timestamp}`
    fn report_file(&self) -> String;
    /// `None` 表示不輸出中繼回應檔
    fn responses_file(&self) -> Option<&str>;
}

/// Produces the raw responses of one batch run.
#[async_trait]
pub trait BatchRunner: Send + Sync {
    async fn run(&self) -> Result<Vec<RawResponse>>;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Vec<RawResponse>>;
    async fn transform(&self, responses: Vec<RawResponse>) -> Result<ReportResult>;
    async fn load(&self, result: ReportResult) -> Result<String>;
}
