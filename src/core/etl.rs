use crate::core::Pipeline;
use crate::utils::error::Result;
use std::time::Instant;

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    /// Extract, transform and load in order; a failure in any phase stops the run
    /// before the report is written.
    pub async fn run(&self) -> Result<String> {
        let started = Instant::now();
        tracing::info!("Starting KYB batch...");

        tracing::info!("📥 Extracting responses...");
        let responses = self.pipeline.extract().await?;

        tracing::info!("🔄 Building report...");
        let result = self.pipeline.transform(responses).await?;
        let row_count = result.records.len();

        tracing::info!("💾 Writing output...");
        let output_path = self.pipeline.load(result).await?;

        tracing::info!(
            "🏁 Batch finished in {:?}: {} report rows",
            started.elapsed(),
            row_count
        );
        Ok(output_path)
    }
}
