use crate::core::flattener::flatten_responses;
use crate::core::serializer::to_csv;
use crate::core::{BatchRunner, ConfigProvider, Pipeline, RawResponse, ReportResult, Storage};
use crate::utils::error::Result;

/// Runs the batch, flattens the responses into report rows and writes the files.
pub struct KybPipeline<S: Storage, R: BatchRunner, C: ConfigProvider> {
    pub(crate) storage: S,
    pub(crate) runner: R,
    pub(crate) config: C,
}

impl<S: Storage, R: BatchRunner, C: ConfigProvider> KybPipeline<S, R, C> {
    pub fn new(storage: S, runner: R, config: C) -> Self {
        Self {
            storage,
            runner,
            config,
        }
    }
}

#[async_trait::async_trait]
impl<S: Storage, R: BatchRunner, C: ConfigProvider> Pipeline for KybPipeline<S, R, C> {
    async fn extract(&self) -> Result<Vec<RawResponse>> {
        let responses = self.runner.run().await?;
        tracing::info!("📊 Collected {} responses", responses.len());
        Ok(responses)
    }

    async fn transform(&self, responses: Vec<RawResponse>) -> Result<ReportResult> {
        tracing::info!("🔧 Flattening {} responses", responses.len());

        let records = flatten_responses(&responses);
        let dropped = responses.len() - records.len();
        let csv_output = to_csv(&records)?;

        if records.is_empty() {
            tracing::warn!("📝 No data processed. The report file will be empty.");
        } else {
            tracing::info!(
                "✅ Flattened {} records ({} responses skipped)",
                records.len(),
                dropped
            );
        }

        Ok(ReportResult {
            responses,
            records,
            csv_output,
            dropped,
        })
    }

    async fn load(&self, result: ReportResult) -> Result<String> {
        if let Some(responses_file) = self.config.responses_file() {
            let json_data = serde_json::to_string_pretty(&result.responses)?;
            self.storage
                .write_file(responses_file, json_data.as_bytes())
                .await?;
            tracing::info!("💾 Saved {} raw responses to: {}", result.responses.len(), responses_file);
        }

        let report_file = self.config.report_file();
        self.storage
            .write_file(&report_file, result.csv_output.as_bytes())
            .await?;

        let output_path = format!("{}/{}", self.config.output_path(), report_file);
        tracing::info!("📦 Report saved: {}", output_path);
        Ok(output_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::EtlError;
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    #[derive(Clone)]
    struct MockStorage {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    }

    impl MockStorage {
        fn new() -> Self {
            Self {
                files: Arc::new(Mutex::new(HashMap::new())),
            }
        }

        async fn get_text(&self, path: &str) -> Option<String> {
            let files = self.files.lock().await;
            files
                .get(path)
                .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
        }
    }

    impl Storage for MockStorage {
        async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned().ok_or_else(|| {
                EtlError::IoError(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("File not found: {}", path),
                ))
            })
        }

        async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
            let mut files = self.files.lock().await;
            files.insert(path.to_string(), data.to_vec());
            Ok(())
        }
    }

    struct FixedRunner(Vec<RawResponse>);

    #[async_trait::async_trait]
    impl BatchRunner for FixedRunner {
        async fn run(&self) -> Result<Vec<RawResponse>> {
            Ok(self.0.clone())
        }
    }

    struct TestConfig {
        responses_file: Option<&'static str>,
    }

    impl ConfigProvider for TestConfig {
        fn output_path(&self) -> &str {
            "./out"
        }

        fn report_file(&self) -> String {
            "report.csv".to_string()
        }

        fn responses_file(&self) -> Option<&str> {
            self.responses_file
        }
    }

    fn responses() -> Vec<RawResponse> {
        vec![
            RawResponse::new(
                "KYB Verify",
                Some(200),
                Some(json!({"TransactionID": "T1", "CountryCode": "US", "Record": {"RecordStatus": "Match"}})),
            ),
            RawResponse::no_response("KYB Verify"),
        ]
    }

    #[tokio::test]
    async fn test_transform_counts_dropped_responses() {
        let pipeline = KybPipeline::new(
            MockStorage::new(),
            FixedRunner(responses()),
            TestConfig { responses_file: None },
        );

        let extracted = pipeline.extract().await.unwrap();
        let result = pipeline.transform(extracted).await.unwrap();

        assert_eq!(result.responses.len(), 2);
        assert_eq!(result.records.len(), 1);
        assert_eq!(result.dropped, 1);
        assert!(result.csv_output.ends_with("\nT1,Match,US,,,,,,,,,"));
    }

    #[tokio::test]
    async fn test_load_writes_report_and_responses() {
        let storage = MockStorage::new();
        let pipeline = KybPipeline::new(
            storage.clone(),
            FixedRunner(responses()),
            TestConfig {
                responses_file: Some("raw.json"),
            },
        );

        let result = pipeline.transform(responses()).await.unwrap();
        let path = pipeline.load(result).await.unwrap();

        assert_eq!(path, "./out/report.csv");
        let report = storage.get_text("report.csv").await.unwrap();
        assert!(report.starts_with("Transaction ID,"));

        let saved: Vec<RawResponse> =
            serde_json::from_str(&storage.get_text("raw.json").await.unwrap()).unwrap();
        assert_eq!(saved, responses());
    }

    #[tokio::test]
    async fn test_load_empty_report_without_responses_file() {
        let storage = MockStorage::new();
        let pipeline = KybPipeline::new(
            storage.clone(),
            FixedRunner(vec![RawResponse::no_response("KYB Verify")]),
            TestConfig { responses_file: None },
        );

        let extracted = pipeline.extract().await.unwrap();
        let result = pipeline.transform(extracted).await.unwrap();
        assert_eq!(result.csv_output, "");

        pipeline.load(result).await.unwrap();
        assert_eq!(storage.get_text("report.csv").await.unwrap(), "");
        assert!(storage.get_text("raw.json").await.is_none());
    }
}
