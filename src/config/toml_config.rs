use crate::core::ConfigProvider;
use crate::utils::error::{EtlError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

pub const DEFAULT_REPORT_FILE: &str = "Business_Verification_Results.csv";
pub const DEFAULT_RESPONSES_FILE: &str = "cleaned_api_responses.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    pub run: RunInfo,
    pub data: Option<DataConfig>,
    pub requests: Vec<RequestDefinition>,
    pub output: OutputConfig,
    /// 設定檔所在目錄，資料檔以此為基準
    #[serde(skip)]
    pub base_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunInfo {
    pub name: String,
    pub description: Option<String>,
    pub iteration_count: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// CSV 檔，標題列即變數名稱
    pub file: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestDefinition {
    pub name: String,
    pub method: Option<String>,
    pub url: String,
    pub headers: Option<HashMap<String, String>>,
    pub body: Option<String>,
    pub timeout_seconds: Option<u64>,
}

impl RequestDefinition {
    pub fn method(&self) -> String {
        self.method
            .as_deref()
            .unwrap_or("GET")
            .to_ascii_uppercase()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub path: String,
    pub report_file: Option<String>,
    pub responses_file: Option<String>,
}

impl RunConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        let mut config = Self::from_toml_str(&content)?;
        config.base_dir = path.as_ref().parent().map(Path::to_path_buf);
        Ok(config)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| EtlError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${API_KEY})，未設定的保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = regex::Regex::new(r"\$\{([^}]+)\}").map_err(|e| EtlError::ConfigError {
            message: format!("Invalid environment placeholder pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        validation::validate_non_empty_string("run.name", &self.run.name)?;

        if let Some(count) = self.run.iteration_count {
            validation::validate_positive_number("run.iteration_count", count, 1)?;
        }

        if let Some(data) = &self.data {
            validation::validate_path("data.file", &data.file)?;
            validation::validate_file_extension("data.file", &data.file, &["csv"])?;
        }

        if self.requests.is_empty() {
            return Err(EtlError::MissingConfigError {
                field: "requests".to_string(),
            });
        }

        for (index, request) in self.requests.iter().enumerate() {
            let prefix = format!("requests[{}]", index);
            validation::validate_non_empty_string(&format!("{}.name", prefix), &request.name)?;
            validation::validate_url(&format!("{}.url", prefix), &request.url)?;
            validation::validate_http_method(&format!("{}.method", prefix), &request.method())?;
            if let Some(timeout) = request.timeout_seconds {
                validation::validate_positive_number(
                    &format!("{}.timeout_seconds", prefix),
                    timeout as usize,
                    1,
                )?;
            }
        }

        validation::validate_path("output.path", &self.output.path)?;
        if let Some(report_file) = &self.output.report_file {
            validation::validate_path("output.report_file", report_file)?;
        }

        Ok(())
    }

    /// 資料檔路徑，相對路徑以設定檔目錄為基準
    pub fn data_file(&self) -> Option<PathBuf> {
        let data = self.data.as_ref()?;
        let file = Path::new(&data.file);
        Some(match &self.base_dir {
            Some(base) if file.is_relative() => base.join(file),
            _ => file.to_path_buf(),
        })
    }

    pub fn iteration_count(&self) -> Option<usize> {
        self.run.iteration_count
    }
}

impl ConfigProvider for RunConfig {
    fn output_path(&self) -> &str {
        &self.output.path
    }

    fn report_file(&self) -> String {
        let pattern = self
            .output
            .report_file
            .as_deref()
            .unwrap_or(DEFAULT_REPORT_FILE);

        pattern.replace(
            "{timestamp}",
            &chrono::Utc::now().format("%Y%m%d_%H%M%S").to_string(),
        )
    }

    fn responses_file(&self) -> Option<&str> {
        match self.output.responses_file.as_deref() {
            None => Some(DEFAULT_RESPONSES_FILE),
            Some("") => None,
            Some(file) => Some(file),
        }
    }
}

impl Validate for RunConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
