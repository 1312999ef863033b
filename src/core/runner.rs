use crate::config::toml_config::{RequestDefinition, RunConfig};
use crate::core::{BatchRunner, RawResponse, Storage};
use crate::utils::error::{EtlError, Result};
use regex::Regex;
use reqwest::{Client, Method};
use serde_json::Value;
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

pub type Variables = HashMap<String, String>;

/// Replaces `{{name}}` placeholders with iteration variables. Unknown names stay as written.
#[derive(Debug, Clone)]
pub struct TemplateRenderer {
    pattern: Regex,
}

impl TemplateRenderer {
    pub fn new() -> Result<Self> {
        let pattern = Regex::new(r"\{\{\s*([^{}]+?)\s*\}\}").map_err(|e| EtlError::ConfigError {
            message: format!("Invalid template pattern: {}", e),
        })?;
        Ok(Self { pattern })
    }

    pub fn render(&self, template: &str, variables: Option<&Variables>) -> String {
        let Some(variables) = variables else {
            return template.to_string();
        };

        self.pattern
            .replace_all(template, |caps: &regex::Captures| {
                variables
                    .get(&caps[1])
                    .cloned()
                    .unwrap_or_else(|| caps[0].to_string())
            })
            .into_owned()
    }
}

/// Parses iteration data: a CSV whose header row names the variables.
pub fn parse_iteration_data(bytes: &[u8]) -> Result<Vec<Variables>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(bytes);

    let mut rows = Vec::new();
    for row in reader.deserialize::<Variables>() {
        rows.push(row?);
    }
    Ok(rows)
}

/// Number of iterations to run: the configured count, else one per data row (at least one).
pub fn plan_iterations(configured: Option<usize>, data_rows: usize) -> usize {
    configured.unwrap_or(data_rows.max(1))
}

/// Variables of iteration `index`; past the last row the last row is reused.
pub fn variables_for(rows: &[Variables], index: usize) -> Option<&Variables> {
    rows.get(index).or_else(|| rows.last())
}

const MAX_PREALLOCATED_RESPONSES: usize = 4096;

/// Up-front capacity for the collected responses; large runs grow on demand.
pub fn response_capacity(iterations: usize, requests: usize) -> usize {
    iterations
        .saturating_mul(requests)
        .min(MAX_PREALLOCATED_RESPONSES)
}

/// Turns a response body into the payload saved for the report.
pub fn parse_response_body(request_name: &str, status_code: u16, body: &[u8]) -> RawResponse {
    if body.iter().all(u8::is_ascii_whitespace) {
        return RawResponse::new(request_name, Some(status_code), None);
    }

    match serde_json::from_slice::<Value>(body) {
        Ok(value) => RawResponse::new(request_name, Some(status_code), Some(value)),
        Err(e) => RawResponse::failed(
            request_name,
            Some(status_code),
            format!("Error parsing JSON response: {}", e),
        ),
    }
}

#[derive(Debug, Clone)]
struct PreparedRequest {
    name: String,
    method: Method,
    url: String,
    headers: Vec<(String, String)>,
    body: Option<String>,
    timeout: Option<Duration>,
}

impl PreparedRequest {
    fn from_definition(index: usize, definition: &RequestDefinition) -> Result<Self> {
        let method = Method::from_bytes(definition.method().as_bytes()).map_err(|e| {
            EtlError::InvalidConfigValueError {
                field: format!("requests[{}].method", index),
                value: definition.method(),
                reason: e.to_string(),
            }
        })?;

        let mut headers: Vec<(String, String)> = definition
            .headers
            .iter()
            .flatten()
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        headers.sort();

        Ok(Self {
            name: definition.name.clone(),
            method,
            url: definition.url.clone(),
            headers,
            body: definition.body.clone(),
            timeout: definition.timeout_seconds.map(Duration::from_secs),
        })
    }
}

/// Sends every request of the collection once per iteration, strictly in sequence.
pub struct HttpBatchRunner {
    client: Client,
    requests: Vec<PreparedRequest>,
    renderer: TemplateRenderer,
    data_file: Option<PathBuf>,
    iteration_count: Option<usize>,
}

impl HttpBatchRunner {
    pub fn new(config: &RunConfig) -> Result<Self> {
        let requests = config
            .requests
            .iter()
            .enumerate()
            .map(|(index, definition)| PreparedRequest::from_definition(index, definition))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            client: Client::new(),
            requests,
            renderer: TemplateRenderer::new()?,
            data_file: config.data_file(),
            iteration_count: config.iteration_count(),
        })
    }

    async fn load_iteration_data(&self) -> Result<Vec<Variables>> {
        let Some(path) = &self.data_file else {
            return Ok(Vec::new());
        };

        tracing::info!("📂 Loading iteration data from: {}", path.display());
        let bytes = tokio::fs::read(path).await?;
        let rows = parse_iteration_data(&bytes)?;
        tracing::info!("📂 Loaded {} data rows", rows.len());
        Ok(rows)
    }

    async fn execute(&self, request: &PreparedRequest, variables: Option<&Variables>) -> RawResponse {
        let url = self.renderer.render(&request.url, variables);
        tracing::debug!("📡 {} {} ({})", request.method, url, request.name);

        let mut builder = self.client.request(request.method.clone(), &url);

        for (key, value) in &request.headers {
            builder = builder.header(key, self.renderer.render(value, variables));
        }

        if let Some(body) = &request.body {
            builder = builder.body(self.renderer.render(body, variables));
        }

        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }

        let response = match builder.send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("❌ '{}' got no response: {}", request.name, e);
                return RawResponse::no_response(&request.name);
            }
        };

        let status = response.status();
        if !status.is_success() {
            tracing::warn!("⚠️ '{}' returned HTTP {}", request.name, status);
        }

        match response.bytes().await {
            Ok(body) => parse_response_body(&request.name, status.as_u16(), &body),
            Err(e) => {
                tracing::warn!("❌ '{}' body could not be read: {}", request.name, e);
                RawResponse::failed(
                    &request.name,
                    Some(status.as_u16()),
                    format!("Error reading response body: {}", e),
                )
            }
        }
    }
}

#[async_trait::async_trait]
impl BatchRunner for HttpBatchRunner {
    async fn run(&self) -> Result<Vec<RawResponse>> {
        let rows = self.load_iteration_data().await?;
        let iterations = plan_iterations(self.iteration_count, rows.len());

        if !rows.is_empty() && iterations > rows.len() {
            tracing::warn!(
                "⚠️ {} iterations requested but only {} data rows; the last row will be reused",
                iterations,
                rows.len()
            );
        }

        tracing::info!(
            "🚀 Running {} iterations x {} requests",
            iterations,
            self.requests.len()
        );

        let mut responses = Vec::with_capacity(response_capacity(iterations, self.requests.len()));
        for index in 0..iterations {
            let variables = variables_for(&rows, index);
            tracing::debug!("🔁 Iteration {}/{}", index + 1, iterations);

            for request in &self.requests {
                responses.push(self.execute(request, variables).await);
            }
        }

        Ok(responses)
    }
}

/// Reads the responses of an earlier run back from a saved responses file.
pub struct ReplayRunner<S: Storage> {
    storage: S,
    path: String,
}

impl<S: Storage> ReplayRunner<S> {
    pub fn new(storage: S, path: String) -> Self {
        Self { storage, path }
    }
}

#[async_trait::async_trait]
impl<S: Storage> BatchRunner for ReplayRunner<S> {
    async fn run(&self) -> Result<Vec<RawResponse>> {
        tracing::info!("📼 Replaying saved responses from: {}", self.path);
        let bytes = self.storage.read_file(&self.path).await?;
        let responses: Vec<RawResponse> = serde_json::from_slice(&bytes)?;
        tracing::info!("📼 Loaded {} saved responses", responses.len());
        Ok(responses)
    }
}
