pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::CliConfig;

pub use crate::config::{cli::LocalStorage, toml_config::RunConfig};
pub use crate::core::{
    etl::EtlEngine,
    flattener::{flatten_response, flatten_responses},
    pipeline::KybPipeline,
    runner::{HttpBatchRunner, ReplayRunner},
    serializer::to_csv,
};
pub use crate::domain::model::{FlatRecord, RawResponse};
pub use crate::utils::error::{EtlError, Result};
