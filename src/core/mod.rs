pub mod etl;
pub mod extractor;
pub mod flattener;
pub mod formatters;
pub mod pipeline;
pub mod runner;
pub mod serializer;

pub use crate::domain::model::{FlatRecord, RawResponse, ReportResult};
pub use crate::domain::ports::{BatchRunner, ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
