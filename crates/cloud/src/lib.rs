//! Clients for the services Sonora talks to outside its database:
//! S3-compatible object storage, the PDF text-extraction service and an
//! OpenAI-compatible chat-completions API.
//!
//! Each service sits behind an `async-trait` trait so the API and worker
//! can run against in-memory fakes in tests.

pub mod config;
pub mod error;
pub mod llm;
pub mod storage;
pub mod text;

pub use config::{AiConfig, StorageConfig, TextExtractionConfig};
pub use error::CloudError;
pub use llm::{ChatCompletionsClient, TextGenerator};
pub use storage::{ObjectStore, S3ObjectStore};
pub use text::{HttpTextExtractor, TextExtractor};
