//! Contract extraction: the pipeline that turns an uploaded PDF into a
//! contract row, the in-process FIFO queue that runs it one document at a
//! time, and the polling loop used by the standalone worker binary.

pub mod error;
pub mod pipeline;
pub mod poller;
pub mod queue;

pub use error::ExtractionError;
pub use pipeline::ContractExtractionPipeline;
pub use queue::{recover_pending, JobProcessor, JobQueue};
