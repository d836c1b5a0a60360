use sonora_cloud::CloudError;
use sonora_core::error::CoreError;
use sonora_core::types::DbId;

/// Reasons a document could not be turned into a contract.
#[derive(Debug, thiserror::Error)]
pub enum ExtractionError {
    #[error("Document {0} not found")]
    DocumentNotFound(DbId),

    #[error("Document {0} is not a contract")]
    NotAContract(DbId),

    #[error("Stored file is not a PDF")]
    NotPdf,

    #[error("No text could be extracted from the document")]
    EmptyText,

    /// The model answer could not be parsed.
    #[error(transparent)]
    Parse(#[from] CoreError),

    #[error(transparent)]
    Cloud(#[from] CloudError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}
