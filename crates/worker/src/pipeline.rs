//! Linear contract-extraction pipeline.
//!
//! load document -> fetch PDF -> extract text -> prompt the model ->
//! parse JSON -> upsert contract -> mark document completed.
//!
//! Any failure marks the document `error` with the message. Nothing is
//! retried automatically.

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::PgPool;
use sonora_cloud::{ObjectStore, TextExtractor, TextGenerator};
use sonora_core::contract::{
    build_extraction_prompt, contract_response_schema, parse_extraction_response, SCHEMA_NAME,
};
use sonora_core::storage::looks_like_pdf;
use sonora_core::types::DbId;
use sonora_db::models::contract::Contract;
use sonora_db::models::document::Document;
use sonora_db::repositories::{ContractRepo, DocumentRepo};

use crate::error::ExtractionError;
use crate::queue::JobProcessor;

/// Everything the pipeline talks to.
#[derive(Clone)]
pub struct ContractExtractionPipeline {
    pool: PgPool,
    store: Arc<dyn ObjectStore>,
    extractor: Arc<dyn TextExtractor>,
    generator: Arc<dyn TextGenerator>,
}

impl ContractExtractionPipeline {
    pub fn new(
        pool: PgPool,
        store: Arc<dyn ObjectStore>,
        extractor: Arc<dyn TextExtractor>,
        generator: Arc<dyn TextGenerator>,
    ) -> Self {
        Self {
            pool,
            store,
            extractor,
            generator,
        }
    }

    /// Run the pipeline for one document, recording the outcome on the
    /// document row.
    pub async fn run(&self, document_id: DbId) -> Result<Contract, ExtractionError> {
        let result = self.load_and_extract(document_id).await;
        self.finish(document_id, result).await
    }

    /// Run the pipeline for a document already claimed (status
    /// `processing`) by [`DocumentRepo::claim_next_pending`].
    pub async fn run_claimed(&self, document: &Document) -> Result<Contract, ExtractionError> {
        let result = self.extract(document).await;
        self.finish(document.id, result).await
    }

    async fn load_and_extract(&self, document_id: DbId) -> Result<Contract, ExtractionError> {
        let document = DocumentRepo::find_any(&self.pool, document_id)
            .await?
            .ok_or(ExtractionError::DocumentNotFound(document_id))?;
        if !document.is_contract() {
            return Err(ExtractionError::NotAContract(document_id));
        }
        DocumentRepo::mark_processing(&self.pool, document_id).await?;
        self.extract(&document).await
    }

    async fn extract(&self, document: &Document) -> Result<Contract, ExtractionError> {
        tracing::info!(document_id = document.id, team_id = document.team_id, "Contract extraction started");

        let bytes = self.store.get_object(&document.storage_key).await?;
        if !looks_like_pdf(&bytes) {
            return Err(ExtractionError::NotPdf);
        }

        let text = self.extractor.extract_text(&document.file_name, bytes).await?;
        if text.trim().is_empty() {
            return Err(ExtractionError::EmptyText);
        }

        let prompt = build_extraction_prompt(&text);
        let raw = self
            .generator
            .generate_json(&prompt, SCHEMA_NAME, &contract_response_schema())
            .await?;
        let extracted = parse_extraction_response(&raw)?;

        let contract = ContractRepo::upsert_from_extraction(&self.pool, document.team_id, document.id, &extracted).await?;
        Ok(contract)
    }

    async fn finish(
        &self,
        document_id: DbId,
        result: Result<Contract, ExtractionError>,
    ) -> Result<Contract, ExtractionError> {
        match &result {
            Ok(contract) => {
                DocumentRepo::mark_completed(&self.pool, document_id).await?;
                tracing::info!(document_id, contract_id = contract.id, status = %contract.status, "Contract extracted");
            }
            // Nothing to mark on a missing row.
            Err(ExtractionError::DocumentNotFound(_)) => {
                tracing::warn!(document_id, "Extraction skipped, document no longer exists");
            }
            Err(e) => {
                tracing::error!(document_id, error = %e, "Contract extraction failed");
                DocumentRepo::mark_failed(&self.pool, document_id, &e.to_string()).await?;
            }
        }
        result
    }
}

#[async_trait]
impl JobProcessor for ContractExtractionPipeline {
    async fn process(&self, document_id: DbId) {
        // Outcome is already recorded on the document row.
        let _ = self.run(document_id).await;
    }
}
