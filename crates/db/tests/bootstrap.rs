use sonora_core::status::{ContractStatus, DocumentStatus};
use sqlx::PgPool;

async fn seeded_names(pool: &PgPool, table: &str) -> Vec<(i16, String)> {
    sqlx::query_as(&format!("SELECT id, name FROM {table} ORDER BY id"))
        .fetch_all(pool)
        .await
        .unwrap()
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_migrated_database_is_healthy(pool: PgPool) {
    sonora_db::health_check(&pool).await.unwrap();

    let tables: Vec<String> = sqlx::query_scalar(
        "SELECT table_name::text FROM information_schema.tables
         WHERE table_schema = 'public' AND table_type = 'BASE TABLE'",
    )
    .fetch_all(&pool)
    .await
    .unwrap();
    for expected in [
        "users",
        "teams",
        "lpm_products",
        "isrc_songs",
        "distribution_statements",
        "tustreams_records",
        "documents",
        "contracts",
    ] {
        assert!(tables.iter().any(|t| t == expected), "missing table {expected}");
    }
}

/// Seeded lookup rows line up with the status enums, id for id.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_status_lookups_match_enums(pool: PgPool) {
    let documents = seeded_names(&pool, "document_statuses").await;
    assert_eq!(documents.len(), DocumentStatus::ALL.len());
    for (status, (id, name)) in DocumentStatus::ALL.iter().zip(&documents) {
        assert_eq!((status.id(), status.as_str()), (*id, name.as_str()));
    }

    let contracts = seeded_names(&pool, "contract_statuses").await;
    assert_eq!(contracts.len(), ContractStatus::ALL.len());
    for (status, (id, name)) in ContractStatus::ALL.iter().zip(&contracts) {
        assert_eq!((status.id(), status.as_str()), (*id, name.as_str()));
    }
}
