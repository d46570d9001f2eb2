use sqlx::PgPool;

/// Full bootstrap test: connect, migrate, verify schema.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_full_bootstrap(pool: PgPool) {
    medsupply_db::health_check(&pool).await.unwrap();

    for table in ["correction_statuses", "match_methods"] {
        let count: (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(&pool)
            .await
            .unwrap_or_else(|e| panic!("{table} query failed: {e}"));
        assert!(count.0 > 0, "{table} should have seed data, got 0 rows");
    }
}

/// Lookup ids must line up with the Rust enums.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_lookup_ids_match_enums(pool: PgPool) {
    use medsupply_core::status::{CorrectionStatus, MatchMethod};

    for status in CorrectionStatus::ALL {
        let name: String = sqlx::query_scalar("SELECT name FROM correction_statuses WHERE id = $1")
            .bind(status.id())
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(name, status.as_str());
    }
    for method in MatchMethod::ALL {
        let name: String = sqlx::query_scalar("SELECT name FROM match_methods WHERE id = $1")
            .bind(method.id())
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(name, method.as_str());
    }
}
