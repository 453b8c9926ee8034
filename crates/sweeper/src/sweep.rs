//! Expired token removal

use cinescope_common::db::Repository;
use cinescope_common::errors::Result;
use cinescope_common::metrics;

/// Delete every token past its expiry and report how many went away.
///
/// Zero deletions is a normal outcome, not an error.
pub async fn sweep_expired_tokens(repo: &Repository) -> Result<String> {
    let deleted = repo.delete_expired_tokens().await?;
    metrics::record_token_sweep(deleted);

    Ok(format!("Deleted {} tokens", deleted))
}

#[cfg(test)]
mod tests {
    use super::*;
    use cinescope_common::db::DbPool;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn mock_repository(db: MockDatabase) -> Repository {
        Repository::new(DbPool {
            primary: db.into_connection(),
            replica: None,
        })
    }

    #[tokio::test]
    async fn reports_deleted_count() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).append_exec_results([MockExecResult {
            last_insert_id: 0,
            rows_affected: 3,
        }]);
        let repo = mock_repository(db);

        let report = sweep_expired_tokens(&repo).await.unwrap();
        assert_eq!(report, "Deleted 3 tokens");
    }

    #[tokio::test]
    async fn zero_deletions_reports_quietly() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).append_exec_results([MockExecResult {
            last_insert_id: 0,
            rows_affected: 0,
        }]);
        let repo = mock_repository(db);

        let report = sweep_expired_tokens(&repo).await.unwrap();
        assert_eq!(report, "Deleted 0 tokens");
    }
}
