use async_trait::async_trait;
use moka::future::Cache;
use sqlx::PgPool;
use std::time::Duration;

use crate::AppResult;

use super::ManagerDirectory;

/// Manager graph read from `"Users".manager_id`.
///
/// Only the team listing is cached (30-second TTL); approve/deny checks
/// always hit the database so a reassigned manager loses access at once.
#[derive(Clone)]
pub struct PgManagerDirectory {
    db: PgPool,
    team_cache: Cache<i32, Vec<i32>>,
}

impl PgManagerDirectory {
    pub fn new(db: PgPool) -> Self {
        let team_cache = Cache::builder()
            .time_to_live(Duration::from_secs(30))
            .max_capacity(1_000)
            .build();

        Self { db, team_cache }
    }
}

#[async_trait]
impl ManagerDirectory for PgManagerDirectory {
    async fn is_manager_of(&self, manager_id: i32, owner_id: i32) -> AppResult<bool> {
        let is_manager: bool = sqlx::query_scalar(
            r#"SELECT EXISTS(SELECT 1 FROM "Users" WHERE id = $1 AND manager_id = $2 AND is_deleted = false)"#,
        )
        .bind(owner_id)
        .bind(manager_id)
        .fetch_one(&self.db)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, manager_id, owner_id, "Manager lookup failed");
            e
        })?;

        Ok(is_manager)
    }

    async fn team_member_ids(&self, manager_id: i32) -> AppResult<Vec<i32>> {
        if let Some(cached) = self.team_cache.get(&manager_id).await {
            return Ok(cached);
        }

        let ids: Vec<i32> = sqlx::query_scalar(
            r#"SELECT id FROM "Users" WHERE manager_id = $1 AND is_deleted = false ORDER BY id"#,
        )
        .bind(manager_id)
        .fetch_all(&self.db)
        .await?;

        self.team_cache.insert(manager_id, ids.clone()).await;
        tracing::debug!(manager_id, team_size = ids.len(), "Team membership cached");
        Ok(ids)
    }
}
