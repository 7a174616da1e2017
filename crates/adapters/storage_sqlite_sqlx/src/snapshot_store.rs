//! `SQLite` implementation of [`NamedSnapshotStore`].

use std::future::Future;

use sqlx::SqlitePool;

use zonelight_app::ports::NamedSnapshotStore;
use zonelight_domain::error::ZonelightError;
use zonelight_domain::snapshot::SceneSnapshot;

use crate::error::StorageError;

const UPSERT: &str = "INSERT INTO named_snapshots (name, snapshot, updated_at) VALUES (?, ?, ?) \
    ON CONFLICT(name) DO UPDATE SET snapshot = excluded.snapshot, updated_at = excluded.updated_at";
const SELECT_BY_NAME: &str = "SELECT snapshot FROM named_snapshots WHERE name = ?";

/// `SQLite`-backed named snapshot store.
pub struct SqliteNamedSnapshotStore {
    pool: SqlitePool,
}

impl SqliteNamedSnapshotStore {
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl NamedSnapshotStore for SqliteNamedSnapshotStore {
    fn save(
        &self,
        name: &str,
        snapshot: SceneSnapshot,
    ) -> impl Future<Output = Result<(), ZonelightError>> + Send {
        let pool = self.pool.clone();
        let name = name.to_string();
        async move {
            let json = serde_json::to_string(&snapshot).map_err(StorageError::from)?;
            sqlx::query(UPSERT)
                .bind(name)
                .bind(json)
                .bind(chrono::Utc::now().to_rfc3339())
                .execute(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(())
        }
    }

    fn load(
        &self,
        name: &str,
    ) -> impl Future<Output = Result<Option<SceneSnapshot>, ZonelightError>> + Send {
        let pool = self.pool.clone();
        let name = name.to_string();
        async move {
            let row: Option<(String,)> = sqlx::query_as(SELECT_BY_NAME)
                .bind(name)
                .fetch_optional(&pool)
                .await
                .map_err(StorageError::from)?;

            let snapshot = row
                .map(|(json,)| serde_json::from_str(&json))
                .transpose()
                .map_err(StorageError::from)?;
            Ok(snapshot)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::Config;
    use zonelight_domain::light::{AttributeValue, Attributes, LightState};

    async fn setup() -> SqliteNamedSnapshotStore {
        let db = Config {
            database_url: "sqlite::memory:".to_string(),
        }
        .build()
        .await
        .unwrap();
        SqliteNamedSnapshotStore::new(db.pool().clone())
    }

    fn snapshot(brightness: i64) -> SceneSnapshot {
        let mut attributes = Attributes::new();
        attributes.insert("brightness".to_string(), AttributeValue::Int(brightness));
        [("light.desk".to_string(), LightState::on(attributes))]
            .into_iter()
            .collect()
    }

    #[tokio::test]
    async fn should_save_and_load_by_name() {
        let store = setup().await;
        store
            .save("zone_lighting_office_work", snapshot(10))
            .await
            .unwrap();

        let loaded = store.load("zone_lighting_office_work").await.unwrap();
        assert_eq!(loaded, Some(snapshot(10)));
    }

    #[tokio::test]
    async fn should_overwrite_snapshot_with_same_name() {
        let store = setup().await;
        store.save("zone_lighting_office_work", snapshot(10)).await.unwrap();
        store.save("zone_lighting_office_work", snapshot(90)).await.unwrap();

        let loaded = store.load("zone_lighting_office_work").await.unwrap();
        assert_eq!(loaded, Some(snapshot(90)));
    }

    #[tokio::test]
    async fn should_return_none_for_unknown_name() {
        let store = setup().await;
        assert_eq!(store.load("zone_lighting_nowhere").await.unwrap(), None);
    }
}
