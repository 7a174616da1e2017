//! `SQLite` implementation of [`ZoneStateStore`].

use std::future::Future;
use std::str::FromStr;

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use zonelight_app::ports::ZoneStateStore;
use zonelight_domain::error::ZonelightError;
use zonelight_domain::id::ZoneId;
use zonelight_domain::zone::ZoneState;

use crate::error::StorageError;

/// Wrapper for converting database rows into a [`ZoneState`].
struct Wrapper(ZoneState);

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let state: String = row.try_get("state")?;
        let state = serde_json::from_str(&state).map_err(|err| sqlx::Error::Decode(Box::new(err)))?;
        Ok(Self(state))
    }
}

const UPSERT: &str = "INSERT INTO zone_states (zone_id, state, updated_at) VALUES (?, ?, ?) \
    ON CONFLICT(zone_id) DO UPDATE SET state = excluded.state, updated_at = excluded.updated_at";
const SELECT_BY_ID: &str = "SELECT state FROM zone_states WHERE zone_id = ?";
const SELECT_IDS: &str = "SELECT zone_id FROM zone_states ORDER BY zone_id";
const DELETE_BY_ID: &str = "DELETE FROM zone_states WHERE zone_id = ?";

/// `SQLite`-backed zone state store.
pub struct SqliteZoneStateStore {
    pool: SqlitePool,
}

impl SqliteZoneStateStore {
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Ids of every zone with a saved state.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the query fails or an id is malformed.
    pub async fn zone_ids(&self) -> Result<Vec<ZoneId>, ZonelightError> {
        let rows: Vec<(String,)> = sqlx::query_as(SELECT_IDS)
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::from)?;
        rows.into_iter()
            .map(|(id,)| {
                ZoneId::from_str(&id).map_err(|err| {
                    ZonelightError::from(StorageError::Database(sqlx::Error::Decode(Box::new(err))))
                })
            })
            .collect()
    }
}

impl ZoneStateStore for SqliteZoneStateStore {
    fn load(
        &self,
        zone: ZoneId,
    ) -> impl Future<Output = Result<Option<ZoneState>, ZonelightError>> + Send {
        let pool = self.pool.clone();
        async move {
            let row: Option<Wrapper> = sqlx::query_as(SELECT_BY_ID)
                .bind(zone.to_string())
                .fetch_optional(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(row.map(|w| w.0))
        }
    }

    fn save(
        &self,
        zone: ZoneId,
        state: ZoneState,
    ) -> impl Future<Output = Result<(), ZonelightError>> + Send {
        let pool = self.pool.clone();
        async move {
            let json = serde_json::to_string(&state).map_err(StorageError::from)?;
            sqlx::query(UPSERT)
                .bind(zone.to_string())
                .bind(json)
                .bind(chrono::Utc::now().to_rfc3339())
                .execute(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(())
        }
    }

    fn delete(&self, zone: ZoneId) -> impl Future<Output = Result<(), ZonelightError>> + Send {
        let pool = self.pool.clone();
        async move {
            sqlx::query(DELETE_BY_ID)
                .bind(zone.to_string())
                .execute(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(())
        }
    }
}
