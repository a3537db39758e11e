//! Bearer credential storage.
//!
//! Holds a single credential per origin. There is no client-side expiry: a
//! credential is only ever invalidated by a request outcome or an explicit logout.

use std::path::PathBuf;

use anyhow::Context;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Row, SqlitePool};
use thiserror::Error;
use tokio::sync::RwLock;

use pagegate_core::GateError;

/// Opaque bearer credential.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Result<Self, GateError> {
        let token = token.into();
        let token = token.trim();
        if token.is_empty() {
            return Err(GateError::validation("credential must not be empty"));
        }
        if token.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(GateError::validation("credential must not contain whitespace"));
        }
        Ok(Self(token.to_string()))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Debug for Credential {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

#[derive(Debug, Error)]
pub enum TokenStoreError {
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

/// Persistent holder of the session credential.
#[async_trait]
pub trait TokenStore: Send + Sync {
    async fn get(&self) -> Result<Option<Credential>, TokenStoreError>;
    async fn set(&self, credential: Credential) -> Result<(), TokenStoreError>;
    async fn clear(&self) -> Result<(), TokenStoreError>;
}

/// Process-local store (tests, short-lived tools).
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    credential: RwLock<Option<Credential>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_credential(credential: Credential) -> Self {
        Self {
            credential: RwLock::new(Some(credential)),
        }
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn get(&self) -> Result<Option<Credential>, TokenStoreError> {
        Ok(self.credential.read().await.clone())
    }

    async fn set(&self, credential: Credential) -> Result<(), TokenStoreError> {
        *self.credential.write().await = Some(credential);
        Ok(())
    }

    async fn clear(&self) -> Result<(), TokenStoreError> {
        *self.credential.write().await = None;
        Ok(())
    }
}

/// SQLite-backed store; survives restarts. One row per origin.
#[derive(Debug, Clone)]
pub struct SqliteTokenStore {
    pool: SqlitePool,
    origin: String,
}

impl SqliteTokenStore {
    /// Open the store in the user's data directory.
    pub async fn open(origin: impl Into<String>) -> anyhow::Result<Self> {
        let db_path = credential_db_path().context("failed to determine credential DB path")?;

        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create credential directory at {:?}", parent))?;
        }

        let options = SqliteConnectOptions::new()
            .filename(&db_path)
            .create_if_missing(true);

        Self::connect_with(options, origin)
            .await
            .with_context(|| format!("failed to open credential store at {:?}", db_path))
    }

    pub async fn connect_with(
        options: SqliteConnectOptions,
        origin: impl Into<String>,
    ) -> anyhow::Result<Self> {
        // A single connection keeps `sqlite::memory:` databases shared across calls.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .context("failed to create SQLite pool for credential store")?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS credentials (
                origin    TEXT NOT NULL PRIMARY KEY,
                token     TEXT NOT NULL,
                stored_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&pool)
        .await
        .context("failed to create credentials table")?;

        Ok(Self {
            pool,
            origin: origin.into(),
        })
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }
}

#[async_trait]
impl TokenStore for SqliteTokenStore {
    async fn get(&self) -> Result<Option<Credential>, TokenStoreError> {
        let row = sqlx::query(
            r#"
            SELECT token
            FROM credentials
            WHERE origin = ?1
            "#,
        )
        .bind(&self.origin)
        .fetch_optional(&self.pool)
        .await
        .context("failed to read credential")?;

        let Some(row) = row else {
            return Ok(None);
        };

        let token = row.try_get::<String, _>("token").context("credential row has no token")?;
        match Credential::new(token) {
            Ok(credential) => Ok(Some(credential)),
            Err(err) => {
                tracing::warn!(
                    origin = %self.origin,
                    "ignoring malformed stored credential: {err}"
                );
                Ok(None)
            }
        }
    }

    async fn set(&self, credential: Credential) -> Result<(), TokenStoreError> {
        let now = Utc::now().to_rfc3339();

        sqlx::query(
            r#"
            INSERT INTO credentials (origin, token, stored_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(origin)
            DO UPDATE SET
                token = excluded.token,
                stored_at = excluded.stored_at
            "#,
        )
        .bind(&self.origin)
        .bind(credential.expose())
        .bind(&now)
        .execute(&self.pool)
        .await
        .context("failed to store credential")?;

        Ok(())
    }

    async fn clear(&self) -> Result<(), TokenStoreError> {
        sqlx::query(
            r#"
            DELETE FROM credentials
            WHERE origin = ?1
            "#,
        )
        .bind(&self.origin)
        .execute(&self.pool)
        .await
        .context("failed to clear credential")?;

        Ok(())
    }
}

fn credential_db_path() -> anyhow::Result<PathBuf> {
    let base = dirs::data_dir().context("no data directory available for this user")?;
    Ok(base.join("pagegate").join("credentials.sqlite"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    async fn memory_sqlite(origin: &str) -> SqliteTokenStore {
        let options = SqliteConnectOptions::from_str("sqlite::memory:").unwrap();
        SqliteTokenStore::connect_with(options, origin).await.unwrap()
    }

    #[test]
    fn credential_debug_is_redacted() {
        let credential = Credential::new("secret-token").unwrap();
        assert_eq!(format!("{credential:?}"), "Credential(<redacted>)");
        assert!(Credential::new("   ").is_err());
        assert!(Credential::new("two words").is_err());
    }

    #[tokio::test]
    async fn memory_store_set_get_clear() {
        let store = MemoryTokenStore::new();
        assert!(store.get().await.unwrap().is_none());

        store.set(Credential::new("abc").unwrap()).await.unwrap();
        assert_eq!(store.get().await.unwrap().unwrap().expose(), "abc");

        store.clear().await.unwrap();
        assert!(store.get().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn sqlite_store_replaces_and_clears_credential() {
        let store = memory_sqlite("http://localhost:5000/api").await;
        assert!(store.get().await.unwrap().is_none());

        store.set(Credential::new("first").unwrap()).await.unwrap();
        store.set(Credential::new("second").unwrap()).await.unwrap();
        assert_eq!(store.get().await.unwrap().unwrap().expose(), "second");

        store.clear().await.unwrap();
        assert!(store.get().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn sqlite_store_is_scoped_by_origin() {
        let store = memory_sqlite("https://a.example").await;
        store.set(Credential::new("token-a").unwrap()).await.unwrap();

        let other = SqliteTokenStore {
            pool: store.pool.clone(),
            origin: "https://b.example".to_string(),
        };
        assert!(other.get().await.unwrap().is_none());

        other.clear().await.unwrap();
        assert_eq!(store.get().await.unwrap().unwrap().expose(), "token-a");
    }
}
