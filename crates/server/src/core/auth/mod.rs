//! Session Module
//!
//! Issues, validates and revokes the opaque bearer tokens that identify the
//! session principal. Tokens live in the `sessions` table.

pub mod middleware;

use crate::core::ctx::Ctx;
use crate::core::db::Database;
use crate::core::error::{Error, Result};
use crate::models::Session;
use axum::http::{header, HeaderMap};
use chrono::{DateTime, Duration, SecondsFormat, Utc};
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

/// Extract `<token>` from an `Authorization: Bearer <token>` header
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Fixed-width UTC form, so stored timestamps compare correctly as text
fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub struct SessionStore {
    db: Database,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(db: Database, ttl: Duration) -> Self {
        Self { db, ttl }
    }

    /// Create a new session for `account_id`, dropping any expired ones first
    pub async fn create_session(&self, account_id: i64) -> Result<Session> {
        let now = Utc::now();
        let session = Session {
            token: Uuid::new_v4().to_string(),
            account_id,
            created_at: now,
            expires_at: now + self.ttl,
        };

        let row = session.clone();
        let purged = self
            .db
            .scoped(|pool| async move {
                let purged = purge_expired(&pool, now).await?;
                insert_session(&pool, &row).await?;
                Ok::<_, Error>(purged)
            })
            .await?;

        if purged > 0 {
            debug!("[Auth] Purged {} expired sessions", purged);
        }

        debug!("[Auth] Session created for account {}", account_id);
        Ok(session)
    }

    /// Resolve a token into the session principal
    pub async fn validate_session(&self, token: &str) -> Result<Ctx> {
        let lookup = token.to_string();
        let row = self
            .db
            .scoped(|pool| async move { find_session(&pool, &lookup).await })
            .await?;

        let (account_id, expires_at) = row.ok_or(Error::AuthenticationRequired)?;
        let expires: DateTime<Utc> = DateTime::parse_from_rfc3339(&expires_at)
            .map_err(|e| Error::Internal(format!("Invalid session expiry: {}", e)))?
            .with_timezone(&Utc);

        if expires <= Utc::now() {
            self.revoke_session(token).await?;
            debug!("[Auth] Expired session rejected");
            return Err(Error::AuthenticationRequired);
        }

        Ok(Ctx::new(account_id, token))
    }

    /// Invalidate a token. Unknown tokens are not an error.
    pub async fn revoke_session(&self, token: &str) -> Result<()> {
        let token = token.to_string();
        self.db
            .scoped(|pool| async move { delete_session(&pool, &token).await })
            .await?;

        info!("[Auth] Session invalidated");
        Ok(())
    }
}

async fn insert_session(pool: &SqlitePool, session: &Session) -> Result<()> {
    sqlx::query(
        "INSERT INTO sessions (token, account_id, created_at, expires_at) VALUES (?, ?, ?, ?)",
    )
    .bind(&session.token)
    .bind(session.account_id)
    .bind(timestamp(session.created_at))
    .bind(timestamp(session.expires_at))
    .execute(pool)
    .await?;
    Ok(())
}

async fn purge_expired(pool: &SqlitePool, now: DateTime<Utc>) -> Result<u64> {
    Ok(sqlx::query("DELETE FROM sessions WHERE expires_at <= ?")
        .bind(timestamp(now))
        .execute(pool)
        .await?
        .rows_affected())
}

async fn find_session(pool: &SqlitePool, token: &str) -> Result<Option<(i64, String)>> {
    Ok(
        sqlx::query_as("SELECT account_id, expires_at FROM sessions WHERE token = ?")
            .bind(token)
            .fetch_optional(pool)
            .await?,
    )
}

async fn delete_session(pool: &SqlitePool, token: &str) -> Result<()> {
    sqlx::query("DELETE FROM sessions WHERE token = ?")
        .bind(token)
        .execute(pool)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use tempfile::TempDir;

    async fn store_with_account(temp_dir: &TempDir, ttl: Duration) -> (SessionStore, i64) {
        let db = Database::new(temp_dir.path().join("passes.sqlite"));
        db.migrate().await.unwrap();

        let account_id = db
            .scoped(|pool| async move {
                let result = sqlx::query(
                    "INSERT INTO accounts (name, email, password_hash, phone, created_at) VALUES ('Ada', 'ada@example.com', 'x', '9876543210', '2026-01-01T00:00:00Z')",
                )
                .execute(&pool)
                .await?;
                Ok::<_, Error>(result.last_insert_rowid())
            })
            .await
            .unwrap();

        (SessionStore::new(db, ttl), account_id)
    }

    #[test]
    fn test_bearer_token_parsing() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert_eq!(bearer_token(&headers), None);

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert_eq!(bearer_token(&headers), None);

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer tok-1"));
        assert_eq!(bearer_token(&headers), Some("tok-1"));
    }

    #[tokio::test]
    async fn test_session_lifecycle() {
        let temp_dir = TempDir::new().unwrap();
        let (store, account_id) = store_with_account(&temp_dir, Duration::days(30)).await;

        let session = store.create_session(account_id).await.unwrap();
        let ctx = store.validate_session(&session.token).await.unwrap();
        assert_eq!(ctx.account_id(), account_id);
        assert_eq!(ctx.token(), session.token);

        store.revoke_session(&session.token).await.unwrap();
        assert!(matches!(
            store.validate_session(&session.token).await,
            Err(Error::AuthenticationRequired)
        ));

        // Revoking twice is fine
        store.revoke_session(&session.token).await.unwrap();
    }

    #[tokio::test]
    async fn test_expired_session_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let (store, account_id) = store_with_account(&temp_dir, Duration::seconds(-1)).await;

        let session = store.create_session(account_id).await.unwrap();
        assert!(matches!(
            store.validate_session(&session.token).await,
            Err(Error::AuthenticationRequired)
        ));
    }

    #[tokio::test]
    async fn test_new_session_purges_unused_expired_ones() {
        let temp_dir = TempDir::new().unwrap();
        let (store, account_id) = store_with_account(&temp_dir, Duration::seconds(-1)).await;

        // Never presented again, so only the purge can remove it
        store.create_session(account_id).await.unwrap();
        let latest = store.create_session(account_id).await.unwrap();

        let tokens: Vec<(String,)> = store
            .db
            .scoped(|pool| async move {
                sqlx::query_as("SELECT token FROM sessions")
                    .fetch_all(&pool)
                    .await
                    .map_err(Error::from)
            })
            .await
            .unwrap();

        assert_eq!(tokens, vec![(latest.token,)]);
    }

    #[test]
    fn test_timestamps_sort_as_text() {
        let whole = DateTime::parse_from_rfc3339("2026-10-16T10:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let later = whole + Duration::milliseconds(500);

        assert!(timestamp(whole) < timestamp(later));
        assert_eq!(timestamp(whole), "2026-10-16T10:00:00.000000Z");
    }

    #[tokio::test]
    async fn test_unknown_token_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let (store, _) = store_with_account(&temp_dir, Duration::days(1)).await;

        assert!(matches!(
            store.validate_session("no-such-token").await,
            Err(Error::AuthenticationRequired)
        ));
    }
}
