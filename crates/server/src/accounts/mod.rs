//! Account Module
//!
//! Handles registration, login and logout. Accounts are stored in the
//! `accounts` table; sessions are delegated to [`SessionStore`].

pub mod validate;

use crate::core::auth::SessionStore;
use crate::core::db::Database;
use crate::core::error::{Error, Result};
use crate::models::{AccountInfo, NewAccount, Session};
use bcrypt::{hash, verify};
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use std::sync::Arc;
use tracing::{info, warn};
use validate::Registration;

type AccountRow = (i64, String, String, Option<i64>, Option<String>, String, String);

/// Account manager handles registration and authentication
pub struct AccountManager {
    db: Database,
    sessions: Arc<SessionStore>,
    bcrypt_cost: u32,
}

impl AccountManager {
    pub fn new(db: Database, sessions: Arc<SessionStore>, bcrypt_cost: u32) -> Self {
        Self {
            db,
            sessions,
            bcrypt_cost,
        }
    }

    /// Register a new account and return its id
    pub async fn register(&self, input: NewAccount) -> Result<i64> {
        let registration = validate::registration(input)?;
        let password_hash = hash(&registration.password, self.bcrypt_cost)?;

        let row = registration.clone();
        let account_id = self
            .db
            .scoped(|pool| async move { insert_account(&pool, &row, &password_hash).await })
            .await
            .inspect_err(|e| {
                if matches!(e, Error::DuplicateEmail) {
                    warn!("[Auth] Duplicate registration for {}", registration.email);
                }
            })?;

        info!(
            "[Auth] Account registered: {} ({})",
            registration.name, registration.email
        );

        Ok(account_id)
    }

    /// Verify credentials and open a session
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<(i64, Session)> {
        let email = validate::credentials(email, password)?;

        let lookup = email.clone();
        let row = self
            .db
            .scoped(|pool| async move { find_credentials(&pool, &lookup).await })
            .await?;

        // Unknown email and wrong password are indistinguishable to the caller
        let Some((account_id, password_hash)) = row else {
            warn!("[Auth] Failed login attempt for {}", email);
            return Err(Error::InvalidCredentials);
        };

        if !verify(password, &password_hash)? {
            warn!("[Auth] Failed login attempt for {}", email);
            return Err(Error::InvalidCredentials);
        }

        let session = self.sessions.create_session(account_id).await?;

        info!("[Auth] Account logged in: {}", account_id);

        Ok((account_id, session))
    }

    /// End a session. Unknown or already revoked tokens succeed.
    pub async fn logout(&self, token: &str) -> Result<()> {
        self.sessions.revoke_session(token).await
    }

    /// Get public account info by id
    pub async fn get_account(&self, account_id: i64) -> Result<AccountInfo> {
        let row = self
            .db
            .scoped(|pool| async move { find_account(&pool, account_id).await })
            .await?;

        let (id, name, email, age, address, phone, created_at) =
            row.ok_or(Error::AuthenticationRequired)?;

        Ok(AccountInfo {
            id,
            name,
            email,
            age: age.and_then(|a| u32::try_from(a).ok()),
            address,
            phone,
            created_at: created_at
                .parse::<DateTime<Utc>>()
                .map_err(|e| Error::Internal(format!("Invalid account timestamp: {}", e)))?,
        })
    }
}

async fn insert_account(
    pool: &SqlitePool,
    registration: &Registration,
    password_hash: &str,
) -> Result<i64> {
    let result = sqlx::query(
        "INSERT INTO accounts (name, email, password_hash, age, address, phone, created_at) VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&registration.name)
    .bind(&registration.email)
    .bind(password_hash)
    .bind(registration.age.map(i64::from))
    .bind(&registration.address)
    .bind(&registration.phone)
    .bind(Utc::now().to_rfc3339())
    .execute(pool)
    .await
    .map_err(|e| match e {
        sqlx::Error::Database(db) if db.is_unique_violation() => Error::DuplicateEmail,
        other => Error::from(other),
    })?;

    Ok(result.last_insert_rowid())
}

async fn find_credentials(pool: &SqlitePool, email: &str) -> Result<Option<(i64, String)>> {
    Ok(
        sqlx::query_as("SELECT id, password_hash FROM accounts WHERE email = ?")
            .bind(email)
            .fetch_optional(pool)
            .await?,
    )
}

async fn find_account(pool: &SqlitePool, account_id: i64) -> Result<Option<AccountRow>> {
    Ok(sqlx::query_as(
        "SELECT id, name, email, age, address, phone, created_at FROM accounts WHERE id = ?",
    )
    .bind(account_id)
    .fetch_optional(pool)
    .await?)
}
