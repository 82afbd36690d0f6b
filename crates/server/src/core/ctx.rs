use crate::core::error::{Error, Result};
use axum::{extract::FromRequestParts, http::request::Parts};

/// The session principal for one request
#[derive(Clone, Debug)]
pub struct Ctx {
    account_id: i64,
    token: String,
}

impl Ctx {
    pub fn new(account_id: i64, token: impl Into<String>) -> Self {
        Self {
            account_id,
            token: token.into(),
        }
    }

    pub fn account_id(&self) -> i64 {
        self.account_id
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    /// Fails unless this session belongs to `account_id`
    pub fn require_account(&self, account_id: i64) -> Result<()> {
        if self.account_id == account_id {
            Ok(())
        } else {
            Err(Error::AuthenticationRequired)
        }
    }
}

impl<S> FromRequestParts<S> for Ctx
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self> {
        parts
            .extensions
            .get::<Ctx>()
            .cloned()
            .ok_or(Error::AuthenticationRequired)
    }
}
