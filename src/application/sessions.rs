use std::sync::Arc;

use sha2::{Digest, Sha256};
use thiserror::Error;
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use crate::application::repos::{RepoError, SessionsRepo, UsersRepo};

const TOKEN_PREFIX: &str = "fs";
const MIN_SECRET_LEN: usize = 32;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("missing session token")]
    Missing,
    #[error("invalid session token")]
    Invalid,
    #[error("expired session")]
    Expired,
    #[error("unknown user")]
    UnknownUser,
    #[error("session lifetime is out of range")]
    TtlOutOfRange,
    #[error(transparent)]
    Repo(#[from] RepoError),
}

/// Identity attached to requests that carry a valid session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: i64,
}

#[derive(Debug, Clone)]
pub struct IssuedSession {
    pub token: String,
    pub user_id: i64,
    pub expires_at: OffsetDateTime,
}

#[derive(Clone)]
pub struct SessionService {
    sessions: Arc<dyn SessionsRepo>,
    users: Arc<dyn UsersRepo>,
}

impl SessionService {
    pub fn new(sessions: Arc<dyn SessionsRepo>, users: Arc<dyn UsersRepo>) -> Self {
        Self { sessions, users }
    }

    /// Mint a session token for an existing user. Only the token hash is stored.
    pub async fn issue(&self, user_id: i64, ttl: Duration) -> Result<IssuedSession, SessionError> {
        match self.users.username_by_id(user_id).await {
            Ok(_) => {}
            Err(RepoError::NotFound) => return Err(SessionError::UnknownUser),
            Err(err) => return Err(err.into()),
        }

        let expires_at = OffsetDateTime::now_utc()
            .checked_add(ttl)
            .ok_or(SessionError::TtlOutOfRange)?;
        let token = format!("{TOKEN_PREFIX}_{}", Self::generate_secret());
        self.sessions
            .create_session(&Self::hash_token(&token), user_id, expires_at)
            .await?;

        Ok(IssuedSession {
            token,
            user_id,
            expires_at,
        })
    }

    pub async fn authenticate(&self, token: &str) -> Result<AuthenticatedUser, SessionError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(SessionError::Missing);
        }
        if !Self::well_formed(token) {
            return Err(SessionError::Invalid);
        }

        let record = self
            .sessions
            .find_session(&Self::hash_token(token))
            .await?
            .ok_or(SessionError::Invalid)?;

        if record.expires_at <= OffsetDateTime::now_utc() {
            return Err(SessionError::Expired);
        }

        Ok(AuthenticatedUser {
            user_id: record.user_id,
        })
    }

    fn hash_token(token: &str) -> Vec<u8> {
        let mut hasher = Sha256::new();
        hasher.update(token.as_bytes());
        hasher.finalize().to_vec()
    }

    fn generate_secret() -> String {
        format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple())
    }

    fn well_formed(token: &str) -> bool {
        match token.split_once('_') {
            Some((prefix, secret)) => prefix == TOKEN_PREFIX && secret.len() >= MIN_SECRET_LEN,
            None => false,
        }
    }
}
