//! Explicit session object for the signed-in user

use crate::{
    error::{AppError, AppResult},
    models::user::{Identity, UserClaims},
};

/// The signed-in user's token and identity, passed to whatever needs them
#[derive(Debug, Clone)]
pub struct Session {
    id_token: String,
    identity: Identity,
}

impl Session {
    /// Build a session from an ID token issued by the identity provider
    pub fn from_id_token(id_token: impl Into<String>) -> AppResult<Self> {
        let id_token = id_token.into();
        let claims = UserClaims::peek(&id_token)
            .map_err(|e| AppError::Authentication(format!("Unreadable ID token: {}", e)))?;
        Ok(Self {
            identity: claims.identity(),
            id_token,
        })
    }

    /// Current identity
    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    /// Value for the `Authorization` header
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.id_token)
    }
}
