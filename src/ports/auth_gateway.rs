//! Auth port - password sign-in against the hosted auth service.

use async_trait::async_trait;
use secrecy::Secret;

use crate::domain::foundation::Timestamp;

use super::GatewayError;

/// An authenticated session.
#[derive(Clone)]
pub struct AuthSession {
    pub user_id: String,
    pub email: Option<String>,
    pub access_token: Secret<String>,
    pub expires_at: Timestamp,
}

impl AuthSession {
    pub fn is_expired(&self, now: &Timestamp) -> bool {
        !self.expires_at.is_after(now)
    }
}

impl std::fmt::Debug for AuthSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSession")
            .field("user_id", &self.user_id)
            .field("email", &self.email)
            .field("access_token", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

#[async_trait]
pub trait AuthGateway: Send + Sync {
    /// Signs in with email and password, replacing the current session.
    async fn sign_in(
        &self,
        email: &str,
        password: &Secret<String>,
    ) -> Result<AuthSession, GatewayError>;

    /// Current session, if signed in and not expired.
    async fn session(&self) -> Option<AuthSession>;

    async fn sign_out(&self);
}
