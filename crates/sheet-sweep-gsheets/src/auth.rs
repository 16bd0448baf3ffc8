//! Bearer tokens for API calls.

use std::future::Future;
use std::path::Path;
use std::pin::Pin;
use std::sync::Arc;

use crate::error::{ApiError, Result};

/// OAuth scopes requested for service accounts
pub const SCOPES: &[&str] = &[
    "https://www.googleapis.com/auth/spreadsheets",
    "https://www.googleapis.com/auth/drive.readonly",
];

type TokenFuture = Pin<Box<dyn Future<Output = Result<String>> + Send>>;
type TokenFn = Arc<dyn Fn() -> TokenFuture + Send + Sync>;

/// Where access tokens come from
#[derive(Clone)]
pub enum TokenSource {
    /// A fixed token supplied by the caller
    Static(String),
    /// A service account; tokens are cached and refreshed by the authenticator
    ServiceAccount(TokenFn),
}

impl std::fmt::Debug for TokenSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenSource::Static(_) => f.write_str("TokenSource::Static(..)"),
            TokenSource::ServiceAccount(_) => f.write_str("TokenSource::ServiceAccount(..)"),
        }
    }
}

impl TokenSource {
    /// Load a service account key and build an authenticator for it
    pub async fn service_account(path: &Path) -> Result<Self> {
        let key = yup_oauth2::read_service_account_key(path).await.map_err(|e| {
            ApiError::Auth(format!(
                "could not read credentials file {}: {}",
                path.display(),
                e
            ))
        })?;
        tracing::debug!("Loaded service account {}", key.client_email);

        let auth = yup_oauth2::ServiceAccountAuthenticator::builder(key)
            .build()
            .await
            .map_err(|e| ApiError::Auth(format!("could not build authenticator: {}", e)))?;
        let auth = Arc::new(auth);

        let fetch: TokenFn = Arc::new(move || {
            let auth = Arc::clone(&auth);
            Box::pin(async move {
                let token = auth
                    .token(SCOPES)
                    .await
                    .map_err(|e| ApiError::Auth(e.to_string()))?;
                token
                    .token()
                    .map(str::to_string)
                    .ok_or_else(|| ApiError::Auth("authenticator returned no access token".into()))
            })
        });
        Ok(TokenSource::ServiceAccount(fetch))
    }

    /// Current access token
    pub async fn token(&self) -> Result<String> {
        match self {
            TokenSource::Static(token) => Ok(token.clone()),
            TokenSource::ServiceAccount(fetch) => fetch().await,
        }
    }
}
