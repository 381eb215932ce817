use crate::core::{AuthProvider, UserSession};
use crate::domain::forms::{LoginForm, RegisterForm};
use crate::utils::error::{AuthFailure, CatalogError, Result};
use crate::utils::validation::Validate;
use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_AUTH_ENDPOINT: &str = "https://identitytoolkit.googleapis.com";

/// Email/password accounts over the identity toolkit REST API.
#[derive(Debug, Clone)]
pub struct IdentityToolkitAuth {
    endpoint: String,
    api_key: String,
    client: Client,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PasswordRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ProfileUpdate<'a> {
    id_token: &'a str,
    display_name: &'a str,
    return_secure_token: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountResponse {
    local_id: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    id_token: Option<String>,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
}

impl AccountResponse {
    fn into_session(self, fallback_token: Option<&str>) -> Result<UserSession> {
        let id_token = self
            .id_token
            .or_else(|| fallback_token.map(str::to_string))
            .ok_or(CatalogError::AuthError(AuthFailure::Unknown))?;
        let expires_at = self
            .expires_in
            .and_then(|secs| secs.parse::<i64>().ok())
            .map(|secs| Utc::now() + ChronoDuration::seconds(secs));

        Ok(UserSession {
            uid: self.local_id,
            email: self.email,
            display_name: self.display_name.filter(|name| !name.is_empty()),
            id_token,
            refresh_token: self.refresh_token,
            expires_at,
        })
    }
}

fn request_failure(error: reqwest::Error) -> CatalogError {
    if error.is_connect() || error.is_timeout() {
        CatalogError::AuthError(AuthFailure::NetworkUnavailable)
    } else {
        CatalogError::ApiError(error)
    }
}

impl IdentityToolkitAuth {
    pub fn new(endpoint: &str, api_key: &str, timeout_seconds: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()?;
        Ok(Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            client,
        })
    }

    async fn call<B: Serialize + Sync>(&self, method: &str, body: &B) -> Result<AccountResponse> {
        let url = format!("{}/v1/accounts:{}", self.endpoint, method);
        tracing::debug!("Auth request: accounts:{}", method);

        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(body)
            .send()
            .await
            .map_err(request_failure)?;

        let status = response.status();
        if status.is_success() {
            return response.json().await.map_err(request_failure);
        }

        let code = response
            .json::<ErrorEnvelope>()
            .await
            .map(|envelope| envelope.error.message)
            .unwrap_or_default();
        tracing::warn!("Auth provider rejected accounts:{} ({}): {}", method, status, code);
        Err(CatalogError::AuthError(AuthFailure::from_provider_code(&code)))
    }
}

#[async_trait]
impl AuthProvider for IdentityToolkitAuth {
    async fn sign_in(&self, form: &LoginForm) -> Result<UserSession> {
        form.validate()?;
        let account = self
            .call(
                "signInWithPassword",
                &PasswordRequest {
                    email: &form.email,
                    password: &form.password,
                    return_secure_token: true,
                },
            )
            .await?;
        account.into_session(None)
    }

    /// Creates the account, then sets its display name.
    async fn sign_up(&self, form: &RegisterForm) -> Result<UserSession> {
        form.validate()?;
        let created = self
            .call(
                "signUp",
                &PasswordRequest {
                    email: &form.email,
                    password: &form.password,
                    return_secure_token: true,
                },
            )
            .await?
            .into_session(None)?;

        let updated = self
            .call(
                "update",
                &ProfileUpdate {
                    id_token: &created.id_token,
                    display_name: &form.name,
                    return_secure_token: true,
                },
            )
            .await;

        match updated {
            Ok(account) => {
                let mut session = account.into_session(Some(&created.id_token))?;
                if session.refresh_token.is_none() {
                    session.refresh_token = created.refresh_token.clone();
                }
                if session.expires_at.is_none() {
                    session.expires_at = created.expires_at;
                }
                Ok(session)
            }
            Err(e) => {
                tracing::warn!("⚠️ Account created but display name not set: {}", e);
                Ok(created)
            }
        }
    }
}
