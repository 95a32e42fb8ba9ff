use crate::error::ApiError;
use crate::http::{unquote_message, ApiClient};
use crate::types::{AuthResult, LoginRequest};
use log::{info, warn};
use reqwest::StatusCode;

const LOGIN_ENDPOINT: &str = "/api/accounts/login";

#[derive(Debug, Clone)]
pub struct AuthService {
    api: ApiClient,
}

impl AuthService {
    pub fn new(api: ApiClient) -> AuthService {
        AuthService { api }
    }

    /// Submits the credentials. Never fails: every transport or server error
    /// comes back as an unsuccessful `AuthResult` with a message to display.
    pub async fn login(&self, email: &str, password: &str) -> AuthResult {
        info!("Logging in {}", email);
        match self.try_login(email, password).await {
            Ok(result) => {
                info!("Login for {} answered success={}", email, result.success);
                result
            }
            Err(e) => {
                warn!("Login for {} failed: {:?}", email, e);
                AuthResult {
                    success: false,
                    message: login_failure_message(&e),
                }
            }
        }
    }

    async fn try_login(&self, email: &str, password: &str) -> Result<AuthResult, ApiError> {
        let url = self.api.url(LOGIN_ENDPOINT, &[])?;
        let response = self
            .api
            .post_json(url, &LoginRequest { email, password })
            .await?;
        let status = response.status();
        if !status.is_success() && status != StatusCode::UNAUTHORIZED {
            return Err(ApiError::Status {
                status,
                body: String::new(),
            });
        }
        let body = response.text().await.map_err(ApiError::from_reqwest)?;
        Ok(AuthResult {
            success: status.is_success(),
            message: unquote_message(&body),
        })
    }
}

fn login_failure_message(err: &ApiError) -> String {
    match err {
        ApiError::Transport(_) | ApiError::Timeout => err.to_string(),
        ApiError::Status { status, .. } => format!("Error del servidor: {}", status),
        other => format!("Error inesperado: {}", other),
    }
}
