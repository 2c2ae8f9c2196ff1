//! Thin async client for the study backend (auth, goals, sessions).

mod types;

pub use types::{
    validate_goal_text, AuthResponse, Goal, GoalPatch, LoginRequest, NewGoal, NewSession,
    RegisterRequest, StudySession, User, MAX_GOALS_PER_SET, MAX_GOAL_LEN,
};

use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use url::Url;

use crate::error::{ApiError, CoreError, ValidationError};
use types::ErrorBody;

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base: Url,
    token: Option<String>,
}

impl ApiClient {
    /// `base_url` is the server root, e.g. `http://localhost:3000`.
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let mut base = Url::parse(base_url)?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Ok(Self {
            http: Client::new(),
            base,
            token: None,
        })
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token;
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    fn url(&self, path: &str) -> Result<Url, ApiError> {
        Ok(self.base.join(path)?)
    }

    fn authorized(&self, req: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    async fn execute(&self, req: RequestBuilder) -> Result<reqwest::Response, ApiError> {
        let resp = self.authorized(req).send().await?;
        let status = resp.status();
        debug!(status = status.as_u16(), url = %resp.url(), "api response");
        if status.is_success() {
            return Ok(resp);
        }
        if status == StatusCode::UNAUTHORIZED {
            warn!("api rejected credentials");
            return Err(ApiError::Unauthorized);
        }
        let body = resp.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&body)
            .map(|b| b.error)
            .unwrap_or_else(|_| {
                status
                    .canonical_reason()
                    .unwrap_or("request failed")
                    .to_string()
            });
        Err(ApiError::Status {
            status: status.as_u16(),
            message,
        })
    }

    async fn json<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T, ApiError> {
        Ok(self.execute(req).await?.json::<T>().await?)
    }

    // ── Auth ─────────────────────────────────────────────────────────

    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, ApiError> {
        let req = self
            .http
            .post(self.url("api/auth/login")?)
            .json(&LoginRequest { email, password });
        self.json(req).await
    }

    pub async fn register(
        &self,
        nombre: &str,
        email: &str,
        password: &str,
    ) -> Result<AuthResponse, ApiError> {
        let req = self.http.post(self.url("api/auth/register")?).json(&RegisterRequest {
            nombre,
            email,
            password,
        });
        self.json(req).await
    }

    pub async fn logout(&self) -> Result<(), ApiError> {
        self.execute(self.http.post(self.url("api/auth/logout")?))
            .await
            .map(|_| ())
    }

    pub async fn me(&self) -> Result<User, ApiError> {
        self.json(self.http.get(self.url("api/auth/me")?)).await
    }

    // ── Goals ────────────────────────────────────────────────────────

    pub async fn goals(&self) -> Result<Vec<Goal>, ApiError> {
        self.json(self.http.get(self.url("api/goals")?)).await
    }

    pub async fn goals_by_set(&self, set_number: u32) -> Result<Vec<Goal>, ApiError> {
        self.json(self.http.get(self.url(&format!("api/goals/set/{set_number}"))?))
            .await
    }

    /// Create a goal, refusing client-side when the set is already full.
    pub async fn create_goal(&self, goal: &NewGoal) -> Result<Goal, CoreError> {
        let existing = self.goals_by_set(goal.set_number).await?;
        if existing.len() >= MAX_GOALS_PER_SET {
            return Err(ValidationError::GoalLimitReached {
                set_number: goal.set_number,
                limit: MAX_GOALS_PER_SET,
            }
            .into());
        }
        let req = self.http.post(self.url("api/goals")?).json(goal);
        Ok(self.json(req).await?)
    }

    pub async fn update_goal(&self, id: &str, patch: &GoalPatch) -> Result<Goal, ApiError> {
        let req = self.http.put(self.url(&format!("api/goals/{id}"))?).json(patch);
        self.json(req).await
    }

    pub async fn delete_goal(&self, id: &str) -> Result<(), ApiError> {
        self.execute(self.http.delete(self.url(&format!("api/goals/{id}"))?))
            .await
            .map(|_| ())
    }

    // ── Sessions ─────────────────────────────────────────────────────

    pub async fn record_session(&self, session: &NewSession) -> Result<StudySession, ApiError> {
        let req = self.http.post(self.url("api/sessions")?).json(session);
        self.json(req).await
    }

    pub async fn sessions(&self) -> Result<Vec<StudySession>, ApiError> {
        self.json(self.http.get(self.url("api/sessions")?)).await
    }
}
