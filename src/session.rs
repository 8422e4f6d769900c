//! Cookie sessions backed by an in-memory store.

use std::time::Duration;

use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use model::entities::{prelude::User, user};
use moka::future::Cache;
use sea_orm::EntityTrait;
use tracing::{debug, trace};

use crate::config::SessionSettings;
use crate::error::AppError;
use crate::schemas::AppState;

pub const SESSION_COOKIE: &str = "sessionid";

/// Maps session ids to user ids; entries expire after the idle timeout.
#[derive(Clone, Debug)]
pub struct SessionStore {
    sessions: Cache<String, i32>,
}

impl SessionStore {
    pub fn new(settings: &SessionSettings) -> Self {
        let sessions = Cache::builder()
            .max_capacity(settings.max_sessions)
            .time_to_idle(Duration::from_secs(settings.idle_timeout_secs))
            .build();
        Self { sessions }
    }

    /// Starts a session for `user_id` and returns its id.
    pub async fn create(&self, user_id: i32) -> String {
        let session_id = uuid::Uuid::new_v4().simple().to_string();
        self.sessions.insert(session_id.clone(), user_id).await;
        debug!("Session started for user {}", user_id);
        session_id
    }

    pub async fn user_id(&self, session_id: &str) -> Option<i32> {
        self.sessions.get(session_id).await
    }

    pub async fn destroy(&self, session_id: &str) {
        self.sessions.invalidate(session_id).await;
    }
}

pub fn session_cookie(session_id: String) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, session_id))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

pub fn removal_cookie() -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE).path("/").build()
}

/// The signed-in user, if the request carries a live session of an active account.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Option<user::Model>);

impl CurrentUser {
    pub fn user(&self) -> Option<&user::Model> {
        self.0.as_ref()
    }
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let Some(session_id) = jar.get(SESSION_COOKIE).map(|c| c.value().to_string()) else {
            trace!("Request has no session cookie");
            return Ok(CurrentUser(None));
        };

        let Some(user_id) = state.sessions.user_id(&session_id).await else {
            debug!("Session cookie does not match a live session");
            return Ok(CurrentUser(None));
        };

        let user = User::find_by_id(user_id).one(&state.db).await?;
        Ok(CurrentUser(user.filter(|u| u.is_active)))
    }
}
