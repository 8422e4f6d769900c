use axum::{
    extract::State,
    response::{IntoResponse, Redirect, Response},
    Form,
};
use axum_extra::extract::cookie::CookieJar;
use finnhub::FinnhubError;
use minijinja::context;
use model::accounts::{self, AccountError};
use tracing::{debug, info, instrument, trace, warn};
use validator::Validate;

use crate::error::AppError;
use crate::forms::{
    ApiKeyForm, FormErrors, LoginForm, RegisterForm, API_KEY_IN_USE, INVALID_CREDENTIALS,
    LOGIN_FAILED, USERNAME_TAKEN,
};
use crate::schemas::AppState;
use crate::session::{removal_cookie, session_cookie, CurrentUser, SESSION_COOKIE};
use crate::templates::render;

const REGISTER_TEMPLATE: &str = "authentication/register.html";
const LOGIN_TEMPLATE: &str = "authentication/login.html";
const API_KEY_TEMPLATE: &str = "account/api_key.html";

/// Registration page
#[instrument(skip(state, current))]
pub async fn register_page(
    State(state): State<AppState>,
    current: CurrentUser,
) -> Result<Response, AppError> {
    trace!("Rendering registration page");
    let page = render(
        &state,
        REGISTER_TEMPLATE,
        context! {
            username => current.user().map(|u| u.username.clone()),
            form => RegisterForm::default(),
            errors => FormErrors::new(),
        },
    )?;
    Ok(page.into_response())
}

/// Creates an account, then sends the visitor to the login page.
#[instrument(skip(state, current, form), fields(username = %form.username))]
pub async fn register_submit(
    State(state): State<AppState>,
    current: CurrentUser,
    Form(form): Form<RegisterForm>,
) -> Result<Response, AppError> {
    trace!("Entering register_submit function");

    let mut errors = FormErrors::from_result(form.validate());
    if !errors.has_field("username") && accounts::username_taken(&state.db, form.username()).await? {
        debug!("Username '{}' is already taken", form.username());
        errors.add_field("username", USERNAME_TAKEN);
    }

    if errors.is_empty() {
        match accounts::register_user(&state.db, form.username(), &form.password).await {
            Ok(user) => {
                info!("Registered user '{}' (ID {})", user.username, user.id);
                return Ok(Redirect::to("/login/").into_response());
            }
            Err(AccountError::UsernameTaken) => errors.add_field("username", USERNAME_TAKEN),
            Err(e) => return Err(e.into()),
        }
    }

    warn!("Registration rejected: {:?}", errors);
    let page = render(
        &state,
        REGISTER_TEMPLATE,
        context! {
            username => current.user().map(|u| u.username.clone()),
            form => form.redisplay(),
            errors => errors,
        },
    )?;
    Ok(page.into_response())
}

/// Login page
#[instrument(skip(state, current))]
pub async fn login_page(
    State(state): State<AppState>,
    current: CurrentUser,
) -> Result<Response, AppError> {
    let page = render(
        &state,
        LOGIN_TEMPLATE,
        context! {
            username => current.user().map(|u| u.username.clone()),
            form_username => "",
            errors => FormErrors::new(),
            message => "",
        },
    )?;
    Ok(page.into_response())
}

/// Checks the credentials and starts a session.
#[instrument(skip(state, jar, form), fields(username = %form.username))]
pub async fn login_submit(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    trace!("Entering login_submit function");

    let username = form.username.trim();
    let Some(user) = accounts::authenticate(&state.db, username, &form.password).await? else {
        warn!("Login failed for '{}'", username);
        let mut errors = FormErrors::new();
        errors.add_form(INVALID_CREDENTIALS);
        let page = render(
            &state,
            LOGIN_TEMPLATE,
            context! {
                username => None::<String>,
                form_username => username,
                errors => errors,
                message => LOGIN_FAILED,
            },
        )?;
        return Ok(page.into_response());
    };

    // A previous session on this browser is replaced, not reused
    if let Some(previous) = jar.get(SESSION_COOKIE) {
        state.sessions.destroy(previous.value()).await;
    }

    let user = accounts::record_login(&state.db, user).await?;
    let session_id = state.sessions.create(user.id).await;
    info!("User '{}' logged in", user.username);

    Ok((jar.add(session_cookie(session_id)), Redirect::to("/dashboard/")).into_response())
}

/// Ends the session, whether or not there was one.
#[instrument(skip(state, jar))]
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> impl IntoResponse {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        state.sessions.destroy(cookie.value()).await;
        info!("Session ended");
    } else {
        debug!("Logout without a session");
    }
    (jar.remove(removal_cookie()), Redirect::to("/login/"))
}

/// API key page; anonymous visitors are sent to the login page.
#[instrument(skip(state, current))]
pub async fn api_key_page(
    State(state): State<AppState>,
    current: CurrentUser,
) -> Result<Response, AppError> {
    let Some(user) = current.user() else {
        return Ok(Redirect::to("/login/").into_response());
    };

    let page = render(
        &state,
        API_KEY_TEMPLATE,
        context! {
            username => user.username.clone(),
            has_key => user.finnhub_api_key.is_some(),
            errors => FormErrors::new(),
        },
    )?;
    Ok(page.into_response())
}

/// Validates the submitted key upstream and stores it on the account.
#[instrument(skip(state, current, form))]
pub async fn api_key_submit(
    State(state): State<AppState>,
    current: CurrentUser,
    Form(form): Form<ApiKeyForm>,
) -> Result<Response, AppError> {
    let Some(user) = current.0 else {
        return Ok(Redirect::to("/login/").into_response());
    };
    trace!("Entering api_key_submit for user {}", user.id);

    let mut errors = FormErrors::from_result(form.validate());
    if errors.is_empty() {
        let client = state.finnhub_client();
        if !client.validate_key(form.key()).await? {
            warn!("Rejected Finnhub key for user '{}'", user.username);
            errors.add_field("api_key", FinnhubError::InvalidKey.to_string());
        } else if accounts::api_key_in_use(&state.db, form.key(), user.id).await? {
            warn!("Finnhub key submitted by '{}' belongs to another account", user.username);
            errors.add_field("api_key", API_KEY_IN_USE);
        }
    }

    if errors.is_empty() {
        match accounts::set_api_key(&state.db, user.clone(), form.key()).await {
            Ok(_) => return Ok(Redirect::to("/dashboard/").into_response()),
            Err(AccountError::ApiKeyInUse) => errors.add_field("api_key", API_KEY_IN_USE),
            Err(e) => return Err(e.into()),
        }
    }

    let page = render(
        &state,
        API_KEY_TEMPLATE,
        context! {
            username => user.username.clone(),
            has_key => user.finnhub_api_key.is_some(),
            errors => errors,
        },
    )?;
    Ok(page.into_response())
}
