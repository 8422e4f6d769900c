//! User factory and credential checks.
//!
//! Every function here works on any SeaORM connection so the web layer can
//! call it with the pooled connection and tests with an in-memory database.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, Set, SqlErr,
};
use thiserror::Error;
use tracing::{debug, info, instrument, trace, warn};

use crate::entities::user;
use crate::password::{hash_password_blocking, verify_password_blocking};

/// Error types for account operations
#[derive(Error, Debug)]
pub enum AccountError {
    #[error("Users must have a username!")]
    MissingUsername,

    #[error("Users must have an email address!")]
    MissingEmail,

    #[error("Users must have a password!")]
    MissingPassword,

    /// Another account registered the same username first
    #[error("This username has been taken. Please try a different username!")]
    UsernameTaken,

    /// Another account already stores the same Finnhub key
    #[error("This API key is already linked to another account.")]
    ApiKeyInUse,

    /// The password could not be hashed
    #[error("Password hashing error: {0}")]
    PasswordHash(String),

    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Type alias for Result with AccountError
pub type Result<T> = std::result::Result<T, AccountError>;

fn is_unique_violation(error: &DbErr) -> bool {
    matches!(error.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

async fn hash(password: &str) -> Result<String> {
    hash_password_blocking(password)
        .await
        .map_err(AccountError::PasswordHash)
}

/// Lower-cases the domain part of an email address, leaving the local part as typed.
pub fn normalize_email(email: &str) -> String {
    let email = email.trim();
    match email.rsplit_once('@') {
        Some((local, domain)) => format!("{}@{}", local, domain.to_lowercase()),
        None => email.to_string(),
    }
}

/// Creates an active, non-privileged user.
///
/// Username, email and password are all mandatory; each missing one is
/// reported with its own error so callers can tell them apart.
#[instrument(skip(db, password))]
pub async fn create_user<C: ConnectionTrait>(
    db: &C,
    username: &str,
    email: &str,
    first_name: &str,
    password: &str,
) -> Result<user::Model> {
    trace!("Entering create_user function");

    if username.is_empty() {
        return Err(AccountError::MissingUsername);
    }
    if email.is_empty() {
        return Err(AccountError::MissingEmail);
    }
    if password.is_empty() {
        return Err(AccountError::MissingPassword);
    }

    let email = normalize_email(email);
    let new_user = user::ActiveModel {
        username: Set(username.to_string()),
        email: Set(Some(email)),
        first_name: Set(first_name.to_string()),
        password_hash: Set(hash(password).await?),
        ..new_active_user()
    };

    let user = new_user.insert(db).await?;
    info!("Created user '{}' with ID {}", user.username, user.id);
    Ok(user)
}

/// Creates a user with staff and admin rights.
#[instrument(skip(db, password))]
pub async fn create_superuser<C: ConnectionTrait>(
    db: &C,
    username: &str,
    email: &str,
    first_name: &str,
    password: &str,
) -> Result<user::Model> {
    let user = create_user(db, username, email, first_name, password).await?;

    let mut active: user::ActiveModel = user.into();
    active.is_admin = Set(true);
    active.is_staff = Set(true);
    let user = active.update(db).await?;

    info!("Promoted user '{}' to superuser", user.username);
    Ok(user)
}

/// Creates an account from the self-service registration form.
/// Only a username and a password are collected there.
#[instrument(skip(db, password))]
pub async fn register_user<C: ConnectionTrait>(
    db: &C,
    username: &str,
    password: &str,
) -> Result<user::Model> {
    if username.is_empty() {
        return Err(AccountError::MissingUsername);
    }
    if password.is_empty() {
        return Err(AccountError::MissingPassword);
    }

    let new_user = user::ActiveModel {
        username: Set(username.to_string()),
        password_hash: Set(hash(password).await?),
        ..new_active_user()
    };

    // Only the username is unique here; the email is always empty
    let user = new_user.insert(db).await.map_err(|e| {
        if is_unique_violation(&e) {
            warn!("Username '{}' was registered concurrently", username);
            AccountError::UsernameTaken
        } else {
            AccountError::Database(e)
        }
    })?;
    info!("Registered user '{}' with ID {}", user.username, user.id);
    Ok(user)
}

fn new_active_user() -> user::ActiveModel {
    user::ActiveModel {
        email: Set(None),
        phone: Set(None),
        first_name: Set(String::new()),
        finnhub_api_key: Set(None),
        is_active: Set(true),
        is_staff: Set(false),
        is_admin: Set(false),
        date_joined: Set(Utc::now()),
        last_login: Set(None),
        ..Default::default()
    }
}

pub async fn username_taken<C: ConnectionTrait>(db: &C, username: &str) -> Result<bool> {
    let count = user::Entity::find()
        .filter(user::Column::Username.eq(username))
        .count(db)
        .await?;
    Ok(count > 0)
}

/// Returns the user only when the credentials match an active account.
///
/// Unknown usernames, wrong passwords and inactive accounts all yield `None`
/// so callers cannot leak which of them happened. Every path runs one
/// argon2 verification, so timing does not tell them apart either.
#[instrument(skip(db, password))]
pub async fn authenticate<C: ConnectionTrait>(
    db: &C,
    username: &str,
    password: &str,
) -> Result<Option<user::Model>> {
    trace!("Entering authenticate function");

    if username.is_empty() || password.is_empty() {
        debug!("Blank credentials rejected");
        verify_password_blocking(password, None).await;
        return Ok(None);
    }

    let Some(user) = user::Entity::find()
        .filter(user::Column::Username.eq(username))
        .one(db)
        .await?
    else {
        debug!("No user named '{}'", username);
        verify_password_blocking(password, None).await;
        return Ok(None);
    };

    if !verify_password_blocking(password, Some(&user.password_hash)).await {
        warn!("Password mismatch for user '{}'", username);
        return Ok(None);
    }

    if !user.is_active {
        warn!("Inactive user '{}' tried to authenticate", username);
        return Ok(None);
    }

    Ok(Some(user))
}

/// Stamps `last_login` on a successful login.
pub async fn record_login<C: ConnectionTrait>(db: &C, user: user::Model) -> Result<user::Model> {
    let mut active: user::ActiveModel = user.into();
    active.last_login = Set(Some(Utc::now()));
    Ok(active.update(db).await?)
}

/// True when another account already stores this key.
pub async fn api_key_in_use<C: ConnectionTrait>(
    db: &C,
    key: &str,
    except_user_id: i32,
) -> Result<bool> {
    let count = user::Entity::find()
        .filter(user::Column::FinnhubApiKey.eq(key))
        .filter(user::Column::Id.ne(except_user_id))
        .count(db)
        .await?;
    Ok(count > 0)
}

/// Stores an already validated Finnhub key on the user record.
#[instrument(skip(db, user, key), fields(user_id = user.id))]
pub async fn set_api_key<C: ConnectionTrait>(
    db: &C,
    user: user::Model,
    key: &str,
) -> Result<user::Model> {
    let mut active: user::ActiveModel = user.into();
    active.finnhub_api_key = Set(Some(key.to_string()));
    let user = active.update(db).await.map_err(|e| {
        if is_unique_violation(&e) {
            warn!("Finnhub key was claimed by another account concurrently");
            AccountError::ApiKeyInUse
        } else {
            AccountError::Database(e)
        }
    })?;
    info!("Stored Finnhub API key for user '{}'", user.username);
    Ok(user)
}

#[cfg(test)]
mod tests {
    use super::*;
    use migration::{Migrator, MigratorTrait};
    use sea_orm::{Database, DatabaseConnection};

    async fn setup_db() -> DatabaseConnection {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        Migrator::up(&db, None).await.expect("Migrations failed.");
        db
    }

    #[tokio::test]
    async fn test_create_user() {
        let db = setup_db().await;
        let user = create_user(&db, "user1", "user1@Gmail.COM", "", "1234")
            .await
            .unwrap();

        assert_eq!(user.username, "user1");
        assert_eq!(user.email.as_deref(), Some("user1@gmail.com"));
        assert!(user.is_active);
        assert!(!user.is_admin);
        assert!(!user.is_staff);
        assert_ne!(user.password_hash, "1234");
        assert_eq!(user.to_string(), "user1");
    }

    #[tokio::test]
    async fn test_create_user_reports_each_missing_field() {
        let db = setup_db().await;

        let err = create_user(&db, "", "user1@gmail.com", "", "1234").await.unwrap_err();
        assert!(matches!(err, AccountError::MissingUsername));
        assert_eq!(err.to_string(), "Users must have a username!");

        let err = create_user(&db, "user_no_email", "", "", "1234").await.unwrap_err();
        assert!(matches!(err, AccountError::MissingEmail));
        assert_eq!(err.to_string(), "Users must have an email address!");

        let err = create_user(&db, "user_no_pwd", "user1@gmail.com", "", "").await.unwrap_err();
        assert!(matches!(err, AccountError::MissingPassword));
        assert_eq!(err.to_string(), "Users must have a password!");
    }

    #[tokio::test]
    async fn test_duplicate_username_and_email_are_rejected() {
        let db = setup_db().await;
        create_user(&db, "user1", "user1@gmail.com", "", "1234").await.unwrap();

        let err = create_user(&db, "user1", "other@gmail.com", "", "1234").await.unwrap_err();
        assert!(matches!(err, AccountError::Database(_)));

        let err = create_user(&db, "user2", "user1@gmail.com", "", "1234").await.unwrap_err();
        assert!(matches!(err, AccountError::Database(_)));
    }

    #[tokio::test]
    async fn test_create_superuser() {
        let db = setup_db().await;
        let admin = create_superuser(&db, "admin", "admin@example.com", "Ada", "password")
            .await
            .unwrap();
        assert!(admin.is_admin);
        assert!(admin.is_staff);
        assert_eq!(admin.first_name, "Ada");
    }

    #[tokio::test]
    async fn test_register_user_without_email() {
        let db = setup_db().await;
        let first = register_user(&db, "trader1", "password").await.unwrap();
        let second = register_user(&db, "trader2", "password").await.unwrap();

        assert_eq!(first.email, None);
        assert_eq!(second.email, None);
        assert!(username_taken(&db, "trader1").await.unwrap());
        assert!(!username_taken(&db, "trader3").await.unwrap());
    }

    #[tokio::test]
    async fn test_authenticate() {
        let db = setup_db().await;
        create_user(&db, "testuser", "testuser@example.com", "", "password")
            .await
            .unwrap();

        assert!(authenticate(&db, "testuser", "password").await.unwrap().is_some());
        assert!(authenticate(&db, "testuser", "wrong").await.unwrap().is_none());
        assert!(authenticate(&db, "randomuser", "password").await.unwrap().is_none());
        assert!(authenticate(&db, "", "password").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_unknown_user_costs_a_password_check() {
        let db = setup_db().await;
        create_user(&db, "testuser", "testuser@example.com", "", "password")
            .await
            .unwrap();

        // Warm the dummy hash so its one-time setup is not measured
        assert!(authenticate(&db, "ghost", "password").await.unwrap().is_none());

        let started = std::time::Instant::now();
        assert!(authenticate(&db, "testuser", "wrong").await.unwrap().is_none());
        let wrong_password = started.elapsed();

        let started = std::time::Instant::now();
        assert!(authenticate(&db, "ghost", "password").await.unwrap().is_none());
        let unknown_user = started.elapsed();

        assert!(
            unknown_user * 4 >= wrong_password,
            "unknown user took {:?}, wrong password took {:?}",
            unknown_user,
            wrong_password
        );
    }

    #[tokio::test]
    async fn test_authenticate_rejects_inactive_user() {
        let db = setup_db().await;
        let user = create_user(&db, "sleepy", "sleepy@example.com", "", "password")
            .await
            .unwrap();
        let mut active: user::ActiveModel = user.into();
        active.is_active = Set(false);
        active.update(&db).await.unwrap();

        assert!(authenticate(&db, "sleepy", "password").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_api_key_storage() {
        let db = setup_db().await;
        let alice = register_user(&db, "alice", "password").await.unwrap();
        let bob = register_user(&db, "bob", "password").await.unwrap();

        let alice = set_api_key(&db, alice, "key-1").await.unwrap();
        assert_eq!(alice.finnhub_api_key.as_deref(), Some("key-1"));

        assert!(!api_key_in_use(&db, "key-1", alice.id).await.unwrap());
        assert!(api_key_in_use(&db, "key-1", bob.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_register_user_maps_unique_violation_to_username_taken() {
        let db = setup_db().await;
        register_user(&db, "dup", "password").await.unwrap();

        let err = register_user(&db, "dup", "password").await.unwrap_err();
        assert!(matches!(err, AccountError::UsernameTaken));
    }

    #[tokio::test]
    async fn test_set_api_key_maps_unique_violation_to_key_in_use() {
        let db = setup_db().await;
        let alice = register_user(&db, "alice", "password").await.unwrap();
        let bob = register_user(&db, "bob", "password").await.unwrap();
        set_api_key(&db, alice, "key-1").await.unwrap();

        let err = set_api_key(&db, bob, "key-1").await.unwrap_err();
        assert!(matches!(err, AccountError::ApiKeyInUse));
    }

    #[tokio::test]
    async fn test_record_login() {
        let db = setup_db().await;
        let user = register_user(&db, "alice", "password").await.unwrap();
        assert!(user.last_login.is_none());
        let user = record_login(&db, user).await.unwrap();
        assert!(user.last_login.is_some());
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("John.Doe@EXAMPLE.Com"), "John.Doe@example.com");
        assert_eq!(normalize_email("  a@B.c "), "a@b.c");
        assert_eq!(normalize_email("no-at-sign"), "no-at-sign");
    }
}
