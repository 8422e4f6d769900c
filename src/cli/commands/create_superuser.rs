use anyhow::{Context, Result};
use sea_orm::Database;
use tracing::{info, trace};

pub async fn create_superuser(
    database_url: &str,
    username: &str,
    email: &str,
    first_name: &str,
    password: &str,
) -> Result<()> {
    trace!("Entering create_superuser function");

    let db = Database::connect(database_url)
        .await
        .with_context(|| format!("Failed to connect to database '{}'", database_url))?;

    let user = model::accounts::create_superuser(&db, username.trim(), email.trim(), first_name, password)
        .await
        .with_context(|| format!("Failed to create superuser '{}'", username))?;

    info!("Superuser '{}' created with ID {}", user, user.id);
    Ok(())
}
