use anyhow::Context;
use sqlx::PgPool;
use tracing::info;

use crate::auth::handlers::display_name_from_email;
use crate::auth::password::hash_password;
use crate::auth::repo_types::{Role, User};
use crate::config::AdminSeedConfig;

/// Provision a single admin account at first startup. Runs after migrations;
/// a non-empty users table makes this a no-op, so restarts are idempotent.
pub async fn seed_admin(db: &PgPool, cfg: &AdminSeedConfig) -> anyhow::Result<()> {
    if User::any(db).await.context("check for existing users")? {
        return Ok(());
    }

    let name = display_name_from_email(&cfg.email);
    let hash = hash_password(&cfg.password)?;
    let admin = User::create(db, &name, &cfg.email, &hash, Role::Admin)
        .await
        .context("insert admin user")?;

    info!(user_id = admin.id, email = %admin.email, "seeded initial admin user");
    Ok(())
}
