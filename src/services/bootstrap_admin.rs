use crate::error::AppResult;
use crate::models::{user, User};
use crate::utils::hash_password;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use std::env;

#[derive(Debug, Clone)]
pub struct BootstrapAdminConfig {
    pub phone: String,
    pub password: String,
}

impl BootstrapAdminConfig {
    pub fn from_env() -> Option<Self> {
        let enabled = env::var("BOOTSTRAP_ADMIN_ENABLED")
            .ok()
            .map(|v| v.trim().to_ascii_lowercase())
            .map(|v| matches!(v.as_str(), "1" | "true" | "yes" | "y" | "on"))
            .unwrap_or(false);

        if !enabled {
            return None;
        }

        Some(Self {
            phone: env::var("BOOTSTRAP_ADMIN_PHONE").ok()?,
            password: env::var("BOOTSTRAP_ADMIN_PASSWORD").ok()?,
        })
    }
}

/// Ensure an admin account exists at startup:
/// - if any admin already exists, do nothing
/// - if the configured phone exists, promote it
/// - otherwise create a fresh admin account
///
/// Credentials come from the environment; nothing is hardcoded.
pub async fn ensure_bootstrap_admin(db: &DatabaseConnection) -> AppResult<()> {
    let Some(cfg) = BootstrapAdminConfig::from_env() else {
        return Ok(());
    };

    let admin_exists = User::find()
        .filter(user::Column::Role.eq("admin"))
        .one(db)
        .await?
        .is_some();
    if admin_exists {
        return Ok(());
    }

    let existing = User::find()
        .filter(user::Column::Phone.eq(cfg.phone.clone()))
        .one(db)
        .await?;

    if let Some(user) = existing {
        let mut active: user::ActiveModel = user.into();
        active.role = sea_orm::ActiveValue::Set("admin".to_string());
        active.update(db).await?;
        tracing::info!("Promoted existing account to admin");
        return Ok(());
    }

    let password_hash = hash_password(&cfg.password)?;
    let now = chrono::Utc::now().naive_utc();

    let new_user = user::ActiveModel {
        phone: sea_orm::ActiveValue::Set(cfg.phone),
        password_hash: sea_orm::ActiveValue::Set(password_hash),
        role: sea_orm::ActiveValue::Set("admin".to_string()),
        created_at: sea_orm::ActiveValue::Set(now),
        ..Default::default()
    };

    new_user.insert(db).await?;
    tracing::info!("Created bootstrap admin account");
    Ok(())
}
