use crate::{
    error::{AppError, AppResult},
    models::{user, User, UserModel},
    utils::{encode_access_token, hash_password, verify_password},
};
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};

pub struct AuthService {
    db: DatabaseConnection,
}

impl AuthService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Register a new citizen account keyed by phone number.
    /// Returns (user_model, access_token).
    pub async fn register(&self, phone: &str, password: &str) -> AppResult<(UserModel, String)> {
        let existing = User::find()
            .filter(user::Column::Phone.eq(phone))
            .one(&self.db)
            .await?;
        if existing.is_some() {
            return Err(AppError::Conflict(
                "Phone number already registered".to_string(),
            ));
        }

        let password_hash = hash_password(password)?;
        let now = chrono::Utc::now().naive_utc();

        let new_user = user::ActiveModel {
            phone: sea_orm::ActiveValue::Set(phone.to_string()),
            password_hash: sea_orm::ActiveValue::Set(password_hash),
            role: sea_orm::ActiveValue::Set("user".to_string()),
            created_at: sea_orm::ActiveValue::Set(now),
            ..Default::default()
        };

        // A concurrent signup with the same phone loses on the unique
        // index; surface that as the same conflict.
        let saved = match new_user.insert(&self.db).await {
            Ok(u) => u,
            Err(e) if is_unique_violation(&e) => {
                return Err(AppError::Conflict(
                    "Phone number already registered".to_string(),
                ))
            }
            Err(e) => return Err(e.into()),
        };

        let token = encode_access_token(&saved.id.to_string())?;
        Ok((saved, token))
    }

    /// Login with phone + password.
    /// Returns (user_model, access_token).
    pub async fn login(&self, phone: &str, password: &str) -> AppResult<(UserModel, String)> {
        let user = self
            .find_by_phone(phone)
            .await
            .map_err(|_| AppError::Unauthorized)?;

        if !verify_password(password, &user.password_hash) {
            return Err(AppError::Unauthorized);
        }

        let token = encode_access_token(&user.id.to_string())?;
        Ok((user, token))
    }

    pub async fn get_user_by_id(&self, id: i32) -> AppResult<UserModel> {
        let user = User::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)?;
        Ok(user)
    }

    async fn find_by_phone(&self, phone: &str) -> AppResult<UserModel> {
        let user = User::find()
            .filter(user::Column::Phone.eq(phone))
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)?;
        Ok(user)
    }
}

fn is_unique_violation(err: &sea_orm::DbErr) -> bool {
    // Postgres unique_violation is SQLSTATE 23505; sea-orm surfaces it in
    // the error string.
    err.to_string().contains("23505") || err.to_string().to_lowercase().contains("duplicate key")
}
