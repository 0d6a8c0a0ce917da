/// User service - registration, credential checks, and profile edits
///
/// Credentials are compared as stored by the record store. Email uniqueness
/// is a pre-check against `GET /users?email=`, so two registrations racing
/// on the same address can both pass it.
use std::sync::Arc;
use tracing::info;
use validator::Validate;

use crate::error::{AppError, Result};
use crate::models::{LoginRequest, NewUser, RecordId, RegisterRequest, UpdateProfileRequest, User};
use crate::store::RecordStore;

pub struct UserService {
    store: Arc<dyn RecordStore>,
}

impl UserService {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Create an account. Fails with `Conflict` when the email is taken,
    /// without writing anything.
    pub async fn register(&self, req: RegisterRequest) -> Result<User> {
        req.validate()?;

        let existing = self.store.find_users_by_email(&req.email).await?;
        if !existing.is_empty() {
            return Err(AppError::Conflict("Email already exists".to_string()));
        }

        let user = self
            .store
            .create_user(&NewUser {
                username: req.username,
                email: req.email,
                password: req.password,
                bio: None,
            })
            .await?;

        info!(user_id = %user.id, "User registered");
        Ok(user)
    }

    pub async fn login(&self, req: LoginRequest) -> Result<User> {
        req.validate()?;

        let user = self
            .store
            .find_users_by_email(&req.email)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| AppError::NotFound("User".to_string()))?;

        if user.password != req.password {
            return Err(AppError::Unauthorized("Invalid credentials".to_string()));
        }

        Ok(user)
    }

    pub async fn get_user(&self, id: &RecordId) -> Result<User> {
        Ok(self.store.get_user(id).await?)
    }

    /// Replace the editable profile fields of `id`.
    pub async fn update_profile(&self, id: &RecordId, req: UpdateProfileRequest) -> Result<User> {
        req.validate()?;

        let current = self.store.get_user(id).await?;

        if current.email != req.email {
            let taken = self
                .store
                .find_users_by_email(&req.email)
                .await?
                .iter()
                .any(|u| &u.id != id);
            if taken {
                return Err(AppError::Conflict("Email already exists".to_string()));
            }
        }

        let updated = User {
            username: req.username,
            email: req.email,
            bio: req.bio.filter(|b| !b.trim().is_empty()),
            ..current
        };

        Ok(self.store.replace_user(&updated).await?)
    }
}
