//! User entity model and DTOs.

use critica_core::confirmation::CodeSubject;
use critica_core::error::CoreError;
use critica_core::roles::Role;
use critica_core::types::{DbId, Timestamp};
use critica_core::validation::validate_username;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Full user row from the `users` table.
///
/// Carries `last_login_at`, which feeds confirmation codes. Use
/// [`UserResponse`] for external-facing output.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: DbId,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub bio: String,
    pub role: String,
    pub last_login_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl User {
    /// Parsed role. The `ck_users_role` constraint keeps this infallible in practice.
    pub fn role(&self) -> Result<Role, CoreError> {
        self.role
            .parse()
            .map_err(|_| CoreError::Internal(format!("User {} has unknown role '{}'", self.id, self.role)))
    }

    /// The state a confirmation code for this user is bound to.
    pub fn code_subject(&self) -> CodeSubject<'_> {
        CodeSubject {
            user_id: self.id,
            email: &self.email,
            last_login_at: self.last_login_at,
        }
    }
}

/// User representation for API responses.
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub bio: String,
    pub role: String,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            username: user.username.clone(),
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            bio: user.bio.clone(),
            role: user.role.clone(),
        }
    }
}

/// DTO for creating a user (admin endpoint and signup).
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateUser {
    #[validate(length(min = 1, max = 150), custom(function = "validate_username"))]
    pub username: String,
    #[validate(email, length(max = 254))]
    pub email: String,
    #[serde(default)]
    #[validate(length(max = 150))]
    pub first_name: String,
    #[serde(default)]
    #[validate(length(max = 150))]
    pub last_name: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub role: Role,
}

impl CreateUser {
    /// A fresh `user`-role account with empty profile fields.
    pub fn with_identity(username: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            email: email.into(),
            first_name: String::new(),
            last_name: String::new(),
            bio: String::new(),
            role: Role::User,
        }
    }
}

/// DTO for an admin updating any user. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateUser {
    #[validate(length(min = 1, max = 150), custom(function = "validate_username"))]
    pub username: Option<String>,
    #[validate(email, length(max = 254))]
    pub email: Option<String>,
    #[validate(length(max = 150))]
    pub first_name: Option<String>,
    #[validate(length(max = 150))]
    pub last_name: Option<String>,
    pub bio: Option<String>,
    pub role: Option<Role>,
}

/// DTO for a user editing their own profile.
///
/// Has no `role` field, so a submitted role is silently ignored.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateProfile {
    #[validate(length(min = 1, max = 150), custom(function = "validate_username"))]
    pub username: Option<String>,
    #[validate(email, length(max = 254))]
    pub email: Option<String>,
    #[validate(length(max = 150))]
    pub first_name: Option<String>,
    #[validate(length(max = 150))]
    pub last_name: Option<String>,
    pub bio: Option<String>,
}

impl From<UpdateProfile> for UpdateUser {
    fn from(profile: UpdateProfile) -> Self {
        Self {
            username: profile.username,
            email: profile.email,
            first_name: profile.first_name,
            last_name: profile.last_name,
            bio: profile.bio,
            role: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_user_rejects_reserved_username() {
        let input = CreateUser::with_identity("me", "me@example.com");
        let errors = input.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("username"));
    }

    #[test]
    fn create_user_rejects_bad_email() {
        let input = CreateUser::with_identity("bob", "not-an-email");
        let errors = input.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("email"));
    }

    #[test]
    fn create_user_accepts_valid_identity() {
        assert!(CreateUser::with_identity("bob", "b@x.com").validate().is_ok());
    }

    #[test]
    fn create_user_role_defaults_to_user() {
        let input: CreateUser =
            serde_json::from_str(r#"{"username":"bob","email":"b@x.com"}"#).unwrap();
        assert_eq!(input.role, Role::User);
    }

    #[test]
    fn profile_update_rejects_reserved_username() {
        let input = UpdateProfile {
            username: Some("me".into()),
            ..Default::default()
        };
        assert!(input.validate().is_err());
    }

    #[test]
    fn profile_update_ignores_submitted_role() {
        let profile: UpdateProfile =
            serde_json::from_str(r#"{"bio":"hello","role":"admin"}"#).unwrap();
        let update = UpdateUser::from(profile);
        assert_eq!(update.role, None);
        assert_eq!(update.bio.as_deref(), Some("hello"));
    }
}
