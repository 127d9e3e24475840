use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub email: String,
    #[serde(default)]
    pub firstname: Option<String>,
    #[serde(default)]
    pub lastname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl User {
    /// Short name shown in the header: the local part of the email address.
    pub fn display_name(&self) -> String {
        match self.email.split('@').next() {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => "Utilisateur".to_string(),
        }
    }
}

/// Authenticated identity plus bearer credential, as returned by the auth
/// endpoints (`{token, user}`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub user: User,
}

/// POST /auth/login
#[derive(Debug, Clone, Serialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Format d'email invalide"))]
    pub email: String,

    #[validate(length(min = 1, message = "Le mot de passe est requis"))]
    pub password: String,
}

/// POST /auth/register
#[derive(Debug, Clone, Serialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 2, max = 50, message = "Le prénom doit contenir entre 2 et 50 caractères"))]
    pub firstname: String,

    #[validate(length(min = 2, max = 50, message = "Le nom doit contenir entre 2 et 50 caractères"))]
    pub lastname: String,

    #[validate(email(message = "Format d'email invalide"))]
    pub email: String,

    #[validate(length(min = 6, message = "Le mot de passe doit contenir au moins 6 caractères"))]
    pub password: String,

    /// Form-level confirmation; checked locally and never serialized.
    #[serde(skip_serializing)]
    #[validate(must_match(other = "password", message = "Les mots de passe ne correspondent pas"))]
    pub password_confirm: String,
}
