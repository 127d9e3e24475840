/// Fallback shown to the user when a failure carries no server message.
pub const GENERIC_ERROR_MESSAGE: &str = "Une erreur est survenue";

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Single human-readable message for inline display, per failed operation.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Validation(msg) => msg.clone(),
            AppError::Api { message, .. } => message.clone(),
            AppError::Http(_) | AppError::Internal(_) => GENERIC_ERROR_MESSAGE.to_string(),
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, AppError::Api { status: 401, .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, AppError::Api { status: 404, .. })
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let message = errors
            .field_errors()
            .into_values()
            .flat_map(|errs| errs.iter())
            .find_map(|e| e.message.as_ref().map(|m| m.to_string()))
            .unwrap_or_else(|| "Saisie invalide".to_string());
        AppError::Validation(message)
    }
}

pub type AppResult<T> = Result<T, AppError>;
