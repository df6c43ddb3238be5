//! Error taxonomy shared by the admin actions, the settings store and the media library.

use hyper::StatusCode;
use std::path::PathBuf;
use thiserror::Error;

pub type PromoResult<T, E = PromoError> = Result<T, E>;

#[derive(Error, Debug)]
pub enum PromoError {
    #[error("No tienes permisos para realizar esta acción.")]
    PermissionDenied,
    #[error("Sesión expirada. Recarga la página e intenta de nuevo.")]
    InvalidToken,
    #[error("{0}")]
    InvalidInput(String),
    #[error("El PDF no se encontró: {}", .0.display())]
    FileMissing(PathBuf),
    #[error("Store error: {0}")]
    Store(String),
    #[error("{0}")]
    Io(#[from] std::io::Error),
}

impl PromoError {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// HTTP status used when the error is surfaced through an admin envelope
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::PermissionDenied | Self::InvalidToken => StatusCode::FORBIDDEN,
            Self::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Self::FileMissing(_) => StatusCode::NOT_FOUND,
            Self::Store(_) | Self::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Short machine-readable kind, used in log lines
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::PermissionDenied => "permission_denied",
            Self::InvalidToken => "invalid_token",
            Self::InvalidInput(_) => "invalid_input",
            Self::FileMissing(_) => "file_missing",
            Self::Store(_) => "store",
            Self::Io(_) => "io",
        }
    }
}

impl From<toml::de::Error> for PromoError {
    fn from(e: toml::de::Error) -> Self {
        Self::Store(e.to_string())
    }
}

impl From<toml::ser::Error> for PromoError {
    fn from(e: toml::ser::Error) -> Self {
        Self::Store(e.to_string())
    }
}
