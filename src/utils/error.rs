use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// 單一欄位的驗證錯誤
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &str, message: &str) -> Self {
        Self {
            field: field.to_string(),
            message: message.to_string(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Failures reported by the auth provider, already mapped to what a user should see.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthFailure {
    EmailAlreadyInUse,
    InvalidCredentials,
    WeakPassword,
    InvalidEmail,
    NetworkUnavailable,
    ProviderUnavailable,
    Unknown,
}

impl AuthFailure {
    /// Maps a provider error code such as `EMAIL_EXISTS` or `WEAK_PASSWORD : ...`.
    pub fn from_provider_code(code: &str) -> Self {
        let head = code.split(':').next().unwrap_or_default().trim();
        match head {
            "EMAIL_EXISTS" => Self::EmailAlreadyInUse,
            "INVALID_LOGIN_CREDENTIALS" | "INVALID_PASSWORD" | "EMAIL_NOT_FOUND"
            | "USER_DISABLED" => Self::InvalidCredentials,
            "WEAK_PASSWORD" => Self::WeakPassword,
            "INVALID_EMAIL" | "MISSING_EMAIL" => Self::InvalidEmail,
            "OPERATION_NOT_ALLOWED" | "CONFIGURATION_NOT_FOUND" | "INVALID_API_KEY" => {
                Self::ProviderUnavailable
            }
            other if other.starts_with("API key not valid") => Self::ProviderUnavailable,
            _ => Self::Unknown,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Self::EmailAlreadyInUse => "This email is already registered. Try logging in instead.",
            Self::InvalidCredentials => "Invalid email or password.",
            Self::WeakPassword => "Password is too weak. Please use at least 6 characters.",
            Self::InvalidEmail => "Please enter a valid email address.",
            Self::NetworkUnavailable => {
                "Network error. Check your internet connection and try again."
            }
            Self::ProviderUnavailable => {
                "Authentication is temporarily unavailable. Please try again later."
            }
            Self::Unknown => "An error occurred. Please try again.",
        }
    }
}

impl fmt::Display for AuthFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Record source unavailable: {message}")]
    SourceUnavailable { message: String },

    #[error("Favorites persistence unavailable: {message}")]
    PersistenceUnavailable { message: String },

    #[error("Authentication failed: {0}")]
    AuthError(AuthFailure),

    #[error("Sign in required")]
    Unauthenticated,

    #[error("Validation failed: {}", join_field_errors(.errors))]
    ValidationError { errors: Vec<FieldError> },

    #[error("Unknown catalog record: {identity}")]
    UnknownRecord { identity: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("HTTP request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("CSV output error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),
}

fn join_field_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    SourceUnavailable,
    PersistenceUnavailable,
    Auth,
    Validation,
    Configuration,
    Io,
}

impl CatalogError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::SourceUnavailable { .. } | Self::ApiError(_) => ErrorKind::SourceUnavailable,
            Self::PersistenceUnavailable { .. } => ErrorKind::PersistenceUnavailable,
            Self::AuthError(_) | Self::Unauthenticated => ErrorKind::Auth,
            Self::ValidationError { .. } | Self::UnknownRecord { .. } => ErrorKind::Validation,
            Self::ConfigError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. }
            | Self::TomlError(_) => ErrorKind::Configuration,
            Self::IoError(_) | Self::SerializationError(_) | Self::CsvError(_) => ErrorKind::Io,
        }
    }

    pub fn validation(errors: Vec<FieldError>) -> Self {
        Self::ValidationError { errors }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::AuthError(failure) => failure.message().to_string(),
            Self::Unauthenticated => "Please log in to use favorites.".to_string(),
            Self::ValidationError { errors } => errors
                .iter()
                .map(|e| e.message.clone())
                .collect::<Vec<_>>()
                .join("\n"),
            Self::UnknownRecord { identity } => {
                format!("No psychologist found for '{}'", identity)
            }
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.kind() {
            ErrorKind::SourceUnavailable => "Check the database URL or run with --offline",
            ErrorKind::PersistenceUnavailable => "Favorites will sync on the next successful write",
            ErrorKind::Auth => "Run `psy-catalog login` and try again",
            ErrorKind::Validation => "Correct the highlighted fields and submit again",
            ErrorKind::Configuration => "Check the configuration file and CLI flags",
            ErrorKind::Io => "Check that the state directory is writable",
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self.kind() {
            ErrorKind::Validation => 2,
            ErrorKind::Auth => 3,
            ErrorKind::Configuration => 4,
            ErrorKind::SourceUnavailable | ErrorKind::PersistenceUnavailable | ErrorKind::Io => 1,
        }
    }
}

pub type Result<T> = std::result::Result<T, CatalogError>;
