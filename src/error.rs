//! Error types for KOK.

/// Top-level error type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),

    #[error("Geocoding error: {0}")]
    Geocode(#[from] GeocodeError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Key/value backend errors.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Failed to open store: {0}")]
    Open(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Schema setup failed: {0}")]
    Schema(String),
}

/// Typed failures of the profile repository.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error(transparent)]
    Backend(#[from] StoreError),

    /// The stored blob under `key` is not valid JSON (or not the expected shape).
    #[error("Stored record {key} is corrupt: {reason}")]
    Corrupt { key: String, reason: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Login errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Email or password does not match the stored account")]
    CredentialMismatch,

    #[error("Credential form is invalid")]
    InvalidForm(crate::validation::FieldErrors),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl AuthError {
    /// Text of the blocking alert shown to the user.
    pub fn alert_message(&self) -> &'static str {
        match self {
            Self::CredentialMismatch => "이메일 또는 비밀번호가 일치하지 않습니다.",
            Self::InvalidForm(_) => "입력한 정보를 다시 확인해주세요.",
            Self::Repository(_) => "저장된 정보를 불러올 수 없습니다.",
        }
    }
}

/// Map/geocoding service errors.
#[derive(Debug, thiserror::Error)]
pub enum GeocodeError {
    #[error("Geocoding request failed: {0}")]
    RequestFailed(String),

    #[error("Geocoding service rejected the request with status {status}")]
    Status { status: u16 },

    #[error("Invalid geocoding response: {0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for GeocodeError {
    fn from(e: reqwest::Error) -> Self {
        Self::RequestFailed(e.to_string())
    }
}

/// Result type alias for the crate.
pub type Result<T> = std::result::Result<T, Error>;
