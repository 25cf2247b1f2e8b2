/// Process-level error type.
///
/// Adapter crates map their specific errors into this type. User-facing
/// command failures are not represented here; they are rendered as replies
/// (see `registry::RegistryError` and `commands::UsageError`).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{var} environment variable is required")]
    MissingToken { var: &'static str },

    #[error("config error: {0}")]
    Config(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("external error: {0}")]
    External(String),
}

pub type Result<T> = std::result::Result<T, Error>;
