use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(String),

    #[error("invalid billing period: {0}")]
    InvalidPeriod(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("contract violation: {0}")]
    ContractViolation(String),

    #[error("lambda api error: {0}")]
    Lambda(String),

    #[error("cloudwatch api error: {0}")]
    CloudWatch(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    TomlDe(#[from] toml::de::Error),

    #[error(transparent)]
    TomlSer(#[from] toml::ser::Error),
}
