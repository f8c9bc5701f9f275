use thiserror::Error;

#[derive(Error, Debug)]
pub enum NeuroLanderError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Environment error: {0}")]
    Environment(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Evaluation error: {0}")]
    Evaluation(String),

    #[error("Evolution error: {0}")]
    Evolution(String),

    #[error("Render error: {0}")]
    Render(String),

    #[error("All species went extinct")]
    CompleteExtinction,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serde error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("Config source error: {0}")]
    ConfigSource(#[from] config::ConfigError),
}

pub type Result<T> = std::result::Result<T, NeuroLanderError>;
