use thiserror::Error;

#[derive(Error, Debug)]
pub enum RelToolsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Process error: {0}")]
    Process(String),

    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    #[error("Version error: {0}")]
    Version(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

pub type Result<T> = std::result::Result<T, RelToolsError>;
