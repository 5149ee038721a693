use thiserror::Error;

#[derive(Error, Debug)]
/// Import error
pub enum ImportError {
    #[error("Class '{0}' does not exist")]
    UnknownType(String),

    #[error("File does not exist")]
    FileNotFound,

    #[error("Content is not valid XML")]
    InvalidXml(String),

    #[error("Content is not valid JSON")]
    InvalidJson(String),

    #[error("Node '{0}' not found")]
    NoMatchingNodes(String),

    #[error("Invalid model definitions: {0}")]
    ModelDefinition(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ImportError {
    /// Parser detail attached to `InvalidXml` / `InvalidJson`, if any.
    pub fn detail(&self) -> Option<&str> {
        match self {
            ImportError::InvalidXml(detail) | ImportError::InvalidJson(detail) => Some(detail),
            _ => None,
        }
    }
}
