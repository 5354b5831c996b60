pub type DeckResult<T> = Result<T, DeckError>;

#[derive(thiserror::Error, Debug)]
pub enum DeckError {
    #[error("malformed document: {0}")]
    MalformedDocument(String),

    #[error("external tool failed: {0}")]
    ExternalTool(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl DeckError {
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedDocument(msg.into())
    }

    pub fn external_tool(msg: impl Into<String>) -> Self {
        Self::ExternalTool(msg.into())
    }
}
