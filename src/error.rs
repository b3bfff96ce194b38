pub type LanechartResult<T> = Result<T, LanechartError>;

#[derive(thiserror::Error, Debug)]
pub enum LanechartError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("ingest error: {0}")]
    Ingest(String),

    #[error("animation error: {0}")]
    Animation(String),

    #[error("serialization error: {0}")]
    Serde(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl LanechartError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn ingest(msg: impl Into<String>) -> Self {
        Self::Ingest(msg.into())
    }

    pub fn animation(msg: impl Into<String>) -> Self {
        Self::Animation(msg.into())
    }

    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}
