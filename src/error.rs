use thiserror::Error;

pub type RenderResult<T> = Result<T, RenderError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RenderError {
    #[error("unrecognized focus command {command:?} at position {position}")]
    DegenerateFocus { command: char, position: usize },

    #[error("unknown palette {0:?}")]
    UnknownPalette(String),

    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

#[derive(Error, Debug, Clone, PartialEq)]
#[error("invalid value {value:?} for parameter {key}")]
pub struct ParamError {
    pub key: String,
    pub value: String,
}

impl ParamError {
    pub fn new(key: &str, value: &str) -> Self {
        Self {
            key: key.to_string(),
            value: value.to_string(),
        }
    }
}

impl RenderError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }
}
