use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClassScanError {
    #[error("malformed class file: {0}")]
    ClassFormat(String),
    #[error("constant pool index {0} is missing")]
    MissingConstant(u16),
    #[error("constant pool index {index} holds {found}, expected a scalar constant")]
    UnexpectedConstant { index: u16, found: String },
    #[error("failed to encode metadata: {0}")]
    Json(#[from] serde_json::Error),
}

impl ClassScanError {
    pub(crate) fn format(err: impl std::fmt::Debug) -> Self {
        ClassScanError::ClassFormat(format!("{err:?}"))
    }
}

pub type Result<T> = std::result::Result<T, ClassScanError>;
