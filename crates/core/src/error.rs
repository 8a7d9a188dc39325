use crate::flow::FlowTaskCycle;
use std::path::PathBuf;
use thiserror::Error;
use zip::result::ZipError;

#[derive(Error, Debug)]
pub enum MergeError {
    #[error("cannot open input {}: {source}", path.display())]
    InputOpen {
        path: PathBuf,
        #[source]
        source: ZipError,
    },
    #[error("cannot read input {}: {source}", path.display())]
    InputRead {
        path: PathBuf,
        #[source]
        source: ZipError,
    },
    #[error("cannot write output {}: {source}", path.display())]
    Output {
        path: PathBuf,
        #[source]
        source: ZipError,
    },
    #[error("duplicate entry `{name}`: {first} and {second}")]
    Collision {
        name: String,
        first: String,
        second: String,
    },
    #[error(transparent)]
    CyclicFlowTask(#[from] FlowTaskCycle),
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON serialization/deserialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl MergeError {
    pub(crate) fn input_open(path: impl Into<PathBuf>, source: impl Into<ZipError>) -> Self {
        MergeError::InputOpen {
            path: path.into(),
            source: source.into(),
        }
    }

    pub(crate) fn input_read(path: impl Into<PathBuf>, source: impl Into<ZipError>) -> Self {
        MergeError::InputRead {
            path: path.into(),
            source: source.into(),
        }
    }

    pub(crate) fn output(path: impl Into<PathBuf>, source: impl Into<ZipError>) -> Self {
        MergeError::Output {
            path: path.into(),
            source: source.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, MergeError>;
