use thiserror::Error;

#[derive(Error, Debug)]
pub enum LogicError {
    #[error("logic pipeline must be installed from within a tokio runtime: {0}")]
    NoRuntime(#[from] tokio::runtime::TryCurrentError),
}

pub type Result<T> = std::result::Result<T, LogicError>;
