use thiserror::Error;
use tokio::task::JoinError;

#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("dispatch task panicked: {0}")]
    Panicked(String),

    #[error("dispatch task was aborted")]
    Aborted,
}

impl From<JoinError> for DispatchError {
    fn from(err: JoinError) -> Self {
        if err.is_cancelled() {
            return DispatchError::Aborted;
        }
        let payload = err.into_panic();
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "non-string panic payload".to_string());
        DispatchError::Panicked(message)
    }
}

pub type Result<T> = std::result::Result<T, DispatchError>;
