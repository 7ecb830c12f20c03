use thiserror::Error;
use tokio::task::JoinError;

/// Failure reported by a network collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    #[error("operation cancelled")]
    Cancelled,
    #[error("{0}")]
    Failed(String),
    /// A failure that came without anything worth showing to the user.
    #[error("request failed without details")]
    Unexplained,
}

impl ServiceError {
    pub fn failed(message: impl Into<String>) -> Self {
        ServiceError::Failed(message.into())
    }

    /// Human readable text, if the failure carries any.
    pub fn message(&self) -> Option<&str> {
        match self {
            ServiceError::Failed(message) if !message.trim().is_empty() => Some(message),
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("bridges session must be created inside a tokio runtime")]
    NoRuntime,
}

/// How a cancelable task ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome<T> {
    Completed(T),
    Cancelled,
    Failed(ServiceError),
}

impl<T> TaskOutcome<T> {
    /// Classifies a collaborator result; its own cancellation counts as cancelled.
    pub fn from_result(result: Result<T, ServiceError>) -> Self {
        match result {
            Ok(value) => TaskOutcome::Completed(value),
            Err(ServiceError::Cancelled) => TaskOutcome::Cancelled,
            Err(err) => TaskOutcome::Failed(err),
        }
    }

    /// Classifies a joined task; an aborted task counts as cancelled.
    pub fn from_join(joined: Result<TaskOutcome<T>, JoinError>) -> Self {
        match joined {
            Ok(outcome) => outcome,
            Err(err) if err.is_cancelled() => TaskOutcome::Cancelled,
            Err(err) => TaskOutcome::Failed(ServiceError::failed(err.to_string())),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, TaskOutcome::Cancelled)
    }
}
