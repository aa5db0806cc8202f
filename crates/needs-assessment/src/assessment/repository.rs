use super::domain::SessionId;
use super::evaluation::AssessmentResult;
use super::session::AssessmentSession;

/// Storage for sessions that are still being answered.
pub trait SessionRepository: Send + Sync {
    fn insert(&self, session: AssessmentSession) -> Result<(), RepositoryError>;
    fn fetch(&self, id: &SessionId) -> Result<Option<AssessmentSession>, RepositoryError>;
    /// Apply `change` to the stored session in place. No other caller may read
    /// or change the session until `change` returns.
    fn modify<T, F>(&self, id: &SessionId, change: F) -> Result<T, RepositoryError>
    where
        F: FnOnce(&mut AssessmentSession) -> T;
    fn remove(&self, id: &SessionId) -> Result<Option<AssessmentSession>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("session already exists")]
    Conflict,
    #[error("session not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Carries a finished result to the view that displays it. A delivered result
/// can be claimed exactly once.
pub trait ResultSink: Send + Sync {
    fn deliver(&self, result: AssessmentResult) -> Result<(), SinkError>;
    fn claim(&self, id: &SessionId) -> Result<Option<AssessmentResult>, SinkError>;
}

/// Result handoff error.
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("result transport unavailable: {0}")]
    Transport(String),
}
