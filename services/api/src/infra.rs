use chrono::{DateTime, Utc};
use metrics_exporter_prometheus::PrometheusHandle;
use needs_assessment::assessment::{
    AssessmentResult, AssessmentSession, OptionId, QuestionId, RepositoryError, ResultSink,
    SessionId, SessionRepository, SinkError,
};
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Default, Clone)]
pub(crate) struct InMemorySessionRepository {
    sessions: Arc<Mutex<HashMap<SessionId, AssessmentSession>>>,
}

impl SessionRepository for InMemorySessionRepository {
    fn insert(&self, session: AssessmentSession) -> Result<(), RepositoryError> {
        let mut guard = self
            .sessions
            .lock()
            .map_err(|_| RepositoryError::Unavailable("session store poisoned".to_string()))?;
        if guard.contains_key(session.id()) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(session.id().clone(), session);
        Ok(())
    }

    fn fetch(&self, id: &SessionId) -> Result<Option<AssessmentSession>, RepositoryError> {
        let guard = self
            .sessions
            .lock()
            .map_err(|_| RepositoryError::Unavailable("session store poisoned".to_string()))?;
        Ok(guard.get(id).cloned())
    }

    fn modify<T, F>(&self, id: &SessionId, change: F) -> Result<T, RepositoryError>
    where
        F: FnOnce(&mut AssessmentSession) -> T,
    {
        let mut guard = self
            .sessions
            .lock()
            .map_err(|_| RepositoryError::Unavailable("session store poisoned".to_string()))?;
        let session = guard.get_mut(id).ok_or(RepositoryError::NotFound)?;
        Ok(change(session))
    }

    fn remove(&self, id: &SessionId) -> Result<Option<AssessmentSession>, RepositoryError> {
        let mut guard = self
            .sessions
            .lock()
            .map_err(|_| RepositoryError::Unavailable("session store poisoned".to_string()))?;
        Ok(guard.remove(id))
    }
}

/// Holds finished results until the result view claims them. Results left
/// unclaimed past the retention window are evicted.
#[derive(Clone)]
pub(crate) struct InMemoryResultSink {
    results: Arc<Mutex<HashMap<SessionId, AssessmentResult>>>,
    retention: Duration,
}

impl InMemoryResultSink {
    pub(crate) fn new(retention: Duration) -> Self {
        Self {
            results: Arc::default(),
            retention,
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<SessionId, AssessmentResult>>, SinkError> {
        let mut guard = self
            .results
            .lock()
            .map_err(|_| SinkError::Transport("result store poisoned".to_string()))?;
        let now = Utc::now();
        let retention = self.retention;
        guard.retain(|_, result| !expired(result.completed_at, now, retention));
        Ok(guard)
    }
}

impl Default for InMemoryResultSink {
    fn default() -> Self {
        Self::new(DEFAULT_RESULT_RETENTION)
    }
}

impl ResultSink for InMemoryResultSink {
    fn deliver(&self, result: AssessmentResult) -> Result<(), SinkError> {
        self.lock()?.insert(result.session_id.clone(), result);
        Ok(())
    }

    fn claim(&self, id: &SessionId) -> Result<Option<AssessmentResult>, SinkError> {
        Ok(self.lock()?.remove(id))
    }
}

const DEFAULT_RESULT_RETENTION: Duration = Duration::from_secs(15 * 60);

fn expired(completed_at: DateTime<Utc>, now: DateTime<Utc>, retention: Duration) -> bool {
    (now - completed_at)
        .to_std()
        .map(|age| age > retention)
        .unwrap_or(false)
}

/// One `--answer` argument: a question id and the options picked for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct AnswerArg {
    pub(crate) question_id: QuestionId,
    pub(crate) option_ids: Vec<OptionId>,
}

/// Parses `QUESTION=OPTION[,OPTION...]`, e.g. `1=opt2` or `4=opt2,opt3`.
pub(crate) fn parse_answer(raw: &str) -> Result<AnswerArg, String> {
    let (question, options) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected QUESTION=OPTION, got '{raw}'"))?;

    let question_id = question
        .trim()
        .parse::<u32>()
        .map(QuestionId)
        .map_err(|err| format!("failed to parse question id '{question}' ({err})"))?;

    let option_ids: Vec<OptionId> = options
        .split(',')
        .map(str::trim)
        .filter(|option| !option.is_empty())
        .map(OptionId::new)
        .collect();
    if option_ids.is_empty() {
        return Err(format!("answer for question {question_id} names no options"));
    }

    Ok(AnswerArg {
        question_id,
        option_ids,
    })
}
