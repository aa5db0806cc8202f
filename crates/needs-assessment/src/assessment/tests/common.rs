use std::collections::HashMap;
use std::sync::{Arc, Barrier, Mutex};
use std::time::Duration;

use axum::response::Response;
use serde_json::Value;

use crate::assessment::catalog::{OptionDefinition, QuestionDefinition, QuestionSet};
use crate::assessment::domain::{OptionId, QuestionId, SessionId};
use crate::assessment::evaluation::AssessmentResult;
use crate::assessment::repository::{
    RepositoryError, ResultSink, SessionRepository, SinkError,
};
use crate::assessment::service::{AssessmentService, FlowTiming};
use crate::assessment::session::AssessmentSession;
use crate::assessment::{assessment_router, AnswerState};

pub(super) fn q(id: u32) -> QuestionId {
    QuestionId(id)
}

pub(super) fn opt(id: &str) -> OptionId {
    OptionId::new(id)
}

pub(super) fn standard_questions() -> Arc<QuestionSet> {
    Arc::new(QuestionSet::standard())
}

pub(super) fn standard_answers() -> AnswerState {
    AnswerState::new(standard_questions())
}

/// Two-question set with weights large enough to push past both clamp bounds.
pub(super) fn extreme_questions() -> Arc<QuestionSet> {
    let questions = QuestionSet::new(vec![
        QuestionDefinition {
            id: q(10),
            translation_key: "scope".to_string(),
            allows_multiple_selections: true,
            options: vec![
                OptionDefinition::new("huge", 90, 40),
                OptionDefinition::new("bigger", 75, 35),
                OptionDefinition::new("refund", -250, -90),
            ],
        },
        QuestionDefinition {
            id: q(11),
            translation_key: "support".to_string(),
            allows_multiple_selections: false,
            options: vec![
                OptionDefinition::new("none", -40, 0),
                OptionDefinition::new("full", 60, -7),
            ],
        },
    ])
    .expect("extreme question set is valid");
    Arc::new(questions)
}

pub(super) fn session() -> AssessmentSession {
    AssessmentSession::new(SessionId("asm-test".to_string()), standard_questions())
}

/// Answers every standard question: q1 opt2 (40), q2 opt3 (-3), q3 opt1 (+1),
/// q4 opt2 (15), q5 opt1 (+5). Complexity 55, independence 3.
pub(super) fn answer_all(session: &mut AssessmentSession) {
    for (question, option) in [(1, "opt2"), (2, "opt3"), (3, "opt1"), (4, "opt2"), (5, "opt1")] {
        session
            .select_option(q(question), &opt(option))
            .expect("standard selection");
    }
}

pub(super) fn instant_timing() -> FlowTiming {
    FlowTiming {
        auto_advance: Duration::from_millis(400),
        calculating_delay: Duration::ZERO,
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryRepository {
    sessions: Arc<Mutex<HashMap<SessionId, AssessmentSession>>>,
}

impl MemoryRepository {
    pub(super) fn len(&self) -> usize {
        self.sessions.lock().expect("repository mutex poisoned").len()
    }
}

impl SessionRepository for MemoryRepository {
    fn insert(&self, session: AssessmentSession) -> Result<(), RepositoryError> {
        let mut guard = self.sessions.lock().expect("repository mutex poisoned");
        if guard.contains_key(session.id()) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(session.id().clone(), session);
        Ok(())
    }

    fn fetch(&self, id: &SessionId) -> Result<Option<AssessmentSession>, RepositoryError> {
        let guard = self.sessions.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn modify<T, F>(&self, id: &SessionId, change: F) -> Result<T, RepositoryError>
    where
        F: FnOnce(&mut AssessmentSession) -> T,
    {
        let mut guard = self.sessions.lock().expect("repository mutex poisoned");
        let session = guard.get_mut(id).ok_or(RepositoryError::NotFound)?;
        Ok(change(session))
    }

    fn remove(&self, id: &SessionId) -> Result<Option<AssessmentSession>, RepositoryError> {
        let mut guard = self.sessions.lock().expect("repository mutex poisoned");
        Ok(guard.remove(id))
    }
}

/// Holds every `modify` caller at a barrier so concurrent requests reach the
/// repository together.
pub(super) struct GatedRepository {
    pub(super) inner: MemoryRepository,
    gate: Barrier,
}

impl GatedRepository {
    pub(super) fn new(callers: usize) -> Self {
        Self {
            inner: MemoryRepository::default(),
            gate: Barrier::new(callers),
        }
    }
}

impl SessionRepository for GatedRepository {
    fn insert(&self, session: AssessmentSession) -> Result<(), RepositoryError> {
        self.inner.insert(session)
    }

    fn fetch(&self, id: &SessionId) -> Result<Option<AssessmentSession>, RepositoryError> {
        self.inner.fetch(id)
    }

    fn modify<T, F>(&self, id: &SessionId, change: F) -> Result<T, RepositoryError>
    where
        F: FnOnce(&mut AssessmentSession) -> T,
    {
        self.gate.wait();
        self.inner.modify(id, change)
    }

    fn remove(&self, id: &SessionId) -> Result<Option<AssessmentSession>, RepositoryError> {
        self.inner.remove(id)
    }
}

#[derive(Default, Clone)]
pub(super) struct MemorySink {
    results: Arc<Mutex<Vec<AssessmentResult>>>,
}

impl MemorySink {
    pub(super) fn delivered(&self) -> Vec<AssessmentResult> {
        self.results.lock().expect("sink mutex poisoned").clone()
    }
}

impl ResultSink for MemorySink {
    fn deliver(&self, result: AssessmentResult) -> Result<(), SinkError> {
        self.results
            .lock()
            .expect("sink mutex poisoned")
            .push(result);
        Ok(())
    }

    fn claim(&self, id: &SessionId) -> Result<Option<AssessmentResult>, SinkError> {
        let mut guard = self.results.lock().expect("sink mutex poisoned");
        let position = guard.iter().position(|result| &result.session_id == id);
        Ok(position.map(|index| guard.remove(index)))
    }
}

pub(super) struct OfflineSink;

impl ResultSink for OfflineSink {
    fn deliver(&self, _result: AssessmentResult) -> Result<(), SinkError> {
        Err(SinkError::Transport("sink offline".to_string()))
    }

    fn claim(&self, _id: &SessionId) -> Result<Option<AssessmentResult>, SinkError> {
        Err(SinkError::Transport("sink offline".to_string()))
    }
}

pub(super) fn build_service() -> (
    AssessmentService<MemoryRepository, MemorySink>,
    MemoryRepository,
    MemorySink,
) {
    let repository = MemoryRepository::default();
    let sink = MemorySink::default();
    let service = AssessmentService::new(
        QuestionSet::standard(),
        Arc::new(repository.clone()),
        Arc::new(sink.clone()),
        instant_timing(),
    );
    (service, repository, sink)
}

pub(super) fn router_with_service(
    service: AssessmentService<MemoryRepository, MemorySink>,
) -> axum::Router {
    assessment_router(Arc::new(service))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
