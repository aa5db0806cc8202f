use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, info, warn};

use super::catalog::QuestionSet;
use super::domain::{AssessmentError, OptionId, QuestionId, SessionId};
use super::evaluation::AssessmentResult;
use super::repository::{RepositoryError, ResultSink, SessionRepository, SinkError};
use super::session::{AssessmentSession, Forward, SessionSnapshot};

/// Delays the display surface applies around the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlowTiming {
    /// Pause after a single-select choice before the step advances on its own.
    pub auto_advance: Duration,
    /// Cosmetic "calculating" pause before a finished result is shown.
    pub calculating_delay: Duration,
}

impl Default for FlowTiming {
    fn default() -> Self {
        Self {
            auto_advance: Duration::from_millis(400),
            calculating_delay: Duration::from_millis(1500),
        }
    }
}

/// Outcome of a forward step, as reported to the display surface.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", content = "data", rename_all = "snake_case")]
pub enum StepOutcome {
    InProgress(SessionSnapshot),
    Blocked(SessionSnapshot),
    Complete(Box<AssessmentResult>),
}

/// Service composing the question set, session storage, and result handoff.
pub struct AssessmentService<R, S> {
    questions: Arc<QuestionSet>,
    sessions: Arc<R>,
    sink: Arc<S>,
    timing: FlowTiming,
}

static SESSION_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_session_id() -> SessionId {
    let id = SESSION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    SessionId(format!("asm-{id:06}"))
}

impl<R, S> AssessmentService<R, S>
where
    R: SessionRepository + 'static,
    S: ResultSink + 'static,
{
    pub fn new(questions: QuestionSet, sessions: Arc<R>, sink: Arc<S>, timing: FlowTiming) -> Self {
        Self {
            questions: Arc::new(questions),
            sessions,
            sink,
            timing,
        }
    }

    pub fn questions(&self) -> &QuestionSet {
        &self.questions
    }

    pub fn timing(&self) -> FlowTiming {
        self.timing
    }

    /// Open a fresh session with zeroed scores and no selections.
    pub fn start(&self) -> Result<SessionSnapshot, AssessmentServiceError> {
        let session = AssessmentSession::new(next_session_id(), Arc::clone(&self.questions));
        let snapshot = session.snapshot(self.timing.auto_advance);
        self.sessions.insert(session)?;
        info!(session = %snapshot.session_id, steps = snapshot.total_steps, "assessment started");
        Ok(snapshot)
    }

    pub fn snapshot(&self, id: &SessionId) -> Result<SessionSnapshot, AssessmentServiceError> {
        let session = self.load(id)?;
        Ok(session.snapshot(self.timing.auto_advance))
    }

    pub fn select(
        &self,
        id: &SessionId,
        question_id: QuestionId,
        option_id: &OptionId,
    ) -> Result<SessionSnapshot, AssessmentServiceError> {
        let auto_advance = self.timing.auto_advance;
        let (scores, snapshot) = self.sessions.modify(id, |session| {
            let scores = session.select_option(question_id, option_id)?;
            Ok::<_, AssessmentError>((scores, session.snapshot(auto_advance)))
        })??;
        debug!(
            session = %id,
            question = %question_id,
            option = %option_id,
            complexity = scores.complexity,
            independence = scores.independence,
            "selection recorded"
        );
        Ok(snapshot)
    }

    pub fn back(&self, id: &SessionId) -> Result<SessionSnapshot, AssessmentServiceError> {
        let auto_advance = self.timing.auto_advance;
        let snapshot = self.sessions.modify(id, |session| {
            session.go_back()?;
            Ok::<_, AssessmentError>(session.snapshot(auto_advance))
        })??;
        Ok(snapshot)
    }

    /// Explicit "next" action. Finishing hands the result to the sink and
    /// discards the session.
    pub fn next(&self, id: &SessionId) -> Result<StepOutcome, AssessmentServiceError> {
        self.step(id, AssessmentSession::go_forward)
    }

    pub fn auto_advance(
        &self,
        id: &SessionId,
        from_step: usize,
    ) -> Result<StepOutcome, AssessmentServiceError> {
        self.step(id, |session| session.auto_advance(from_step))
    }

    /// Discard an unfinished session.
    pub fn abandon(&self, id: &SessionId) -> Result<(), AssessmentServiceError> {
        let session = self.sessions.remove(id)?.ok_or(RepositoryError::NotFound)?;
        info!(
            session = %id,
            answered = session.answers().answered_count(),
            "assessment abandoned"
        );
        Ok(())
    }

    /// Hand the finished result to the next view; available once.
    pub fn claim_result(&self, id: &SessionId) -> Result<AssessmentResult, AssessmentServiceError> {
        let result = self.sink.claim(id)?.ok_or(RepositoryError::NotFound)?;
        Ok(result)
    }

    fn load(&self, id: &SessionId) -> Result<AssessmentSession, AssessmentServiceError> {
        let session = self.sessions.fetch(id)?.ok_or(RepositoryError::NotFound)?;
        Ok(session)
    }

    /// Runs `advance` while the repository holds the session. A finished result
    /// reaches the sink before the session is released.
    fn step<F>(&self, id: &SessionId, advance: F) -> Result<StepOutcome, AssessmentServiceError>
    where
        F: FnOnce(&mut AssessmentSession) -> Result<Forward, AssessmentError>,
    {
        let auto_advance = self.timing.auto_advance;
        let outcome = self
            .sessions
            .modify(id, |session| -> Result<StepOutcome, AssessmentServiceError> {
                let before = session.clone();
                match advance(session)? {
                    Forward::Stayed { .. } => {
                        Ok(StepOutcome::Blocked(session.snapshot(auto_advance)))
                    }
                    Forward::Moved { step } => {
                        info!(
                            session = %id,
                            step,
                            total = session.answers().questions().len(),
                            "assessment step completed"
                        );
                        Ok(StepOutcome::InProgress(session.snapshot(auto_advance)))
                    }
                    Forward::Finished(result) => {
                        if let Err(error) = self.sink.deliver(result.as_ref().clone()) {
                            *session = before;
                            return Err(AssessmentServiceError::from(error));
                        }
                        info!(
                            session = %result.session_id,
                            tier = result.recommendation.complexity_tier.slug(),
                            model = result.recommendation.ownership_model.slug(),
                            complexity = result.scores.complexity,
                            independence = result.scores.independence,
                            "assessment complete"
                        );
                        Ok(StepOutcome::Complete(result))
                    }
                }
            })??;

        if matches!(outcome, StepOutcome::Complete(_)) && self.sessions.remove(id)?.is_none() {
            warn!(session = %id, "completed session was already discarded");
        }
        Ok(outcome)
    }
}

/// Error raised by the assessment service.
#[derive(Debug, thiserror::Error)]
pub enum AssessmentServiceError {
    #[error(transparent)]
    Assessment(#[from] AssessmentError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Sink(#[from] SinkError),
}
