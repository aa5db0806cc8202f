//! Needs assessment engine: question sets, answer scoring, classification, and
//! the session flow that hands a finished recommendation to the next view.

pub mod answers;
pub mod catalog;
pub mod domain;
pub mod evaluation;
pub mod repository;
pub mod router;
pub mod service;
pub mod session;

#[cfg(test)]
mod tests;

pub use answers::AnswerState;
pub use catalog::{CatalogError, OptionDefinition, QuestionDefinition, QuestionSet};
pub use domain::{
    AssessmentError, InvalidReference, OptionId, QuestionId, ScoreCard, Selection, SessionId,
};
pub use evaluation::{
    classify, AssessmentResult, ComplexityTier, OwnershipModel, Recommendation, ResultContent,
};
pub use repository::{RepositoryError, ResultSink, SessionRepository, SinkError};
pub use router::assessment_router;
pub use service::{AssessmentService, AssessmentServiceError, FlowTiming, StepOutcome};
pub use session::{
    AssessmentSession, Forward, OptionView, Progress, QuestionView, SessionSnapshot, SessionStatus,
};
