use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a question; ordering of the set defines presentation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct QuestionId(pub u32);

impl fmt::Display for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Identifier of an option, unique within its question.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OptionId(pub String);

impl OptionId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

/// Identifier handed to the display surface for an in-progress session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

/// Recorded answer for one question. Single-select questions carry one option id,
/// multi-select questions carry the chosen ids in the order they were picked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Selection {
    Single(OptionId),
    Multiple(Vec<OptionId>),
}

impl Selection {
    pub fn contains(&self, option_id: &OptionId) -> bool {
        match self {
            Selection::Single(selected) => selected == option_id,
            Selection::Multiple(selected) => selected.contains(option_id),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Selection::Single(_) => false,
            Selection::Multiple(selected) => selected.is_empty(),
        }
    }
}

/// Both running scores, as shown on the live meter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreCard {
    pub complexity: u8,
    pub independence: i64,
}

/// Citation of an id that the configured question set does not contain.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidReference {
    #[error("question {0} is not part of the configured question set")]
    Question(QuestionId),
    #[error("option '{option_id}' does not belong to question {question_id}")]
    Option {
        question_id: QuestionId,
        option_id: OptionId,
    },
}

/// Integration defects raised by the engine. None of these are retryable.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AssessmentError {
    #[error(transparent)]
    InvalidReference(#[from] InvalidReference),
    #[error("assessment is not ready to classify: question {unanswered} has no selection")]
    NotReady { unanswered: QuestionId },
    #[error("assessment session is already complete")]
    SessionComplete,
}
