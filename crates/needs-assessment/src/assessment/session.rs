use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde::Serialize;

use super::answers::AnswerState;
use super::catalog::QuestionSet;
use super::domain::{AssessmentError, OptionId, QuestionId, ScoreCard, SessionId};
use super::evaluation::{AssessmentResult, ComplexityTier};

/// Where a session sits in the ordered question sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    InProgress { step: usize },
    Complete,
}

/// Result of asking the session to move forward.
#[derive(Debug, Clone, PartialEq)]
pub enum Forward {
    /// The current step is unanswered (or an automatic advance was stale).
    Stayed { step: usize },
    Moved { step: usize },
    Finished(Box<AssessmentResult>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    InProgress,
    Complete,
}

/// One assessment run, from the first question to the handoff of its result.
#[derive(Debug, Clone)]
pub struct AssessmentSession {
    id: SessionId,
    answers: AnswerState,
    progress: Progress,
}

impl AssessmentSession {
    pub fn new(id: SessionId, questions: Arc<QuestionSet>) -> Self {
        Self {
            id,
            answers: AnswerState::new(questions),
            progress: Progress::InProgress { step: 0 },
        }
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn progress(&self) -> Progress {
        self.progress
    }

    pub fn answers(&self) -> &AnswerState {
        &self.answers
    }

    pub fn scores(&self) -> ScoreCard {
        self.answers.scores()
    }

    /// Record a selection without moving between steps.
    pub fn select_option(
        &mut self,
        question_id: QuestionId,
        option_id: &OptionId,
    ) -> Result<ScoreCard, AssessmentError> {
        self.current_step()?;
        self.answers.select_option(question_id, option_id)
    }

    pub fn can_go_back(&self) -> bool {
        matches!(self.progress, Progress::InProgress { step } if step > 0)
    }

    pub fn can_go_forward(&self) -> bool {
        match self.progress {
            Progress::InProgress { step } => self.answers.is_answered(step),
            Progress::Complete => false,
        }
    }

    /// Step back one question. Selections and their scores are left untouched.
    pub fn go_back(&mut self) -> Result<usize, AssessmentError> {
        let step = self.current_step()?;
        let step = step.saturating_sub(1);
        self.progress = Progress::InProgress { step };
        Ok(step)
    }

    /// Advance past the current question, finishing the session on the last one.
    pub fn go_forward(&mut self) -> Result<Forward, AssessmentError> {
        let step = self.current_step()?;
        if !self.answers.is_answered(step) {
            return Ok(Forward::Stayed { step });
        }

        if step + 1 < self.answers.questions().len() {
            self.progress = Progress::InProgress { step: step + 1 };
            return Ok(Forward::Moved { step: step + 1 });
        }

        let recommendation = self.answers.classify()?;
        self.progress = Progress::Complete;

        Ok(Forward::Finished(Box::new(AssessmentResult {
            session_id: self.id.clone(),
            recommendation,
            scores: self.answers.scores(),
            selections: self.answers.selections(),
            content: recommendation.content(),
            total_questions: self.answers.questions().len(),
            completed_at: Utc::now(),
        })))
    }

    /// Debounced advance after a single-select choice. Only fires when the session
    /// is still on `from_step`, so a late timer never skips a question.
    pub fn auto_advance(&mut self, from_step: usize) -> Result<Forward, AssessmentError> {
        let step = self.current_step()?;
        if step != from_step || !self.auto_advance_eligible(step) {
            return Ok(Forward::Stayed { step });
        }
        self.go_forward()
    }

    pub fn snapshot(&self, auto_advance_delay: Duration) -> SessionSnapshot {
        let total_steps = self.answers.questions().len();
        let (status, step) = match self.progress {
            Progress::InProgress { step } => (SessionStatus::InProgress, step),
            Progress::Complete => (SessionStatus::Complete, total_steps.saturating_sub(1)),
        };

        let question = self.answers.questions().question(step).map(|question| {
            QuestionView {
                id: question.id,
                translation_key: question.translation_key.clone(),
                allows_multiple_selections: question.allows_multiple_selections,
                options: question
                    .options
                    .iter()
                    .enumerate()
                    .map(|(index, option)| OptionView {
                        id: option.id.clone(),
                        translation_key: option.translation_key.clone(),
                        selected: self.answers.is_selected(step, index),
                    })
                    .collect(),
            }
        });

        let scores = self.answers.scores();
        let auto_advance_after_ms = match self.progress {
            Progress::InProgress { step } if self.auto_advance_eligible(step) => {
                Some(u64::try_from(auto_advance_delay.as_millis()).unwrap_or(u64::MAX))
            }
            _ => None,
        };

        SessionSnapshot {
            session_id: self.id.clone(),
            status,
            step,
            total_steps,
            progress_percent: progress_percent(step, total_steps),
            question,
            scores,
            meter: ComplexityTier::from_score(scores.complexity),
            can_go_back: self.can_go_back(),
            can_go_forward: self.can_go_forward(),
            is_last_step: step + 1 == total_steps,
            auto_advance_after_ms,
        }
    }

    fn current_step(&self) -> Result<usize, AssessmentError> {
        match self.progress {
            Progress::InProgress { step } => Ok(step),
            Progress::Complete => Err(AssessmentError::SessionComplete),
        }
    }

    fn auto_advance_eligible(&self, step: usize) -> bool {
        self.answers
            .questions()
            .question(step)
            .map(|question| !question.allows_multiple_selections)
            .unwrap_or(false)
            && self.answers.is_answered(step)
    }
}

fn progress_percent(step: usize, total_steps: usize) -> u8 {
    if total_steps == 0 {
        return 0;
    }
    let percent = ((step + 1) as f64 / total_steps as f64 * 100.0).round();
    percent.clamp(0.0, 100.0) as u8
}

/// Immutable view of a session that a display surface renders from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSnapshot {
    pub session_id: SessionId,
    pub status: SessionStatus,
    pub step: usize,
    pub total_steps: usize,
    pub progress_percent: u8,
    pub question: Option<QuestionView>,
    pub scores: ScoreCard,
    pub meter: ComplexityTier,
    pub can_go_back: bool,
    pub can_go_forward: bool,
    pub is_last_step: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_advance_after_ms: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuestionView {
    pub id: QuestionId,
    pub translation_key: String,
    pub allows_multiple_selections: bool,
    pub options: Vec<OptionView>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OptionView {
    pub id: OptionId,
    pub translation_key: String,
    pub selected: bool,
}
