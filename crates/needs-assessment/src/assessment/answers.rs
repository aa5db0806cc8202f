use std::collections::BTreeMap;
use std::sync::Arc;

use super::catalog::{OptionDefinition, QuestionSet};
use super::domain::{AssessmentError, OptionId, QuestionId, ScoreCard, Selection};
use super::evaluation::{classify, Recommendation};

pub const COMPLEXITY_FLOOR: i64 = 0;
pub const COMPLEXITY_CEILING: i64 = 100;

/// Selections made so far in one assessment. Scores are never stored; they are
/// tallied from the selections each time they are read.
#[derive(Debug, Clone)]
pub struct AnswerState {
    questions: Arc<QuestionSet>,
    picks: Vec<Vec<usize>>,
}

impl AnswerState {
    pub fn new(questions: Arc<QuestionSet>) -> Self {
        let picks = vec![Vec::new(); questions.len()];
        Self { questions, picks }
    }

    pub fn questions(&self) -> &QuestionSet {
        &self.questions
    }

    /// Record a choice. Single-select questions keep only the latest option;
    /// multi-select questions toggle the option in or out of their set.
    pub fn select_option(
        &mut self,
        question_id: QuestionId,
        option_id: &OptionId,
    ) -> Result<ScoreCard, AssessmentError> {
        let (question_index, option_index) = self.questions.resolve(question_id, option_id)?;
        let multi = self.questions.questions()[question_index].allows_multiple_selections;
        let picks = &mut self.picks[question_index];

        if multi {
            match picks.iter().position(|&picked| picked == option_index) {
                Some(existing) => {
                    picks.remove(existing);
                }
                None => picks.push(option_index),
            }
        } else {
            picks.clear();
            picks.push(option_index);
        }

        Ok(self.scores())
    }

    pub fn is_answered(&self, question_index: usize) -> bool {
        self.picks
            .get(question_index)
            .map(|picks| !picks.is_empty())
            .unwrap_or(false)
    }

    pub fn is_selected(&self, question_index: usize, option_index: usize) -> bool {
        self.picks
            .get(question_index)
            .map(|picks| picks.contains(&option_index))
            .unwrap_or(false)
    }

    pub fn is_complete(&self) -> bool {
        self.first_unanswered().is_none()
    }

    pub fn first_unanswered(&self) -> Option<QuestionId> {
        self.questions
            .questions()
            .iter()
            .zip(&self.picks)
            .find(|(_, picks)| picks.is_empty())
            .map(|(question, _)| question.id)
    }

    pub fn answered_count(&self) -> usize {
        self.picks.iter().filter(|picks| !picks.is_empty()).count()
    }

    pub fn complexity_score(&self) -> u8 {
        let raw: i64 = self
            .selected_options()
            .map(|option| i64::from(option.complexity_weight))
            .sum();
        // Bounded to 0..=100, so the narrowing cannot truncate.
        raw.clamp(COMPLEXITY_FLOOR, COMPLEXITY_CEILING) as u8
    }

    pub fn independence_score(&self) -> i64 {
        self.selected_options()
            .map(|option| i64::from(option.independence_weight))
            .sum()
    }

    pub fn scores(&self) -> ScoreCard {
        ScoreCard {
            complexity: self.complexity_score(),
            independence: self.independence_score(),
        }
    }

    /// Raw selections keyed by question id, omitting unanswered questions.
    pub fn selections(&self) -> BTreeMap<QuestionId, Selection> {
        self.questions
            .questions()
            .iter()
            .zip(&self.picks)
            .filter(|(_, picks)| !picks.is_empty())
            .map(|(question, picks)| {
                let ids = picks.iter().map(|&index| question.options[index].id.clone());
                let selection = if question.allows_multiple_selections {
                    Selection::Multiple(ids.collect())
                } else {
                    match ids.last() {
                        Some(id) => Selection::Single(id),
                        None => Selection::Multiple(Vec::new()),
                    }
                };
                (question.id, selection)
            })
            .collect()
    }

    pub fn classify(&self) -> Result<Recommendation, AssessmentError> {
        if let Some(unanswered) = self.first_unanswered() {
            return Err(AssessmentError::NotReady { unanswered });
        }
        Ok(classify(&self.scores()))
    }

    fn selected_options(&self) -> impl Iterator<Item = &OptionDefinition> + '_ {
        self.questions
            .questions()
            .iter()
            .zip(&self.picks)
            .flat_map(|(question, picks)| picks.iter().map(move |&index| &question.options[index]))
    }
}
