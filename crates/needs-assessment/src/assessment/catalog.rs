use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::domain::{InvalidReference, OptionId, QuestionId};

/// One selectable choice and its contribution to both scores.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionDefinition {
    pub id: OptionId,
    pub translation_key: String,
    #[serde(rename = "complexity")]
    pub complexity_weight: i32,
    #[serde(rename = "independence")]
    pub independence_weight: i32,
}

impl OptionDefinition {
    pub fn new(id: &str, complexity_weight: i32, independence_weight: i32) -> Self {
        Self {
            id: OptionId::new(id),
            translation_key: id.to_string(),
            complexity_weight,
            independence_weight,
        }
    }
}

/// Decision point presented as one step of the assessment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionDefinition {
    pub id: QuestionId,
    pub translation_key: String,
    #[serde(rename = "multi_select", default)]
    pub allows_multiple_selections: bool,
    pub options: Vec<OptionDefinition>,
}

impl QuestionDefinition {
    pub fn option(&self, index: usize) -> Option<&OptionDefinition> {
        self.options.get(index)
    }

    pub fn option_position(&self, option_id: &OptionId) -> Option<usize> {
        self.options.iter().position(|option| &option.id == option_id)
    }
}

/// Ordered, validated question set. Every id lookup the engine performs goes
/// through [`QuestionSet::resolve`], so references are checked in one place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct QuestionSet {
    questions: Vec<QuestionDefinition>,
}

impl QuestionSet {
    pub fn new(questions: Vec<QuestionDefinition>) -> Result<Self, CatalogError> {
        if questions.is_empty() {
            return Err(CatalogError::Empty);
        }

        let mut seen_questions = HashSet::new();
        for question in &questions {
            if !seen_questions.insert(question.id) {
                return Err(CatalogError::DuplicateQuestion(question.id));
            }
            if question.options.is_empty() {
                return Err(CatalogError::NoOptions(question.id));
            }

            let mut seen_options = HashSet::new();
            for option in &question.options {
                if !seen_options.insert(&option.id) {
                    return Err(CatalogError::DuplicateOption {
                        question_id: question.id,
                        option_id: option.id.clone(),
                    });
                }
            }
        }

        Ok(Self { questions })
    }

    /// The five-step project calculator shipped with the site.
    pub fn standard() -> Self {
        let question = |id: u32, multi: bool, options: Vec<OptionDefinition>| QuestionDefinition {
            id: QuestionId(id),
            translation_key: format!("q{id}"),
            allows_multiple_selections: multi,
            options,
        };

        Self {
            questions: vec![
                question(
                    1,
                    false,
                    vec![
                        OptionDefinition::new("opt1", 10, 0),
                        OptionDefinition::new("opt2", 40, 0),
                        OptionDefinition::new("opt3", 80, 0),
                    ],
                ),
                question(
                    2,
                    false,
                    vec![
                        OptionDefinition::new("opt1", 0, 3),
                        OptionDefinition::new("opt2", 0, 1),
                        OptionDefinition::new("opt3", 0, -3),
                    ],
                ),
                question(
                    3,
                    false,
                    vec![
                        OptionDefinition::new("opt1", 0, 1),
                        OptionDefinition::new("opt2", 20, -1),
                        OptionDefinition::new("opt3", 40, -2),
                    ],
                ),
                question(
                    4,
                    true,
                    vec![
                        OptionDefinition::new("opt1", 0, 0),
                        OptionDefinition::new("opt2", 15, 0),
                        OptionDefinition::new("opt3", 25, 0),
                        OptionDefinition::new("opt4", 30, 0),
                    ],
                ),
                question(
                    5,
                    false,
                    vec![
                        OptionDefinition::new("opt1", 0, 5),
                        OptionDefinition::new("opt2", 0, -5),
                    ],
                ),
            ],
        }
    }

    pub fn from_json_str(raw: &str) -> Result<Self, CatalogError> {
        let questions: Vec<QuestionDefinition> = serde_json::from_str(raw)?;
        Self::new(questions)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn questions(&self) -> &[QuestionDefinition] {
        &self.questions
    }

    pub fn question(&self, index: usize) -> Option<&QuestionDefinition> {
        self.questions.get(index)
    }

    pub fn position(&self, question_id: QuestionId) -> Option<usize> {
        self.questions
            .iter()
            .position(|question| question.id == question_id)
    }

    /// Map a (question, option) citation to positional indices.
    pub fn resolve(
        &self,
        question_id: QuestionId,
        option_id: &OptionId,
    ) -> Result<(usize, usize), InvalidReference> {
        let question_index = self
            .position(question_id)
            .ok_or(InvalidReference::Question(question_id))?;
        let option_index = self.questions[question_index]
            .option_position(option_id)
            .ok_or_else(|| InvalidReference::Option {
                question_id,
                option_id: option_id.clone(),
            })?;
        Ok((question_index, option_index))
    }
}

/// Raised when a question set fails load-time validation.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed reading question set {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("question set is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("question set contains no questions")]
    Empty,
    #[error("question {0} has no options")]
    NoOptions(QuestionId),
    #[error("question id {0} appears more than once")]
    DuplicateQuestion(QuestionId),
    #[error("option '{option_id}' appears more than once in question {question_id}")]
    DuplicateOption {
        question_id: QuestionId,
        option_id: OptionId,
    },
}
