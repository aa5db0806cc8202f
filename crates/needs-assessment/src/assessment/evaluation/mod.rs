mod content;
mod policy;

pub use content::ResultContent;
pub use policy::{ComplexityTier, OwnershipModel, LOW_TIER_CEILING, MID_TIER_CEILING};

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{QuestionId, ScoreCard, SessionId, Selection};

/// Terminal classification of a completed assessment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Recommendation {
    pub complexity_tier: ComplexityTier,
    pub ownership_model: OwnershipModel,
}

impl Recommendation {
    pub fn content(&self) -> ResultContent {
        ResultContent::for_outcome(self.complexity_tier, self.ownership_model)
    }

    pub fn summary(&self) -> String {
        format!(
            "{} complexity, {} ownership",
            self.complexity_tier.slug(),
            self.ownership_model.slug()
        )
    }
}

/// Pure mapping from final scores to a recommendation.
pub fn classify(scores: &ScoreCard) -> Recommendation {
    Recommendation {
        complexity_tier: ComplexityTier::from_score(scores.complexity),
        ownership_model: OwnershipModel::from_score(scores.independence),
    }
}

/// Payload handed to the result sink once per completed session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssessmentResult {
    pub session_id: SessionId,
    pub recommendation: Recommendation,
    pub scores: ScoreCard,
    pub selections: BTreeMap<QuestionId, Selection>,
    pub content: ResultContent,
    pub total_questions: usize,
    pub completed_at: DateTime<Utc>,
}
