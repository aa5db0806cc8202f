use serde::{Deserialize, Serialize};

use super::policy::{ComplexityTier, OwnershipModel};

const RESULTS_PREFIX: &str = "calculator.results";

/// Translation keys the content provider resolves into result copy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultContent {
    pub tier_title: String,
    pub model_title: String,
    pub model_description: String,
    pub price_range: String,
    pub timeline: String,
    pub features: String,
    pub best_for: String,
}

impl ResultContent {
    pub fn for_outcome(tier: ComplexityTier, model: OwnershipModel) -> Self {
        let tier = tier.slug();
        let model = model.slug();
        let details = |field: &str| format!("{RESULTS_PREFIX}.details.{tier}.{field}");

        Self {
            tier_title: format!("{RESULTS_PREFIX}.tiers.{tier}"),
            model_title: format!("{RESULTS_PREFIX}.{model}.title"),
            model_description: format!("{RESULTS_PREFIX}.{model}.desc"),
            price_range: details("priceRange"),
            timeline: details("timeline"),
            features: details("features"),
            best_for: details("bestFor"),
        }
    }
}
