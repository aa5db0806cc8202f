use super::common::*;
use crate::assessment::domain::{AssessmentError, ScoreCard};
use crate::assessment::evaluation::{
    classify, ComplexityTier, OwnershipModel, Recommendation, ResultContent,
};

fn scores(complexity: u8, independence: i64) -> ScoreCard {
    ScoreCard {
        complexity,
        independence,
    }
}

#[test]
fn classify_maps_tier_breakpoints() {
    let cases = [
        (30, ComplexityTier::Low),
        (31, ComplexityTier::Mid),
        (70, ComplexityTier::Mid),
        (71, ComplexityTier::High),
    ];
    for (complexity, expected) in cases {
        assert_eq!(
            classify(&scores(complexity, 0)).complexity_tier,
            expected,
            "complexity {complexity}"
        );
    }
}

#[test]
fn classify_maps_independence_sign_to_ownership() {
    assert_eq!(
        classify(&scores(10, -5)).ownership_model,
        OwnershipModel::Managed
    );
    assert_eq!(
        classify(&scores(10, 0)).ownership_model,
        OwnershipModel::Owned
    );
}

#[test]
fn classify_refuses_partial_answers() {
    let mut answers = standard_answers();
    for (question, option) in [(1, "opt1"), (2, "opt1"), (3, "opt1"), (4, "opt2")] {
        answers.select_option(q(question), &opt(option)).expect("valid");
    }

    assert_eq!(
        answers.classify(),
        Err(AssessmentError::NotReady { unanswered: q(5) })
    );
}

#[test]
fn classify_is_idempotent_on_unchanged_answers() {
    let mut answers = standard_answers();
    for (question, option) in [(1, "opt3"), (2, "opt3"), (3, "opt2"), (4, "opt2"), (5, "opt2")] {
        answers.select_option(q(question), &opt(option)).expect("valid");
    }

    let first = answers.classify().expect("complete");
    let second = answers.classify().expect("complete");

    assert_eq!(first, second);
    assert_eq!(
        first,
        Recommendation {
            complexity_tier: ComplexityTier::High,
            ownership_model: OwnershipModel::Managed,
        }
    );
}

#[test]
fn recommendation_exposes_result_content_keys() {
    let recommendation = Recommendation {
        complexity_tier: ComplexityTier::Mid,
        ownership_model: OwnershipModel::Owned,
    };

    let content = recommendation.content();

    assert_eq!(
        content,
        ResultContent {
            tier_title: "calculator.results.tiers.mid".to_string(),
            model_title: "calculator.results.owned.title".to_string(),
            model_description: "calculator.results.owned.desc".to_string(),
            price_range: "calculator.results.details.mid.priceRange".to_string(),
            timeline: "calculator.results.details.mid.timeline".to_string(),
            features: "calculator.results.details.mid.features".to_string(),
            best_for: "calculator.results.details.mid.bestFor".to_string(),
        }
    );
    assert_eq!(recommendation.summary(), "mid complexity, owned ownership");
}
