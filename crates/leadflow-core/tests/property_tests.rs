//! # Property-Based Tests
//!
//! Invariants of the transition validator and the scorer, checked with proptest.

use leadflow_core::{
    BusinessDomain, LeadSource, LeadStage, Recommendation, Score, is_valid_transition, score,
};
use proptest::prelude::*;

// =============================================================================
// STRATEGIES
// =============================================================================

fn any_stage() -> impl Strategy<Value = LeadStage> {
    prop::sample::select(LeadStage::ALL.to_vec())
}

fn any_source() -> impl Strategy<Value = LeadSource> {
    prop::sample::select(LeadSource::ALL.to_vec())
}

fn any_domain() -> impl Strategy<Value = Option<BusinessDomain>> {
    prop::option::of(prop::sample::select(BusinessDomain::ALL.to_vec()))
}

// =============================================================================
// PROPERTY TESTS
// =============================================================================

proptest! {
    /// Nothing ever leaves a final stage.
    #[test]
    fn final_stages_are_terminal(from in any_stage(), to in any_stage()) {
        if from.is_final() {
            prop_assert!(!is_valid_transition(from, to));
        }
    }

    /// Every accepted transition is either the escape to lost or one step forward.
    #[test]
    fn accepted_transitions_are_lost_or_one_step(from in any_stage(), to in any_stage()) {
        if is_valid_transition(from, to) {
            prop_assert!(to == LeadStage::Lost || from.next() == Some(to));
        }
    }

    /// Self-transitions are never valid.
    #[test]
    fn no_self_transition(stage in any_stage()) {
        prop_assert!(!is_valid_transition(stage, stage));
    }

    /// The scorer is pure: identical input, identical output.
    #[test]
    fn scoring_deterministic(
        source in any_source(),
        stage in any_stage(),
        activity in any::<u32>(),
        domain in any_domain(),
    ) {
        let first = score(source, stage, activity, domain);
        let second = score(source, stage, activity, domain);
        prop_assert_eq!(first, second);
    }

    /// Scores stay within [0.0, 1.0].
    #[test]
    fn score_bounded(
        source in any_source(),
        stage in any_stage(),
        activity in any::<u32>(),
        domain in any_domain(),
    ) {
        let result = score(source, stage, activity, domain);
        prop_assert!(result.score >= Score::MIN && result.score <= Score::MAX);
        prop_assert!(result.score.as_f64() >= 0.0 && result.score.as_f64() <= 1.0);
    }

    /// Recommendation follows the score bands in the fixed branch order.
    #[test]
    fn recommendation_matches_bands(
        source in any_source(),
        stage in any_stage(),
        activity in any::<u32>(),
        domain in any_domain(),
    ) {
        let result = score(source, stage, activity, domain);
        let expected = if result.score >= Score::new(70) && domain.is_some() {
            Recommendation::TransferToSales
        } else if result.score <= Score::new(30) {
            Recommendation::DropLead
        } else {
            Recommendation::ContinueQualification
        };
        prop_assert_eq!(result.recommendation, expected);
        prop_assert_eq!(result.reason, expected.reason());
    }

    /// A missing domain caps the score at 0.55.
    #[test]
    fn missing_domain_caps(
        source in any_source(),
        stage in any_stage(),
        activity in any::<u32>(),
    ) {
        prop_assert!(score(source, stage, activity, None).score <= Score::new(55));
    }
}
