//! # Stage Transitions
//!
//! The rule deciding whether a lead may move between stages, and the gate
//! a lead must pass before it is handed over to sales.
//!
//! ## Transition Table
//!
//! | From \ To   | new | contacted | qualified | transferred | lost |
//! |-------------|-----|-----------|-----------|-------------|------|
//! | new         |     | yes       |           |             | yes  |
//! | contacted   |     |           | yes       |             | yes  |
//! | qualified   |     |           |           | yes         | yes  |
//! | transferred |     |           |           |             |      |
//! | lost        |     |           |           |             |      |
//!
//! Both functions are pure and independent of storage.

use crate::{Lead, LeadStage, Score};

/// Forward order of the cold pipeline. `Lost` is deliberately absent.
pub const FORWARD_ORDER: [LeadStage; 4] = [
    LeadStage::New,
    LeadStage::Contacted,
    LeadStage::Qualified,
    LeadStage::Transferred,
];

/// Minimum score a lead needs before it can be transferred to sales.
pub const TRANSFER_MIN_SCORE: Score = Score::new(60);

/// Decide whether `current -> target` is a permitted stage change.
///
/// Rules, evaluated in order:
/// 1. Nothing leaves a final stage.
/// 2. `Lost` is reachable from any non-final stage.
/// 3. A target outside the forward order is rejected.
/// 4. Otherwise only a single step forward is accepted.
#[must_use]
pub fn is_valid_transition(current: LeadStage, target: LeadStage) -> bool {
    if current.is_final() {
        return false;
    }

    if target == LeadStage::Lost {
        return true;
    }

    let (Some(current_index), Some(target_index)) =
        (current.forward_index(), target.forward_index())
    else {
        return false;
    };

    target_index == current_index + 1
}

/// Stages reachable from `current` in one valid transition.
#[must_use]
pub fn allowed_targets(current: LeadStage) -> Vec<LeadStage> {
    LeadStage::ALL
        .iter()
        .copied()
        .filter(|target| is_valid_transition(current, *target))
        .collect()
}

/// Whether a lead qualifies for hand-over to sales.
///
/// Requires a known business domain and a recorded score of at least
/// [`TRANSFER_MIN_SCORE`].
#[must_use]
pub fn can_transfer_to_sales(lead: &Lead) -> bool {
    lead.business_domain.is_some() && lead.ai_score.is_some_and(|s| s >= TRANSFER_MIN_SCORE)
}

// =============================================================================
// TESTS
// =============================================================================
