//! # Scoring Module
//!
//! Heuristic lead scoring.
//!
//! - Base score from the lead's source
//! - Adjusted by activity volume and pipeline stage
//! - Known business domain adds a bonus; unknown domain caps the score
//! - Score maps to a recommendation with a fixed reason
//!
//! All arithmetic runs in integer hundredths so thresholds compare exactly.

use crate::{BusinessDomain, Lead, LeadSource, LeadStage, Recommendation, Score};

/// Score at or above which a lead with a known domain is sent to sales.
pub const TRANSFER_THRESHOLD: Score = Score::new(70);

/// Score at or below which a lead is dropped.
pub const DROP_THRESHOLD: Score = Score::new(30);

/// Highest score a lead without a business domain can reach (hundredths).
pub const NO_DOMAIN_CAP: i32 = 55;

/// Bonus for a known business domain (hundredths).
pub const DOMAIN_BONUS: i32 = 10;

/// Output of the scorer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreResult {
    pub score: Score,
    pub recommendation: Recommendation,
    pub reason: &'static str,
}

/// Base score for a source (hundredths).
#[must_use]
pub fn source_base(source: LeadSource) -> i32 {
    match source {
        LeadSource::Scanner => 50,
        LeadSource::Partner => 70,
        LeadSource::Manual => 40,
    }
}

/// Adjustment for the number of recorded activities (hundredths).
#[must_use]
pub fn activity_adjustment(activity_count: u32) -> i32 {
    match activity_count {
        0 => -20,
        1..=2 => 5,
        3..=6 => 15,
        _ => 25,
    }
}

/// Bonus for the current stage (hundredths).
#[must_use]
pub fn stage_bonus(stage: LeadStage) -> i32 {
    match stage {
        LeadStage::New => 0,
        LeadStage::Contacted => 5,
        LeadStage::Qualified => 15,
        LeadStage::Transferred => 20,
        LeadStage::Lost => -40,
    }
}

/// Score a lead from its attributes.
///
/// The domain cap is applied after the source, activity and stage terms
/// and before clamping. It only lowers a score, never raises it.
///
/// The recommendation branches are checked in a fixed order: transfer
/// first (needs a domain), then drop, then continue.
#[must_use]
pub fn score(
    source: LeadSource,
    stage: LeadStage,
    activity_count: u32,
    business_domain: Option<BusinessDomain>,
) -> ScoreResult {
    let mut points = source_base(source);
    points += activity_adjustment(activity_count);
    points += stage_bonus(stage);

    if business_domain.is_some() {
        points += DOMAIN_BONUS;
    } else {
        points = points.min(NO_DOMAIN_CAP);
    }

    let score = Score::from_hundredths(points);

    let recommendation = if score >= TRANSFER_THRESHOLD && business_domain.is_some() {
        Recommendation::TransferToSales
    } else if score <= DROP_THRESHOLD {
        Recommendation::DropLead
    } else {
        Recommendation::ContinueQualification
    };

    ScoreResult {
        score,
        recommendation,
        reason: recommendation.reason(),
    }
}

/// Score a lead using its current attributes.
#[must_use]
pub fn score_lead(lead: &Lead) -> ScoreResult {
    score(
        lead.source,
        lead.stage,
        lead.activity_count,
        lead.business_domain,
    )
}

// =============================================================================
// TESTS
// =============================================================================
