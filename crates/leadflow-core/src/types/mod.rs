//! # Core Type Definitions
//!
//! This module contains all core types for the Leadflow lead lifecycle:
//! - Identifiers (`LeadId`, `SaleId`)
//! - Closed vocabularies (`LeadSource`, `LeadStage`, `BusinessDomain`, `Recommendation`)
//! - Records (`Lead`, `NewLead`, `Sale`)
//! - Scores (`Score`)
//! - Error types (`LeadError`)
//!
//! ## Closed Vocabularies
//!
//! Every enumerated field is a Rust enum. Free strings are parsed once, at the
//! boundary, through `FromStr`; an unknown string is an error there and can
//! never reach the validator or the scorer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// =============================================================================
// IDENTIFIERS
// =============================================================================

/// Store-assigned identifier of a lead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LeadId(pub u64);

impl fmt::Display for LeadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Store-assigned identifier of a sale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SaleId(pub u64);

// =============================================================================
// LEAD SOURCE
// =============================================================================

/// Channel a lead came in through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeadSource {
    Scanner,
    Partner,
    Manual,
}

impl LeadSource {
    /// All sources in declaration order.
    pub const ALL: [LeadSource; 3] = [Self::Scanner, Self::Partner, Self::Manual];

    /// Wire name of the source.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Scanner => "scanner",
            Self::Partner => "partner",
            Self::Manual => "manual",
        }
    }
}

// =============================================================================
// LEAD STAGE
// =============================================================================

/// Lifecycle position of a lead.
///
/// The forward order is `New -> Contacted -> Qualified -> Transferred`.
/// `Lost` sits outside that order and is reachable from any non-final stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeadStage {
    New,
    Contacted,
    Qualified,
    Transferred,
    Lost,
}

impl LeadStage {
    /// All stages in declaration order.
    pub const ALL: [LeadStage; 5] = [
        Self::New,
        Self::Contacted,
        Self::Qualified,
        Self::Transferred,
        Self::Lost,
    ];

    /// Wire name of the stage.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Contacted => "contacted",
            Self::Qualified => "qualified",
            Self::Transferred => "transferred",
            Self::Lost => "lost",
        }
    }

    /// Final stages have no outgoing transitions.
    #[must_use]
    pub fn is_final(&self) -> bool {
        matches!(self, Self::Transferred | Self::Lost)
    }

    /// Position in the forward order, `None` for `Lost`.
    #[must_use]
    pub fn forward_index(&self) -> Option<usize> {
        crate::transition::FORWARD_ORDER
            .iter()
            .position(|stage| stage == self)
    }

    /// The single forward step from this stage, if any.
    #[must_use]
    pub fn next(&self) -> Option<LeadStage> {
        let index = self.forward_index()?;
        crate::transition::FORWARD_ORDER.get(index + 1).copied()
    }
}

// =============================================================================
// BUSINESS DOMAIN
// =============================================================================

/// Classification tag of a lead's business. Absent when unknown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BusinessDomain {
    First,
    Second,
    Third,
}

impl BusinessDomain {
    /// All domains in declaration order.
    pub const ALL: [BusinessDomain; 3] = [Self::First, Self::Second, Self::Third];

    /// Wire name of the domain.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::First => "first",
            Self::Second => "second",
            Self::Third => "third",
        }
    }

    /// Parse an optional domain field. Missing or blank input means unknown.
    pub fn parse_optional(value: Option<&str>) -> Result<Option<Self>, LeadError> {
        match value.map(str::trim) {
            None | Some("") => Ok(None),
            Some(domain) => domain.parse().map(Some),
        }
    }
}

// =============================================================================
// RECOMMENDATION
// =============================================================================

/// Next action suggested by the scorer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recommendation {
    TransferToSales,
    ContinueQualification,
    DropLead,
}

impl Recommendation {
    /// All recommendations in declaration order.
    pub const ALL: [Recommendation; 3] = [
        Self::TransferToSales,
        Self::ContinueQualification,
        Self::DropLead,
    ];

    /// Wire name of the recommendation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TransferToSales => "transfer_to_sales",
            Self::ContinueQualification => "continue_qualification",
            Self::DropLead => "drop_lead",
        }
    }

    /// Fixed human-readable reason attached to this recommendation.
    #[must_use]
    pub fn reason(&self) -> &'static str {
        match self {
            Self::TransferToSales => "High deal probability, recommended to transfer to sales",
            Self::ContinueQualification => "Additional qualification required",
            Self::DropLead => "Low deal probability",
        }
    }
}

// =============================================================================
// DISPLAY / FROMSTR
// =============================================================================

macro_rules! wire_enum {
    ($ty:ty, $kind:literal) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = LeadError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let trimmed = s.trim();
                Self::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str().eq_ignore_ascii_case(trimmed))
                    .ok_or_else(|| LeadError::UnknownValue {
                        kind: $kind,
                        value: s.to_string(),
                    })
            }
        }
    };
}

wire_enum!(LeadSource, "source");
wire_enum!(LeadStage, "stage");
wire_enum!(BusinessDomain, "business domain");
wire_enum!(Recommendation, "recommendation");

// =============================================================================
// SCORE
// =============================================================================

/// A lead score in [0.0, 1.0], stored as integer hundredths.
///
/// Integer storage keeps threshold comparisons exact: 0.7 is `Score(70)`,
/// never `0.6999...`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(from = "u8")]
pub struct Score(u8);

impl From<u8> for Score {
    /// Saturates at 100, so decoded rows cannot exceed the range.
    fn from(hundredths: u8) -> Self {
        Self::new(hundredths)
    }
}

impl Score {
    /// Lowest possible score.
    pub const MIN: Score = Score(0);

    /// Highest possible score.
    pub const MAX: Score = Score(100);

    /// Build a score from unsigned hundredths, saturating at 100.
    #[must_use]
    pub const fn new(hundredths: u8) -> Self {
        if hundredths > 100 {
            Self(100)
        } else {
            Self(hundredths)
        }
    }

    /// Build a score from signed hundredths, clamping into [0, 100].
    #[must_use]
    pub fn from_hundredths(hundredths: i32) -> Self {
        Self(hundredths.clamp(0, 100) as u8)
    }

    /// Raw hundredths value in [0, 100].
    #[must_use]
    pub const fn hundredths(self) -> u8 {
        self.0
    }

    /// The score as a float in [0.0, 1.0].
    #[must_use]
    #[allow(clippy::float_arithmetic)]
    pub fn as_f64(self) -> f64 {
        f64::from(self.0) / 100.0
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

// =============================================================================
// LEAD
// =============================================================================

/// Fields supplied when a lead is created. Everything else is defaulted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewLead {
    pub source: LeadSource,
    pub business_domain: Option<BusinessDomain>,
}

impl NewLead {
    /// Create a new lead request.
    #[must_use]
    pub const fn new(source: LeadSource, business_domain: Option<BusinessDomain>) -> Self {
        Self {
            source,
            business_domain,
        }
    }
}

/// A persisted lead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lead {
    pub id: LeadId,
    pub source: LeadSource,
    pub stage: LeadStage,
    pub business_domain: Option<BusinessDomain>,
    pub activity_count: u32,
    pub ai_score: Option<Score>,
    pub ai_recommendation: Option<Recommendation>,
    pub ai_reason: Option<String>,
    /// Set once by the store at insertion.
    pub created_at: DateTime<Utc>,
}

impl Lead {
    /// Materialize a freshly created lead: stage `New`, no activity, unscored.
    #[must_use]
    pub fn create(id: LeadId, new: NewLead, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            source: new.source,
            stage: LeadStage::New,
            business_domain: new.business_domain,
            activity_count: 0,
            ai_score: None,
            ai_recommendation: None,
            ai_reason: None,
            created_at,
        }
    }
}

impl fmt::Display for Lead {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Lead(id={}, stage={})", self.id, self.stage)
    }
}

// =============================================================================
// SALE
// =============================================================================

/// Sale pipeline position. Only the entry stage is modelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SaleStage {
    #[default]
    New,
}

/// A sale opened when a lead is transferred. One per lead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sale {
    pub id: SaleId,
    pub lead_id: LeadId,
    pub stage: SaleStage,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur in the Leadflow system.
///
/// All variants are terminal. The core never retries.
#[derive(Debug, Error)]
pub enum LeadError {
    /// The requested lead does not exist.
    #[error("Lead not found: {0}")]
    NotFound(LeadId),

    /// The requested stage change violates the ordering rule.
    #[error("Invalid stage transition from '{current}' to '{requested}'")]
    InvalidTransition {
        current: LeadStage,
        requested: LeadStage,
    },

    /// The lead does not meet the conditions for handing over to sales.
    #[error("Lead {0} cannot be transferred to sales: requires a business domain and a score of at least 0.60")]
    CannotTransfer(LeadId),

    /// A sale already exists for the lead.
    #[error("Sale already exists for lead {0}")]
    SaleExists(LeadId),

    /// A string did not name a member of a closed vocabulary.
    #[error("Unknown {kind}: '{value}'")]
    UnknownValue { kind: &'static str, value: String },

    /// Caller-supplied input was rejected.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A serialization or deserialization error occurred.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    IoError(String),
}

// =============================================================================
// TESTS
// =============================================================================
