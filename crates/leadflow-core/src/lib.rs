//! # leadflow-core
//!
//! The lead lifecycle rules for Leadflow - THE RULES.
//!
//! Leads move along a short pipeline (`new -> contacted -> qualified ->
//! transferred`, with an exit to `lost` from any non-final stage) and carry
//! a heuristic score that recommends the next action.
//!
//! ## Layout
//!
//! - `types`: identifiers, closed vocabularies, records, errors
//! - `transition`: the stage transition validator and the sales transfer gate
//! - `scoring`: the lead scorer
//! - `store` / `storage`: persistence seam, in-memory and redb implementations
//! - `service`: lifecycle orchestration (read, validate/score, mutate, persist)
//!
//! ## Architectural Constraints
//!
//! - `transition` and `scoring` are pure functions, testable without storage
//! - No async, no network dependencies
//! - Scores use integer hundredths; no floating-point in the rules

// =============================================================================
// MODULES
// =============================================================================

pub mod scoring;
pub mod service;
pub mod storage;
pub mod store;
pub mod transition;
pub mod types;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{
    BusinessDomain, Lead, LeadError, LeadId, LeadSource, LeadStage, NewLead, Recommendation,
    Sale, SaleId, SaleStage, Score,
};

// =============================================================================
// RE-EXPORTS: Rules
// =============================================================================

pub use scoring::{ScoreResult, score, score_lead};
pub use transition::{FORWARD_ORDER, allowed_targets, can_transfer_to_sales, is_valid_transition};

// =============================================================================
// RE-EXPORTS: Storage & Orchestration
// =============================================================================

pub use service::{LeadService, PipelineStats, StorageBackend};
pub use storage::RedbStore;
pub use store::{LeadStore, MemoryStore};
