//! # Lead Service
//!
//! Lifecycle orchestration over a lead store.
//!
//! Each operation is one read-modify-write against a single lead:
//! fetch, run the pure rules in [`crate::transition`] and [`crate::scoring`],
//! mutate, persist. The rules themselves never touch storage.
//!
//! ## Storage Backends
//!
//! - `InMemory`: `MemoryStore` (fast, volatile)
//! - `Persistent`: `RedbStore` (disk-backed, ACID)

use crate::scoring::score_lead;
use crate::storage::RedbStore;
use crate::store::{LeadStore, MemoryStore};
use crate::transition::{can_transfer_to_sales, is_valid_transition};
use crate::{Lead, LeadError, LeadId, LeadStage, NewLead, Sale};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Storage backend for a [`LeadService`].
#[derive(Debug)]
pub enum StorageBackend {
    /// In-memory store (fast, volatile).
    InMemory(MemoryStore),
    /// Disk-backed store using redb (ACID, persistent).
    Persistent(RedbStore),
}

impl Default for StorageBackend {
    fn default() -> Self {
        Self::InMemory(MemoryStore::new())
    }
}

/// Lead counts across the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineStats {
    pub total_leads: usize,
    /// Count per stage; every stage is present, zero included.
    pub by_stage: BTreeMap<LeadStage, usize>,
    pub total_sales: usize,
}

/// Orchestrates the lead lifecycle against a storage backend.
#[derive(Debug, Default)]
pub struct LeadService {
    backend: StorageBackend,
}

impl LeadService {
    /// Create a service with in-memory storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a service with an existing in-memory store.
    #[must_use]
    pub fn with_memory(store: MemoryStore) -> Self {
        Self {
            backend: StorageBackend::InMemory(store),
        }
    }

    /// Create a service with persistent redb storage at `path`.
    pub fn with_redb(path: impl AsRef<Path>) -> Result<Self, LeadError> {
        Ok(Self {
            backend: StorageBackend::Persistent(RedbStore::open(path)?),
        })
    }

    /// Check if using persistent storage.
    #[must_use]
    pub fn is_persistent(&self) -> bool {
        matches!(self.backend, StorageBackend::Persistent(_))
    }

    /// Get a reference to the storage backend.
    #[must_use]
    pub fn backend(&self) -> &StorageBackend {
        &self.backend
    }

    fn store(&self) -> &dyn LeadStore {
        match &self.backend {
            StorageBackend::InMemory(store) => store,
            StorageBackend::Persistent(store) => store,
        }
    }

    fn store_mut(&mut self) -> &mut dyn LeadStore {
        match &mut self.backend {
            StorageBackend::InMemory(store) => store,
            StorageBackend::Persistent(store) => store,
        }
    }

    // =========================================================================
    // LIFECYCLE OPERATIONS
    // =========================================================================

    /// Create a lead in stage `New` with no activity and no score.
    pub fn create(&mut self, new: NewLead) -> Result<Lead, LeadError> {
        self.store_mut().insert_lead(new, Utc::now())
    }

    /// Fetch a lead by id.
    pub fn fetch(&self, id: LeadId) -> Result<Lead, LeadError> {
        self.store().get_lead(id)?.ok_or(LeadError::NotFound(id))
    }

    /// Move a lead to `target`.
    ///
    /// Entering `Transferred` additionally requires the transfer gate and
    /// opens the lead's sale in the same write as the stage change.
    pub fn update_stage(&mut self, id: LeadId, target: LeadStage) -> Result<Lead, LeadError> {
        let mut lead = self.fetch(id)?;

        if !is_valid_transition(lead.stage, target) {
            return Err(LeadError::InvalidTransition {
                current: lead.stage,
                requested: target,
            });
        }

        if target == LeadStage::Transferred {
            if !can_transfer_to_sales(&lead) {
                return Err(LeadError::CannotTransfer(id));
            }
            lead.stage = target;
            self.store_mut().commit_transfer(&lead, Utc::now())?;
            return Ok(lead);
        }

        lead.stage = target;
        self.store_mut().save_lead(&lead)?;
        Ok(lead)
    }

    /// Score a lead from its current attributes and persist the result.
    pub fn analyze(&mut self, id: LeadId) -> Result<Lead, LeadError> {
        let mut lead = self.fetch(id)?;
        let result = score_lead(&lead);

        lead.ai_score = Some(result.score);
        lead.ai_recommendation = Some(result.recommendation);
        lead.ai_reason = Some(result.reason.to_string());

        self.store_mut().save_lead(&lead)?;
        Ok(lead)
    }

    /// Record one contact activity on a lead.
    pub fn record_activity(&mut self, id: LeadId) -> Result<Lead, LeadError> {
        let mut lead = self.fetch(id)?;
        lead.activity_count = lead.activity_count.saturating_add(1);
        self.store_mut().save_lead(&lead)?;
        Ok(lead)
    }

    // =========================================================================
    // QUERIES
    // =========================================================================

    /// All leads in id order, optionally restricted to one stage.
    pub fn list(&self, stage: Option<LeadStage>) -> Result<Vec<Lead>, LeadError> {
        self.store().list_leads(stage)
    }

    /// The sale opened for a lead, if it has been transferred.
    pub fn sale_for_lead(&self, id: LeadId) -> Result<Option<Sale>, LeadError> {
        // Distinguish "no such lead" from "lead without a sale"
        self.fetch(id)?;
        self.store().get_sale_for_lead(id)
    }

    /// Lead counts per stage and the number of sales.
    pub fn stats(&self) -> Result<PipelineStats, LeadError> {
        let mut by_stage: BTreeMap<LeadStage, usize> =
            LeadStage::ALL.iter().map(|stage| (*stage, 0)).collect();

        let leads = self.store().list_leads(None)?;
        for lead in &leads {
            *by_stage.entry(lead.stage).or_insert(0) += 1;
        }

        Ok(PipelineStats {
            total_leads: leads.len(),
            by_stage,
            total_sales: self.store().sale_count()?,
        })
    }

    /// Total number of stored leads.
    pub fn lead_count(&self) -> Result<usize, LeadError> {
        self.store().lead_count()
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BusinessDomain, LeadSource, Recommendation, Score};

    fn service_with(source: LeadSource, domain: Option<BusinessDomain>) -> (LeadService, LeadId) {
        let mut service = LeadService::new();
        let lead = service
            .create(NewLead::new(source, domain))
            .expect("create");
        (service, lead.id)
    }

    #[test]
    fn create_returns_fresh_lead() {
        let (service, id) = service_with(LeadSource::Scanner, None);
        let lead = service.fetch(id).expect("fetch");
        assert_eq!(lead.stage, LeadStage::New);
        assert_eq!(lead.activity_count, 0);
        assert!(lead.ai_score.is_none());
        assert!(!service.is_persistent());
    }

    #[test]
    fn fetch_missing_is_not_found() {
        let service = LeadService::new();
        assert!(matches!(
            service.fetch(LeadId(1)),
            Err(LeadError::NotFound(LeadId(1)))
        ));
    }

    #[test]
    fn stage_moves_one_step() {
        let (mut service, id) = service_with(LeadSource::Manual, None);
        let lead = service
            .update_stage(id, LeadStage::Contacted)
            .expect("update");
        assert_eq!(lead.stage, LeadStage::Contacted);
        assert_eq!(service.fetch(id).expect("fetch").stage, LeadStage::Contacted);
    }

    #[test]
    fn skipping_stage_is_rejected_and_not_persisted() {
        let (mut service, id) = service_with(LeadSource::Manual, None);
        let err = service.update_stage(id, LeadStage::Qualified);
        assert!(matches!(
            err,
            Err(LeadError::InvalidTransition {
                current: LeadStage::New,
                requested: LeadStage::Qualified
            })
        ));
        assert_eq!(service.fetch(id).expect("fetch").stage, LeadStage::New);
    }

    #[test]
    fn unscored_lead_cannot_be_transferred() {
        let (mut service, id) = service_with(LeadSource::Partner, Some(BusinessDomain::First));
        service.update_stage(id, LeadStage::Contacted).expect("contacted");
        service.update_stage(id, LeadStage::Qualified).expect("qualified");

        assert!(matches!(
            service.update_stage(id, LeadStage::Transferred),
            Err(LeadError::CannotTransfer(_))
        ));
        assert_eq!(service.fetch(id).expect("fetch").stage, LeadStage::Qualified);
        assert!(service.sale_for_lead(id).expect("sale").is_none());
    }

    #[test]
    fn scored_lead_transfers_and_opens_sale() {
        let (mut service, id) = service_with(LeadSource::Partner, Some(BusinessDomain::First));
        service.update_stage(id, LeadStage::Contacted).expect("contacted");
        service.update_stage(id, LeadStage::Qualified).expect("qualified");
        let scored = service.analyze(id).expect("analyze");
        // 70 - 20 + 15 + 10 = 75
        assert_eq!(scored.ai_score, Some(Score::new(75)));

        let lead = service
            .update_stage(id, LeadStage::Transferred)
            .expect("transfer");
        assert_eq!(lead.stage, LeadStage::Transferred);

        let sale = service.sale_for_lead(id).expect("sale").expect("present");
        assert_eq!(sale.lead_id, id);
        assert_eq!(service.stats().expect("stats").total_sales, 1);
    }

    #[test]
    fn analyze_persists_result() {
        let (mut service, id) = service_with(LeadSource::Scanner, None);
        let lead = service.analyze(id).expect("analyze");
        assert_eq!(lead.ai_score, Some(Score::new(30)));
        assert_eq!(lead.ai_recommendation, Some(Recommendation::DropLead));
        assert_eq!(lead.ai_reason.as_deref(), Some("Low deal probability"));
        assert_eq!(service.fetch(id).expect("fetch"), lead);
    }

    #[test]
    fn activity_increments_and_shifts_score() {
        let (mut service, id) = service_with(LeadSource::Manual, None);
        let lead = service.record_activity(id).expect("activity");
        assert_eq!(lead.activity_count, 1);

        let lead = service.analyze(id).expect("analyze");
        assert_eq!(lead.ai_score, Some(Score::new(45)));
        assert_eq!(
            lead.ai_recommendation,
            Some(Recommendation::ContinueQualification)
        );
    }

    #[test]
    fn lost_is_final() {
        let (mut service, id) = service_with(LeadSource::Manual, None);
        service.update_stage(id, LeadStage::Lost).expect("lost");
        assert!(matches!(
            service.update_stage(id, LeadStage::Lost),
            Err(LeadError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn sale_for_missing_lead_is_not_found() {
        let service = LeadService::new();
        assert!(matches!(
            service.sale_for_lead(LeadId(4)),
            Err(LeadError::NotFound(_))
        ));
    }

    #[test]
    fn stats_cover_every_stage() {
        let (mut service, id) = service_with(LeadSource::Manual, None);
        service.create(NewLead::new(LeadSource::Scanner, None)).expect("create");
        service.update_stage(id, LeadStage::Lost).expect("lost");

        let stats = service.stats().expect("stats");
        assert_eq!(stats.total_leads, 2);
        assert_eq!(stats.by_stage.len(), LeadStage::ALL.len());
        assert_eq!(stats.by_stage[&LeadStage::New], 1);
        assert_eq!(stats.by_stage[&LeadStage::Lost], 1);
        assert_eq!(stats.by_stage[&LeadStage::Transferred], 0);
    }
}
