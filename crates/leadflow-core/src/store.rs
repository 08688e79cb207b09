//! # Lead Store
//!
//! The persistence seam of the lifecycle and its in-memory implementation.
//!
//! `LeadStore` is implemented by:
//! - [`MemoryStore`]: `BTreeMap`-backed, volatile
//! - [`crate::storage::RedbStore`]: disk-backed, ACID
//!
//! Both assign ids the same way (starting at 1, never reused), so a
//! sequence of operations yields identical records on either backend.

use crate::{Lead, LeadError, LeadId, LeadStage, NewLead, Sale, SaleId, SaleStage};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

// =============================================================================
// STORE TRAIT
// =============================================================================

/// Storage operations required by the lead lifecycle.
pub trait LeadStore {
    /// Insert a new lead, assigning its id. Returns the stored record.
    fn insert_lead(&mut self, new: NewLead, created_at: DateTime<Utc>)
    -> Result<Lead, LeadError>;

    /// Fetch a lead by id.
    fn get_lead(&self, id: LeadId) -> Result<Option<Lead>, LeadError>;

    /// Overwrite an existing lead. Fails with `NotFound` if it was never inserted.
    fn save_lead(&mut self, lead: &Lead) -> Result<(), LeadError>;

    /// Persist a lead that has just moved to `Transferred` and open its sale.
    ///
    /// The lead update and the sale insert succeed or fail together.
    /// Fails with `SaleExists` if the lead already has a sale.
    fn commit_transfer(
        &mut self,
        lead: &Lead,
        created_at: DateTime<Utc>,
    ) -> Result<Sale, LeadError>;

    /// Fetch the sale attached to a lead.
    fn get_sale_for_lead(&self, lead: LeadId) -> Result<Option<Sale>, LeadError>;

    /// All leads in ascending id order, optionally filtered by stage.
    fn list_leads(&self, stage: Option<LeadStage>) -> Result<Vec<Lead>, LeadError>;

    /// Total number of leads.
    fn lead_count(&self) -> Result<usize, LeadError>;

    /// Total number of sales.
    fn sale_count(&self) -> Result<usize, LeadError>;
}

// =============================================================================
// MEMORY STORE
// =============================================================================

/// Volatile lead store.
///
/// Uses `BTreeMap` so listings come out in id order.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    leads: BTreeMap<LeadId, Lead>,
    /// Sales keyed by the lead they belong to.
    sales: BTreeMap<LeadId, Sale>,
    /// Last assigned lead id (0 = none yet).
    last_lead_id: u64,
    /// Last assigned sale id (0 = none yet).
    last_sale_id: u64,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl LeadStore for MemoryStore {
    fn insert_lead(
        &mut self,
        new: NewLead,
        created_at: DateTime<Utc>,
    ) -> Result<Lead, LeadError> {
        self.last_lead_id = self.last_lead_id.saturating_add(1);
        let lead = Lead::create(LeadId(self.last_lead_id), new, created_at);
        self.leads.insert(lead.id, lead.clone());
        Ok(lead)
    }

    fn get_lead(&self, id: LeadId) -> Result<Option<Lead>, LeadError> {
        Ok(self.leads.get(&id).cloned())
    }

    fn save_lead(&mut self, lead: &Lead) -> Result<(), LeadError> {
        match self.leads.get_mut(&lead.id) {
            Some(slot) => {
                *slot = lead.clone();
                Ok(())
            }
            None => Err(LeadError::NotFound(lead.id)),
        }
    }

    fn commit_transfer(
        &mut self,
        lead: &Lead,
        created_at: DateTime<Utc>,
    ) -> Result<Sale, LeadError> {
        if !self.leads.contains_key(&lead.id) {
            return Err(LeadError::NotFound(lead.id));
        }
        if self.sales.contains_key(&lead.id) {
            return Err(LeadError::SaleExists(lead.id));
        }

        self.last_sale_id = self.last_sale_id.saturating_add(1);
        let sale = Sale {
            id: SaleId(self.last_sale_id),
            lead_id: lead.id,
            stage: SaleStage::New,
            created_at,
        };

        self.sales.insert(lead.id, sale.clone());
        self.leads.insert(lead.id, lead.clone());
        Ok(sale)
    }

    fn get_sale_for_lead(&self, lead: LeadId) -> Result<Option<Sale>, LeadError> {
        Ok(self.sales.get(&lead).cloned())
    }

    fn list_leads(&self, stage: Option<LeadStage>) -> Result<Vec<Lead>, LeadError> {
        Ok(self
            .leads
            .values()
            .filter(|lead| stage.is_none_or(|s| lead.stage == s))
            .cloned()
            .collect())
    }

    fn lead_count(&self) -> Result<usize, LeadError> {
        Ok(self.leads.len())
    }

    fn sale_count(&self) -> Result<usize, LeadError> {
        Ok(self.sales.len())
    }
}

// =============================================================================
// TESTS
// =============================================================================
