//! # redb-backed Lead Storage
//!
//! A disk-backed lead store using the redb embedded database, providing:
//! - ACID transactions (one write transaction per mutation)
//! - Crash safety (copy-on-write B-trees)
//! - MVCC (concurrent readers, single writer)
//!
//! Rows are postcard-encoded records keyed by id. Sales are keyed by the
//! lead they belong to, which makes the one-sale-per-lead rule a key
//! uniqueness check.

use crate::store::LeadStore;
use crate::{Lead, LeadError, LeadId, LeadStage, NewLead, Sale, SaleId, SaleStage};
use chrono::{DateTime, Utc};
use redb::{Database, ReadableDatabase, ReadableTable, ReadableTableMetadata, TableDefinition};
use std::path::Path;

/// Table for leads: LeadId(u64) -> serialized Lead bytes
const LEADS: TableDefinition<u64, &[u8]> = TableDefinition::new("leads");

/// Table for sales: owning LeadId(u64) -> serialized Sale bytes
const SALES: TableDefinition<u64, &[u8]> = TableDefinition::new("sales");

/// Table for metadata: key string -> value u64
const METADATA: TableDefinition<&str, u64> = TableDefinition::new("metadata");

const LAST_LEAD_ID: &str = "last_lead_id";
const LAST_SALE_ID: &str = "last_sale_id";

/// A disk-backed lead store using redb.
pub struct RedbStore {
    /// The redb database handle.
    db: Database,
    /// Last assigned lead id, mirrored from METADATA.
    last_lead_id: u64,
    /// Last assigned sale id, mirrored from METADATA.
    last_sale_id: u64,
}

impl std::fmt::Debug for RedbStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedbStore")
            .field("last_lead_id", &self.last_lead_id)
            .field("last_sale_id", &self.last_sale_id)
            .finish_non_exhaustive()
    }
}

fn encode<T: serde::Serialize>(value: &T) -> Result<Vec<u8>, LeadError> {
    postcard::to_allocvec(value).map_err(|e| LeadError::SerializationError(e.to_string()))
}

fn decode<'a, T: serde::Deserialize<'a>>(bytes: &'a [u8]) -> Result<T, LeadError> {
    postcard::from_bytes(bytes).map_err(|e| LeadError::SerializationError(e.to_string()))
}

impl RedbStore {
    /// Open or create a lead database at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, LeadError> {
        let db = Database::create(path.as_ref()).map_err(|e| LeadError::IoError(e.to_string()))?;

        // Initialize tables if they don't exist
        {
            let write_txn = db
                .begin_write()
                .map_err(|e| LeadError::IoError(e.to_string()))?;
            let _ = write_txn
                .open_table(LEADS)
                .map_err(|e| LeadError::IoError(e.to_string()))?;
            let _ = write_txn
                .open_table(SALES)
                .map_err(|e| LeadError::IoError(e.to_string()))?;
            let _ = write_txn
                .open_table(METADATA)
                .map_err(|e| LeadError::IoError(e.to_string()))?;
            write_txn
                .commit()
                .map_err(|e| LeadError::IoError(e.to_string()))?;
        }

        // Load id counters
        let (last_lead_id, last_sale_id) = {
            let read_txn = db
                .begin_read()
                .map_err(|e| LeadError::IoError(e.to_string()))?;
            let table = read_txn
                .open_table(METADATA)
                .map_err(|e| LeadError::IoError(e.to_string()))?;
            let lead = table
                .get(LAST_LEAD_ID)
                .map_err(|e| LeadError::IoError(e.to_string()))?
                .map(|v| v.value())
                .unwrap_or(0);
            let sale = table
                .get(LAST_SALE_ID)
                .map_err(|e| LeadError::IoError(e.to_string()))?
                .map(|v| v.value())
                .unwrap_or(0);
            (lead, sale)
        };

        Ok(Self {
            db,
            last_lead_id,
            last_sale_id,
        })
    }

    /// Compact the database file.
    pub fn compact(&mut self) -> Result<(), LeadError> {
        self.db
            .compact()
            .map_err(|e| LeadError::IoError(e.to_string()))?;
        Ok(())
    }

    /// Count rows of a u64-keyed table.
    fn table_len(
        &self,
        table: TableDefinition<'static, u64, &'static [u8]>,
    ) -> Result<usize, LeadError> {
        let read_txn = self
            .db
            .begin_read()
            .map_err(|e| LeadError::IoError(e.to_string()))?;
        let table = read_txn
            .open_table(table)
            .map_err(|e| LeadError::IoError(e.to_string()))?;
        let count = table
            .len()
            .map_err(|e| LeadError::IoError(e.to_string()))?;
        Ok(count as usize)
    }
}

// =============================================================================
// LEADSTORE TRAIT IMPLEMENTATION
// =============================================================================

impl LeadStore for RedbStore {
    fn insert_lead(
        &mut self,
        new: NewLead,
        created_at: DateTime<Utc>,
    ) -> Result<Lead, LeadError> {
        let id = self.last_lead_id.saturating_add(1);
        let lead = Lead::create(LeadId(id), new, created_at);
        let bytes = encode(&lead)?;

        let write_txn = self
            .db
            .begin_write()
            .map_err(|e| LeadError::IoError(e.to_string()))?;
        {
            let mut leads_table = write_txn
                .open_table(LEADS)
                .map_err(|e| LeadError::IoError(e.to_string()))?;
            leads_table
                .insert(id, bytes.as_slice())
                .map_err(|e| LeadError::IoError(e.to_string()))?;
        }
        {
            let mut meta_table = write_txn
                .open_table(METADATA)
                .map_err(|e| LeadError::IoError(e.to_string()))?;
            meta_table
                .insert(LAST_LEAD_ID, id)
                .map_err(|e| LeadError::IoError(e.to_string()))?;
        }
        write_txn
            .commit()
            .map_err(|e| LeadError::IoError(e.to_string()))?;

        // Only advance the counter once the row is durable
        self.last_lead_id = id;
        Ok(lead)
    }

    fn get_lead(&self, id: LeadId) -> Result<Option<Lead>, LeadError> {
        let read_txn = self
            .db
            .begin_read()
            .map_err(|e| LeadError::IoError(e.to_string()))?;
        let leads_table = read_txn
            .open_table(LEADS)
            .map_err(|e| LeadError::IoError(e.to_string()))?;

        match leads_table
            .get(id.0)
            .map_err(|e| LeadError::IoError(e.to_string()))?
        {
            Some(data) => Ok(Some(decode(data.value())?)),
            None => Ok(None),
        }
    }

    fn save_lead(&mut self, lead: &Lead) -> Result<(), LeadError> {
        let bytes = encode(lead)?;

        let write_txn = self
            .db
            .begin_write()
            .map_err(|e| LeadError::IoError(e.to_string()))?;
        {
            let mut leads_table = write_txn
                .open_table(LEADS)
                .map_err(|e| LeadError::IoError(e.to_string()))?;
            let exists = leads_table
                .get(lead.id.0)
                .map_err(|e| LeadError::IoError(e.to_string()))?
                .is_some();
            if !exists {
                return Err(LeadError::NotFound(lead.id));
            }
            leads_table
                .insert(lead.id.0, bytes.as_slice())
                .map_err(|e| LeadError::IoError(e.to_string()))?;
        }
        write_txn
            .commit()
            .map_err(|e| LeadError::IoError(e.to_string()))?;
        Ok(())
    }

    fn commit_transfer(
        &mut self,
        lead: &Lead,
        created_at: DateTime<Utc>,
    ) -> Result<Sale, LeadError> {
        let sale_id = self.last_sale_id.saturating_add(1);
        let sale = Sale {
            id: SaleId(sale_id),
            lead_id: lead.id,
            stage: SaleStage::New,
            created_at,
        };
        let lead_bytes = encode(lead)?;
        let sale_bytes = encode(&sale)?;

        // Lead update, sale insert and counter bump share one transaction.
        // Returning early drops the transaction uncommitted.
        let write_txn = self
            .db
            .begin_write()
            .map_err(|e| LeadError::IoError(e.to_string()))?;
        {
            let mut leads_table = write_txn
                .open_table(LEADS)
                .map_err(|e| LeadError::IoError(e.to_string()))?;
            let mut sales_table = write_txn
                .open_table(SALES)
                .map_err(|e| LeadError::IoError(e.to_string()))?;
            let mut meta_table = write_txn
                .open_table(METADATA)
                .map_err(|e| LeadError::IoError(e.to_string()))?;

            let lead_exists = leads_table
                .get(lead.id.0)
                .map_err(|e| LeadError::IoError(e.to_string()))?
                .is_some();
            if !lead_exists {
                return Err(LeadError::NotFound(lead.id));
            }

            let sale_exists = sales_table
                .get(lead.id.0)
                .map_err(|e| LeadError::IoError(e.to_string()))?
                .is_some();
            if sale_exists {
                return Err(LeadError::SaleExists(lead.id));
            }

            sales_table
                .insert(lead.id.0, sale_bytes.as_slice())
                .map_err(|e| LeadError::IoError(e.to_string()))?;
            leads_table
                .insert(lead.id.0, lead_bytes.as_slice())
                .map_err(|e| LeadError::IoError(e.to_string()))?;
            meta_table
                .insert(LAST_SALE_ID, sale_id)
                .map_err(|e| LeadError::IoError(e.to_string()))?;
        }
        write_txn
            .commit()
            .map_err(|e| LeadError::IoError(e.to_string()))?;

        self.last_sale_id = sale_id;
        Ok(sale)
    }

    fn get_sale_for_lead(&self, lead: LeadId) -> Result<Option<Sale>, LeadError> {
        let read_txn = self
            .db
            .begin_read()
            .map_err(|e| LeadError::IoError(e.to_string()))?;
        let sales_table = read_txn
            .open_table(SALES)
            .map_err(|e| LeadError::IoError(e.to_string()))?;

        match sales_table
            .get(lead.0)
            .map_err(|e| LeadError::IoError(e.to_string()))?
        {
            Some(data) => Ok(Some(decode(data.value())?)),
            None => Ok(None),
        }
    }

    fn list_leads(&self, stage: Option<LeadStage>) -> Result<Vec<Lead>, LeadError> {
        let read_txn = self
            .db
            .begin_read()
            .map_err(|e| LeadError::IoError(e.to_string()))?;
        let leads_table = read_txn
            .open_table(LEADS)
            .map_err(|e| LeadError::IoError(e.to_string()))?;

        let mut leads = Vec::new();
        for entry in leads_table
            .iter()
            .map_err(|e| LeadError::IoError(e.to_string()))?
        {
            let (_, value) = entry.map_err(|e| LeadError::IoError(e.to_string()))?;
            let lead: Lead = decode(value.value())?;
            if stage.is_none_or(|s| lead.stage == s) {
                leads.push(lead);
            }
        }
        Ok(leads)
    }

    fn lead_count(&self) -> Result<usize, LeadError> {
        self.table_len(LEADS)
    }

    fn sale_count(&self) -> Result<usize, LeadError> {
        self.table_len(SALES)
    }
}
