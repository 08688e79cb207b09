//! # API Request/Response Types
//!
//! This module defines the JSON structures for the HTTP API.
//!
//! Requests carry enum values as strings and are parsed at this boundary,
//! so an unknown source, domain or stage becomes a 400 before any rule runs.

use chrono::{DateTime, Utc};
use leadflow_core::{
    BusinessDomain, Lead, LeadError, LeadSource, LeadStage, NewLead, PipelineStats,
    Recommendation, Sale, SaleStage,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// =============================================================================
// HEALTH RESPONSE
// =============================================================================

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

// =============================================================================
// STATUS RESPONSE
// =============================================================================

/// Pipeline status response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub total_leads: usize,
    /// Lead count per stage name, every stage present.
    pub by_stage: BTreeMap<String, usize>,
    pub total_sales: usize,
    pub persistent: bool,
}

impl StatusResponse {
    pub fn from_stats(stats: &PipelineStats, persistent: bool) -> Self {
        Self {
            total_leads: stats.total_leads,
            by_stage: stats
                .by_stage
                .iter()
                .map(|(stage, count)| (stage.as_str().to_string(), *count))
                .collect(),
            total_sales: stats.total_sales,
            persistent,
        }
    }
}

// =============================================================================
// LEAD REQUESTS
// =============================================================================

/// Lead creation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateLeadRequest {
    pub source: String,
    #[serde(default)]
    pub business_domain: Option<String>,
}

impl CreateLeadRequest {
    /// Parse into a [`NewLead`].
    ///
    /// A missing or blank domain means "unknown" and is accepted.
    pub fn to_new_lead(&self) -> Result<NewLead, LeadError> {
        let source: LeadSource = self.source.parse()?;
        let business_domain = BusinessDomain::parse_optional(self.business_domain.as_deref())?;
        Ok(NewLead::new(source, business_domain))
    }
}

/// Stage change request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageUpdateRequest {
    pub stage: String,
}

impl StageUpdateRequest {
    pub fn target(&self) -> Result<LeadStage, LeadError> {
        self.stage.parse()
    }
}

/// Query string for `GET /leads`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub stage: Option<String>,
}

impl ListQuery {
    pub fn stage_filter(&self) -> Result<Option<LeadStage>, LeadError> {
        self.stage.as_deref().map(str::parse).transpose()
    }
}

// =============================================================================
// LEAD JSON
// =============================================================================

/// Lead JSON representation. The score is exposed as a float in [0, 1].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeadJson {
    pub id: u64,
    pub source: LeadSource,
    pub stage: LeadStage,
    pub business_domain: Option<BusinessDomain>,
    pub activity_count: u32,
    pub ai_score: Option<f64>,
    pub ai_recommendation: Option<Recommendation>,
    pub ai_reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<&Lead> for LeadJson {
    fn from(lead: &Lead) -> Self {
        Self {
            id: lead.id.0,
            source: lead.source,
            stage: lead.stage,
            business_domain: lead.business_domain,
            activity_count: lead.activity_count,
            ai_score: lead.ai_score.map(|s| s.as_f64()),
            ai_recommendation: lead.ai_recommendation,
            ai_reason: lead.ai_reason.clone(),
            created_at: lead.created_at,
        }
    }
}

/// Sale JSON representation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleJson {
    pub id: u64,
    pub lead_id: u64,
    pub stage: SaleStage,
    pub created_at: DateTime<Utc>,
}

impl From<&Sale> for SaleJson {
    fn from(sale: &Sale) -> Self {
        Self {
            id: sale.id.0,
            lead_id: sale.lead_id.0,
            stage: sale.stage,
            created_at: sale.created_at,
        }
    }
}

// =============================================================================
// RESPONSE ENVELOPES
// =============================================================================

/// Single-lead response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeadResponse {
    pub success: bool,
    pub lead: Option<LeadJson>,
    pub error: Option<String>,
}

impl LeadResponse {
    pub fn success(lead: &Lead) -> Self {
        Self {
            success: true,
            lead: Some(LeadJson::from(lead)),
            error: None,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            lead: None,
            error: Some(msg.into()),
        }
    }
}

/// Lead listing response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeadListResponse {
    pub success: bool,
    pub leads: Vec<LeadJson>,
    pub error: Option<String>,
}

impl LeadListResponse {
    pub fn success(leads: &[Lead]) -> Self {
        Self {
            success: true,
            leads: leads.iter().map(LeadJson::from).collect(),
            error: None,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            leads: vec![],
            error: Some(msg.into()),
        }
    }
}

/// Sale lookup response. `found` is false for a lead with no sale yet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleResponse {
    pub success: bool,
    pub found: bool,
    pub sale: Option<SaleJson>,
    pub error: Option<String>,
}

impl SaleResponse {
    pub fn success(sale: Option<&Sale>) -> Self {
        Self {
            success: true,
            found: sale.is_some(),
            sale: sale.map(SaleJson::from),
            error: None,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            found: false,
            sale: None,
            error: Some(msg.into()),
        }
    }
}
