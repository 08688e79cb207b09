//! Unit tests for API types serialization/deserialization.

// Allow unwrap and panic in tests - these are standard for test code
#![allow(clippy::unwrap_used, clippy::panic)]

use chrono::{TimeZone, Utc};
use leadflow::api::{
    CreateLeadRequest, HealthResponse, LeadJson, LeadListResponse, LeadResponse, ListQuery,
    SaleResponse, StageUpdateRequest, StatusResponse,
};
use leadflow_core::{
    BusinessDomain, Lead, LeadError, LeadId, LeadService, LeadSource, LeadStage, NewLead,
    Recommendation, Sale, SaleId, SaleStage, Score,
};

fn sample_lead() -> Lead {
    let created_at = Utc.with_ymd_and_hms(2026, 3, 14, 9, 30, 0).unwrap();
    let mut lead = Lead::create(
        LeadId(7),
        NewLead::new(LeadSource::Partner, Some(BusinessDomain::First)),
        created_at,
    );
    lead.stage = LeadStage::Qualified;
    lead.activity_count = 5;
    lead.ai_score = Some(Score::new(100));
    lead.ai_recommendation = Some(Recommendation::TransferToSales);
    lead.ai_reason = Some(Recommendation::TransferToSales.reason().to_string());
    lead
}

// =============================================================================
// HEALTH RESPONSE TESTS
// =============================================================================

#[test]
fn test_health_response_default() {
    let health = HealthResponse::default();
    assert_eq!(health.status, "ok");
    assert!(!health.version.is_empty());
}

#[test]
fn test_health_response_serialization() {
    let health = HealthResponse {
        status: "ok".to_string(),
        version: "0.4.2".to_string(),
    };

    let json = serde_json::to_string(&health).unwrap();
    assert_eq!(json, r#"{"status":"ok","version":"0.4.2"}"#);
}

// =============================================================================
// STATUS RESPONSE TESTS
// =============================================================================

#[test]
fn test_status_response_from_stats() {
    let mut service = LeadService::new();
    service
        .create(NewLead::new(LeadSource::Manual, None))
        .unwrap();

    let status = StatusResponse::from_stats(&service.stats().unwrap(), false);
    assert_eq!(status.total_leads, 1);
    assert_eq!(status.by_stage["new"], 1);
    assert_eq!(status.by_stage["lost"], 0);

    let json = serde_json::to_value(&status).unwrap();
    assert_eq!(json["by_stage"]["contacted"], 0);
    assert_eq!(json["persistent"], false);
}

// =============================================================================
// REQUEST TESTS
// =============================================================================

#[test]
fn test_create_request_with_domain() {
    let request: CreateLeadRequest =
        serde_json::from_str(r#"{"source":"Scanner","business_domain":" third "}"#).unwrap();

    let new = request.to_new_lead().unwrap();
    assert_eq!(new.source, LeadSource::Scanner);
    assert_eq!(new.business_domain, Some(BusinessDomain::Third));
}

#[test]
fn test_create_request_domain_optional() {
    for body in [
        r#"{"source":"manual"}"#,
        r#"{"source":"manual","business_domain":null}"#,
        r#"{"source":"manual","business_domain":""}"#,
    ] {
        let request: CreateLeadRequest = serde_json::from_str(body).unwrap();
        assert!(request.to_new_lead().unwrap().business_domain.is_none());
    }
}

#[test]
fn test_create_request_unknown_source() {
    let request = CreateLeadRequest {
        source: "referral".to_string(),
        business_domain: None,
    };

    match request.to_new_lead() {
        Err(LeadError::UnknownValue { kind, value }) => {
            assert_eq!(kind, "source");
            assert_eq!(value, "referral");
        }
        other => panic!("expected UnknownValue, got {:?}", other),
    }
}

#[test]
fn test_stage_request_target() {
    let request: StageUpdateRequest = serde_json::from_str(r#"{"stage":"lost"}"#).unwrap();
    assert_eq!(request.target().unwrap(), LeadStage::Lost);

    let bad = StageUpdateRequest {
        stage: "closed".to_string(),
    };
    assert!(matches!(bad.target(), Err(LeadError::UnknownValue { .. })));
}

#[test]
fn test_list_query_filter() {
    assert_eq!(ListQuery::default().stage_filter().unwrap(), None);

    let query = ListQuery {
        stage: Some("contacted".to_string()),
    };
    assert_eq!(query.stage_filter().unwrap(), Some(LeadStage::Contacted));
}

// =============================================================================
// LEAD JSON TESTS
// =============================================================================

#[test]
fn test_lead_json_wire_format() {
    let json = serde_json::to_value(LeadJson::from(&sample_lead())).unwrap();

    assert_eq!(json["id"], 7);
    assert_eq!(json["source"], "partner");
    assert_eq!(json["stage"], "qualified");
    assert_eq!(json["business_domain"], "first");
    assert_eq!(json["activity_count"], 5);
    assert_eq!(json["ai_score"], 1.0);
    assert_eq!(json["ai_recommendation"], "transfer_to_sales");
    assert_eq!(
        json["ai_reason"],
        "High deal probability, recommended to transfer to sales"
    );
    assert_eq!(json["created_at"], "2026-03-14T09:30:00Z");
}

#[test]
fn test_lead_json_unscored() {
    let created_at = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
    let lead = Lead::create(
        LeadId(1),
        NewLead::new(LeadSource::Scanner, None),
        created_at,
    );

    let json = serde_json::to_value(LeadJson::from(&lead)).unwrap();
    assert!(json["business_domain"].is_null());
    assert!(json["ai_score"].is_null());
    assert!(json["ai_recommendation"].is_null());
}

#[test]
fn test_lead_response_round_trip() {
    let response = LeadResponse::success(&sample_lead());
    let text = serde_json::to_string(&response).unwrap();
    let back: LeadResponse = serde_json::from_str(&text).unwrap();

    assert!(back.success);
    assert!(back.error.is_none());
    assert_eq!(back.lead, response.lead);
}

#[test]
fn test_error_envelopes() {
    let lead = LeadResponse::error("Lead not found: 3");
    assert!(!lead.success);
    assert!(lead.lead.is_none());

    let list = LeadListResponse::error("Unknown stage: 'won'");
    assert!(!list.success);
    assert!(list.leads.is_empty());

    let sale = SaleResponse::error("Lead not found: 3");
    assert!(!sale.found);
    assert_eq!(sale.error.as_deref(), Some("Lead not found: 3"));
}

// =============================================================================
// SALE RESPONSE TESTS
// =============================================================================

#[test]
fn test_sale_response_found() {
    let sale = Sale {
        id: SaleId(2),
        lead_id: LeadId(7),
        stage: SaleStage::New,
        created_at: Utc.with_ymd_and_hms(2026, 3, 15, 12, 0, 0).unwrap(),
    };

    let json = serde_json::to_value(SaleResponse::success(Some(&sale))).unwrap();
    assert_eq!(json["found"], true);
    assert_eq!(json["sale"]["id"], 2);
    assert_eq!(json["sale"]["lead_id"], 7);
    assert_eq!(json["sale"]["stage"], "new");
}

#[test]
fn test_sale_response_none() {
    let response = SaleResponse::success(None);
    assert!(response.success);
    assert!(!response.found);
    assert!(response.sale.is_none());
}
