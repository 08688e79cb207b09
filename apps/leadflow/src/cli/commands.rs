//! # CLI Command Implementations
//!
//! This module contains the actual implementations of CLI commands.
//! Each command opens the configured backend, runs one service operation
//! and prints the result as text or, with `--json-mode`, as JSON.

use crate::api::{self, AppState, LeadJson, SaleJson, StatusResponse};
use crate::config::{Backend, Config};
use leadflow_core::{BusinessDomain, Lead, LeadError, LeadId, LeadService, LeadStage, NewLead};
use serde::Serialize;

// =============================================================================
// SERVER COMMAND
// =============================================================================

/// Start the HTTP server.
pub async fn cmd_server(config: &Config) -> Result<(), LeadError> {
    let service = config.open_service()?;

    println!("Leadflow Server Starting...");
    println!();
    println!("Configuration:");
    println!("  Host:       {}", config.host);
    println!("  Port:       {}", config.port);
    println!("  Backend:    {}", config.backend);
    println!("  Database:   {:?}", config.database);
    println!("  Rate limit: {}", config.rate_limit);
    println!();
    println!("Endpoints:");
    println!("  GET   /health              - Health check");
    println!("  GET   /status              - Pipeline counts");
    println!("  POST  /leads               - Create a lead");
    println!("  GET   /leads?stage=        - List leads");
    println!("  GET   /leads/{{id}}          - Fetch a lead");
    println!("  PATCH /leads/{{id}}/stage    - Change stage");
    println!("  POST  /leads/{{id}}/analyze  - Score a lead");
    println!("  POST  /leads/{{id}}/activity - Record activity");
    println!("  GET   /leads/{{id}}/sale     - Sale for a lead");
    println!();
    println!("Press Ctrl+C to stop");
    println!();

    let state = AppState::new(service).with_rate_limit(config.rate_limit);
    api::run_server(&config.bind_addr(), state).await
}

// =============================================================================
// INIT COMMAND
// =============================================================================

/// Initialize a new empty database.
pub fn cmd_init(config: &Config, force: bool) -> Result<(), LeadError> {
    if config.backend == Backend::Memory {
        return Err(LeadError::InvalidInput(
            "The memory backend has no database to initialize".to_string(),
        ));
    }

    let db_path = &config.database;
    if db_path.exists() {
        if !force {
            return Err(LeadError::InvalidInput(
                "Database already exists. Use --force to overwrite.".to_string(),
            ));
        }
        std::fs::remove_file(db_path).map_err(|e| {
            LeadError::IoError(format!("Cannot remove '{}': {}", db_path.display(), e))
        })?;
    }

    LeadService::with_redb(db_path)?;
    println!("Initialized new redb database at {:?}", db_path);
    Ok(())
}

// =============================================================================
// LEAD COMMANDS
// =============================================================================

/// Create a lead.
pub fn cmd_create(
    config: &Config,
    json_mode: bool,
    source: &str,
    domain: Option<&str>,
) -> Result<(), LeadError> {
    let source = source.parse()?;
    let domain = BusinessDomain::parse_optional(domain)?;

    let mut service = config.open_service()?;
    let lead = service.create(NewLead::new(source, domain))?;
    print_lead("Created", &lead, json_mode)
}

/// Show one lead.
pub fn cmd_show(config: &Config, json_mode: bool, id: u64) -> Result<(), LeadError> {
    let service = config.open_service()?;
    let lead = service.fetch(LeadId(id))?;
    print_lead("Lead", &lead, json_mode)
}

/// Move a lead to another stage.
pub fn cmd_stage(config: &Config, json_mode: bool, id: u64, stage: &str) -> Result<(), LeadError> {
    let target: LeadStage = stage.parse()?;
    let mut service = config.open_service()?;
    let lead = service.update_stage(LeadId(id), target)?;
    print_lead("Updated", &lead, json_mode)
}

/// Score a lead.
pub fn cmd_analyze(config: &Config, json_mode: bool, id: u64) -> Result<(), LeadError> {
    let mut service = config.open_service()?;
    let lead = service.analyze(LeadId(id))?;
    print_lead("Analyzed", &lead, json_mode)
}

/// Record one activity.
pub fn cmd_activity(config: &Config, json_mode: bool, id: u64) -> Result<(), LeadError> {
    let mut service = config.open_service()?;
    let lead = service.record_activity(LeadId(id))?;
    print_lead("Activity recorded", &lead, json_mode)
}

/// List leads.
pub fn cmd_list(config: &Config, json_mode: bool, stage: Option<&str>) -> Result<(), LeadError> {
    let filter: Option<LeadStage> = stage.map(str::parse).transpose()?;
    let service = config.open_service()?;
    let leads = service.list(filter)?;

    if json_mode {
        let leads: Vec<LeadJson> = leads.iter().map(LeadJson::from).collect();
        return print_json(&leads);
    }

    if leads.is_empty() {
        println!("No leads");
        return Ok(());
    }

    println!(
        "{:>6}  {:<8}  {:<12}  {:<7}  {:>8}  {:>5}",
        "ID", "SOURCE", "STAGE", "DOMAIN", "ACTIVITY", "SCORE"
    );
    for lead in &leads {
        println!(
            "{:>6}  {:<8}  {:<12}  {:<7}  {:>8}  {:>5}",
            lead.id,
            lead.source,
            lead.stage,
            lead.business_domain
                .map_or_else(|| "-".to_string(), |d| d.to_string()),
            lead.activity_count,
            lead.ai_score.map_or_else(|| "-".to_string(), |s| s.to_string()),
        );
    }
    Ok(())
}

/// Show the sale opened for a lead.
pub fn cmd_sale(config: &Config, json_mode: bool, id: u64) -> Result<(), LeadError> {
    let service = config.open_service()?;
    let sale = service.sale_for_lead(LeadId(id))?;

    if json_mode {
        return print_json(&sale.as_ref().map(SaleJson::from));
    }

    match sale {
        Some(sale) => {
            println!("Sale {}", sale.id.0);
            println!("  Lead:    {}", sale.lead_id);
            println!("  Stage:   new");
            println!("  Created: {}", sale.created_at.to_rfc3339());
        }
        None => println!("Lead {} has no sale", id),
    }
    Ok(())
}

// =============================================================================
// STATUS COMMAND
// =============================================================================

/// Show pipeline counts.
pub fn cmd_status(config: &Config, json_mode: bool) -> Result<(), LeadError> {
    let service = config.open_service()?;
    let stats = service.stats()?;

    if json_mode {
        return print_json(&StatusResponse::from_stats(&stats, service.is_persistent()));
    }

    println!("Leadflow Pipeline Status");
    println!("========================");
    println!("Database: {:?}", config.database);
    println!("Backend:  {}", config.backend);
    println!();
    for (stage, count) in &stats.by_stage {
        println!("{:<12} {}", format!("{}:", stage), count);
    }
    println!();
    println!("Total leads: {}", stats.total_leads);
    println!("Total sales: {}", stats.total_sales);

    Ok(())
}

// =============================================================================
// HELPER FUNCTIONS
// =============================================================================

fn print_json<T: Serialize>(value: &T) -> Result<(), LeadError> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|e| LeadError::SerializationError(e.to_string()))?;
    println!("{}", text);
    Ok(())
}

fn print_lead(heading: &str, lead: &Lead, json_mode: bool) -> Result<(), LeadError> {
    if json_mode {
        return print_json(&LeadJson::from(lead));
    }

    println!("{} lead {}", heading, lead.id);
    println!("  Source:   {}", lead.source);
    println!("  Stage:    {}", lead.stage);
    match lead.business_domain {
        Some(domain) => println!("  Domain:   {}", domain),
        None => println!("  Domain:   unknown"),
    }
    println!("  Activity: {}", lead.activity_count);
    if let (Some(score), Some(recommendation)) = (lead.ai_score, lead.ai_recommendation) {
        println!("  Score:    {} ({})", score, recommendation);
    }
    if let Some(reason) = &lead.ai_reason {
        println!("  Reason:   {}", reason);
    }
    println!("  Created:  {}", lead.created_at.to_rfc3339());
    Ok(())
}

// =============================================================================
// TESTS
// =============================================================================
