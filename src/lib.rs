//! Collect.chat → Bitrix24 Lead Relay Library
//!
//! Receives lead webhooks from Collect.chat (JSON or form-encoded), reshapes
//! them into Bitrix24 `crm.lead.add` records and forwards them to the
//! configured inbound webhook, relaying Bitrix24's answer to the caller.
//!
//! # Modules
//!
//! - `api`: API definitions.
//! - `core`: Core mapping logic.
//! - `integrations`: External service integrations.
//! - `bitrix_client`: Bitrix24 webhook client.
//! - `config`: Configuration management.
//! - `errors`: Error handling types.
//! - `handlers`: HTTP request handlers.
//! - `lead_models`: Inbound payload and outbound record models.
//! - `mapping`: Collect.chat → Bitrix24 field mapping profiles.
//! - `routes`: Router assembly.

pub mod api;
pub mod core;
pub mod integrations;

pub mod bitrix_client;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod lead_models;
pub mod mapping;
pub mod routes;
