//! # clipnote-core
//!
//! Core types, traits, and abstractions for the clipnote clipboard manager.
//!
//! This crate provides:
//! - The record model and its AI lifecycle state machine
//! - Content digest for capture dedup
//! - Error taxonomy and `Result` alias
//! - Preferences and provider configuration
//! - Persistence gateway and secret store contracts
//! - Centralized defaults and structured logging field names

pub mod config;
pub mod defaults;
pub mod digest;
pub mod error;
pub mod logging;
pub mod models;
pub mod repository;
pub mod secrets;

pub use config::{Preferences, ProviderKind};
pub use digest::content_digest;
pub use error::{Error, Result};
pub use models::{AiPatch, AiState, Record, Summary};
pub use repository::RecordRepository;
pub use secrets::{EnvSecretStore, SecretStore};
