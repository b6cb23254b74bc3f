//! Core types and shared functionality for newsdeck.
//!
//! This crate provides:
//! - Two-tier on-disk cache (artifact files plus one JSON index per tier)
//! - Provider cascade engine with a deterministic terminal fallback
//! - The shared post model and stable id derivation
//! - Unified error types
//! - Configuration structures

pub mod cache;
pub mod cascade;
pub mod config;
pub mod error;
pub mod model;

pub use cache::{ArtifactStore, CacheEntry, CacheStats, EntryMeta};
pub use cascade::{Cascade, CascadeOutcome, Provider, ProviderError, Resolution};
pub use config::AppConfig;
pub use error::Error;
pub use model::{Post, SourceTag};
