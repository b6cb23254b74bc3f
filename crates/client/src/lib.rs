//! Client code for newsdeck.
//!
//! This crate provides the HTTP provider clients (news sources, text
//! generation, image search), the aggregator, and the cache-backed summary
//! and image services shared by the CLI and any embedding caller.

pub mod aggregate;
pub mod fetch;
pub mod image;
pub mod sources;
pub mod summary;

pub use aggregate::{Aggregator, merge_ranked};
pub use fetch::http_client;
pub use image::{ImageOrigin, ImageRef, ImageService};
pub use sources::{SourceFetcher, SourceQuery};
pub use summary::{Article, Summary, SummaryOrigin, SummaryService};
