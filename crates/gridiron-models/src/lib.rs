//! Shared data models for the play analyzer.
//!
//! This crate provides Serde-serializable types for:
//! - Per-side and full-play tactical analyses
//! - Coaching personas
//! - Remote asset handles and processing states
//! - Analysis outcomes and error payloads
//! - The structured-output schema sent to the generation service

pub mod analysis;
pub mod asset;
pub mod outcome;
pub mod persona;
pub mod schema;

// Re-export common types
pub use analysis::{FullPlayAnalysis, SchemaViolation, SideAnalysis};
pub use asset::{AssetState, RemoteAsset};
pub use outcome::{AnalysisOutcome, ErrorKind, ErrorResult};
pub use persona::Persona;
pub use schema::response_schema;
