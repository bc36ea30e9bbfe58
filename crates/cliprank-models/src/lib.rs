//! Shared data models for the cliprank backend.
//!
//! This crate provides Serde-serializable types for:
//! - Jobs and their pipeline steps
//! - Clips (selected highlights) and renders
//! - Transcript artifacts
//! - Status enums with the allowed transition graph

pub mod clip;
pub mod id;
pub mod job;
pub mod render;
pub mod status;
pub mod transcript;

// Re-export common types
pub use clip::{Clip, ClipMetadata};
pub use id::{ClipId, JobId, RenderId};
pub use job::{Job, SourceKind};
pub use render::{Render, RenderOptions};
pub use status::{JobStep, RunStatus};
pub use transcript::{Transcript, TranscriptSegment};
