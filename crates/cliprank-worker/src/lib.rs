//! Pipeline workers: job and render orchestration over a bounded pool.
//!
//! A [`ClipService`] is the only public entry point: it validates
//! submissions, owns the [`Scheduler`], and dispatches the job and
//! render orchestrators, which talk to storage through
//! [`cliprank_store::JobStore`] and to the media tools through the
//! traits in [`media`].

pub mod artifacts;
pub mod config;
pub mod context;
pub mod error;
pub mod gate;
pub mod job_run;
pub mod media;
pub mod render_run;
pub mod scheduler;
pub mod service;
pub mod telemetry;
pub mod timeouts;

pub use artifacts::ArtifactLayout;
pub use config::WorkerConfig;
pub use context::PipelineContext;
pub use error::{WorkerError, WorkerResult};
pub use gate::RenderGate;
pub use media::{Downloader, Notifier, Renderer, Thumbnailer, TranscribeQuality, Transcriber};
pub use scheduler::Scheduler;
pub use service::ClipService;
