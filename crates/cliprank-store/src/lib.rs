//! Persistence seam for the cliprank pipeline.
//!
//! The orchestrators only ever talk to [`JobStore`]; the HTTP layer and
//! concrete database live outside this workspace. [`MemoryStore`] is the
//! reference implementation, used by every orchestrator test.

pub mod error;
pub mod memory;
pub mod store;

pub use error::{StoreError, StoreResult};
pub use memory::MemoryStore;
pub use store::JobStore;
