//! The lead discovery and enrichment workflow.
//!
//! Everything stateful about a user's search lives in a [`SearchSession`]:
//! the canonical result set, the provider continuation token, and the
//! visible display window. The session drives its collaborators through
//! the [`traits`] seams, so the presentation layer (HTTP server, CLI) and
//! the tests all exercise identical logic.

pub mod adapters;
pub mod enrich;
pub mod error;
pub mod memory;
pub mod reconcile;
pub mod session;
pub mod testing;
pub mod traits;

pub use adapters::PgLeadStore;
pub use enrich::{EnrichFailure, EnrichReport};
pub use error::WorkflowError;
pub use memory::MemoryLeadStore;
pub use reconcile::SaveTarget;
pub use session::SearchSession;
pub use traits::{EmailScraper, LeadStore, SearchProvider};
