pub mod discovery;
pub mod pipeline;
pub mod startup;
pub mod summary;

pub use discovery::discover_documents;
pub use pipeline::{Collected, DocumentError, DocumentFailure, Pipeline};
pub use startup::{Session, start};
pub use summary::RunSummary;
