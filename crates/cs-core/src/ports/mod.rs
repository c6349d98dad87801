//! Port interfaces for the application layer
//!
//! Ports define the contract between the use cases in `cs-app` and the
//! adapters in `cs-infra`. The core stays free of HTTP, files and clocks;
//! everything that touches the outside world comes in through a trait here.
//!
//! ## Port Placement Guidelines
//!
//! A trait belongs in `cs-core/ports` when it is implemented by the
//! infrastructure layer and depended upon by more than one use case.
//! Otherwise keep it next to the use case that needs it.

mod clock;
pub mod errors;
pub mod presentation;
pub mod project_store;
pub mod repository;
pub mod state_store;

#[cfg(any(test, feature = "testing"))]
pub mod tests;

pub use clock::*;
pub use errors::{GitHubApiError, StateStoreError};
pub use presentation::PresentationSinkPort;
pub use project_store::ProjectStorePort;
pub use repository::{RepositoryReaderPort, RepositoryWriterPort};
pub use state_store::{StateStorePort, CREDENTIAL_KEY, LAST_KNOWN_MARKER_KEY};
