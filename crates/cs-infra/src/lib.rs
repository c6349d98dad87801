pub mod fs;
pub mod github;
pub mod presentation;
pub mod state;
pub mod store;
pub mod time;

pub use github::GitHubClient;
pub use presentation::JsonSnapshotSink;
pub use state::FileStateStore;
pub use store::InMemoryProjectStore;
pub use time::SystemClock;
