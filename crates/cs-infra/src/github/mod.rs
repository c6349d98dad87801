//! GitHub REST adapter implementing the repository ports.

mod client;

pub use client::GitHubClient;
