//! coursework-sync
//!
//! Keeps a local, merged picture of the CAD coursework stored in a GitHub
//! repository (`Day NN/CW/<project>` or `CW/Day NN/<project>` folders) and
//! uploads new projects as `CW/Day NN/<project>`.

pub mod bootstrap;
pub mod cli;

pub use cli::{run, Cli};
