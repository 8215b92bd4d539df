//! Web project provisioning from a remote setup bundle.
//!
//! The library is the whole tool; the binary in `main.rs` is a thin
//! dispatcher. A provisioning run downloads a gzip-compressed tar bundle,
//! unpacks it into a scratch directory, patches the bundled web config,
//! copies mapped files into the project tree, and seeds the project `.env`
//! from prompts and remote content blocks. The scratch directory is swept
//! whether the run succeeds or fails.

pub mod archive;
pub mod cli;
pub mod commands;
pub mod config;
pub mod envfile;
pub mod error;
pub mod fetch;
pub mod fsops;
pub mod logging;
pub mod patch;
pub mod pipeline;
pub mod prompt;
