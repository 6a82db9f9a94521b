//! Environment file reconciliation library.
//!
//! This library keeps a local `.env` file in step with a git-trackable
//! template (by default the same path with `.example` appended). The template
//! decides which variables exist and how the file is laid out, while the local
//! file keeps its values. Variables that must hold a secret are filled in by a
//! pluggable asynchronous generator when they are empty.
//!
//! # Features
//!
//! - **Verbatim passthrough**: comments, blank lines and anything that isn't a
//!   `NAME=value` line are written back exactly as read
//! - **Change report**: added, removed and generated variables are reported
//! - **Concurrent generation**: secret generators run concurrently on tokio
//! - **Optional tracing**: Detailed logging when the `tracing` feature is enabled
//!
//! # Example
//!
//! ```rust,no_run
//! use dotenv_sync::generate::RandomSecret;
//! use dotenv_sync::sync::{EnvSync, EnvSyncConfig};
//! use std::collections::HashSet;
//! use std::sync::Arc;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let config = EnvSyncConfig::new(
//!     ".env", // template defaults to .env.example
//!     HashSet::from(["SECRET_KEY".to_string()]),
//!     Arc::new(RandomSecret::default()),
//! );
//!
//! EnvSync::run(config).await.unwrap();
//! # }
//! ```

pub mod generate;
pub mod merge;
pub mod parse;
pub mod resolve;
pub mod sync;
