//! shotview-core: run-state store for a screenshot-regression report viewer
//!
//! The store keeps a tree of test suites with per-browser results and retry
//! history, and folds a stream of run and UI events into immutable snapshots
//! that a rendering layer can diff cheaply.
//!
//! # Architecture
//!
//! ```text
//! InitialPayload ──► RunState::from_payload ──► RunStore
//!                                                  │
//!        RunEvent ──► reduce(&RunState, event) ◄───┘
//!                          │
//!                          ├─► next RunState (Arc-shared subtrees, revision stamps)
//!                          └─► Vec<Effect> ──► KeyValueStore (base host)
//! ```
//!
//! # Modules
//!
//! - `status`: test status set and any-fail-dominates aggregation
//! - `model`: suites, browser results, outcomes, image states
//! - `tree`: path lookup and copy-on-write branch updates
//! - `patterns`: configured error patterns
//! - `grouping`: grouped-errors projection
//! - `view`: view preferences and base-host parsing
//! - `payload`: initial run payload
//! - `event`: typed event catalog
//! - `state`: snapshot and reducer
//! - `store`: snapshot owner and persisted key-value stores
//! - `config`: configuration file
//! - `logging`: tracing subscriber setup
//!
//! # Safety
//!
//! This crate forbids unsafe code.

#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod event;
pub mod grouping;
pub mod logging;
pub mod model;
pub mod patterns;
pub mod payload;
pub mod state;
pub mod status;
pub mod store;
pub mod tree;
pub mod view;

pub use error::{ConfigError, Error, Result, StorageError};
pub use event::RunEvent;
pub use payload::InitialPayload;
pub use state::{Effect, RunState, StartupOptions, reduce};
pub use status::Status;
pub use store::{JsonFileStore, KeyValueStore, MemoryStore, RunStore};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
