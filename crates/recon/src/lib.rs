//! `rollbook-recon`: student name reconciliation engine.
//!
//! Pure engine crate: receives pre-loaded records and roster cells, returns
//! classified results. No CLI or IO dependencies.

pub mod config;
pub mod engine;
pub mod error;
pub mod matcher;
pub mod model;
pub mod normalize;
pub mod roster;
pub mod summary;

pub use config::{Corrections, DuplicatePolicy, RulesConfig};
pub use engine::run;
pub use error::ReconError;
pub use model::{ReconInput, ReconResult, StudentRecord};
pub use normalize::{canonical_key, dedup_key, reorder_last_first};
pub use roster::{RosterBook, RosterExtractor, RosterStudent};
