//! Sweep Core - core library for gha-sweep
//!
//! This crate provides the per-repository sweep pipeline: configuration and
//! secrets handling, local mirror management (clone, stage, commit, push,
//! cleanup), and the workflow-file mutators applied inside each mirror.

pub mod config;
pub mod error;
pub mod mirror;
pub mod mutate;
pub mod pipeline;
pub mod secrets;

pub use config::{Config, SweepConfig};
pub use error::{Error, Result};
pub use mirror::{Mirror, PublishOutcome};
pub use mutate::{DisableWorkflows, EnableFossaWorkflow, MutationOutcome, Mutator};
pub use pipeline::{run_sweep, RepoOutcome, SweepSummary};
pub use secrets::Secrets;
