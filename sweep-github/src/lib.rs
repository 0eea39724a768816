//! Sweep GitHub - repository listing for gha-sweep
//!
//! This crate provides the paginated repository listing used to discover
//! every repository of a user or organization before a sweep run.

mod error;
mod list;

pub use error::{Error, Result};
pub use list::{Repo, RepoLister};
