//! CLI command implementations

pub mod clean;
pub mod sweep;

pub use clean::CleanArgs;
pub use sweep::SweepArgs;
