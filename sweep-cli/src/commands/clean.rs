//! Leftover mirror cleanup command
//!
//! Mirrors are removed by the pipeline itself; this command sweeps the
//! local root for directories left behind by a hard-killed run.

use std::path::PathBuf;

use clap::Args;
use sweep_core::Config;

/// Arguments for the clean command
#[derive(Args, Debug)]
pub struct CleanArgs {
    /// Directory for local mirrors (overrides config)
    #[arg(long)]
    local_root: Option<PathBuf>,
}

impl CleanArgs {
    /// Execute the clean command
    pub fn execute(&self) -> anyhow::Result<()> {
        let config = Config::load_with_overrides(None, self.local_root.clone(), None, None)?;
        let root = &config.sweep.local_root;

        if !root.exists() {
            println!("Nothing to clean: {} does not exist", root.display());
            return Ok(());
        }

        let mut removed = 0;
        for entry in std::fs::read_dir(root)? {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                std::fs::remove_dir_all(entry.path())?;
                println!("Removed {}", entry.path().display());
                removed += 1;
            }
        }

        if removed == 0 {
            println!("No leftover mirrors under {}", root.display());
        } else {
            println!("Removed {} leftover mirror(s)", removed);
        }

        Ok(())
    }
}
