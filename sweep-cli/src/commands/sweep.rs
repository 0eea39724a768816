//! The disable/enable sweep command

use std::path::PathBuf;
use std::time::Duration;

use clap::Args;
use sweep_core::{run_sweep, Config, Mutator, Secrets};
use sweep_github::RepoLister;

/// Arguments shared by the disable and enable sweeps
#[derive(Args, Debug)]
pub struct SweepArgs {
    /// Target user or organization (overrides config)
    #[arg(short, long, env = "GHA_SWEEP_IDENTITY")]
    identity: Option<String>,

    /// Directory for local mirrors (overrides config)
    #[arg(long)]
    local_root: Option<PathBuf>,

    /// Repositories requested per listing page (overrides config)
    #[arg(long)]
    page_size: Option<u32>,

    /// Seconds to pause between repositories (overrides config)
    #[arg(long, value_name = "SECONDS")]
    delay: Option<u64>,
}

impl SweepArgs {
    /// Execute the sweep with the given mutator
    pub async fn execute(&self, mutator: &dyn Mutator, verbose: bool) -> anyhow::Result<()> {
        let config = Config::load_with_overrides(
            self.identity.clone(),
            self.local_root.clone(),
            self.page_size,
            self.delay.map(Duration::from_secs),
        )?;
        let sweep = &config.sweep;

        let identity = sweep.identity.clone().ok_or_else(|| {
            anyhow::anyhow!(
                "No target identity configured. Pass --identity, set GHA_SWEEP_IDENTITY, \
                 or add identity to the [sweep] section of the config file"
            )
        })?;

        let token = load_token()?;

        if verbose {
            println!("Sweep:      {}", mutator.label());
            println!("Identity:   {}", identity);
            println!("Local root: {}", sweep.local_root.display());
        }

        let lister = RepoLister::new(token.clone());
        let repos = lister.list_repositories(&identity, sweep.page_size).await?;

        if repos.is_empty() {
            println!("No repositories found for {}", identity);
            return Ok(());
        }

        let names: Vec<String> = repos.into_iter().map(|r| r.full_name).collect();
        let summary = run_sweep(sweep, &token, &names, mutator).await;

        println!(
            "Sweep finished: {} updated, {} unchanged, {} failed ({} total)",
            summary.updated,
            summary.skipped,
            summary.failed,
            summary.total()
        );

        Ok(())
    }
}

/// Load the GitHub token, scaffolding a secrets template on first run
fn load_token() -> anyhow::Result<String> {
    let secrets = Secrets::load()?;

    if let Some(token) = secrets.github_token() {
        return Ok(token);
    }

    // First run: write the template so the user has a file to fill in
    if let Some(path) = Secrets::default_secrets_path() {
        if !path.exists() {
            let created = Secrets::create_template()?;
            anyhow::bail!(
                "GitHub token not found. Set the GITHUB_TOKEN environment variable, \
                 or add your token to the template just created at {}",
                created.display()
            );
        }
    }

    anyhow::bail!(
        "GitHub token not found. Set the GITHUB_TOKEN environment variable \
         or add token to the secrets file"
    )
}
