use anyhow::{Context, Result};
use betstats_finance::Period;
use betstats_ingest::BetclicClient;
use clap::Parser;
use std::process::ExitCode;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod add;
mod chart;
mod config;
mod state;
mod sync;

use sync::RunOptions;

#[derive(Parser, Debug)]
#[command(
    name = "betstats",
    version,
    long_version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("BETSTATS_BUILD_SHA"), ")"),
    about = "Betting account statistics: fetch, reconcile and chart your Betclic history"
)]
struct Cli {
    /// Skip the API fetch and chart the stored history only
    #[arg(long)]
    no_update: bool,

    /// Chart yearly totals instead of monthly ones
    #[arg(long)]
    yearly: bool,

    /// Interactively add an account, then exit
    #[arg(long)]
    add: bool,

    /// Only process the account with this name
    #[arg(long, value_name = "NAME")]
    account: Option<String>,
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("betstats=info,warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    init_tracing();
    let cli = Cli::parse();

    let accounts_path = state::accounts_path()?;

    if cli.add {
        add::run_add(&accounts_path)?;
        return Ok(ExitCode::SUCCESS);
    }

    let file = config::load_accounts(&accounts_path)?;
    if file.accounts.is_empty() {
        warn!(path = %accounts_path.display(), "no account configured; run: betstats --add");
        return Ok(ExitCode::SUCCESS);
    }

    let opts = RunOptions {
        update: !cli.no_update,
        period: if cli.yearly { Period::Yearly } else { Period::Monthly },
    };
    let client = BetclicClient::new().context("building HTTP client")?;
    let data_dir = state::data_dir()?;

    let mut stdout = std::io::stdout();
    let report = sync::run_all(
        &client,
        &file.accounts,
        cli.account.as_deref(),
        &data_dir,
        opts,
        &mut stdout,
    )
    .await?;

    info!(
        processed = report.processed.len(),
        failed = report.failed.len(),
        "run complete"
    );
    if report.failed.is_empty() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_parse() {
        let cli = Cli::try_parse_from(["betstats", "--no-update", "--yearly"]).unwrap();
        assert!(cli.no_update);
        assert!(cli.yearly);
        assert!(!cli.add);
        assert_eq!(cli.account, None);
    }

    #[test]
    fn test_add_and_account_flags() {
        let cli = Cli::try_parse_from(["betstats", "--add", "--account", "main"]).unwrap();
        assert!(cli.add);
        assert_eq!(cli.account.as_deref(), Some("main"));
    }

    #[test]
    fn test_help_is_not_an_error_exit() {
        let err = Cli::try_parse_from(["betstats", "--help"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
        assert_eq!(err.exit_code(), 0);
    }

    #[test]
    fn test_unknown_flag_rejected() {
        assert!(Cli::try_parse_from(["betstats", "--monthly"]).is_err());
    }
}
