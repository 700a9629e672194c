//! Command-line argument dispatch.
//!
//! Maps validated CLI arguments to the action to run, currently only the
//! API server with its configuration.

use crate::cli::actions::{server::Args, Action};
use crate::cli::commands::{database, ARG_ADMIN_SECRET, ARG_PORT};
use anyhow::{Context, Result};
use secrecy::SecretString;

/// Map validated CLI matches to a server action.
///
/// # Errors
/// Returns an error if required arguments are missing or inconsistent.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches.get_one::<u16>(ARG_PORT).copied().unwrap_or(8080);

    let admin_secret = matches
        .get_one::<String>(ARG_ADMIN_SECRET)
        .cloned()
        .context("missing required argument: --admin-secret")?;

    if admin_secret.trim().is_empty() {
        anyhow::bail!("--admin-secret must not be empty");
    }

    let db_opts = database::Options::parse(matches)?;

    Ok(Action::Server(Args {
        port,
        dsn: db_opts.dsn,
        admin_secret: SecretString::from(admin_secret),
        db_max_connections: db_opts.max_connections,
        db_acquire_timeout_seconds: db_opts.acquire_timeout_seconds,
    }))
}
