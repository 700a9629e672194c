use crate::{
    cli::{globals::GlobalArgs, telemetry},
    portero::{self, store::postgres::PoolConfig},
};
use anyhow::Result;
use secrecy::SecretString;
use std::time::Duration;
use tracing::debug;
use url::Url;

pub struct Args {
    pub port: u16,
    pub dsn: String,
    pub admin_secret: SecretString,
    pub db_max_connections: u32,
    pub db_acquire_timeout_seconds: u64,
}

impl std::fmt::Debug for Args {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Args")
            .field("port", &self.port)
            .field("dsn", &redact_dsn(&self.dsn))
            .field("admin_secret", &"***")
            .field("db_max_connections", &self.db_max_connections)
            .field("db_acquire_timeout_seconds", &self.db_acquire_timeout_seconds)
            .finish()
    }
}

/// Mask the password of a connection string so it can be logged.
pub(crate) fn redact_dsn(dsn: &str) -> String {
    match Url::parse(dsn) {
        Ok(mut url) => {
            if url.password().is_some() {
                // set_password only fails for cannot-be-a-base URLs, which have no password
                let _ = url.set_password(Some("***"));
            }
            url.to_string()
        }
        Err(_) => "<invalid dsn>".to_string(),
    }
}

/// Execute the server action.
/// # Errors
/// Returns an error if the database is unreachable or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    debug!("Server args: {:?}", args);

    let globals = GlobalArgs::new(args.admin_secret);

    let pool_config = PoolConfig {
        max_connections: args.db_max_connections,
        acquire_timeout: Duration::from_secs(args.db_acquire_timeout_seconds),
    };

    let result = portero::new(args.port, &args.dsn, &pool_config, globals).await;

    telemetry::shutdown_tracer();

    result
}
