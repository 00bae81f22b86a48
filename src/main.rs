use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing::Instrument;

use user_records::{
    cli::{self, Cli},
    config::Config,
    db,
    services::PgUserService,
    telemetry::{self, InvocationId},
};

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    telemetry::init_tracing(cli.verbose)?;

    let span = telemetry::invocation_span(InvocationId::new(), &cli.task_name);
    run(cli).instrument(span).await
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let mut out = std::io::stdout();
    let mut err = std::io::stderr();

    // Usage errors and informational selectors never need a connection
    if let Some(outcome) = cli::preflight(&cli, &mut out, &mut err)? {
        return Ok(outcome.into());
    }

    let config = Config::load(cli.env_file.as_deref(), cli.database_url.clone())
        .context("Failed to load configuration")?;

    let pool = db::connect(&config.db_url, &config.pool_settings())
        .await
        .context("Failed to initialize database")?;
    let service = PgUserService::new(pool);

    let result = cli::dispatch(&service, &cli, &mut out, &mut err).await;
    db::close_pool(service.pool()).await;

    Ok(result?.into())
}
