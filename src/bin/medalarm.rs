use anyhow::Result;
use clap::Parser;
use dotenvy::dotenv;
use log::{error, info};

use medalarm::commands::{build_store, dispatch, Cli, CommandContext};
use medalarm::core::{notify_failure, Config, Role, Session};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv().ok();

    let cli = Cli::parse();
    let config = Config::from_env()?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.log_level))
        .init();

    // Auth gate: reminders belong to signed-in patients
    let session = match Session::load(&config.session_path)
        .and_then(|s| s.require_role(Role::Patient).map(|_| s))
    {
        Ok(session) => session,
        Err(e) => {
            error!("Session check failed: {e:#}");
            notify_failure(&format!("{e:#}"));
            std::process::exit(1);
        }
    };

    info!(
        "Signed in as user {} ({}) against {}",
        session.id, session.role, config.api_url
    );

    let store = build_store(&config, cli.dry_run)?;
    let ctx = CommandContext::new(store, session, config);

    if let Err(e) = dispatch(&ctx, cli.command).await {
        notify_failure(&format!("{e:#}"));
        std::process::exit(1);
    }

    Ok(())
}
