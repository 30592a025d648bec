mod shell;

use std::io;

use tracing::info;

use moodboard_app::{AppState, Config};

fn main() -> anyhow::Result<()> {
    // Config (also loads .env if present)
    let config = Config::from_env();

    // Init logging
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "moodboard=info".into()),
        )
        .init();

    info!(
        "Starting MoodBoard Maker (db {:?}, uploads {})",
        config.db_path(),
        config.upload_root.display()
    );

    let mut app = AppState::open(config)?;

    let stdin = io::stdin();
    let mut shell = shell::Shell::new(stdin.lock(), io::stdout());
    shell.run(&mut app)?;

    info!("Shutting down");
    Ok(())
}
