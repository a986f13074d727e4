use anyhow::{Context, Result};
use softkey_bridge::script::parse_line;
use softkey_bridge::session::{Flow, Session};
use softkey_bridge::settings::load_config;
use softkey_core::ResizeMode;
use softkey_core::platform::Platform;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let config = load_config(config_path.as_deref())?;

    // The host shell describes itself through the environment.
    let user_agent = std::env::var("SOFTKEY_USER_AGENT").unwrap_or_default();
    let hybrid = std::env::var_os("SOFTKEY_HYBRID").is_some();
    let platform = Platform::from_user_agent(&user_agent, hybrid);

    tracing::info!(?platform, "softkey bridge starting");

    let session = Session::new(config, platform, ResizeMode::Native);
    session.start();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("Failed to read command")? {
        let command = match parse_line(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                tracing::warn!("{}", e);
                continue;
            }
        };

        match session.apply(command).await {
            Ok((Flow::Quit, _)) => break,
            Ok((Flow::Continue, Some(output))) => print!("{}", output),
            Ok((Flow::Continue, None)) => {}
            Err(e) => tracing::warn!("{:#}", e),
        }
    }

    session.stop();
    tracing::info!("softkey bridge stopped");
    Ok(())
}
