// iv-widgets - headless runtime for embeddable iv-* widgets
//
// Architecture:
// - Page mounts widgets through the element registry and routes realtime
//   channel events back to them
// - Each widget with a ws-url owns a reconnecting WebSocket channel task
// - `serve` runs an axum server with a demo page and a mock feed
//
// The binary is a thin shell over the library: parse the CLI, load config,
// set up logging, dispatch the command.

use anyhow::Result;
use clap::Parser;
use iv_widgets::cli::{self, Cli};
use iv_widgets::config::Config;
use iv_widgets::{logging, theme};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Config commands run before loading, so a broken config can be reset
    if cli::handle_config_command(&cli)? {
        return Ok(());
    }

    // Ensure config template exists (helps users discover options)
    Config::ensure_config_exists();

    // Extract bundled themes on first run
    theme::ensure_themes_extracted();

    let config = Config::from_env()?;

    // Keep the guard alive so file logs flush on exit
    let _log_guard = logging::init(&config.logging);

    tracing::debug!("iv-widgets {} (theme: {})", iv_widgets::config::VERSION, config.theme);

    cli::run(cli, config).await
}
