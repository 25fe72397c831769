// CLI module - command-line argument parsing and handlers
//
// Subcommands:
// - render: print server-rendered HTML for one widget
// - embed: print the embed snippet for a widget configuration
// - watch: mount a widget, connect it and print renders and events
// - serve: demo page plus WebSocket demo feed
// - themes: list bundled and user themes
// - config --show/--path/--reset/--edit/--update: configuration management

use crate::config::{Config, VERSION};
use crate::page::Page;
use crate::server::{self, ServerState};
use crate::theme::Theme;
use crate::widget::{self, ElementId};
use anyhow::{bail, Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use std::collections::HashMap;
use std::future::Future;
use std::io::Write;
use std::net::SocketAddr;
use std::process::Command;
use tokio::sync::{broadcast, oneshot};
use tokio::task::{JoinError, JoinHandle};

/// iv-widgets - headless runtime for embeddable iv-* widgets
#[derive(Debug, Parser)]
#[command(name = "iv-widgets")]
#[command(version = VERSION)]
#[command(about = "Headless runtime for embeddable iv-* widgets", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Print server-rendered HTML for a widget
    Render {
        /// Custom element tag, e.g. iv-capsule-card
        tag: String,

        /// Attribute as name=value (bare name for boolean attributes)
        #[arg(short = 'a', long = "attr", value_parser = parse_attribute)]
        attributes: Vec<(String, String)>,

        /// Theme name (defaults to the configured theme)
        #[arg(long)]
        theme: Option<String>,
    },

    /// Print the embed snippet for a widget configuration
    Embed {
        /// Custom element tag
        tag: String,

        /// Configuration object with camelCase keys, e.g. '{"wsUrl":"wss://x"}'
        config: String,
    },

    /// Mount a widget, connect it and print renders and events until Ctrl+C
    Watch {
        /// Custom element tag
        tag: String,

        /// Attribute as name=value
        #[arg(short = 'a', long = "attr", value_parser = parse_attribute)]
        attributes: Vec<(String, String)>,

        /// Theme name (defaults to the configured theme)
        #[arg(long)]
        theme: Option<String>,
    },

    /// Serve the demo page and WebSocket demo feed
    Serve {
        /// Bind address (overrides config)
        #[arg(long)]
        bind: Option<SocketAddr>,
    },

    /// List available themes
    Themes,

    /// Manage configuration
    Config {
        /// Show effective configuration
        #[arg(long)]
        show: bool,

        /// Reset config file to defaults
        #[arg(long)]
        reset: bool,

        /// Open config file in $EDITOR
        #[arg(long)]
        edit: bool,

        /// Update config with new defaults (preserves user values)
        #[arg(long)]
        update: bool,

        /// Show config file path
        #[arg(long)]
        path: bool,
    },
}

/// Parse `name=value`; a bare `name` is an empty (present) attribute
pub fn parse_attribute(raw: &str) -> Result<(String, String), String> {
    let (name, value) = raw.split_once('=').unwrap_or((raw, ""));
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("missing attribute name in {:?}", raw));
    }
    Ok((name.to_string(), value.to_string()))
}

fn as_pairs(attributes: &[(String, String)]) -> Vec<(&str, &str)> {
    attributes
        .iter()
        .map(|(n, v)| (n.as_str(), v.as_str()))
        .collect()
}

/// Handle commands that must work even when the config file is broken.
/// Returns true if a command was handled (exit after).
pub fn handle_config_command(cli: &Cli) -> Result<bool> {
    let Some(Commands::Config {
        show,
        reset,
        edit,
        update,
        path,
    }) = &cli.command
    else {
        return Ok(false);
    };

    if *path {
        handle_config_path()?;
    } else if *show {
        handle_config_show()?;
    } else if *reset {
        handle_config_reset()?;
    } else if *edit {
        handle_config_edit()?;
    } else if *update {
        handle_config_update()?;
    } else {
        // No flag provided, show help
        println!("Usage: iv-widgets config [--show|--reset|--edit|--update|--path]");
        println!();
        println!("Options:");
        println!("  --show    Display effective configuration");
        println!("  --reset   Reset config file to defaults");
        println!("  --edit    Open config file in $EDITOR");
        println!("  --update  Update config with new defaults (preserves user values)");
        println!("  --path    Show config file path");
    }
    Ok(true)
}

/// Run every other command with the loaded configuration
pub async fn run(cli: Cli, config: Config) -> Result<()> {
    match cli.command {
        Some(Commands::Render {
            tag,
            attributes,
            theme,
        }) => handle_render(&config, &tag, &attributes, theme.as_deref()),
        Some(Commands::Embed { tag, config: json }) => handle_embed(&tag, &json),
        Some(Commands::Watch {
            tag,
            attributes,
            theme,
        }) => handle_watch(&config, &tag, &attributes, theme.as_deref()).await,
        Some(Commands::Serve { bind }) => handle_serve(config, bind).await,
        Some(Commands::Themes) => {
            handle_themes(&config);
            Ok(())
        }
        Some(Commands::Config { .. }) => Ok(()), // Handled before config load
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    }
}

// ─── Widget commands ───

/// Server-rendered HTML for one widget
pub fn render_html(config: &Config, tag: &str, attributes: &[(String, String)], theme: Option<&str>) -> Result<String> {
    let theme = Theme::by_name(theme.unwrap_or(&config.theme));
    let mut page = Page::new(theme, config.realtime.to_runtime()).without_realtime();
    page.mount(tag, &as_pairs(attributes))?;
    Ok(page.to_html())
}

fn handle_render(config: &Config, tag: &str, attributes: &[(String, String)], theme: Option<&str>) -> Result<()> {
    println!("{}", render_html(config, tag, attributes, theme)?);
    Ok(())
}

fn handle_embed(tag: &str, json: &str) -> Result<()> {
    crate::widgets::define_all();
    let value: serde_json::Value =
        serde_json::from_str(json).context("Embed configuration is not valid JSON")?;
    let Some(object) = value.as_object() else {
        bail!("Embed configuration must be a JSON object");
    };
    println!("{}", widget::embed_code_for_tag(tag, object)?);
    Ok(())
}

async fn handle_watch(config: &Config, tag: &str, attributes: &[(String, String)], theme: Option<&str>) -> Result<()> {
    let theme = Theme::by_name(theme.unwrap_or(&config.theme));
    let mut page = Page::new(theme, config.realtime.to_runtime());
    let mut events = page.document().subscribe();

    let id = page.mount(tag, &as_pairs(attributes))?;
    let mut printed: HashMap<ElementId, u64> = HashMap::new();
    print_if_rendered(&page, id, &mut printed);

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            routed = page.next_channel_event() => {
                if let Some(id) = routed {
                    print_if_rendered(&page, id, &mut printed);
                }
            }
            Some(event) = events.recv() => {
                println!("{}", serde_json::to_string(&event)?);
            }
        }
    }

    tracing::info!("Stopping watch");
    Ok(())
}

fn print_if_rendered(page: &Page, id: ElementId, printed: &mut HashMap<ElementId, u64>) {
    let Some(element) = page.element(id) else {
        return;
    };
    let passes = element.render_passes();
    if printed.get(&id) != Some(&passes) {
        printed.insert(id, passes);
        println!(
            "── render #{} ({}) ──\n{}",
            passes,
            element.connection_state(),
            element.outer_html()
        );
    }
}

async fn handle_serve(config: Config, bind: Option<SocketAddr>) -> Result<()> {
    let (feed, _) = broadcast::channel(256);
    let state = ServerState {
        feed: feed.clone(),
        theme: config.theme.clone(),
        realtime: config.realtime.to_runtime(),
        bind_addr: bind.unwrap_or(config.bind_addr),
    };

    let (demo_shutdown_tx, demo_shutdown_rx) = oneshot::channel();
    let demo_handle = tokio::spawn(crate::demo::run_demo(feed, demo_shutdown_rx, config.demo));

    let (server_shutdown_tx, server_shutdown_rx) = oneshot::channel();
    let mut server_handle = tokio::spawn(server::start_server(state, server_shutdown_rx));

    // The server may exit on its own, e.g. the port was taken
    let exited = until_interrupted(&mut server_handle, tokio::signal::ctrl_c()).await?;

    tracing::info!("Shutting down...");

    // If the sends fail, the tasks have already stopped (which is fine)
    let _ = demo_shutdown_tx.send(());
    let _ = server_shutdown_tx.send(());
    let _ = demo_handle.await;

    let joined = match exited {
        Some(joined) => joined,
        None => server_handle.await,
    };
    match joined {
        Ok(result) => result?,
        Err(e) => bail!("Server task failed: {}", e),
    }

    tracing::info!("Shutdown complete");
    Ok(())
}

/// Wait for `interrupt` or for `task` to exit, whichever comes first.
///
/// Returns the task's result when it exited first; the handle must not be
/// awaited again in that case.
async fn until_interrupted<T, F>(task: &mut JoinHandle<T>, interrupt: F) -> Result<Option<Result<T, JoinError>>>
where
    F: Future<Output = std::io::Result<()>>,
{
    tokio::select! {
        result = interrupt => {
            result.context("Failed to listen for Ctrl+C")?;
            Ok(None)
        }
        joined = task => Ok(Some(joined)),
    }
}

fn handle_themes(config: &Config) {
    for name in Theme::list_available() {
        let marker = if name == config.theme { "*" } else { " " };
        println!("{} {}", marker, name);
    }
}

// ─── Config commands ───

fn config_path() -> Result<std::path::PathBuf> {
    Config::config_path().context("Could not determine config path")
}

fn handle_config_path() -> Result<()> {
    println!("{}", config_path()?.display());
    Ok(())
}

fn handle_config_show() -> Result<()> {
    let config = Config::from_env()?;

    println!("# Effective configuration (env > file > defaults)");
    println!();
    print!("{}", config.to_toml());

    // Show source info
    println!();
    let path = config_path()?;
    if path.exists() {
        println!("# Source: {}", path.display());
    } else {
        println!("# Source: defaults (no config file)");
    }
    Ok(())
}

fn handle_config_reset() -> Result<()> {
    let path = config_path()?;

    // Confirm if file exists
    if path.exists() {
        eprint!(
            "Config file exists at {}. Overwrite? [y/N] ",
            path.display()
        );
        std::io::stderr().flush()?;

        let mut input = String::new();
        std::io::stdin().read_line(&mut input)?;

        if !input.trim().eq_ignore_ascii_case("y") {
            println!("Aborted.");
            return Ok(());
        }
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Error creating directory {}", parent.display()))?;
    }

    // Config's single source of truth
    std::fs::write(&path, Config::default().to_toml())
        .with_context(|| format!("Error writing config {}", path.display()))?;

    println!("Config reset to defaults: {}", path.display());
    Ok(())
}

fn handle_config_edit() -> Result<()> {
    let path = config_path()?;

    if !path.exists() {
        Config::ensure_config_exists();
        println!("Created new config file: {}", path.display());
    }

    let editor = std::env::var("EDITOR")
        .or_else(|_| std::env::var("VISUAL"))
        .unwrap_or_else(|_| {
            if cfg!(windows) {
                "notepad".to_string()
            } else {
                "nano".to_string()
            }
        });

    println!("Opening {} with {}", path.display(), editor);

    let status = Command::new(&editor).arg(&path).status().with_context(|| {
        format!(
            "Failed to launch editor '{}'. Set $EDITOR to your preferred editor",
            editor
        )
    })?;
    if !status.success() {
        bail!("Editor exited with status: {}", status);
    }
    Ok(())
}

fn handle_config_update() -> Result<()> {
    let path = config_path()?;

    if !path.exists() {
        Config::ensure_config_exists();
        println!("Created new config file: {}", path.display());
        return Ok(());
    }

    // Regenerate from the effective config, preserving user values
    let updated = Config::from_env()?.to_toml();

    let backup_path = path.with_extension("toml.bak");
    match std::fs::copy(&path, &backup_path) {
        Ok(_) => println!("Backup created: {}", backup_path.display()),
        Err(e) => eprintln!("Warning: Could not create backup: {}", e),
    }

    std::fs::write(&path, updated)
        .with_context(|| format!("Error writing config {}", path.display()))?;

    println!("Config updated with latest structure: {}", path.display());
    println!("Your values have been preserved.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_attribute() {
        assert_eq!(
            parse_attribute("ws-url=ws://host/feed?a=b").unwrap(),
            ("ws-url".to_string(), "ws://host/feed?a=b".to_string())
        );
        assert_eq!(
            parse_attribute("verified").unwrap(),
            ("verified".to_string(), String::new())
        );
        assert!(parse_attribute("=value").is_err());
    }

    #[test]
    fn test_cli_parses_render() {
        let cli = Cli::try_parse_from([
            "iv-widgets",
            "render",
            "iv-capsule-card",
            "-a",
            "title=Hello",
            "--attr",
            "status=warning",
            "--theme",
            "IV Light",
        ])
        .unwrap();

        match cli.command {
            Some(Commands::Render {
                tag,
                attributes,
                theme,
            }) => {
                assert_eq!(tag, "iv-capsule-card");
                assert_eq!(attributes.len(), 2);
                assert_eq!(attributes[1], ("status".to_string(), "warning".to_string()));
                assert_eq!(theme.as_deref(), Some("IV Light"));
            }
            other => panic!("expected render, got {:?}", other),
        }
    }

    #[test]
    fn test_config_command_is_detected() {
        let cli = Cli::try_parse_from(["iv-widgets", "config", "--path"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Config { path: true, .. })));
        let cli = Cli::try_parse_from(["iv-widgets", "themes"]).unwrap();
        assert!(!handle_config_command(&cli).unwrap());
    }

    #[test]
    fn test_render_html_for_capsule() {
        let attributes = vec![
            ("capsule-id".to_string(), "c-42".to_string()),
            ("title".to_string(), "Hello".to_string()),
        ];
        let html = render_html(&Config::default(), "iv-capsule-card", &attributes, None).unwrap();
        assert!(html.starts_with("<iv-capsule-card"));
        assert!(html.contains("Hello"));
    }

    #[test]
    fn test_render_unknown_tag_fails() {
        let err = render_html(&Config::default(), "iv-missing", &[], None).unwrap_err();
        assert!(err.to_string().contains("iv-missing"));
    }

    #[test]
    fn test_render_rejects_markup_in_attribute_names() {
        let (name, value) = parse_attribute("x><script>alert(1)</script><y=1").unwrap();
        let err = render_html(&Config::default(), "iv-capsule-card", &[(name, value)], None)
            .unwrap_err();
        assert!(err.to_string().contains("invalid attribute name"));
    }

    #[tokio::test]
    async fn test_task_exiting_first_ends_the_wait() {
        let mut task = tokio::spawn(async { 7 });
        let exited = until_interrupted(&mut task, std::future::pending()).await.unwrap();
        assert_eq!(exited.unwrap().unwrap(), 7);
    }

    #[tokio::test]
    async fn test_interrupt_leaves_task_to_be_awaited() {
        let (tx, rx) = oneshot::channel::<()>();
        let mut task = tokio::spawn(async move {
            let _ = rx.await;
            "stopped"
        });
        let exited = until_interrupted(&mut task, async { Ok(()) }).await.unwrap();
        assert!(exited.is_none());

        tx.send(()).unwrap();
        assert_eq!(task.await.unwrap(), "stopped");
    }
}
