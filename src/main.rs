//! Main entry point for the podbean-editor CLI application.

use clap::Parser;
use crossterm::{
    event::Event,
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use log::{debug, info, warn};
use podbean_editor::api::PodbeanClient;
use podbean_editor::auth;
use podbean_editor::config::Config;
use podbean_editor::session::{EditorSession, SaveOutcome};
use podbean_editor::tui::{Action, App, draw, poll_event};
use ratatui::prelude::*;
use std::env;
use std::io::{self, stdout};
use std::time::Duration;

/// Command-line arguments for the podbean-editor application.
#[derive(Parser, Debug)]
#[command(
    name = "podbean-editor",
    version,
    about = "A bulk editor for podcast episode metadata",
    long_about = "Fetch every episode of a Podbean podcast, edit metadata in a \
                  table, and push the changes back in one batch."
)]
struct Args {
    /// OAuth client id (overrides config and PODBEAN_CLIENT_ID)
    #[arg(long)]
    client_id: Option<String>,

    /// OAuth client secret (overrides config and PODBEAN_CLIENT_SECRET)
    #[arg(long)]
    client_secret: Option<String>,

    /// Exchange this authorization code instead of using client credentials
    #[arg(long)]
    auth_code: Option<String>,

    /// Redirect URI registered with the OAuth app (overrides config)
    #[arg(long)]
    redirect_uri: Option<String>,

    /// Print the browser authorization URL and exit
    #[arg(long)]
    print_auth_url: bool,

    /// Log verbosity level: 0=error, 1=warn, 2=info, 3=debug, 4=trace
    #[arg(short, long, default_value_t = 1)]
    log: u8,
}

/// Resolve a credential: CLI flag, then environment, then config file.
fn resolve_credential(cli: &Option<String>, env_name: &str, config_value: &str) -> String {
    if let Some(value) = cli {
        return value.clone();
    }
    if let Ok(value) = env::var(env_name) {
        if !value.is_empty() {
            return value;
        }
    }
    config_value.to_string()
}

/// Initialize the terminal for TUI rendering.
fn init_terminal() -> io::Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;
    execute!(stdout(), EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout());
    Terminal::new(backend)
}

/// Restore the terminal to its original state.
fn restore_terminal() -> io::Result<()> {
    disable_raw_mode()?;
    execute!(stdout(), LeaveAlternateScreen)?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Initialize logging
    let log_level = match args.log {
        0 => log::LevelFilter::Error,
        1 => log::LevelFilter::Warn,
        2 => log::LevelFilter::Info,
        3 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    env_logger::Builder::new()
        .filter_level(log_level)
        .format_timestamp(None)
        .format_target(false)
        .init();

    debug!("Log level set to {:?}", log_level);

    // Load config
    let config = Config::load().unwrap_or_else(|e| {
        warn!("Failed to load config: {}. Using defaults.", e);
        Config::new()
    });

    // Merge config with CLI args and environment
    let client_id = resolve_credential(&args.client_id, "PODBEAN_CLIENT_ID", &config.client_id);
    let client_secret = resolve_credential(
        &args.client_secret,
        "PODBEAN_CLIENT_SECRET",
        &config.client_secret,
    );
    let redirect_uri = args
        .redirect_uri
        .clone()
        .unwrap_or_else(|| config.redirect_uri.clone());

    if args.print_auth_url {
        if client_id.is_empty() {
            eprintln!("Error: a client id is required to build the authorization URL.");
            std::process::exit(1);
        }
        let url = auth::build_authorize_url(&config.api_base, &client_id, &redirect_uri)?;
        println!("{}", url);
        return Ok(());
    }

    if client_id.is_empty() || client_secret.is_empty() {
        eprintln!("Error: missing OAuth credentials.");
        match Config::create_default_if_missing() {
            Ok(path) => eprintln!(
                "       Set client_id and client_secret in {} or export\n       PODBEAN_CLIENT_ID and PODBEAN_CLIENT_SECRET.",
                path.display()
            ),
            Err(_) => eprintln!(
                "       Export PODBEAN_CLIENT_ID and PODBEAN_CLIENT_SECRET or pass --client-id/--client-secret."
            ),
        }
        std::process::exit(1);
    }

    // Obtain a bearer token; auth failures block the whole session
    let token = if let Some(code) = &args.auth_code {
        auth::exchange_auth_code(&config.api_base, &client_id, &client_secret, code, &redirect_uri)
            .await
    } else {
        auth::fetch_client_token(&config.api_base, &client_id, &client_secret).await
    };

    let token = match token {
        Ok(token) => token,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    info!("Obtained access token");

    let client = match PodbeanClient::with_base_url(&config.api_base) {
        Ok(client) => client,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    // Initialize terminal
    let mut terminal = init_terminal()?;

    // Create app state
    let mut app = App::new(EditorSession::new());

    // Main event loop
    let result = run_app(&mut terminal, &mut app, &client, &token.access_token).await;

    // Restore terminal
    restore_terminal()?;

    result
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    client: &PodbeanClient,
    token: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    // Initial fetch
    fetch_episodes(terminal, app, client, token).await?;

    loop {
        // Draw UI
        terminal.draw(|f| draw(f, app))?;

        // Poll for events
        if let Some(event) = poll_event(Duration::from_millis(100))? {
            if let Event::Key(key) = event {
                let action = app.handle_input(key);

                match action {
                    Action::Quit => break,
                    Action::Refresh => {
                        fetch_episodes(terminal, app, client, token).await?;
                    }
                    Action::SaveAll => {
                        run_batch_save(terminal, app, client, token).await?;
                    }
                    Action::None => {}
                }
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

/// Fetch the full episode list, replacing the collection wholesale.
///
/// A page failure aborts the fetch and surfaces as a blocking message; the
/// previous collection and pending edits stay untouched so the user can
/// re-trigger manually.
async fn fetch_episodes(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    client: &PodbeanClient,
    token: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    app.set_loading("Fetching episodes...");
    terminal.draw(|f| draw(f, app))?;

    match app.session.refresh(client, token).await {
        Ok(()) => {
            info!("Loaded {} episodes", app.session.len());
            app.show_table();
        }
        Err(e) => {
            app.set_error(&e.to_string());
            app.show_table();
        }
    }

    Ok(())
}

/// Save every dirty episode sequentially, redrawing between requests so the
/// "N of Total" counter stays live, then reconcile with the server.
async fn run_batch_save(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    client: &PodbeanClient,
    token: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    // Snapshot the dirty ids up front; edits made during the run wait for
    // the next batch.
    let ids = app.session.snapshot_dirty_ids();
    if ids.is_empty() {
        return Ok(());
    }

    let total = ids.len();
    app.start_save_modal(total);

    let mut success = 0;
    for (idx, id) in ids.iter().enumerate() {
        let label = app
            .session
            .episode(id)
            .map(|e| e.title.clone())
            .unwrap_or_else(|| id.clone());

        app.update_save_progress(idx + 1, &format!("Saving \"{}\"...", label));
        terminal.draw(|f| draw(f, app))?;

        match app.session.save_episode(client, token, id).await {
            Ok(()) => {
                success += 1;
                app.add_save_log(&format!("+ {}", label));
            }
            Err(e) => {
                // Contained per episode: log it, count it, keep going
                app.add_save_log(&format!("! {}: {}", label, e));
            }
        }
        terminal.draw(|f| draw(f, app))?;
    }

    app.close_save_modal();
    info!("Batch save finished: {} of {} succeeded", success, total);

    // Reconcile with the server; edits that failed to save are discarded
    app.set_loading("Refreshing episodes...");
    terminal.draw(|f| draw(f, app))?;

    let outcome = SaveOutcome {
        success_count: success,
        total_count: total,
    };
    match app.session.refresh_after_save(client, token).await {
        Ok(()) => {
            app.show_table();
            app.set_status(&outcome.to_display());
        }
        Err(e) => {
            app.show_table();
            app.set_error(&e.to_string());
        }
    }

    Ok(())
}
