mod action;
mod app;
mod cache;
mod client;
mod config;
mod detail;
mod error;
mod logging;
mod pagination;
mod query;
mod reply;
mod sync;
#[cfg(test)]
mod testing;
mod tui;
mod types;
mod ui;
mod validate;

use std::panic;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::sync::mpsc;
use tracing_subscriber::util::SubscriberInitExt;

use crate::action::Action;
use crate::app::App;
use crate::cache::RememberedLocations;
use crate::client::{ApiClient, Credential};
use crate::config::Config;
use crate::error::ConsoleError;
use crate::query::Location;
use crate::tui::{Event, EventHandler};

/// Terminal console for a wsite server
#[derive(Parser, Debug)]
#[command(name = "wsc", version, about)]
struct Args {
    /// Server root, e.g. http://localhost:4567
    #[arg(long)]
    base_url: Option<String>,

    /// Login token; defaults to the variable named by `token_env`
    #[arg(long)]
    token: Option<String>,

    /// Location to open, e.g. /control/listUsers?limit=10&page=2
    #[arg(long)]
    location: Option<String>,

    /// Config file to use instead of the platform default
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::subscriber(
        logging::default_filter(),
        logging::open_log(cache::log_path().as_deref()),
    )
    .init();

    let args = Args::parse();

    let mut config = Config::load(args.config.as_deref());
    if let Some(base_url) = args.base_url {
        config.server.base_url = base_url;
    }

    let start = match args.location.as_deref() {
        Some(href) => Some(
            Location::parse(href)
                .ok_or_else(|| ConsoleError::Config(format!("unknown location: {}", href)))?,
        ),
        None => None,
    };

    let credential = Credential::new(config.resolve_token(args.token));
    if !credential.is_present() {
        return Err(ConsoleError::Auth(format!(
            "no login token; pass --token or set {}",
            config.server.token_env
        ))
        .into());
    }
    let client = ApiClient::new(&config.server.base_url, credential);
    tracing::debug!(base_url = client.base_url(), "starting console");

    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = tui::restore();
        original_hook(panic_info);
    }));

    let result = run(client, config, start).await;

    tui::restore()?;

    result
}

async fn run(
    client: ApiClient,
    config: Config,
    start: Option<Location>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut terminal = tui::init()?;

    let (action_tx, mut action_rx) = mpsc::unbounded_channel::<Action>();

    let remembered = config
        .lists
        .remember_locations
        .then(RememberedLocations::load);
    let mut app = App::new(Arc::new(client), &config, start, remembered, action_tx.clone());

    let render_rate = Duration::from_millis(16);
    let mut events = EventHandler::new(render_rate);

    loop {
        tokio::select! {
            Some(event) = events.next() => {
                if event.is_quit() {
                    break;
                }

                match event {
                    Event::Render | Event::Resize => {
                        terminal.draw(|frame| ui::render(frame, &app))?;
                    }
                    _ => {
                        let action = app.handle_event(event);
                        if !matches!(action, Action::None) {
                            action_tx.send(action)?;
                        }
                    }
                }
            }
            Some(action) = action_rx.recv() => {
                app.update(action);
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}
