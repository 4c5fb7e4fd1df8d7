mod app;
mod event;
mod ui;

use anyhow::Context;
use clap::Parser;
use radiolog_api_client::{ApiClient, BASE_URL_ENV, DEFAULT_BASE_URL};
use radiolog_audio_player::Player;
use radiolog_feed::{DEFAULT_NEAR_BOTTOM_THRESHOLD, DEFAULT_RETAIN_MAX, FeedView};

use crate::{
    app::App,
    event::{AppEvent, EventHandler},
};

#[derive(Parser)]
#[command(name = "radiolog", about = "Live radio-transcription feed TUI")]
struct Cli {
    #[arg(long, env = BASE_URL_ENV, default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Newest items kept in the live window; 0 keeps everything.
    #[arg(long, default_value_t = DEFAULT_RETAIN_MAX)]
    retain: usize,

    /// Scroll distance (in px-equivalent units) still counted as "at the
    /// bottom" for auto-scroll purposes.
    #[arg(long, default_value_t = DEFAULT_NEAR_BOTTOM_THRESHOLD)]
    near_bottom: u32,

    /// Hide translations even when the feed carries them.
    #[arg(long)]
    no_translation: bool,
}

fn setup_panic_hook() {
    let original = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        ratatui::restore();
        original(info);
    }));
}

fn setup_tracing() {
    // The terminal is in raw mode; only log when explicitly asked to.
    if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_writer(std::io::stderr)
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    setup_tracing();

    let client = ApiClient::new(&cli.base_url)
        .with_context(|| format!("invalid base url: {}", cli.base_url))?;

    let retain = (cli.retain > 0).then_some(cli.retain);
    let feed = FeedView::with_config(retain, cli.near_bottom);

    setup_panic_hook();
    let mut terminal = ratatui::init();

    let (mut events, tx) = EventHandler::new();

    let (player_tx, mut player_rx) = tokio::sync::mpsc::unbounded_channel();
    let player = match Player::spawn(player_tx) {
        Ok(handle) => handle,
        Err(error) => {
            ratatui::restore();
            return Err(error).context("failed to open audio output");
        }
    };

    let forward_tx = tx.clone();
    tokio::spawn(async move {
        while let Some(event) = player_rx.recv().await {
            if forward_tx.send(AppEvent::Player(event)).is_err() {
                break;
            }
        }
    });

    let mut app = App::new(feed, client, player, tx, !cli.no_translation);
    app.start();

    loop {
        terminal.draw(|frame| ui::draw(frame, &app)).ok();

        match events.next().await {
            Some(AppEvent::Key(key)) => app.handle_key(key),
            Some(AppEvent::Feed(event)) => app.handle_feed_event(event),
            Some(AppEvent::Player(event)) => app.handle_player_event(event),
            Some(AppEvent::Resize) | Some(AppEvent::Tick) => {}
            None => break,
        }

        if app.should_quit {
            break;
        }
    }

    ratatui::restore();
    Ok(())
}
