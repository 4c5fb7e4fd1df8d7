use crossterm::event::{Event, KeyEvent, KeyEventKind};
use radiolog_audio_player::PlayerEvent;
use radiolog_feed::{Transcription, TranscriptionResponse};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};

/// How often labels like "4 minutes ago" are refreshed.
const TIME_TICK: std::time::Duration = std::time::Duration::from_secs(5);

#[derive(Debug)]
pub enum AppEvent {
    Key(KeyEvent),
    Resize,
    /// Periodic refresh so relative timestamps stay current.
    Tick,
    Feed(FeedEvent),
    Player(PlayerEvent),
}

#[derive(Debug)]
pub enum FeedEvent {
    /// The event stream completed its opening handshake.
    StreamOpened,
    Live(Transcription),
    History(Result<TranscriptionResponse, String>),
    OlderPage(Result<TranscriptionResponse, String>),
    StreamLost(String),
}

/// Multiplexes terminal input, the refresh tick, and events pushed by the
/// network/playback tasks onto one channel.
pub struct EventHandler {
    rx: UnboundedReceiver<AppEvent>,
}

impl EventHandler {
    pub fn new() -> (Self, UnboundedSender<AppEvent>) {
        let (tx, rx) = unbounded_channel();

        let input_tx = tx.clone();
        std::thread::Builder::new()
            .name("term-input".into())
            .spawn(move || read_terminal_events(input_tx))
            .expect("failed to spawn terminal input thread");

        let tick_tx = tx.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(TIME_TICK);
            loop {
                interval.tick().await;
                if tick_tx.send(AppEvent::Tick).is_err() {
                    break;
                }
            }
        });

        (Self { rx }, tx)
    }

    pub async fn next(&mut self) -> Option<AppEvent> {
        self.rx.recv().await
    }
}

fn read_terminal_events(tx: UnboundedSender<AppEvent>) {
    loop {
        match crossterm::event::read() {
            Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                if tx.send(AppEvent::Key(key)).is_err() {
                    break;
                }
            }
            Ok(Event::Resize(..)) => {
                if tx.send(AppEvent::Resize).is_err() {
                    break;
                }
            }
            Ok(_) => {}
            Err(_) => break,
        }
    }
}
