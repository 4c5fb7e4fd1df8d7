use crossterm::event::{KeyCode, KeyEvent};
use futures_util::StreamExt;
use radiolog_api_client::ApiClient;
use radiolog_audio_player::{PlayerEvent, PlayerHandle};
use radiolog_feed::{FeedView, LiveArrival, LoadState, Transcription};
use tokio::sync::mpsc::UnboundedSender;

use crate::event::{AppEvent, FeedEvent};

/// One terminal row expressed in the feed's px-equivalent distance units,
/// so the near-bottom threshold keeps its meaning in a character grid.
pub const ROW_UNITS: u32 = 20;

const PAGE_STEP: usize = 10;

pub struct App {
    pub feed: FeedView,
    pub show_translation: bool,
    /// Cursor counted from the newest (bottom) item; 0 means pinned to the
    /// live tail. Counting from the bottom keeps the cursor on the same
    /// item when older pages are prepended.
    pub cursor_from_bottom: usize,
    pub playing: Option<String>,
    /// Clip hash whose bytes are being fetched for playback.
    pub pending_clip: Option<String>,
    pub older_in_flight: bool,
    pub last_error: Option<String>,
    pub should_quit: bool,
    client: ApiClient,
    player: PlayerHandle,
    tx: UnboundedSender<AppEvent>,
}

impl App {
    pub fn new(
        feed: FeedView,
        client: ApiClient,
        player: PlayerHandle,
        tx: UnboundedSender<AppEvent>,
        show_translation: bool,
    ) -> Self {
        Self {
            feed,
            show_translation,
            cursor_from_bottom: 0,
            playing: None,
            pending_clip: None,
            older_in_flight: false,
            last_error: None,
            should_quit: false,
            client,
            player,
            tx,
        }
    }

    /// Kick off the initial fetch and the live subscription. The
    /// subscription is opened immediately — events may well arrive before
    /// the historical fetch resolves, and the feed merges either order.
    pub fn start(&self) {
        self.spawn_history_fetch();

        let client = self.client.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            match client.subscribe().await {
                Ok(stream) => {
                    let _ = tx.send(AppEvent::Feed(FeedEvent::StreamOpened));
                    let mut stream = std::pin::pin!(stream);
                    while let Some(item) = stream.next().await {
                        let event = match item {
                            Ok(t) => FeedEvent::Live(t),
                            Err(error) => {
                                let _ = tx
                                    .send(AppEvent::Feed(FeedEvent::StreamLost(error.to_string())));
                                return;
                            }
                        };
                        if tx.send(AppEvent::Feed(event)).is_err() {
                            return;
                        }
                    }
                    let _ = tx.send(AppEvent::Feed(FeedEvent::StreamLost(
                        "event stream ended".into(),
                    )));
                }
                Err(error) => {
                    let _ = tx.send(AppEvent::Feed(FeedEvent::StreamLost(error.to_string())));
                }
            }
        });
    }

    pub fn handle_feed_event(&mut self, event: FeedEvent) {
        match event {
            FeedEvent::StreamOpened => self.feed.on_stream_open(),
            FeedEvent::Live(transcription) => {
                self.sync_scroll_distance();
                match self.feed.on_live_event(transcription) {
                    LiveArrival::AutoScroll => self.cursor_from_bottom = 0,
                    // The tail grew underneath us; keep the cursor on the
                    // same item.
                    LiveArrival::Unread => self.cursor_from_bottom += 1,
                }
            }
            FeedEvent::History(Ok(page)) => {
                self.feed.on_history(page);
                self.cursor_from_bottom = 0;
            }
            FeedEvent::History(Err(error)) => {
                self.feed.on_history_error();
                self.last_error = Some(error);
            }
            FeedEvent::OlderPage(result) => {
                self.older_in_flight = false;
                match result {
                    Ok(page) => self.feed.on_older_page(page),
                    Err(error) => self.last_error = Some(error),
                }
            }
            FeedEvent::StreamLost(error) => self.last_error = Some(error),
        }
    }

    pub fn handle_player_event(&mut self, event: PlayerEvent) {
        match event {
            PlayerEvent::Started { hash } => {
                self.pending_clip = None;
                self.playing = Some(hash);
            }
            PlayerEvent::Stopped { hash } => {
                if self.playing.as_deref() == Some(hash.as_str()) {
                    self.playing = None;
                }
            }
            PlayerEvent::Failed { hash, error } => {
                if self.pending_clip.as_deref() == Some(hash.as_str()) {
                    self.pending_clip = None;
                }
                self.last_error = Some(error);
            }
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Up | KeyCode::Char('k') => self.move_cursor_up(1),
            KeyCode::Down | KeyCode::Char('j') => self.move_cursor_down(1),
            KeyCode::PageUp => self.move_cursor_up(PAGE_STEP),
            KeyCode::PageDown => self.move_cursor_down(PAGE_STEP),
            KeyCode::End | KeyCode::Char('G') => self.jump_to_bottom(),
            KeyCode::Enter | KeyCode::Char('p') => self.toggle_playback(),
            KeyCode::Char('r') => self.retry_history(),
            _ => {}
        }
    }

    pub fn base_url(&self) -> &str {
        self.client.base_url()
    }

    pub fn selected_item(&self) -> Option<&Transcription> {
        let items = self.feed.items();
        let cursor = self.cursor_from_bottom.min(items.len().saturating_sub(1));
        items.len().checked_sub(1 + cursor).map(|i| &items[i])
    }

    fn move_cursor_up(&mut self, step: usize) {
        let len = self.feed.items().len();
        if len == 0 {
            return;
        }
        self.cursor_from_bottom = (self.cursor_from_bottom + step).min(len - 1);
        self.sync_scroll_distance();

        // Top of the retained list acts as the load-more sentinel.
        if self.cursor_from_bottom == len - 1 {
            self.maybe_load_older();
        }
    }

    fn move_cursor_down(&mut self, step: usize) {
        self.cursor_from_bottom = self.cursor_from_bottom.saturating_sub(step);
        self.sync_scroll_distance();
    }

    fn jump_to_bottom(&mut self) {
        self.cursor_from_bottom = 0;
        self.feed.jump_to_bottom();
    }

    fn retry_history(&mut self) {
        if self.feed.load() == LoadState::Failed {
            self.feed.retry();
            self.last_error = None;
            self.spawn_history_fetch();
        }
    }

    /// Toggle semantics: activating the already-playing clip stops it.
    fn toggle_playback(&mut self) {
        let Some(item) = self.selected_item() else {
            return;
        };
        let hash = item.audio_hash.clone();

        if self.playing.as_deref() == Some(hash.as_str()) {
            self.player.stop(hash);
            return;
        }
        if self.pending_clip.is_some() {
            return;
        }

        self.pending_clip = Some(hash.clone());
        let client = self.client.clone();
        let player = self.player.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            match client.fetch_audio(&hash).await {
                Ok(bytes) => player.play(hash, bytes),
                Err(error) => {
                    let _ = tx.send(AppEvent::Player(PlayerEvent::Failed {
                        hash,
                        error: error.to_string(),
                    }));
                }
            }
        });
    }

    fn maybe_load_older(&mut self) {
        if self.older_in_flight || self.feed.older_exhausted() {
            return;
        }
        let Some(cursor) = self.feed.older_cursor() else {
            return;
        };

        self.older_in_flight = true;
        let client = self.client.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = client.fetch_before(cursor).await.map_err(|e| e.to_string());
            let _ = tx.send(AppEvent::Feed(FeedEvent::OlderPage(result)));
        });
    }

    fn spawn_history_fetch(&self) {
        let client = self.client.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = client.fetch_recent().await.map_err(|e| e.to_string());
            let _ = tx.send(AppEvent::Feed(FeedEvent::History(result)));
        });
    }

    fn sync_scroll_distance(&mut self) {
        self.feed
            .set_distance_from_bottom(self.cursor_from_bottom as u32 * ROW_UNITS);
    }
}
