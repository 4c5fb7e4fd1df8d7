//! # Feed state machine
//!
//! Owns the retained transcription sequence and reconciles two sources that
//! resolve in arbitrary order: the historical `recent` fetch and the live
//! event stream. The safe merge is append-only live events plus
//! replace-on-resolve history — never a merge by index — so live arrivals
//! that land before the history resolves are buffered and re-applied on top
//! of the fetched base.
//!
//! Ordering is chronological, newest-last. Live events append at the tail;
//! older pages attach at the head. The retention cap bounds the live window
//! and is suspended while paged-in history is on screen (otherwise a cap
//! trim would immediately evict what the user just asked for); jumping back
//! to the bottom re-trims and re-arms it.

use crate::types::{Transcription, TranscriptionResponse};
use chrono::{DateTime, Utc};

/// Live-variant retention cap.
pub const DEFAULT_RETAIN_MAX: usize = 50;

/// Distance from the bottom edge below which an arrival auto-scrolls
/// instead of counting as unread.
pub const DEFAULT_NEAR_BOTTOM_THRESHOLD: u32 = 200;

/// Whether the live stream has completed its opening handshake. There is no
/// reconnect modeling; `Establishing -> Live` is the only transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    Establishing,
    Live,
}

/// Lifecycle of the historical `recent` fetch. A failed fetch is an explicit
/// state with a user-visible retry, not a loading indicator stuck forever.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    Loading,
    Ready,
    Failed,
}

/// What the renderer should do about a live arrival.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiveArrival {
    /// The viewport was near the bottom: stay pinned, unread stays zero.
    AutoScroll,
    /// The viewport was scrolled away: the item arrived unseen.
    Unread,
}

/// How a scroll-to-bottom should be presented. Initial post-load positioning
/// is immediate to avoid a visible animation on first paint; the user-invoked
/// jump is smooth.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollMode {
    Immediate,
    Smooth,
}

pub struct FeedView {
    items: Vec<Transcription>,
    /// Live arrivals seen before the historical fetch resolved.
    pending_live: Vec<Transcription>,
    connection: ConnectionStatus,
    load: LoadState,
    unread_count: usize,
    distance_from_bottom: u32,
    near_bottom_threshold: u32,
    retain_max: Option<usize>,
    cap_suspended: bool,
    older_exhausted: bool,
}

impl FeedView {
    pub fn new() -> Self {
        Self::with_config(Some(DEFAULT_RETAIN_MAX), DEFAULT_NEAR_BOTTOM_THRESHOLD)
    }

    /// `retain_max: None` leaves the feed unbounded (paginating variant).
    pub fn with_config(retain_max: Option<usize>, near_bottom_threshold: u32) -> Self {
        Self {
            items: Vec::new(),
            pending_live: Vec::new(),
            connection: ConnectionStatus::Establishing,
            load: LoadState::Loading,
            unread_count: 0,
            distance_from_bottom: 0,
            near_bottom_threshold,
            retain_max,
            cap_suspended: false,
            older_exhausted: false,
        }
    }

    pub fn items(&self) -> &[Transcription] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn connection(&self) -> ConnectionStatus {
        self.connection
    }

    pub fn load(&self) -> LoadState {
        self.load
    }

    pub fn unread_count(&self) -> usize {
        self.unread_count
    }

    pub fn near_bottom(&self) -> bool {
        self.distance_from_bottom < self.near_bottom_threshold
    }

    /// Derived jump-to-bottom affordance.
    pub fn show_scroll_button(&self) -> bool {
        self.unread_count > 0 && !self.near_bottom()
    }

    pub fn older_exhausted(&self) -> bool {
        self.older_exhausted
    }

    /// The stream completed its opening handshake.
    pub fn on_stream_open(&mut self) {
        self.connection = ConnectionStatus::Live;
    }

    /// One transcription arrived on the live stream. Appended newest-last;
    /// valid before or after the historical fetch resolves.
    pub fn on_live_event(&mut self, transcription: Transcription) -> LiveArrival {
        if self.load != LoadState::Ready {
            self.pending_live.push(transcription.clone());
        }
        self.items.push(transcription);
        self.enforce_cap();

        if self.near_bottom() {
            // Auto-scroll keeps the viewport pinned to the new bottom.
            self.distance_from_bottom = 0;
            LiveArrival::AutoScroll
        } else {
            self.unread_count += 1;
            LiveArrival::Unread
        }
    }

    /// The historical fetch resolved: the page becomes the base and any live
    /// events that arrived while it was pending are re-applied on top, so
    /// either resolution order yields the same final sequence.
    pub fn on_history(&mut self, page: TranscriptionResponse) -> ScrollMode {
        self.items = page.transcriptions;
        self.items.append(&mut self.pending_live);
        self.load = LoadState::Ready;
        self.enforce_cap();
        self.distance_from_bottom = 0;
        ScrollMode::Immediate
    }

    pub fn on_history_error(&mut self) {
        self.load = LoadState::Failed;
    }

    pub fn retry(&mut self) {
        if self.load == LoadState::Failed {
            self.load = LoadState::Loading;
        }
    }

    /// Pagination cursor: timestamp of the currently-oldest retained item.
    /// `None` when the feed is empty, in which case loading older pages is a
    /// no-op.
    pub fn older_cursor(&self) -> Option<DateTime<Utc>> {
        self.items.first().map(|t| t.timestamp)
    }

    /// A strictly-older page arrived; attach it at the head. An empty page
    /// means backward pagination is exhausted.
    pub fn on_older_page(&mut self, page: TranscriptionResponse) {
        if page.transcriptions.is_empty() {
            self.older_exhausted = true;
            return;
        }
        let mut merged = page.transcriptions;
        merged.append(&mut self.items);
        self.items = merged;
        self.cap_suspended = true;
    }

    /// Manual scroll handler: recompute near-bottom status and clear the
    /// unread bookkeeping once the user returns near the bottom.
    pub fn set_distance_from_bottom(&mut self, distance: u32) {
        self.distance_from_bottom = distance;
        if self.near_bottom() {
            self.unread_count = 0;
        }
    }

    /// User-invoked jump to the newest item. Resets unread state and re-trims
    /// the feed back to the live window.
    pub fn jump_to_bottom(&mut self) -> ScrollMode {
        self.distance_from_bottom = 0;
        self.unread_count = 0;
        self.cap_suspended = false;
        let before = self.items.len();
        self.enforce_cap();
        if self.items.len() < before {
            // The re-trim evicted paged-in history, so items strictly older
            // than the new head exist again and paging back must re-arm.
            self.older_exhausted = false;
        }
        ScrollMode::Smooth
    }

    fn enforce_cap(&mut self) {
        let Some(max) = self.retain_max else {
            return;
        };
        // Only the newest `max` buffered arrivals can survive the history
        // merge, so the pending buffer honors the cap too.
        if self.pending_live.len() > max {
            let overflow = self.pending_live.len() - max;
            self.pending_live.drain(..overflow);
        }
        if self.cap_suspended {
            return;
        }
        let len = self.items.len();
        if len > max {
            self.items.drain(..len - max);
        }
    }
}

impl Default for FeedView {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::parse_timestamp;

    fn item(t: u32, text: &str) -> Transcription {
        Transcription {
            timestamp: parse_timestamp(&format!("2025-03-01T12:00:{t:02}")).unwrap(),
            text: text.to_string(),
            translation: None,
            audio_hash: format!("hash-{text}"),
        }
    }

    fn page(items: &[Transcription]) -> TranscriptionResponse {
        TranscriptionResponse {
            transcriptions: items.to_vec(),
        }
    }

    fn texts(view: &FeedView) -> Vec<&str> {
        view.items().iter().map(|t| t.text.as_str()).collect()
    }

    #[test]
    fn stream_open_goes_live_once() {
        let mut view = FeedView::new();
        assert_eq!(view.connection(), ConnectionStatus::Establishing);
        view.on_stream_open();
        assert_eq!(view.connection(), ConnectionStatus::Live);
    }

    #[test]
    fn live_events_append_after_history() {
        let mut view = FeedView::new();
        view.on_history(page(&[item(1, "a"), item(2, "b")]));
        view.on_live_event(item(3, "c"));
        assert_eq!(texts(&view), ["a", "b", "c"]);
    }

    #[test]
    fn history_resolving_late_keeps_already_arrived_events() {
        let mut view = FeedView::new();
        view.on_live_event(item(3, "c"));
        view.on_live_event(item(4, "d"));
        view.on_history(page(&[item(1, "a"), item(2, "b")]));
        assert_eq!(texts(&view), ["a", "b", "c", "d"]);

        // Later events append normally, not via the pending buffer.
        view.on_live_event(item(5, "e"));
        assert_eq!(texts(&view), ["a", "b", "c", "d", "e"]);
    }

    #[test]
    fn retention_cap_drops_oldest_first() {
        let mut view = FeedView::with_config(Some(3), DEFAULT_NEAR_BOTTOM_THRESHOLD);
        view.on_history(page(&[item(1, "a"), item(2, "b"), item(3, "c")]));
        view.on_live_event(item(4, "d"));
        view.on_live_event(item(5, "e"));
        assert_eq!(texts(&view), ["c", "d", "e"]);
    }

    #[test]
    fn near_bottom_arrival_autoscrolls_and_stays_unread_free() {
        let mut view = FeedView::new();
        view.on_history(page(&[item(1, "a")]));
        assert!(view.near_bottom());

        assert_eq!(view.on_live_event(item(2, "b")), LiveArrival::AutoScroll);
        assert_eq!(view.unread_count(), 0);
        assert!(!view.show_scroll_button());
    }

    #[test]
    fn far_arrival_increments_unread_and_shows_affordance() {
        let mut view = FeedView::new();
        view.on_history(page(&[item(1, "a")]));
        view.set_distance_from_bottom(500);

        assert_eq!(view.on_live_event(item(2, "b")), LiveArrival::Unread);
        assert_eq!(view.on_live_event(item(3, "c")), LiveArrival::Unread);
        assert_eq!(view.unread_count(), 2);
        assert!(view.show_scroll_button());
    }

    #[test]
    fn scrolling_back_near_bottom_clears_unread() {
        let mut view = FeedView::new();
        view.on_history(page(&[item(1, "a")]));
        view.set_distance_from_bottom(500);
        view.on_live_event(item(2, "b"));
        assert_eq!(view.unread_count(), 1);

        view.set_distance_from_bottom(100);
        assert_eq!(view.unread_count(), 0);
        assert!(!view.show_scroll_button());
    }

    #[test]
    fn jump_to_bottom_resets_unread_and_is_smooth() {
        let mut view = FeedView::new();
        view.on_history(page(&[item(1, "a")]));
        view.set_distance_from_bottom(500);
        view.on_live_event(item(2, "b"));

        assert_eq!(view.jump_to_bottom(), ScrollMode::Smooth);
        assert_eq!(view.unread_count(), 0);
        assert!(!view.show_scroll_button());
        assert!(view.near_bottom());
    }

    #[test]
    fn initial_history_positioning_is_immediate() {
        let mut view = FeedView::new();
        assert_eq!(view.on_history(page(&[item(1, "a")])), ScrollMode::Immediate);
    }

    #[test]
    fn older_cursor_is_oldest_timestamp_or_none() {
        let mut view = FeedView::new();
        assert_eq!(view.older_cursor(), None);

        view.on_history(page(&[item(10, "a"), item(20, "b"), item(30, "c")]));
        assert_eq!(view.older_cursor(), Some(item(10, "a").timestamp));
    }

    #[test]
    fn older_page_prepends_without_touching_the_tail() {
        let mut view = FeedView::new();
        view.on_history(page(&[item(10, "a"), item(20, "b")]));
        view.on_older_page(page(&[item(5, "x"), item(8, "y")]));
        assert_eq!(texts(&view), ["x", "y", "a", "b"]);
        assert!(!view.older_exhausted());
    }

    #[test]
    fn empty_older_page_marks_exhausted() {
        let mut view = FeedView::new();
        view.on_history(page(&[item(10, "a")]));
        view.on_older_page(page(&[]));
        assert!(view.older_exhausted());
        assert_eq!(texts(&view), ["a"]);
    }

    #[test]
    fn cap_is_suspended_while_paged_back_and_rearmed_on_jump() {
        let mut view = FeedView::with_config(Some(2), DEFAULT_NEAR_BOTTOM_THRESHOLD);
        view.on_history(page(&[item(10, "a"), item(20, "b")]));
        view.on_older_page(page(&[item(1, "x"), item(2, "y")]));
        view.set_distance_from_bottom(500);

        // Live arrival must not evict the paged-in history.
        view.on_live_event(item(30, "c"));
        assert_eq!(texts(&view), ["x", "y", "a", "b", "c"]);

        view.jump_to_bottom();
        assert_eq!(texts(&view), ["b", "c"]);
    }

    #[test]
    fn jump_rearms_pagination_after_evicting_paged_history() {
        let mut view = FeedView::with_config(Some(2), DEFAULT_NEAR_BOTTOM_THRESHOLD);
        view.on_history(page(&[item(10, "a"), item(20, "b")]));
        view.on_older_page(page(&[item(1, "x"), item(2, "y")]));
        view.on_older_page(page(&[]));
        assert!(view.older_exhausted());

        // Re-trimming drops x/y, so strictly-older items exist again below
        // the retained window and paging back must work.
        view.jump_to_bottom();
        assert_eq!(texts(&view), ["a", "b"]);
        assert!(!view.older_exhausted());
        assert_eq!(view.older_cursor(), Some(item(10, "a").timestamp));
    }

    #[test]
    fn jump_keeps_exhaustion_when_nothing_was_evicted() {
        let mut view = FeedView::with_config(Some(5), DEFAULT_NEAR_BOTTOM_THRESHOLD);
        view.on_history(page(&[item(10, "a")]));
        view.on_older_page(page(&[]));
        assert!(view.older_exhausted());

        // Nothing to trim: the head is still the true start of history.
        view.jump_to_bottom();
        assert!(view.older_exhausted());
    }

    #[test]
    fn pending_buffer_honors_the_cap_before_history_resolves() {
        let mut view = FeedView::with_config(Some(3), DEFAULT_NEAR_BOTTOM_THRESHOLD);
        view.on_history_error();
        for t in 1..=50 {
            view.on_live_event(item(t, &format!("e{t}")));
        }
        assert_eq!(view.items().len(), 3);
        assert_eq!(view.pending_live.len(), 3);

        // A late-resolving fetch merges only the surviving newest events.
        view.on_history(page(&[]));
        assert_eq!(texts(&view), ["e48", "e49", "e50"]);
    }

    #[test]
    fn history_failure_is_explicit_and_retryable() {
        let mut view = FeedView::new();
        view.on_live_event(item(3, "c"));
        view.on_history_error();
        assert_eq!(view.load(), LoadState::Failed);

        view.retry();
        assert_eq!(view.load(), LoadState::Loading);

        // The retried fetch still merges under the buffered live arrival.
        view.on_history(page(&[item(1, "a"), item(2, "b")]));
        assert_eq!(view.load(), LoadState::Ready);
        assert_eq!(texts(&view), ["a", "b", "c"]);
    }

    #[test]
    fn recent_then_live_scenario() {
        let mut view = FeedView::new();
        view.on_history(page(&[item(1, "a"), item(2, "b")]));
        view.on_live_event(item(3, "c"));

        let items = view.items();
        assert_eq!(items.len(), 3);
        assert_eq!(items.last().unwrap().text, "c");
    }
}
