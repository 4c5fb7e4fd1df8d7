use crate::error::Error;

/// The shared audio-output resource. Implementations own exactly one sink;
/// `play` replaces whatever is queued.
pub trait AudioOutput {
    fn play(&mut self, bytes: &[u8]) -> Result<(), Error>;
    /// Pause and reset to the start, dropping anything queued.
    fn stop(&mut self);
    /// True once the queued clip has drained (natural end of playback).
    fn is_idle(&self) -> bool;
}

/// Tracks the at-most-one currently playing clip, keyed by audio hash.
pub struct Coordinator<O> {
    output: O,
    current: Option<String>,
}

impl<O: AudioOutput> Coordinator<O> {
    pub fn new(output: O) -> Self {
        Self {
            output,
            current: None,
        }
    }

    /// Starts `hash` playing. A different clip already playing is stopped
    /// first. On failure the currently-playing marker is left unchanged and
    /// the error is surfaced to the caller.
    pub fn play(&mut self, hash: &str, bytes: &[u8]) -> Result<(), Error> {
        if self
            .current
            .as_deref()
            .is_some_and(|current| current != hash)
        {
            self.output.stop();
        }
        self.output.play(bytes)?;
        self.current = Some(hash.to_string());
        Ok(())
    }

    /// No-op unless `hash` is the currently playing clip.
    pub fn stop(&mut self, hash: &str) {
        if self.current.as_deref() == Some(hash) {
            self.output.stop();
            self.current = None;
        }
    }

    pub fn is_playing(&self, hash: &str) -> bool {
        self.current.as_deref() == Some(hash)
    }

    pub fn currently_playing(&self) -> Option<&str> {
        self.current.as_deref()
    }

    /// Polled by the owner: when the output has drained on its own, clears
    /// the marker and returns the hash that just finished.
    pub fn poll_finished(&mut self) -> Option<String> {
        if self.current.is_some() && self.output.is_idle() {
            return self.current.take();
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct FakeOutput {
        playing: bool,
        plays: usize,
        stops: usize,
        fail_next: bool,
    }

    impl AudioOutput for FakeOutput {
        fn play(&mut self, _bytes: &[u8]) -> Result<(), Error> {
            if self.fail_next {
                return Err(Error::Playback("device gone".into()));
            }
            self.playing = true;
            self.plays += 1;
            Ok(())
        }

        fn stop(&mut self) {
            self.playing = false;
            self.stops += 1;
        }

        fn is_idle(&self) -> bool {
            !self.playing
        }
    }

    fn coordinator() -> Coordinator<FakeOutput> {
        Coordinator::new(FakeOutput::default())
    }

    #[test]
    fn at_most_one_clip_plays() {
        let mut c = coordinator();
        c.play("a", b"x").unwrap();
        assert!(c.is_playing("a"));

        c.play("b", b"y").unwrap();
        assert!(!c.is_playing("a"));
        assert!(c.is_playing("b"));
        // The previous clip was stopped before switching.
        assert_eq!(c.output.stops, 1);
    }

    #[test]
    fn stop_on_non_current_clip_is_a_noop() {
        let mut c = coordinator();
        c.play("a", b"x").unwrap();
        c.stop("b");
        assert!(c.is_playing("a"));
        assert_eq!(c.output.stops, 0);
    }

    #[test]
    fn stop_clears_current() {
        let mut c = coordinator();
        c.play("a", b"x").unwrap();
        c.stop("a");
        assert!(!c.is_playing("a"));
        assert_eq!(c.currently_playing(), None);
    }

    #[test]
    fn failed_play_leaves_state_unchanged() {
        let mut c = coordinator();
        c.play("a", b"x").unwrap();
        c.output.fail_next = true;

        assert!(c.play("b", b"y").is_err());
        // `a` remains the marked clip, exactly as before the attempt.
        assert_eq!(c.currently_playing(), Some("a"));
    }

    #[test]
    fn replaying_the_current_clip_restarts_without_stop() {
        let mut c = coordinator();
        c.play("a", b"x").unwrap();
        c.play("a", b"x").unwrap();
        assert!(c.is_playing("a"));
        assert_eq!(c.output.plays, 2);
        assert_eq!(c.output.stops, 0);
    }

    #[test]
    fn natural_end_of_clip_clears_current() {
        let mut c = coordinator();
        c.play("a", b"x").unwrap();
        assert_eq!(c.poll_finished(), None);

        c.output.playing = false; // clip drained
        assert_eq!(c.poll_finished(), Some("a".to_string()));
        assert_eq!(c.currently_playing(), None);
    }
}
