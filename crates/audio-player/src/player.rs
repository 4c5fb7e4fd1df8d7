use std::sync::mpsc;
use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;

use crate::coordinator::{AudioOutput, Coordinator};
use crate::error::Error;
use crate::output::RodioOutput;

const IDLE_POLL: Duration = Duration::from_millis(100);

enum Command {
    Play { hash: String, bytes: Vec<u8> },
    Stop { hash: String },
}

/// What the playback thread reports back to the UI event loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerEvent {
    Started { hash: String },
    /// Stopped explicitly or because the clip reached its end.
    Stopped { hash: String },
    Failed { hash: String, error: String },
}

/// Channel-based handle to the playback thread. Cloneable; dropping the
/// last handle shuts the thread down.
#[derive(Clone)]
pub struct PlayerHandle {
    tx: mpsc::Sender<Command>,
}

impl PlayerHandle {
    pub fn play(&self, hash: impl Into<String>, bytes: Vec<u8>) {
        let _ = self.tx.send(Command::Play {
            hash: hash.into(),
            bytes,
        });
    }

    pub fn stop(&self, hash: impl Into<String>) {
        let _ = self.tx.send(Command::Stop { hash: hash.into() });
    }
}

/// Owns the playback thread. Audio objects are created on that thread (the
/// output stream is not `Send`) and never leave it; the rest of the app
/// talks to it through [`PlayerHandle`] and [`PlayerEvent`].
pub struct Player;

impl Player {
    /// Spawns the playback thread on the default output device.
    pub fn spawn(events: UnboundedSender<PlayerEvent>) -> Result<PlayerHandle, Error> {
        Self::spawn_with(RodioOutput::new, events)
    }

    /// Spawns with an output built by `make_output` on the playback thread;
    /// the factory keeps non-`Send` outputs constructible while letting
    /// tests inject fakes.
    pub fn spawn_with<O, F>(
        make_output: F,
        events: UnboundedSender<PlayerEvent>,
    ) -> Result<PlayerHandle, Error>
    where
        O: AudioOutput,
        F: FnOnce() -> Result<O, Error> + Send + 'static,
    {
        let (tx, rx) = mpsc::channel();
        let (ready_tx, ready_rx) = mpsc::channel();

        std::thread::Builder::new()
            .name("audio-player".into())
            .spawn(move || {
                let output = match make_output() {
                    Ok(output) => {
                        let _ = ready_tx.send(Ok(()));
                        output
                    }
                    Err(error) => {
                        let _ = ready_tx.send(Err(error));
                        return;
                    }
                };
                run(Coordinator::new(output), rx, events);
            })
            .map_err(|e| Error::Playback(format!("failed to spawn playback thread: {e}")))?;

        ready_rx
            .recv()
            .map_err(|_| Error::Playback("playback thread exited during startup".into()))??;
        Ok(PlayerHandle { tx })
    }
}

fn run<O: AudioOutput>(
    mut coordinator: Coordinator<O>,
    rx: mpsc::Receiver<Command>,
    events: UnboundedSender<PlayerEvent>,
) {
    loop {
        match rx.recv_timeout(IDLE_POLL) {
            Ok(Command::Play { hash, bytes }) => match coordinator.play(&hash, &bytes) {
                Ok(()) => {
                    let _ = events.send(PlayerEvent::Started { hash });
                }
                Err(error) => {
                    tracing::error!(%error, %hash, "playback start failed");
                    let _ = events.send(PlayerEvent::Failed {
                        hash,
                        error: error.to_string(),
                    });
                }
            },
            Ok(Command::Stop { hash }) => {
                let was_playing = coordinator.is_playing(&hash);
                coordinator.stop(&hash);
                if was_playing {
                    let _ = events.send(PlayerEvent::Stopped { hash });
                }
            }
            Err(mpsc::RecvTimeoutError::Timeout) => {
                if let Some(hash) = coordinator.poll_finished() {
                    let _ = events.send(PlayerEvent::Stopped { hash });
                }
            }
            Err(mpsc::RecvTimeoutError::Disconnected) => break,
        }
    }
}
