use std::io::Cursor;

use rodio::{Decoder, OutputStream, OutputStreamBuilder, Sink};

use crate::coordinator::AudioOutput;
use crate::error::Error;

/// Default-device output: one `OutputStream` and one `Sink` for the
/// lifetime of the coordinator. The stream handle must stay alive for the
/// sink to keep producing sound, hence the held field.
pub struct RodioOutput {
    _stream: OutputStream,
    sink: Sink,
}

impl RodioOutput {
    pub fn new() -> Result<Self, Error> {
        let stream = OutputStreamBuilder::open_default_stream()?;
        let sink = Sink::connect_new(stream.mixer());
        Ok(Self {
            _stream: stream,
            sink,
        })
    }
}

impl AudioOutput for RodioOutput {
    fn play(&mut self, bytes: &[u8]) -> Result<(), Error> {
        let source = Decoder::new(Cursor::new(bytes.to_vec()))?;
        self.sink.stop();
        self.sink.append(source);
        self.sink.play();
        Ok(())
    }

    fn stop(&mut self) {
        self.sink.stop();
    }

    fn is_idle(&self) -> bool {
        self.sink.empty()
    }
}
