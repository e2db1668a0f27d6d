//! rodio-backed audio output.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use focuswell_core::{AudioError, AudioSink, ChimeOutput, ChimeTone};
use rodio::buffer::SamplesBuffer;
use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink, Source};
use tracing::debug;

/// The default output device. Must outlive every sink created from it.
pub struct AudioOutput {
    _stream: OutputStream,
    handle: OutputStreamHandle,
}

impl AudioOutput {
    pub fn open() -> Result<Self, AudioError> {
        let (stream, handle) =
            OutputStream::try_default().map_err(|e| AudioError::NoDevice(e.to_string()))?;
        Ok(Self {
            _stream: stream,
            handle,
        })
    }

    pub fn track_sink(&self, path: PathBuf) -> RodioSink {
        RodioSink {
            handle: self.handle.clone(),
            path,
            sink: None,
            volume: 0.0,
        }
    }

    pub fn chime(&self) -> RodioChime {
        RodioChime {
            handle: self.handle.clone(),
        }
    }
}

/// Looping file playback. The decoder is opened lazily on first play;
/// rewinding drops it so the next play starts from the top of the file.
pub struct RodioSink {
    handle: OutputStreamHandle,
    path: PathBuf,
    sink: Option<Sink>,
    volume: f32,
}

impl RodioSink {
    fn load(&self) -> Result<Sink, AudioError> {
        let load_failed = |path: &Path, message: String| AudioError::LoadFailed {
            path: path.to_path_buf(),
            message,
        };
        let file = File::open(&self.path).map_err(|e| load_failed(&self.path, e.to_string()))?;
        let source =
            Decoder::new(BufReader::new(file)).map_err(|e| load_failed(&self.path, e.to_string()))?;
        let sink =
            Sink::try_new(&self.handle).map_err(|e| AudioError::PlaybackRejected(e.to_string()))?;
        sink.set_volume(self.volume);
        sink.append(source.repeat_infinite());
        debug!(path = %self.path.display(), "loaded ambient track");
        Ok(sink)
    }
}

impl AudioSink for RodioSink {
    fn play(&mut self) -> Result<(), AudioError> {
        if let Some(sink) = &self.sink {
            sink.set_volume(self.volume);
            sink.play();
            return Ok(());
        }
        self.sink = Some(self.load()?);
        Ok(())
    }

    fn pause(&mut self) {
        if let Some(sink) = &self.sink {
            sink.pause();
        }
    }

    fn rewind(&mut self) {
        if let Some(sink) = self.sink.take() {
            sink.stop();
        }
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume;
        if let Some(sink) = &self.sink {
            sink.set_volume(volume);
        }
    }

    fn volume(&self) -> f32 {
        self.volume
    }
}

pub struct RodioChime {
    handle: OutputStreamHandle,
}

impl ChimeOutput for RodioChime {
    fn play(&mut self, tone: &ChimeTone) -> Result<(), AudioError> {
        let samples = tone.samples(ChimeTone::SAMPLE_RATE);
        let buffer = SamplesBuffer::new(1, ChimeTone::SAMPLE_RATE, samples);
        self.handle
            .play_raw(buffer)
            .map_err(|e| AudioError::PlaybackRejected(e.to_string()))
    }
}
