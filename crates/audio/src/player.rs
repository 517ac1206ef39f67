//! rodio playback for the alarm horn

use anyhow::{Context, Result};
use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink, Source};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::Duration;

/// Horn tone used when no sound file is available
const HORN_FREQUENCY: f32 = 440.0;

/// Alert sounds tried when no custom file is configured
const SYSTEM_ALERT_PATHS: &[&str] = &[
    // freedesktop sounds (Linux)
    "/usr/share/sounds/freedesktop/stereo/alarm-clock-elapsed.oga",
    "/usr/share/sounds/freedesktop/stereo/bell.oga",
    // Ubuntu/GNOME sounds
    "/usr/share/sounds/gnome/default/alerts/glass.ogg",
    // macOS
    "/System/Library/Sounds/Glass.aiff",
    // Windows
    "C:\\Windows\\Media\\Alarm01.wav",
];

/// First path in the list that exists on disk
pub(crate) fn first_existing<'a>(paths: &[&'a str]) -> Option<&'a str> {
    paths.iter().copied().find(|p| Path::new(p).exists())
}

/// Owns the output stream and one sink. Not `Send`; lives on the audio thread.
pub(crate) struct AudioPlayer {
    // Keep the stream alive - dropping it stops all audio
    _stream: OutputStream,
    _stream_handle: OutputStreamHandle,
    sink: Sink,
}

impl AudioPlayer {
    pub fn new() -> Result<Self> {
        let (stream, stream_handle) =
            OutputStream::try_default().context("Failed to open audio output stream")?;
        let sink = Sink::try_new(&stream_handle).context("Failed to create audio sink")?;

        Ok(Self {
            _stream: stream,
            _stream_handle: stream_handle,
            sink,
        })
    }

    /// Play a sound file, optionally looping until stopped
    pub fn play_file(&self, path: &str, looped: bool) -> Result<()> {
        let file =
            File::open(path).with_context(|| format!("Failed to open sound file: {}", path))?;
        let source = Decoder::new(BufReader::new(file))
            .with_context(|| format!("Failed to decode sound file: {}", path))?;

        if looped {
            self.sink.append(source.repeat_infinite());
        } else {
            self.sink.append(source);
        }
        self.sink.play();
        Ok(())
    }

    /// Play the system alert, falling back to a generated tone
    pub fn play_system_alert(&self, looped: bool) -> Result<()> {
        if let Some(path) = first_existing(SYSTEM_ALERT_PATHS) {
            if self.play_file(path, looped).is_ok() {
                return Ok(());
            }
        }
        self.play_tone(looped);
        Ok(())
    }

    fn play_tone(&self, looped: bool) {
        let tone = rodio::source::SineWave::new(HORN_FREQUENCY).amplify(0.3);
        if looped {
            self.sink.append(tone);
        } else {
            self.sink.append(tone.take_duration(Duration::from_millis(500)));
        }
        self.sink.play();
    }

    pub fn stop(&self) {
        self.sink.stop();
    }

    pub fn set_volume(&self, volume: f32) {
        self.sink.set_volume(volume.clamp(0.0, 1.0));
    }
}
