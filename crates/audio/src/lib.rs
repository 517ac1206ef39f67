//! rcs-panel-audio: audible alarm cue on a dedicated audio thread.
//!
//! rodio's output stream is not `Send`, so the player lives on its own thread
//! and the engine talks to it through a command channel.

mod player;

use anyhow::{anyhow, Context, Result};
use log::{debug, warn};
use player::AudioPlayer;
use rcs_panel_core::AudibleCue;
use rcs_panel_types::AudibleCueConfig;
use std::sync::mpsc::{channel, Sender};
use std::thread::JoinHandle;

/// Commands for the audio thread
enum CueCommand {
    Play(AudibleCueConfig),
    Stop,
    Shutdown,
}

/// `AudibleCue` that plays through rodio
pub struct AudioThreadCue {
    sender: Option<Sender<CueCommand>>,
    handle: Option<JoinHandle<()>>,
}

impl AudioThreadCue {
    /// Start the audio thread. Fails if no output device can be opened.
    pub fn spawn() -> Result<Self> {
        let (tx, rx) = channel::<CueCommand>();
        let (ready_tx, ready_rx) = channel::<Result<(), String>>();

        let handle = std::thread::Builder::new()
            .name("rcs-panel-audio".to_string())
            .spawn(move || {
                // Create AudioPlayer in this thread (it's not Send)
                let player = match AudioPlayer::new() {
                    Ok(p) => {
                        let _ = ready_tx.send(Ok(()));
                        p
                    }
                    Err(e) => {
                        let _ = ready_tx.send(Err(format!("{:#}", e)));
                        return;
                    }
                };

                while let Ok(command) = rx.recv() {
                    match command {
                        CueCommand::Play(config) => {
                            player.stop();
                            player.set_volume(config.volume);
                            let result = match config.custom_sound_path.as_deref() {
                                Some(path) => player.play_file(path, config.loop_sound),
                                None => player.play_system_alert(config.loop_sound),
                            };
                            if let Err(e) = result {
                                warn!("Failed to play alarm sound: {:?}", e);
                            }
                        }
                        CueCommand::Stop => player.stop(),
                        CueCommand::Shutdown => {
                            debug!("Audio thread received shutdown signal");
                            break;
                        }
                    }
                }
                debug!("Audio thread exiting");
            })
            .context("Failed to spawn audio thread")?;

        match ready_rx.recv() {
            Ok(Ok(())) => Ok(Self {
                sender: Some(tx),
                handle: Some(handle),
            }),
            Ok(Err(message)) => {
                let _ = handle.join();
                Err(anyhow!("Audio output unavailable: {}", message))
            }
            Err(_) => {
                let _ = handle.join();
                Err(anyhow!("Audio thread exited during startup"))
            }
        }
    }

    fn send(&self, command: CueCommand) {
        if let Some(sender) = &self.sender {
            if sender.send(command).is_err() {
                warn!("Audio thread is gone; alarm cue dropped");
            }
        }
    }
}

impl AudibleCue for AudioThreadCue {
    fn start(&mut self, config: &AudibleCueConfig) {
        self.send(CueCommand::Play(config.clone()));
    }

    fn stop(&mut self) {
        self.send(CueCommand::Stop);
    }
}

impl Drop for AudioThreadCue {
    fn drop(&mut self) {
        self.send(CueCommand::Shutdown);
        // Drop sender to close channel
        self.sender = None;
        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.join() {
                warn!("Audio thread panicked: {:?}", e);
            }
        }
    }
}
