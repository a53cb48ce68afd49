//! Playback control actions.
//!
//! Each playback event maps to a shell command run through the user's shell,
//! `playerctl` by default, so any MPRIS-capable player is controllable.
//! Commands run synchronously on the dispatcher; a stuck player stalls
//! hotkey processing until it returns, which is accepted behavior.

use std::{env, process::Command, sync::Arc};

use tracing::info;

use chord_engine::{action, Action, ActionError};
use config::PlaybackEvent;

/// Builds and runs playback commands with the configured step sizes.
pub struct Player {
    /// Relative seek distance in milliseconds.
    seek_step: u32,
    /// Volume step in percent.
    volume_step: u8,
}

impl Player {
    /// Create a player with the configured seek and volume steps.
    pub fn new(seek_step: u32, volume_step: u8) -> Self {
        Self {
            seek_step,
            volume_step,
        }
    }

    /// The shell command for one playback event.
    fn command(&self, event: PlaybackEvent) -> String {
        let seek_secs = f64::from(self.seek_step) / 1000.0;
        let vol = f64::from(self.volume_step) / 100.0;
        match event {
            PlaybackEvent::Play => "playerctl play".to_string(),
            PlaybackEvent::Stop => "playerctl stop".to_string(),
            PlaybackEvent::Pause => "playerctl pause".to_string(),
            PlaybackEvent::PlayPause => "playerctl play-pause".to_string(),
            PlaybackEvent::SeekFwd => format!("playerctl position {}+", seek_secs),
            PlaybackEvent::SeekBack => format!("playerctl position {}-", seek_secs),
            PlaybackEvent::SkipNext => "playerctl next".to_string(),
            PlaybackEvent::SkipPrev => "playerctl previous".to_string(),
            PlaybackEvent::VolUp => format!("playerctl volume {}+", vol),
            PlaybackEvent::VolDown => format!("playerctl volume {}-", vol),
        }
    }

    /// Run the command for an event, mapping failure to an action error.
    fn run(&self, event: PlaybackEvent) -> Result<(), ActionError> {
        let command = self.command(event);
        info!(%event, %command, "running playback command");
        let shell = env::var("SHELL").unwrap_or_else(|_| "/bin/sh".to_string());
        let output = Command::new(&shell)
            .arg("-c")
            .arg(&command)
            .output()
            .map_err(|e| ActionError::new(format!("cannot run {}: {}", command, e)))?;
        if output.status.success() {
            Ok(())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Err(ActionError::new(format!(
                "{} failed ({}): {}",
                command,
                output.status,
                stderr.trim()
            )))
        }
    }

    /// Wrap one event as an engine action.
    pub fn action(self: &Arc<Self>, event: PlaybackEvent) -> Action {
        let player = Arc::clone(self);
        action(move || player.run(event))
    }
}
