//! Device action wire contract.
//!
//! Defines the payload records pushed to the remote device controller.
//! The `action` tag and field names are the contract the device-side
//! decoder expects; changing them breaks deployed controllers.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
/// Enumerates supported `PowerState` values.
pub enum PowerState {
    On,
    Off,
}

impl PowerState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::On => "ON",
            Self::Off => "OFF",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
/// Enumerates supported `PlaybackAction` values.
pub enum PlaybackAction {
    Play,
    Pause,
    Stop,
}

impl PlaybackAction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Play => "Play",
            Self::Pause => "Pause",
            Self::Stop => "Stop",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "action", rename_all = "snake_case")]
/// Action payload pushed to the device channel, tagged by `action`.
pub enum DeviceAction {
    TogglePower { state: PowerState },
    VolumeStep { volume_steps: i64 },
    PlaybackController { playback_action: PlaybackAction },
}

impl DeviceAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TogglePower { .. } => "toggle_power",
            Self::VolumeStep { .. } => "volume_step",
            Self::PlaybackController { .. } => "playback_controller",
        }
    }
}
