use serde::{Deserialize, Serialize};

use crate::render::view::Readout;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CueAction {
    Play,
    Pause,
    Rewind,
}

/// Messages pushed to browser clients.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    Readout(Readout),
    Cue {
        clip: String,
        src: String,
        action: CueAction,
    },
    Alert {
        message: String,
    },
    Error {
        message: String,
    },
    Pong,
}

/// Messages a browser client sends. `toggle` is a click on the timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    Toggle,
    Ping,
}
