use std::io::Write;

use super::alert::{ClipAsset, Playback};
use crate::notify;
use crate::ws::protocol::{CueAction, ServerMessage};
use crate::ws::websocket_server::Outbound;

/// Console playback: rings the terminal bell and posts a desktop
/// notification carrying the clip as its sound.
pub struct DesktopClip {
    asset: ClipAsset,
    message: String,
    playing: bool,
}

impl DesktopClip {
    pub fn new(asset: ClipAsset, message: impl Into<String>) -> Self {
        Self {
            asset,
            message: message.into(),
            playing: false,
        }
    }

    fn sound_name(&self) -> &'static str {
        match self.asset.name {
            "alert" => "alarm-clock-elapsed",
            _ => "bell",
        }
    }
}

impl Playback for DesktopClip {
    fn play(&mut self) {
        self.playing = true;
        tracing::debug!(path = %self.asset.path.display(), "Playing clip");
        print!("\x07");
        let _ = std::io::stdout().flush();
        if let Err(e) = notify::send_notification(&self.message, Some(self.sound_name())) {
            tracing::warn!(clip = self.asset.name, "Failed to send notification: {}", e);
        }
    }

    fn pause(&mut self) {
        self.playing = false;
    }

    fn rewind(&mut self) {
        tracing::trace!(clip = self.asset.name, was_playing = self.playing, "rewind");
    }
}

/// Browser playback: forwards every handle operation to connected clients,
/// which own the actual `<audio>` element for the clip.
pub struct BrowserClip {
    asset: ClipAsset,
    outbound: Outbound,
}

impl BrowserClip {
    pub fn new(asset: ClipAsset, outbound: Outbound) -> Self {
        Self { asset, outbound }
    }

    fn send(&self, action: CueAction) {
        let message = ServerMessage::Cue {
            clip: self.asset.name.to_string(),
            src: self.asset.url_path(),
            action,
        };
        if !self.outbound.publish_event(message) {
            tracing::debug!(clip = self.asset.name, ?action, "No browser connected for cue");
        }
    }
}

impl Playback for BrowserClip {
    fn play(&mut self) {
        self.send(CueAction::Play);
    }

    fn pause(&mut self) {
        self.send(CueAction::Pause);
    }

    fn rewind(&mut self) {
        self.send(CueAction::Rewind);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ws::websocket_server::create_outbound_channel;
    use std::path::PathBuf;

    fn bell_asset() -> ClipAsset {
        ClipAsset {
            name: "bell",
            file_name: "bell.mp3",
            path: PathBuf::from("assets/bell.mp3"),
        }
    }

    #[tokio::test]
    async fn test_browser_clip_forwards_actions() {
        let outbound = create_outbound_channel();
        let (_readouts, mut rx) = outbound.subscribe();
        let mut clip = BrowserClip::new(bell_asset(), outbound);

        clip.pause();
        clip.rewind();
        clip.play();

        let actions: Vec<CueAction> = (0..3)
            .map(|_| match rx.try_recv().unwrap() {
                ServerMessage::Cue { clip, src, action } => {
                    assert_eq!(clip, "bell");
                    assert_eq!(src, "/bell.mp3");
                    action
                }
                other => panic!("unexpected message: {:?}", other),
            })
            .collect();
        assert_eq!(actions, vec![CueAction::Pause, CueAction::Rewind, CueAction::Play]);
    }

    #[test]
    fn test_browser_clip_without_listeners_is_silent() {
        let outbound = create_outbound_channel();
        let mut clip = BrowserClip::new(bell_asset(), outbound.clone());
        clip.play();
        assert!(!outbound.publish_event(ServerMessage::Pong));
    }
}
