use std::path::{Path, PathBuf};

use thiserror::Error;

pub const ALERT_FILE: &str = "alert.mp3";
pub const BELL_FILE: &str = "bell.mp3";

#[derive(Debug, Error)]
pub enum AudioError {
    #[error("audio asset missing: {}", .0.display())]
    MissingAsset(PathBuf),
    #[error("Audio not loaded")]
    NotLoaded,
}

/// One sound clip on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClipAsset {
    pub name: &'static str,
    pub file_name: &'static str,
    pub path: PathBuf,
}

impl ClipAsset {
    fn locate(
        assets_dir: &Path,
        name: &'static str,
        file_name: &'static str,
    ) -> Result<Self, AudioError> {
        let path = assets_dir.join(file_name);
        if !path.is_file() {
            return Err(AudioError::MissingAsset(path));
        }
        Ok(Self {
            name,
            file_name,
            path,
        })
    }

    /// Path a browser client fetches the clip from.
    pub fn url_path(&self) -> String {
        format!("/{}", self.file_name)
    }
}

/// A controllable playback of one clip.
pub trait Playback: Send {
    fn play(&mut self);
    fn pause(&mut self);
    fn rewind(&mut self);
}

/// The high intensity `alert` clip and the low intensity `bell` clip.
pub struct ClipPair {
    pub alert: Box<dyn Playback>,
    pub bell: Box<dyn Playback>,
}

impl ClipPair {
    /// Finds both assets in `assets_dir` and opens a handle for each.
    pub fn load<F>(assets_dir: &Path, mut open: F) -> Result<Self, AudioError>
    where
        F: FnMut(ClipAsset) -> Box<dyn Playback>,
    {
        let alert = ClipAsset::locate(assets_dir, "alert", ALERT_FILE)?;
        let bell = ClipAsset::locate(assets_dir, "bell", BELL_FILE)?;
        Ok(Self {
            alert: open(alert),
            bell: open(bell),
        })
    }
}

/// Plays a cue whenever its trigger turns on.
pub struct AudioAlert {
    clips: Option<ClipPair>,
    last_trigger: bool,
}

impl AudioAlert {
    pub fn new(clips: Option<ClipPair>) -> Self {
        Self {
            clips,
            last_trigger: false,
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.clips.is_some()
    }

    /// Feeds the current trigger value.
    ///
    /// On a rising edge both clips are stopped and rewound, then the alert
    /// clip plays for high intensity and the bell for low intensity. Returns
    /// whether a clip started.
    pub fn update(&mut self, trigger: bool, is_high_intensity: bool) -> Result<bool, AudioError> {
        let rising = trigger && !self.last_trigger;
        self.last_trigger = trigger;
        if !rising {
            return Ok(false);
        }

        let clips = self.clips.as_mut().ok_or(AudioError::NotLoaded)?;
        tracing::debug!(high = is_high_intensity, "Playing alert");

        clips.alert.pause();
        clips.bell.pause();
        clips.alert.rewind();
        clips.bell.rewind();
        if is_high_intensity {
            clips.alert.play();
        } else {
            clips.bell.play();
        }
        Ok(true)
    }
}
