use chrono::{DateTime, Local};
use std::collections::HashMap;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::interval::phase::{FRAME_RATE_HZ, Intensity};
use crate::render::view::clock_string;

/// Human readable activity log plus per-phase time totals.
#[derive(Debug)]
pub struct SessionLog {
    frames_spent: HashMap<Intensity, u64>,
    session_start: DateTime<Local>,
    log_file: Option<PathBuf>,
}

impl SessionLog {
    pub fn new(log_file: Option<PathBuf>) -> Self {
        let now = Local::now();
        if let Some(ref path) = log_file {
            if let Err(e) = Self::log_to_file(
                path,
                &format!(
                    "=== Session started at {} ===",
                    now.format("%Y-%m-%d %H:%M:%S")
                ),
            ) {
                tracing::warn!("Cannot write activity log {}: {}", path.display(), e);
            }
        }
        Self {
            frames_spent: HashMap::new(),
            session_start: now,
            log_file,
        }
    }

    fn log_to_file(path: &Path, message: &str) -> std::io::Result<()> {
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        writeln!(file, "{}", message)?;
        Ok(())
    }

    pub fn log(&self, message: &str) {
        if let Some(ref path) = self.log_file {
            let _ = Self::log_to_file(path, message);
        }
    }

    /// Logs a timestamped line and returns it for display.
    pub fn event(&self, message: &str) -> String {
        let line = format!("[{}] {}", Local::now().format("%H:%M:%S"), message);
        self.log(&line);
        line
    }

    pub fn record_frame(&mut self, intensity: Intensity) {
        *self.frames_spent.entry(intensity).or_insert(0) += 1;
    }

    pub fn seconds_in(&self, intensity: Intensity) -> u64 {
        self.frames_spent.get(&intensity).copied().unwrap_or(0) / FRAME_RATE_HZ
    }

    pub fn wall_clock_seconds(&self) -> i64 {
        (Local::now() - self.session_start).num_seconds()
    }

    pub fn stats(&self, rounds_completed: u32, total_rounds: u32) -> String {
        let mut out = String::from("\n--- Workout Statistics ---\n");
        out.push_str(&format!(
            "Session duration: {} minutes\n",
            self.wall_clock_seconds() / 60
        ));
        out.push_str(&format!(
            "Rounds completed: {}/{}\n",
            rounds_completed, total_rounds
        ));
        for intensity in [Intensity::High, Intensity::Low] {
            out.push_str(&format!(
                "  {} {} - {}\n",
                intensity.emoji(),
                intensity.label(),
                clock_string(self.seconds_in(intensity))
            ));
        }
        out.push_str("--------------------------\n");
        out
    }
}
