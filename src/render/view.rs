use serde::Serialize;

use crate::interval::session::{SessionState, WorkoutPlan};
use crate::render::svg;

pub const IMAGE_SIZE: f64 = 250.0;

/// What the timer shows for a single frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Readout {
    pub image: String,
    pub countdown: String,
    pub phase: String,
    pub rounds: String,
    pub paused: bool,
    pub paused_label: Option<String>,
    pub total: String,
    pub progress: f64,
    pub high_intensity: bool,
    pub complete: bool,
}

/// Formats whole seconds as `MM:SS`.
pub fn clock_string(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

fn rounds_label(state: &SessionState, plan: &WorkoutPlan) -> String {
    if state.is_complete(plan) {
        "Workout complete!".to_string()
    } else {
        format!(
            "Round {} of {}",
            state.rounds_completed + 1,
            plan.total_rounds
        )
    }
}

pub fn compose(state: &SessionState, plan: &WorkoutPlan) -> Readout {
    let progress = state.progress_percent(plan);
    let high = state.intensity.is_high();
    let image = svg::render(progress, IMAGE_SIZE, IMAGE_SIZE, high);

    Readout {
        image: svg::data_uri(&image),
        countdown: clock_string(state.seconds_remaining(plan)),
        phase: state.intensity.label().to_string(),
        rounds: rounds_label(state, plan),
        paused: state.paused,
        paused_label: state.paused.then(|| "Paused - click to resume".to_string()),
        total: format!("Total Time: {}", clock_string(state.total_elapsed_seconds())),
        progress,
        high_intensity: high,
        complete: state.is_complete(plan),
    }
}

impl Readout {
    /// Single console line.
    pub fn status_line(&self) -> String {
        let mut line = format!(
            "{} {:>5.1}% | {} | {} | {}",
            self.countdown, self.progress, self.phase, self.rounds, self.total
        );
        if let Some(ref label) = self.paused_label {
            line.push_str(&format!(" | {}", label));
        }
        line
    }
}
