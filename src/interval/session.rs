use super::phase::{FRAME_RATE_HZ, Intensity, PhaseDurations};

/// Everything that changes while a workout runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionState {
    pub frame_count: u64,
    pub total_frames: u64,
    pub intensity: Intensity,
    pub paused: bool,
    pub rounds_completed: u32,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            frame_count: 0,
            total_frames: 0,
            intensity: Intensity::Low,
            paused: true,
            rounds_completed: 0,
        }
    }
}

/// Fixed parameters of one workout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkoutPlan {
    pub durations: PhaseDurations,
    pub total_rounds: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Paused, nothing moved.
    Idle,
    Advanced,
    PhaseChanged {
        ended: Intensity,
        started: Intensity,
        round_completed: bool,
    },
}

impl SessionState {
    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
    }

    pub fn frames_for_current_phase(&self, plan: &WorkoutPlan) -> u64 {
        plan.durations.frames_for_phase(self.intensity.is_high())
    }

    pub fn progress_percent(&self, plan: &WorkoutPlan) -> f64 {
        let frames = self.frames_for_current_phase(plan);
        if frames == 0 {
            return 100.0;
        }
        (self.frame_count as f64 / frames as f64 * 100.0).min(100.0)
    }

    /// Whole seconds left in the current phase, counting down from its duration.
    pub fn seconds_remaining(&self, plan: &WorkoutPlan) -> u64 {
        plan.durations
            .seconds_for(self.intensity)
            .saturating_sub(self.frame_count / FRAME_RATE_HZ)
    }

    pub fn total_elapsed_seconds(&self) -> u64 {
        self.total_frames / FRAME_RATE_HZ
    }

    pub fn is_complete(&self, plan: &WorkoutPlan) -> bool {
        self.rounds_completed >= plan.total_rounds
    }
}

/// Moves the session forward by one frame.
///
/// A running session gains a frame; once the phase budget is spent the phase
/// flips and the frame counter starts over. Leaving a high intensity phase
/// completes a round, saturating at `plan.total_rounds`.
pub fn advance(state: &mut SessionState, plan: &WorkoutPlan) -> TickOutcome {
    if state.paused {
        return TickOutcome::Idle;
    }

    state.frame_count += 1;
    state.total_frames += 1;

    if state.frame_count < state.frames_for_current_phase(plan) {
        return TickOutcome::Advanced;
    }

    let ended = state.intensity;
    let started = ended.flipped();
    state.intensity = started;
    state.frame_count = 0;

    let round_completed = match ended {
        Intensity::High => complete_round(state, plan),
        Intensity::Low => false,
    };

    TickOutcome::PhaseChanged {
        ended,
        started,
        round_completed,
    }
}

fn complete_round(state: &mut SessionState, plan: &WorkoutPlan) -> bool {
    if state.rounds_completed >= plan.total_rounds {
        return false;
    }
    state.rounds_completed += 1;
    true
}
