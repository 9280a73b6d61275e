pub const FRAME_RATE_HZ: u64 = 30; // Ticks per second
pub const HIGH_INTENSITY_SECONDS: u64 = 60; // Default high intensity time
pub const LOW_INTENSITY_SECONDS: u64 = 3 * 60; // Default low intensity time
pub const DEV_PHASE_SECONDS: u64 = 3; // Both phases in the development profile
pub const MAX_PHASE_SECONDS: u64 = 24 * 60 * 60; // Longest phase accepted on the command line
pub const TOTAL_ROUNDS: u32 = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Intensity {
    High,
    Low,
}

impl Intensity {
    pub fn from_high(is_high: bool) -> Self {
        if is_high {
            Intensity::High
        } else {
            Intensity::Low
        }
    }

    pub fn is_high(self) -> bool {
        self == Intensity::High
    }

    pub fn flipped(self) -> Self {
        match self {
            Intensity::High => Intensity::Low,
            Intensity::Low => Intensity::High,
        }
    }

    pub(crate) fn as_str(&self) -> &str {
        match self {
            Intensity::High => "HIGH",
            Intensity::Low => "LOW",
        }
    }

    pub(crate) fn label(&self) -> &str {
        match self {
            Intensity::High => "High Intensity",
            Intensity::Low => "Low Intensity",
        }
    }

    pub(crate) fn emoji(&self) -> &str {
        match self {
            Intensity::High => "🔥",
            Intensity::Low => "❄️",
        }
    }
}

/// Phase lengths in whole seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseDurations {
    pub high_seconds: u64,
    pub low_seconds: u64,
}

impl PhaseDurations {
    pub fn production() -> Self {
        Self {
            high_seconds: HIGH_INTENSITY_SECONDS,
            low_seconds: LOW_INTENSITY_SECONDS,
        }
    }

    pub fn development() -> Self {
        Self {
            high_seconds: DEV_PHASE_SECONDS,
            low_seconds: DEV_PHASE_SECONDS,
        }
    }

    pub fn seconds_for(&self, intensity: Intensity) -> u64 {
        match intensity {
            Intensity::High => self.high_seconds,
            Intensity::Low => self.low_seconds,
        }
    }

    /// Frame budget of one phase. Saturates instead of wrapping.
    pub fn frames_for_phase(&self, is_high: bool) -> u64 {
        self.seconds_for(Intensity::from_high(is_high))
            .saturating_mul(FRAME_RATE_HZ)
    }
}

impl Default for PhaseDurations {
    fn default() -> Self {
        Self::production()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frames_for_phase_production() {
        let durations = PhaseDurations::production();
        assert_eq!(durations.frames_for_phase(true), 60 * 30);
        assert_eq!(durations.frames_for_phase(false), 180 * 30);
    }

    #[test]
    fn test_frames_for_phase_development() {
        let durations = PhaseDurations::development();
        assert_eq!(durations.frames_for_phase(true), 90);
        assert_eq!(durations.frames_for_phase(false), 90);
    }

    #[test]
    fn test_frames_for_phase_saturates() {
        let durations = PhaseDurations {
            high_seconds: MAX_PHASE_SECONDS,
            low_seconds: u64::MAX / 2,
        };
        assert_eq!(durations.frames_for_phase(true), 2_592_000);
        assert_eq!(durations.frames_for_phase(false), u64::MAX);
    }

    #[test]
    fn test_flipped_alternates() {
        assert_eq!(Intensity::High.flipped(), Intensity::Low);
        assert_eq!(Intensity::Low.flipped(), Intensity::High);
        assert_eq!(Intensity::from_high(true), Intensity::High);
        assert!(!Intensity::Low.is_high());
    }
}
