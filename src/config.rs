use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::OnceLock;

use clap::Parser;
use regex::Regex;
use thiserror::Error;

use crate::interval::phase::{MAX_PHASE_SECONDS, PhaseDurations, TOTAL_ROUNDS};
use crate::interval::session::WorkoutPlan;

/// Environment switch selecting the short development phases.
pub const PROFILE_ENV: &str = "INTERVAL_IT_ENV";
pub const DEFAULT_ADDR: &str = "127.0.0.1:8765";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid duration '{0}' (expected e.g. 45s, 1m, 1m30s)")]
    InvalidDuration(String),
    #[error("duration must be longer than zero")]
    ZeroDuration,
    #[error("duration '{0}' is longer than 24h")]
    DurationTooLong(String),
    #[error("a workout needs at least one round")]
    ZeroRounds,
}

#[derive(Parser, Debug, Clone)]
#[command(
    name = "interval_it",
    version,
    about = "⏱️ Interval It - high/low intensity workout timer"
)]
pub struct Cli {
    /// Serve the timer to browser clients over WebSocket instead of the console
    #[arg(long)]
    pub daemon: bool,

    /// Address serving the browser page and its WebSocket feed in daemon mode
    #[arg(long, default_value = DEFAULT_ADDR)]
    pub addr: SocketAddr,

    /// High intensity duration (e.g. "20s", "1m"). Overrides the profile.
    #[arg(long, value_parser = parse_duration_arg)]
    pub high: Option<u64>,

    /// Low intensity duration (e.g. "10s", "3m"). Overrides the profile.
    #[arg(long, value_parser = parse_duration_arg)]
    pub low: Option<u64>,

    /// Rounds in the workout
    #[arg(long, default_value_t = TOTAL_ROUNDS)]
    pub rounds: u32,

    /// Use the 3 second development phases
    #[arg(long)]
    pub dev: bool,

    /// Pause the timer once the last round is done
    #[arg(long)]
    pub stop_at_completion: bool,

    /// Directory holding alert.mp3 and bell.mp3
    #[arg(long, default_value = "assets")]
    pub assets: PathBuf,

    /// Activity log file
    #[arg(short, long)]
    pub log: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    Production,
    Development,
}

impl Profile {
    pub fn from_env_value(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
            Some("development" | "dev") => Profile::Development,
            _ => Profile::Production,
        }
    }

    pub fn durations(self) -> PhaseDurations {
        match self {
            Profile::Production => PhaseDurations::production(),
            Profile::Development => PhaseDurations::development(),
        }
    }
}

/// Everything the run loop needs, resolved from CLI and environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimerConfig {
    pub profile: Profile,
    pub plan: WorkoutPlan,
    pub stop_at_completion: bool,
    pub daemon: bool,
    pub addr: SocketAddr,
    pub assets_dir: PathBuf,
    pub log_file: Option<PathBuf>,
    pub verbose: bool,
}

impl TimerConfig {
    pub fn resolve(cli: &Cli, env_profile: Option<&str>) -> Result<Self, ConfigError> {
        if cli.rounds == 0 {
            return Err(ConfigError::ZeroRounds);
        }

        let profile = if cli.dev {
            Profile::Development
        } else {
            Profile::from_env_value(env_profile)
        };
        let defaults = profile.durations();
        let durations = PhaseDurations {
            high_seconds: cli.high.unwrap_or(defaults.high_seconds),
            low_seconds: cli.low.unwrap_or(defaults.low_seconds),
        };

        Ok(Self {
            profile,
            plan: WorkoutPlan {
                durations,
                total_rounds: cli.rounds,
            },
            stop_at_completion: cli.stop_at_completion,
            daemon: cli.daemon,
            addr: cli.addr,
            assets_dir: cli.assets.clone(),
            log_file: cli.log.clone().or_else(default_log_file),
            verbose: cli.verbose,
        })
    }
}

fn default_log_file() -> Option<PathBuf> {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    Some(PathBuf::from(format!(
        "{}/.local/share/interval_it/activity.log",
        home
    )))
}

fn duration_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(?:(\d+)h)?(?:(\d+)m)?(?:(\d+)s)?$").expect("duration pattern compiles")
    })
}

/// Parses `90`, `90s`, `1m30s`, `1h` into whole seconds, at most
/// `MAX_PHASE_SECONDS`.
pub fn parse_duration_arg(value: &str) -> Result<u64, ConfigError> {
    let value = value.trim();
    let invalid = || ConfigError::InvalidDuration(value.to_string());
    let too_long = || ConfigError::DurationTooLong(value.to_string());

    let seconds = if value.bytes().all(|b| b.is_ascii_digit()) && !value.is_empty() {
        value.parse::<u64>().map_err(|_| too_long())?
    } else {
        let captures = duration_pattern()
            .captures(value)
            .filter(|_| !value.is_empty())
            .ok_or_else(invalid)?;
        let part = |index: usize, unit: u64| -> Result<u64, ConfigError> {
            captures
                .get(index)
                .map(|m| {
                    m.as_str()
                        .parse::<u64>()
                        .ok()
                        .and_then(|n| n.checked_mul(unit))
                        .ok_or_else(too_long)
                })
                .unwrap_or(Ok(0))
        };
        let (hours, minutes, secs) = (part(1, 3600)?, part(2, 60)?, part(3, 1)?);
        hours
            .checked_add(minutes)
            .and_then(|total| total.checked_add(secs))
            .ok_or_else(too_long)?
    };

    if seconds == 0 {
        return Err(ConfigError::ZeroDuration);
    }
    if seconds > MAX_PHASE_SECONDS {
        return Err(too_long());
    }
    Ok(seconds)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("interval_it").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_parse_duration_forms() {
        assert_eq!(parse_duration_arg("90"), Ok(90));
        assert_eq!(parse_duration_arg("45s"), Ok(45));
        assert_eq!(parse_duration_arg("3m"), Ok(180));
        assert_eq!(parse_duration_arg("1m30s"), Ok(90));
        assert_eq!(parse_duration_arg("1h"), Ok(3600));
    }

    #[test]
    fn test_parse_duration_rejects() {
        assert_eq!(parse_duration_arg("0"), Err(ConfigError::ZeroDuration));
        assert_eq!(parse_duration_arg("0m0s"), Err(ConfigError::ZeroDuration));
        assert_eq!(
            parse_duration_arg(""),
            Err(ConfigError::InvalidDuration(String::new()))
        );
        assert!(matches!(
            parse_duration_arg("ten minutes"),
            Err(ConfigError::InvalidDuration(_))
        ));
        assert!(matches!(
            parse_duration_arg("30s1m"),
            Err(ConfigError::InvalidDuration(_))
        ));
    }

    #[test]
    fn test_parse_duration_rejects_overflow() {
        for input in ["6000000000000000h", "99999999999999999999", "18446744073709551615s"] {
            assert_eq!(
                parse_duration_arg(input),
                Err(ConfigError::DurationTooLong(input.to_string())),
                "{}",
                input
            );
        }
        assert_eq!(parse_duration_arg("24h"), Ok(MAX_PHASE_SECONDS));
        assert!(matches!(
            parse_duration_arg("24h1s"),
            Err(ConfigError::DurationTooLong(_))
        ));
    }

    #[test]
    fn test_cli_rejects_oversized_duration() {
        assert!(Cli::try_parse_from(["interval_it", "--low", "1000000000000000000"]).is_err());
        assert!(Cli::try_parse_from(["interval_it", "--high", "6000000000000000h"]).is_err());
    }

    #[test]
    fn test_profile_from_env() {
        assert_eq!(Profile::from_env_value(None), Profile::Production);
        assert_eq!(
            Profile::from_env_value(Some("development")),
            Profile::Development
        );
        assert_eq!(Profile::from_env_value(Some(" DEV ")), Profile::Development);
        assert_eq!(
            Profile::from_env_value(Some("production")),
            Profile::Production
        );
    }

    #[test]
    fn test_resolve_defaults() {
        let config = TimerConfig::resolve(&cli(&[]), None).unwrap();
        assert_eq!(config.profile, Profile::Production);
        assert_eq!(config.plan.durations, PhaseDurations::production());
        assert_eq!(config.plan.total_rounds, TOTAL_ROUNDS);
        assert!(!config.daemon);
        assert_eq!(config.addr, DEFAULT_ADDR.parse().unwrap());
        assert!(config.log_file.unwrap().ends_with("interval_it/activity.log"));
    }

    #[test]
    fn test_resolve_dev_profile_and_overrides() {
        let config = TimerConfig::resolve(&cli(&["--high", "20s"]), Some("development")).unwrap();
        assert_eq!(config.profile, Profile::Development);
        assert_eq!(config.plan.durations.high_seconds, 20);
        assert_eq!(config.plan.durations.low_seconds, 3);

        let config = TimerConfig::resolve(&cli(&["--dev", "--rounds", "3"]), None).unwrap();
        assert_eq!(config.plan.durations, PhaseDurations::development());
        assert_eq!(config.plan.total_rounds, 3);
    }

    #[test]
    fn test_resolve_rejects_zero_rounds() {
        assert_eq!(
            TimerConfig::resolve(&cli(&["--rounds", "0"]), None),
            Err(ConfigError::ZeroRounds)
        );
    }

    #[test]
    fn test_cli_rejects_bad_duration() {
        assert!(Cli::try_parse_from(["interval_it", "--low", "soon"]).is_err());
    }
}
