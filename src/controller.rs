use std::io::Write;

use crate::audio::alert::AudioAlert;
use crate::clock::ticker::Ticker;
use crate::interval::phase::Intensity;
use crate::interval::session::{SessionState, TickOutcome, WorkoutPlan, advance};
use crate::notify;
use crate::render::view::{Readout, compose};
use crate::session_log::SessionLog;
use crate::ws::protocol::ServerMessage;
use crate::ws::websocket_server::{CommandReceiver, Outbound};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlCommand {
    /// A click anywhere on the timer.
    Toggle,
}

/// Where readouts, announcements and alerts end up.
pub trait Surface {
    fn show(&mut self, readout: &Readout);
    fn announce(&mut self, line: &str);
    fn alert(&mut self, message: &str);
}

/// Terminal front end. Redraws the status line only when the visible
/// countdown or labels change.
#[derive(Debug, Default)]
pub struct ConsoleSurface {
    last_key: Option<(String, String, String, bool)>,
}

impl Surface for ConsoleSurface {
    fn show(&mut self, readout: &Readout) {
        let key = (
            readout.countdown.clone(),
            readout.phase.clone(),
            readout.rounds.clone(),
            readout.paused,
        );
        if self.last_key.as_ref() == Some(&key) {
            return;
        }
        self.last_key = Some(key);
        print!("\r\x1b[2K{}", readout.status_line());
        let _ = std::io::stdout().flush();
    }

    fn announce(&mut self, line: &str) {
        println!("\n{}", line);
        // force a redraw below the announcement
        self.last_key = None;
    }

    fn alert(&mut self, message: &str) {
        notify::alert_user(message);
        self.last_key = None;
    }
}

/// Browser front end: readouts and alerts go out on the WebSocket feed.
/// An alert nobody is connected to see falls back to the desktop.
pub struct BrowserSurface {
    outbound: Outbound,
    fallback: fn(&str),
}

impl BrowserSurface {
    pub fn new(outbound: Outbound) -> Self {
        Self::with_fallback(outbound, notify::alert_user)
    }

    pub fn with_fallback(outbound: Outbound, fallback: fn(&str)) -> Self {
        Self { outbound, fallback }
    }
}

impl Surface for BrowserSurface {
    fn show(&mut self, readout: &Readout) {
        self.outbound.publish_readout(readout.clone());
    }

    fn announce(&mut self, line: &str) {
        tracing::info!("{}", line);
    }

    fn alert(&mut self, message: &str) {
        let delivered = self.outbound.publish_event(ServerMessage::Alert {
            message: message.to_string(),
        });
        if !delivered {
            tracing::warn!("No browser connected for alert: {}", message);
            (self.fallback)(message);
        }
    }
}

/// Owns the workout session and applies clicks and frame ticks to it.
pub struct Controller {
    state: SessionState,
    plan: WorkoutPlan,
    stop_at_completion: bool,
    audio: AudioAlert,
    journal: SessionLog,
    surface: Box<dyn Surface>,
}

impl Controller {
    pub fn new(
        plan: WorkoutPlan,
        stop_at_completion: bool,
        audio: AudioAlert,
        journal: SessionLog,
        surface: Box<dyn Surface>,
    ) -> Self {
        Self {
            state: SessionState::default(),
            plan,
            stop_at_completion,
            audio,
            journal,
            surface,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn readout(&self) -> Readout {
        compose(&self.state, &self.plan)
    }

    /// Draws the initial frame.
    pub fn start(&mut self) {
        let readout = self.readout();
        self.surface.show(&readout);
    }

    pub fn click(&mut self) {
        self.state.toggle_pause();
        let message = if self.state.paused { "Paused" } else { "Resumed" };
        let line = self.journal.event(message);
        tracing::debug!("{}", line);
        self.refresh();
    }

    pub fn tick(&mut self) -> TickOutcome {
        let intensity = self.state.intensity;
        let outcome = advance(&mut self.state, &self.plan);
        match outcome {
            TickOutcome::Idle => return outcome,
            TickOutcome::Advanced => self.journal.record_frame(intensity),
            TickOutcome::PhaseChanged {
                ended,
                started,
                round_completed,
            } => {
                self.journal.record_frame(ended);
                self.on_phase_changed(started, round_completed);
            }
        }
        self.refresh();
        outcome
    }

    fn on_phase_changed(&mut self, started: Intensity, round_completed: bool) {
        let line = self.journal.event(&format!(
            "{} Switched to {} intensity",
            started.emoji(),
            started.as_str()
        ));
        self.surface.announce(&line);

        if !round_completed {
            return;
        }

        let line = self.journal.event(&format!(
            "🔔 Round {}/{} complete",
            self.state.rounds_completed, self.plan.total_rounds
        ));
        self.surface.announce(&line);

        if self.state.is_complete(&self.plan) {
            let line = self.journal.event("🏁 Workout complete!");
            self.surface.announce(&line);
            if self.stop_at_completion {
                self.state.paused = true;
            }
        }
    }

    /// Fires the cue for a freshly started phase and redraws.
    fn refresh(&mut self) {
        let trigger = self.state.frame_count == 0 && !self.state.paused;
        if let Err(e) = self.audio.update(trigger, self.state.intensity.is_high()) {
            tracing::warn!("Audio alert failed: {}", e);
            self.surface.alert(&e.to_string());
        }
        let readout = self.readout();
        self.surface.show(&readout);
    }

    /// Drives the session until the ticker runs out.
    ///
    /// Clicks and frames are handled one at a time on this task. A closed
    /// command channel only stops click handling.
    pub async fn run<T: Ticker>(&mut self, ticker: &mut T, commands: &mut CommandReceiver) {
        let mut commands_open = true;
        loop {
            tokio::select! {
                biased;
                command = commands.recv(), if commands_open => match command {
                    Some(ControlCommand::Toggle) => self.click(),
                    None => commands_open = false,
                },
                more = ticker.tick() => {
                    if !more {
                        break;
                    }
                    self.tick();
                }
            }
        }
    }

    pub fn stats(&self) -> String {
        self.journal
            .stats(self.state.rounds_completed, self.plan.total_rounds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::alert::tests::{CallLog, recording_pair};
    use crate::clock::ticker::ScriptedTicker;
    use crate::interval::phase::PhaseDurations;
    use crate::ws::websocket_server::tests::{next_text, start};
    use crate::ws::websocket_server::{create_command_channel, create_outbound_channel};
    use futures_util::SinkExt;
    use std::sync::{Arc, Mutex};
    use tokio_tungstenite::tungstenite::protocol::Message;

    #[derive(Default)]
    struct Recorded {
        shown: Vec<Readout>,
        announced: Vec<String>,
        alerts: Vec<String>,
    }

    struct RecordingSurface(Arc<Mutex<Recorded>>);

    impl Surface for RecordingSurface {
        fn show(&mut self, readout: &Readout) {
            self.0.lock().unwrap().shown.push(readout.clone());
        }

        fn announce(&mut self, line: &str) {
            self.0.lock().unwrap().announced.push(line.to_string());
        }

        fn alert(&mut self, message: &str) {
            self.0.lock().unwrap().alerts.push(message.to_string());
        }
    }

    fn dev_plan(total_rounds: u32) -> WorkoutPlan {
        WorkoutPlan {
            durations: PhaseDurations::development(),
            total_rounds,
        }
    }

    fn controller(
        total_rounds: u32,
        stop_at_completion: bool,
        loaded: bool,
    ) -> (Controller, Arc<Mutex<Recorded>>, CallLog) {
        let (pair, calls) = recording_pair();
        let audio = AudioAlert::new(loaded.then_some(pair));
        let recorded = Arc::new(Mutex::new(Recorded::default()));
        let controller = Controller::new(
            dev_plan(total_rounds),
            stop_at_completion,
            audio,
            SessionLog::new(None),
            Box::new(RecordingSurface(recorded.clone())),
        );
        (controller, recorded, calls)
    }

    fn plays(calls: &CallLog) -> Vec<String> {
        calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.ends_with(":play"))
            .cloned()
            .collect()
    }

    #[test]
    fn test_paused_ticks_do_nothing() {
        let (mut controller, recorded, calls) = controller(8, false, true);
        for _ in 0..10 {
            assert_eq!(controller.tick(), TickOutcome::Idle);
        }
        assert_eq!(*controller.state(), SessionState::default());
        assert!(recorded.lock().unwrap().shown.is_empty());
        assert!(plays(&calls).is_empty());
    }

    #[test]
    fn test_start_cue_and_phase_cue() {
        let (mut controller, recorded, calls) = controller(8, false, true);

        controller.click();
        // resuming at the start of a phase cues the phase being entered
        assert_eq!(plays(&calls), vec!["bell:play"]);

        for _ in 0..90 {
            controller.tick();
        }
        assert_eq!(controller.state().intensity, Intensity::High);
        assert_eq!(plays(&calls), vec!["bell:play", "alert:play"]);

        let recorded = recorded.lock().unwrap();
        assert_eq!(recorded.announced.len(), 1);
        assert!(recorded.announced[0].contains("Switched to HIGH intensity"));
        assert_eq!(recorded.shown.last().unwrap().phase, "High Intensity");
        assert_eq!(recorded.shown.last().unwrap().countdown, "00:03");
    }

    #[test]
    fn test_pause_mid_phase_keeps_counters() {
        let (mut controller, _recorded, calls) = controller(8, false, true);
        controller.click();
        for _ in 0..40 {
            controller.tick();
        }
        let before = *controller.state();

        controller.click();
        controller.tick();
        controller.click();

        let after = controller.state();
        assert_eq!(after.frame_count, before.frame_count);
        assert_eq!(after.total_frames, before.total_frames);
        assert!(!after.paused);
        // no cue away from a phase boundary
        assert_eq!(plays(&calls), vec!["bell:play"]);
    }

    #[test]
    fn test_missing_audio_raises_alert_once_per_edge() {
        let (mut controller, recorded, _calls) = controller(8, false, false);
        controller.click();
        controller.tick();
        assert_eq!(recorded.lock().unwrap().alerts, vec!["Audio not loaded"]);

        for _ in 0..89 {
            controller.tick();
        }
        assert_eq!(recorded.lock().unwrap().alerts.len(), 2);
    }

    #[test]
    fn test_completion_keeps_cycling_by_default() {
        let (mut controller, recorded, _calls) = controller(1, false, true);
        controller.click();
        for _ in 0..180 {
            controller.tick();
        }
        assert_eq!(controller.state().rounds_completed, 1);
        assert!(!controller.state().paused);

        for _ in 0..90 {
            controller.tick();
        }
        assert_eq!(controller.state().intensity, Intensity::High);
        assert_eq!(controller.state().rounds_completed, 1);
        assert!(
            recorded
                .lock()
                .unwrap()
                .announced
                .iter()
                .any(|l| l.contains("Workout complete!"))
        );
        assert!(controller.readout().complete);
    }

    #[test]
    fn test_stop_at_completion_pauses() {
        let (mut controller, _recorded, calls) = controller(1, true, true);
        controller.click();
        for _ in 0..180 {
            controller.tick();
        }
        assert!(controller.state().paused);
        assert_eq!(controller.state().intensity, Intensity::Low);
        assert_eq!(controller.tick(), TickOutcome::Idle);
        // the final boundary is silent because the session stopped
        assert_eq!(plays(&calls), vec!["bell:play", "alert:play"]);
    }

    #[tokio::test]
    async fn test_run_loop_scenario() {
        let (mut controller, _recorded, _calls) = controller(8, false, true);
        let (tx, mut rx) = create_command_channel();
        tx.send(ControlCommand::Toggle).unwrap();
        drop(tx);

        let mut ticker = ScriptedTicker::new([90]);
        controller.run(&mut ticker, &mut rx).await;

        let state = controller.state();
        assert!(!state.paused);
        assert_eq!(state.intensity, Intensity::High);
        assert_eq!(state.frame_count, 0);
        assert_eq!(state.total_frames, 90);
        assert_eq!(state.rounds_completed, 0);
        assert!(controller.stats().contains("Rounds completed: 0/8"));
    }

    static FALLBACK_ALERTS: Mutex<Vec<String>> = Mutex::new(Vec::new());

    fn record_fallback(message: &str) {
        FALLBACK_ALERTS.lock().unwrap().push(message.to_string());
    }

    #[test]
    fn test_browser_alert_without_clients_falls_back() {
        let outbound = create_outbound_channel();
        let mut surface = BrowserSurface::with_fallback(outbound, record_fallback);

        surface.alert("Audio not loaded");

        assert_eq!(*FALLBACK_ALERTS.lock().unwrap(), vec!["Audio not loaded"]);
    }

    #[tokio::test]
    async fn test_browser_joining_paused_timer_sees_it() {
        let (addr, mut commands, outbound) = start().await;
        let (pair, _calls) = recording_pair();
        let mut controller = Controller::new(
            dev_plan(8),
            false,
            AudioAlert::new(Some(pair)),
            SessionLog::new(None),
            Box::new(BrowserSurface::new(outbound)),
        );
        controller.start();

        let (mut ws, _) = tokio_tungstenite::connect_async(format!("ws://{}/ws", addr))
            .await
            .unwrap();
        let first = next_text(&mut ws).await;
        assert_eq!(first["type"], "readout");
        assert_eq!(first["paused"], true);
        assert_eq!(first["countdown"], "00:03");
        assert_eq!(first["phase"], "Low Intensity");

        ws.send(Message::Text(r#"{"type":"toggle"}"#.to_string()))
            .await
            .unwrap();
        assert_eq!(commands.recv().await, Some(ControlCommand::Toggle));
        controller.click();

        let resumed = next_text(&mut ws).await;
        assert_eq!(resumed["type"], "readout");
        assert_eq!(resumed["paused"], false);
    }
}
