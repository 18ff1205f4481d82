use coexist::engine::progress::{Progress, ProgressCallback};
use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressState, ProgressStyle};
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tracing::warn;

const EVENT_BUFFER: usize = 1024;
const REDRAW_HZ: u8 = 12;
const SPINNER_TICK: Duration = Duration::from_millis(80);

#[derive(Debug)]
pub enum UiEvent {
    Progress(Progress),
    Log(String),
}

/// The bar of the stage currently running.
struct PhaseBar {
    name: String,
    bar: ProgressBar,
}

impl PhaseBar {
    fn label(&self, detail: &str) -> String {
        format!("{} ({})", self.name, detail)
    }

    /// `✓ name` plus the item count, when the phase had one, and the elapsed time.
    fn summary(&self) -> String {
        let elapsed = self.bar.elapsed().as_secs_f64();
        match self.bar.length() {
            Some(total) => format!(
                "✓ {}: {}/{} in {:.1}s",
                self.name,
                self.bar.position(),
                total,
                elapsed
            ),
            None => format!("✓ {} in {:.1}s", self.name, elapsed),
        }
    }
}

/// Draws progress events and forwarded log lines from a single task, so the
/// two never interleave on the terminal.
pub struct UiManager {
    terminal: MultiProgress,
    phase: Option<PhaseBar>,
    events: mpsc::Receiver<UiEvent>,
    shutdown: watch::Receiver<bool>,
    // Keeps the multi-bar registered while no phase is running.
    idle: ProgressBar,
}

impl UiManager {
    pub fn new() -> (Self, mpsc::Sender<UiEvent>, watch::Sender<bool>) {
        let (event_sender, events) = mpsc::channel(EVENT_BUFFER);
        let (shutdown_sender, shutdown) = watch::channel(false);
        let terminal = MultiProgress::with_draw_target(ProgressDrawTarget::stderr_with_hz(REDRAW_HZ));
        let idle = terminal.add(ProgressBar::hidden());
        let manager = Self {
            terminal,
            phase: None,
            events,
            shutdown,
            idle,
        };
        (manager, event_sender, shutdown_sender)
    }

    pub async fn run(mut self) {
        loop {
            tokio::select! {
                Some(event) = self.events.recv() => self.handle_event(event),
                changed = self.shutdown.changed() => {
                    if changed.is_err() || *self.shutdown.borrow() {
                        break;
                    }
                }
            }
        }
        while let Ok(event) = self.events.try_recv() {
            self.handle_event(event);
        }
        self.close_phase();
        self.idle.finish_and_clear();
    }

    fn print(&self, line: impl AsRef<str>) {
        let _ = self.terminal.println(line);
    }

    fn close_phase(&mut self) -> Option<PhaseBar> {
        let phase = self.phase.take()?;
        phase.bar.finish_and_clear();
        Some(phase)
    }

    fn handle_event(&mut self, event: UiEvent) {
        match event {
            UiEvent::Log(line) => self.print(line),
            UiEvent::Progress(progress) => self.handle_progress(progress),
        }
    }

    fn handle_progress(&mut self, progress: Progress) {
        match progress {
            Progress::PhaseStart { name } => {
                self.close_phase();
                let bar = self.terminal.add(ProgressBar::new_spinner());
                bar.set_style(spinner_style());
                bar.set_message(name.clone());
                bar.enable_steady_tick(SPINNER_TICK);
                self.phase = Some(PhaseBar { name, bar });
            }
            Progress::PhaseFinish => {
                if let Some(phase) = self.close_phase() {
                    self.print(phase.summary());
                }
            }
            Progress::TaskStart { total } => {
                if let Some(phase) = &self.phase {
                    phase.bar.disable_steady_tick();
                    phase.bar.set_style(counter_style());
                    phase.bar.set_length(total);
                    phase.bar.reset();
                }
            }
            Progress::TaskIncrement { amount } => {
                if let Some(phase) = &self.phase {
                    phase.bar.inc(amount);
                }
            }
            Progress::TaskFinish => {
                if let Some(phase) = &self.phase {
                    let done = phase.bar.length().unwrap_or_else(|| phase.bar.position());
                    phase.bar.set_position(done);
                    phase.bar.finish();
                }
            }
            Progress::StatusUpdate { text } => {
                if let Some(phase) = &self.phase {
                    phase.bar.set_message(phase.label(&text));
                }
            }
            Progress::Message(text) => self.print(format!("  {text}")),
        }
    }
}

fn spinner_style() -> ProgressStyle {
    ProgressStyle::with_template("{spinner:.green} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"])
}

fn counter_style() -> ProgressStyle {
    ProgressStyle::with_template("{msg:<40} [{bar:40.cyan/blue}] {pos}/{len} ({remaining})")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .with_key(
            "remaining",
            |state: &ProgressState, w: &mut dyn std::fmt::Write| {
                let _ = write!(w, "{:.1}s left", state.eta().as_secs_f64());
            },
        )
        .progress_chars("━╸ ")
}

/// Turns core progress events into UI events on the channel.
#[derive(Clone)]
pub struct CliProgressHandler {
    sender: mpsc::Sender<UiEvent>,
}

impl CliProgressHandler {
    pub fn new(sender: mpsc::Sender<UiEvent>) -> Self {
        Self { sender }
    }

    pub fn get_callback(&self) -> ProgressCallback<'static> {
        let sender = self.sender.clone();
        Box::new(move |progress: Progress| {
            if let Err(e) = sender.try_send(UiEvent::Progress(progress)) {
                warn!("Dropped progress event, UI channel unavailable: {}", e);
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coexist::engine::progress::ProgressReporter;

    fn hidden_manager() -> UiManager {
        let (manager, _sender, _shutdown) = UiManager::new();
        manager.terminal.set_draw_target(ProgressDrawTarget::hidden());
        manager
    }

    fn send(manager: &mut UiManager, progress: Progress) {
        manager.handle_event(UiEvent::Progress(progress));
    }

    fn start(manager: &mut UiManager, name: &str) {
        send(manager, Progress::PhaseStart { name: name.into() });
    }

    fn active(manager: &UiManager) -> &PhaseBar {
        manager.phase.as_ref().expect("a phase should be active")
    }

    #[test]
    fn new_phase_replaces_the_previous_one() {
        let mut manager = hidden_manager();
        assert!(manager.phase.is_none());

        start(&mut manager, "Reducing replicates");
        assert_eq!(active(&manager).bar.message(), "Reducing replicates");

        start(&mut manager, "Aggregating replicates");
        assert_eq!(active(&manager).name, "Aggregating replicates");
        assert_eq!(active(&manager).bar.message(), "Aggregating replicates");
    }

    #[test]
    fn finishing_a_phase_clears_it() {
        let mut manager = hidden_manager();
        start(&mut manager, "Reducing replicates");
        send(&mut manager, Progress::PhaseFinish);
        assert!(manager.phase.is_none());
    }

    #[test]
    fn finishing_without_a_phase_is_harmless() {
        let mut manager = hidden_manager();
        send(&mut manager, Progress::PhaseFinish);
        assert!(manager.phase.is_none());
    }

    #[test]
    fn task_events_count_items() {
        let mut manager = hidden_manager();
        start(&mut manager, "Reducing replicates");

        send(&mut manager, Progress::TaskStart { total: 12 });
        assert_eq!(active(&manager).bar.length(), Some(12));
        assert_eq!(active(&manager).bar.position(), 0);

        send(&mut manager, Progress::TaskIncrement { amount: 5 });
        assert_eq!(active(&manager).bar.position(), 5);

        send(&mut manager, Progress::TaskFinish);
        let phase = active(&manager);
        assert!(phase.bar.is_finished());
        assert_eq!(phase.bar.position(), 12);
        assert!(phase.summary().starts_with("✓ Reducing replicates: 12/12 in "));
    }

    #[test]
    fn summary_without_items_reports_only_time() {
        let mut manager = hidden_manager();
        start(&mut manager, "Summarizing");
        assert!(active(&manager).summary().starts_with("✓ Summarizing in "));
    }

    #[test]
    fn status_text_is_shown_next_to_the_phase() {
        let mut manager = hidden_manager();
        start(&mut manager, "Launching production");
        send(
            &mut manager,
            Progress::StatusUpdate {
                text: "job a".into(),
            },
        );
        assert_eq!(active(&manager).bar.message(), "Launching production (job a)");
    }

    #[test]
    fn lines_print_without_a_phase() {
        let mut manager = hidden_manager();
        manager.handle_event(UiEvent::Log("log line".to_string()));
        send(&mut manager, Progress::Message("note".to_string()));
        assert!(manager.phase.is_none());
    }

    #[tokio::test]
    async fn reporter_events_reach_the_channel() {
        let (sender, mut receiver) = mpsc::channel(4);
        let handler = CliProgressHandler::new(sender);
        let reporter = ProgressReporter::with_callback(handler.get_callback());

        reporter.phase("Testing");
        reporter.report(Progress::TaskStart { total: 3 });

        let Some(UiEvent::Progress(first)) = receiver.recv().await else {
            panic!("expected a progress event");
        };
        assert_eq!(first, Progress::PhaseStart { name: "Testing".into() });
        let Some(UiEvent::Progress(second)) = receiver.recv().await else {
            panic!("expected a progress event");
        };
        assert_eq!(second, Progress::TaskStart { total: 3 });
    }

    #[tokio::test]
    async fn run_drains_queued_events_and_stops_on_shutdown() {
        let (manager, sender, shutdown) = UiManager::new();
        manager.terminal.set_draw_target(ProgressDrawTarget::hidden());
        let handle = tokio::spawn(manager.run());

        sender
            .send(UiEvent::Progress(Progress::Message("queued".into())))
            .await
            .unwrap();
        shutdown.send(true).unwrap();

        tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .unwrap()
            .unwrap();
    }
}
