use log::{debug, error, info, warn};
use rand::SeedableRng;
use rand::rngs::StdRng;
use reflex_core::{Difficulty, Mode, Phase};
use reflex_session::{SessionConfig, SessionEvent, SessionMachine, SessionSignal, SessionSummary};
use reflex_store::{KeyValueStore, ModeFilter, Ranking, Storage, User, UserType};
use reflex_timing::Timer;
use std::time::Duration;

use crate::command::{Command, HELP};
use crate::render;
use crate::settings::Settings;

/// Console controller. Owns at most one running session and the storage it
/// reports to; every method returns the lines to print.
pub struct App<T: Timer, S: KeyValueStore> {
    settings: Settings,
    timer: T,
    storage: Storage<S>,
    user: Option<User>,
    game: Option<SessionMachine<T, StdRng>>,
    seed: Option<u64>,
    should_exit: bool,
}

impl<T: Timer, S: KeyValueStore> App<T, S> {
    pub fn new(settings: Settings, timer: T, storage: Storage<S>, seed: Option<u64>) -> Self {
        let user = storage.user().unwrap_or_else(|e| {
            warn!(target: "app", "Ignoring stored user: {:#}", e);
            None
        });
        Self {
            settings,
            timer,
            storage,
            user,
            game: None,
            seed,
            should_exit: false,
        }
    }

    pub fn greeting(&mut self) -> Vec<String> {
        let mut lines = vec!["=== REFLEX: reaction training ===".to_string()];
        match self.storage.current_session() {
            Ok(session) => lines.push(format!("{} ({})", session.name, session.date)),
            Err(e) => warn!(target: "app", "No session metadata: {:#}", e),
        }
        match &self.user {
            Some(user) => lines.push(format!("Welcome back, {}!", user.name)),
            None => lines.push("Please log in: login <name> [student|adult]".to_string()),
        }
        lines.push("Type 'help' for commands.".to_string());
        lines
    }

    pub fn handle(&mut self, command: Command) -> Vec<String> {
        debug!(target: "app", "Command {:?}", command);
        match command {
            Command::Tap => self.send(SessionEvent::Tap),
            Command::Recall(sum) => {
                if self.phase() == Some(Phase::NumberEntry) {
                    self.send(SessionEvent::SubmitRecall(sum))
                } else {
                    vec!["Nothing to recall right now.".to_string()]
                }
            }
            Command::Login { name, user_type } => self.login(&name, user_type),
            Command::Logout => self.logout(),
            Command::Play { mode, difficulty } => self.play(mode, difficulty),
            Command::Stop => {
                if self.stop_game() {
                    vec!["Session abandoned, nothing recorded.".to_string()]
                } else {
                    vec!["Nothing is running.".to_string()]
                }
            }
            Command::Ranking(filter) => self.ranking(filter),
            Command::History => self.history(),
            Command::Session => match self.storage.current_session() {
                Ok(session) => vec![format!("{} [{}] {}", session.name, session.id, session.date)],
                Err(e) => {
                    error!(target: "app", "Failed to read session metadata: {:#}", e);
                    vec!["Could not read session information.".to_string()]
                }
            },
            Command::Help => HELP.lines().map(str::to_string).collect(),
            Command::Quit => {
                self.shutdown();
                self.should_exit = true;
                vec!["Bye!".to_string()]
            }
        }
    }

    /// One pass of the input loop. The command goes first, so a tap is
    /// judged against the stimulus that was showing when it was typed and
    /// never against one whose timer came due while input was pending.
    pub fn step(&mut self, command: Option<Command>) -> Vec<String> {
        let mut lines = match command {
            Some(command) => self.handle(command),
            None => Vec::new(),
        };
        lines.extend(self.tick());
        lines
    }

    /// Fires due session timers.
    pub fn tick(&mut self) -> Vec<String> {
        let Some(game) = &mut self.game else {
            return Vec::new();
        };
        let signals = game.update();
        self.present(signals)
    }

    fn send(&mut self, event: SessionEvent) -> Vec<String> {
        let Some(game) = &mut self.game else {
            return Vec::new();
        };
        let signals = game.handle_event(event);
        self.present(signals)
    }

    fn present(&mut self, signals: Vec<SessionSignal>) -> Vec<String> {
        let Some(game) = &self.game else {
            return Vec::new();
        };
        let mode = game.config.mode;
        let progress = game.trial_progress();

        let mut lines = Vec::new();
        let mut completed = None;
        for signal in signals {
            lines.extend(render::signal_lines(mode, &signal, progress));
            if let SessionSignal::Completed(summary) = signal {
                completed = Some(summary);
            }
        }
        if let Some(summary) = completed {
            lines.extend(self.save(&summary));
            self.game = None;
        }
        lines
    }

    fn save(&mut self, summary: &SessionSummary) -> Vec<String> {
        match summary.to_json_pretty() {
            Ok(json) => debug!(target: "app", "Trial breakdown:\n{}", json),
            Err(e) => warn!(target: "app", "{:#}", e),
        }
        let Some(draft) = summary.record_draft() else {
            info!(target: "app", "{} session had no valid trials", summary.mode);
            return vec!["No valid trials, nothing was recorded.".to_string()];
        };
        let Some(user) = &self.user else {
            return vec!["Not logged in, progress not saved.".to_string()];
        };
        match self.storage.append(user, draft) {
            Ok(record) => vec![format!("Saved as {}.", &record.id[..8.min(record.id.len())])],
            Err(e) => {
                error!(target: "app", "Failed to save record: {:#}", e);
                vec!["Storage error: progress not saved.".to_string()]
            }
        }
    }

    fn login(&mut self, name: &str, user_type: UserType) -> Vec<String> {
        match self.storage.login(name, user_type) {
            Ok(user) => {
                let line = format!("Welcome, {} ({})!", user.name, user.user_type);
                self.user = Some(user);
                vec![line]
            }
            Err(e) => vec![format!("Login failed: {:#}", e)],
        }
    }

    fn logout(&mut self) -> Vec<String> {
        self.stop_game();
        if let Err(e) = self.storage.clear_user() {
            error!(target: "app", "Failed to clear user: {:#}", e);
        }
        self.user = None;
        vec!["Logged out.".to_string()]
    }

    fn play(&mut self, mode: Mode, difficulty: Option<Difficulty>) -> Vec<String> {
        if self.user.is_none() {
            return vec!["Please log in first: login <name>".to_string()];
        }
        self.stop_game();

        let difficulty = difficulty.unwrap_or(self.settings.difficulty);
        let rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let mut game = SessionMachine::new(
            SessionConfig::new(mode, difficulty),
            self.timer.clone(),
            rng,
        );

        let mut lines = vec![format!("== {} ==", mode.display_name()), instructions(mode).to_string()];
        if mode.uses_difficulty() {
            lines.push(format!("Difficulty: {difficulty}"));
        }
        let signals = game.handle_event(SessionEvent::Start);
        self.game = Some(game);
        lines.extend(self.present(signals));
        lines
    }

    fn ranking(&self, filter: ModeFilter) -> Vec<String> {
        match self.storage.records() {
            Ok(records) => {
                let ranking = Ranking::build(&records, filter);
                render::ranking_lines(&ranking, self.user.as_ref().map(|u| u.id.as_str()))
            }
            Err(e) => {
                error!(target: "app", "Failed to read records: {:#}", e);
                vec!["Could not read records.".to_string()]
            }
        }
    }

    fn history(&self) -> Vec<String> {
        let Some(user) = &self.user else {
            return vec!["Please log in first: login <name>".to_string()];
        };
        match self.storage.records_by_user(&user.id) {
            Ok(records) => render::history_lines(&records),
            Err(e) => {
                error!(target: "app", "Failed to read records: {:#}", e);
                vec!["Could not read records.".to_string()]
            }
        }
    }

    /// Drops the running session, cancelling its timers. Returns whether
    /// one was running.
    fn stop_game(&mut self) -> bool {
        let Some(mut game) = self.game.take() else {
            return false;
        };
        let was_running = game.phase().is_running();
        if was_running {
            game.handle_event(SessionEvent::Reset);
            debug!(target: "app", "Stopped session {}", game.session_id());
        }
        was_running
    }

    pub fn shutdown(&mut self) {
        self.stop_game();
    }

    pub fn phase(&self) -> Option<Phase> {
        self.game.as_ref().map(|g| g.phase())
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn storage(&self) -> &Storage<S> {
        &self.storage
    }

    pub fn next_deadline(&self) -> Option<u64> {
        self.game.as_ref().and_then(|g| g.next_deadline())
    }

    /// How long the input loop may block: one tick, or less when a session
    /// timer comes due sooner.
    pub fn poll_interval(&self) -> Duration {
        let tick = self.settings.tick();
        match self.next_deadline() {
            Some(deadline) => {
                let until = Duration::from_millis(deadline.saturating_sub(self.timer.now()));
                tick.min(until)
            }
            None => tick,
        }
    }

    pub fn should_exit(&self) -> bool {
        self.should_exit
    }
}

fn instructions(mode: Mode) -> &'static str {
    match mode {
        Mode::Simple => "Press Enter as soon as GO appears. Pressing early is a false start.",
        Mode::Sprint => "On your marks, set... press Enter at the gun. Under 100 ms is a false start.",
        Mode::Color => "Press Enter only for GREEN. Let every other color pass.",
        Mode::Dual => "Press Enter only for GREEN, and add up every digit you see.",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{Result, bail};
    use reflex_store::MemoryStore;
    use reflex_store::storage::RECORDS_KEY;
    use reflex_core::ResultKind;
    use reflex_testkit::UsingLogger;
    use reflex_timing::ManualTimer;
    use test_context::test_context;

    type TestApp<S> = App<ManualTimer, S>;

    fn app() -> (TestApp<MemoryStore>, ManualTimer) {
        app_with(MemoryStore::new())
    }

    fn app_with<S: KeyValueStore>(kv: S) -> (TestApp<S>, ManualTimer) {
        let timer = ManualTimer::new();
        let app = App::new(Settings::default(), timer.clone(), Storage::new(kv), Some(42));
        (app, timer)
    }

    /// Waits out one poll interval the way the input loop does.
    fn idle<S: KeyValueStore>(app: &mut TestApp<S>, timer: &ManualTimer) -> Vec<String> {
        timer.advance(app.poll_interval().as_millis() as u64);
        app.step(None)
    }

    /// Plays a speed session to the end, tapping `rt` ms after each go cue,
    /// or straight away while waiting when `rt` is `None`.
    fn run_speed<S: KeyValueStore>(app: &mut TestApp<S>, timer: &ManualTimer, rt: Option<u64>) -> Vec<String> {
        let mut lines = Vec::new();
        let mut steps = 0;
        while let Some(phase) = app.phase() {
            steps += 1;
            assert!(steps < 20_000, "session never finished, stuck in {phase:?}");
            match (phase, rt) {
                (Phase::Go, Some(rt)) => {
                    timer.advance(rt);
                    lines.extend(app.step(Some(Command::Tap)));
                }
                (Phase::Waiting | Phase::Ready, None) => lines.extend(app.step(Some(Command::Tap))),
                _ => lines.extend(idle(app, timer)),
            }
        }
        lines
    }

    fn logged_in(mode: Mode) -> (TestApp<MemoryStore>, ManualTimer) {
        let (mut app, timer) = app();
        app.handle(Command::Login {
            name: "Aoi".to_string(),
            user_type: UserType::Student,
        });
        app.handle(Command::Play {
            mode,
            difficulty: Some(Difficulty::Easy),
        });
        (app, timer)
    }

    struct FailingRecords(MemoryStore);

    impl KeyValueStore for FailingRecords {
        fn get(&self, key: &str) -> Result<Option<String>> {
            self.0.get(key)
        }

        fn set(&mut self, key: &str, value: &str) -> Result<()> {
            if key == RECORDS_KEY {
                bail!("disk full");
            }
            self.0.set(key, value)
        }

        fn remove(&mut self, key: &str) -> Result<()> {
            self.0.remove(key)
        }
    }

    #[test]
    fn test_play_requires_login() {
        let (mut app, _) = app();
        let lines = app.handle(Command::Play {
            mode: Mode::Simple,
            difficulty: None,
        });
        assert_eq!(lines, vec!["Please log in first: login <name>".to_string()]);
        assert_eq!(app.phase(), None);
    }

    #[test_context(UsingLogger)]
    #[test]
    fn test_simple_session_is_saved(_ctx: &mut UsingLogger) {
        let (mut app, timer) = app();
        app.handle(Command::Login {
            name: "Aoi".to_string(),
            user_type: UserType::Student,
        });
        app.handle(Command::Play {
            mode: Mode::Simple,
            difficulty: None,
        });
        assert!(matches!(app.phase(), Some(Phase::Countdown { .. })));

        let lines = run_speed(&mut app, &timer, Some(250));
        assert!(lines.iter().any(|l| l.contains("GO!")));
        assert!(lines.iter().any(|l| l.contains("Average 250 ms")));
        assert!(lines.iter().any(|l| l.starts_with("Saved as")));

        let records = app.storage().records().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].reaction_time_ms, 250);
        assert_eq!(records[0].mode, Mode::Simple);
        assert_eq!(Some(records[0].user_id.as_str()), app.user().map(|u| u.id.as_str()));
    }

    #[test]
    fn test_false_starts_record_nothing() {
        let (mut app, timer) = app();
        app.handle(Command::Login {
            name: "Aoi".to_string(),
            user_type: UserType::Student,
        });
        app.handle(Command::Play {
            mode: Mode::Sprint,
            difficulty: None,
        });
        let lines = run_speed(&mut app, &timer, None);
        assert!(lines.iter().any(|l| l.starts_with("False start!")));
        assert!(lines.iter().any(|l| l == "No valid trials, nothing was recorded."));
        assert!(app.storage().records().unwrap().is_empty());
    }

    #[test]
    fn test_storage_failure_reports_progress_not_saved() {
        let (mut app, timer) = app_with(FailingRecords(MemoryStore::new()));
        app.handle(Command::Login {
            name: "Aoi".to_string(),
            user_type: UserType::Adult,
        });
        app.handle(Command::Play {
            mode: Mode::Simple,
            difficulty: None,
        });
        let lines = run_speed(&mut app, &timer, Some(300));
        assert!(lines.iter().any(|l| l.contains("progress not saved")));
        assert_eq!(app.phase(), None);
    }

    #[test]
    fn test_dual_session_through_recall() {
        let (mut app, timer) = app();
        app.handle(Command::Login {
            name: "Ren".to_string(),
            user_type: UserType::Student,
        });
        app.handle(Command::Play {
            mode: Mode::Dual,
            difficulty: Some(Difficulty::Easy),
        });
        assert_eq!(
            app.handle(Command::Recall(3)),
            vec!["Nothing to recall right now.".to_string()]
        );

        let mut steps = 0;
        while app.phase() != Some(Phase::NumberEntry) {
            steps += 1;
            assert!(steps < 10_000);
            idle(&mut app, &timer);
        }
        let lines = app.handle(Command::Recall(0));
        assert_eq!(app.phase(), None);
        assert!(lines.iter().any(|l| l.starts_with("Score")));

        let records = app.storage().records().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].mode, Mode::Dual);
        assert!(records[0].score.is_some());
        assert!(records[0].accuracy_pct.is_some());
    }

    #[test]
    fn test_poll_interval_stops_at_next_deadline() {
        let (mut app, timer) = logged_in(Mode::Simple);
        assert_eq!(app.next_deadline(), Some(1_000));
        timer.set(995);
        assert_eq!(app.poll_interval(), Duration::from_millis(5));
        timer.set(1_000);
        assert_eq!(app.poll_interval(), Duration::ZERO);
        app.step(None);
        assert_eq!(app.phase(), Some(Phase::Countdown { remaining: 2 }));
        assert_eq!(app.poll_interval(), Duration::from_millis(10));
    }

    #[test_context(UsingLogger)]
    #[test]
    fn test_tap_is_judged_before_due_go_cue(_ctx: &mut UsingLogger) {
        let (mut app, timer) = logged_in(Mode::Simple);
        while app.phase() != Some(Phase::Waiting) {
            idle(&mut app, &timer);
        }
        // the tap arrives together with an overdue go cue
        let onset = app.next_deadline().unwrap();
        timer.set(onset + 5);
        let lines = app.step(Some(Command::Tap));

        assert!(lines.iter().any(|l| l.starts_with("False start!")));
        assert!(!lines.iter().any(|l| l.contains("0 ms")));
        assert!(!lines.iter().any(|l| l.contains("GO!")));
        assert_eq!(app.phase(), Some(Phase::Result(ResultKind::FalseStart)));
    }

    #[test]
    fn test_tap_applies_to_color_on_screen() {
        let (mut app, timer) = logged_in(Mode::Color);
        while app.phase() != Some(Phase::Playing) {
            idle(&mut app, &timer);
        }
        let closes = app.next_deadline().unwrap();
        timer.set(closes + 5);
        app.step(Some(Command::Tap));

        let game = app.game.as_ref().unwrap();
        let trials = game.trials();
        assert_eq!(trials.len(), 1);
        assert_eq!(trials[0].index, 0);
        assert!(trials[0].tapped);
        assert_ne!(trials[0].reaction_time_ms, Some(0));
        // the next color gets a full window from the tap
        assert_eq!(app.next_deadline(), Some(closes + 5 + 3_000));
    }

    #[test]
    fn test_stop_cancels_session() {
        let (mut app, timer) = app();
        app.handle(Command::Login {
            name: "Aoi".to_string(),
            user_type: UserType::Student,
        });
        app.handle(Command::Play {
            mode: Mode::Color,
            difficulty: None,
        });
        assert_eq!(
            app.handle(Command::Stop),
            vec!["Session abandoned, nothing recorded.".to_string()]
        );
        assert_eq!(app.phase(), None);
        timer.advance(60_000);
        assert!(app.tick().is_empty());
        assert!(app.storage().records().unwrap().is_empty());
        assert_eq!(app.handle(Command::Stop), vec!["Nothing is running.".to_string()]);
    }

    #[test]
    fn test_logout_returns_to_login() {
        let (mut app, _) = app();
        app.handle(Command::Login {
            name: "Aoi".to_string(),
            user_type: UserType::Student,
        });
        app.handle(Command::Play {
            mode: Mode::Sprint,
            difficulty: None,
        });
        app.handle(Command::Logout);
        assert_eq!(app.user(), None);
        assert_eq!(app.phase(), None);
        assert_eq!(app.storage().user().unwrap(), None);
        assert_eq!(
            app.handle(Command::History),
            vec!["Please log in first: login <name>".to_string()]
        );
    }

    #[test]
    fn test_invalid_login_is_reported() {
        let (mut app, _) = app();
        let lines = app.handle(Command::Login {
            name: "x".repeat(21),
            user_type: UserType::Student,
        });
        assert!(lines[0].starts_with("Login failed"));
        assert_eq!(app.user(), None);
    }

    #[test]
    fn test_ranking_and_history_after_session() {
        let (mut app, timer) = app();
        app.handle(Command::Login {
            name: "Aoi".to_string(),
            user_type: UserType::Student,
        });
        app.handle(Command::Play {
            mode: Mode::Simple,
            difficulty: None,
        });
        run_speed(&mut app, &timer, Some(190));

        let lines = app.handle(Command::Ranking(ModeFilter::All));
        assert!(lines.iter().any(|l| l == "Your rank: 🥇 (190 ms)"));
        let lines = app.handle(Command::Ranking(ModeFilter::Only(Mode::Color)));
        assert!(lines.iter().any(|l| l == "No records yet."));

        let lines = app.handle(Command::History);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("190 ms"));
    }

    #[test]
    fn test_greeting_and_quit() {
        let (mut app, _) = app();
        let lines = app.greeting();
        assert!(lines.iter().any(|l| l.starts_with("Please log in")));
        assert!(lines.iter().any(|l| l.starts_with("Ota City")));
        app.handle(Command::Quit);
        assert!(app.should_exit());
    }
}
