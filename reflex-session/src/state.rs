use super::config::{JudgmentRules, ModeRules, SessionConfig, SpeedRules};
use super::summary::{MemoryResult, SessionSummary};
use super::trial::{ActiveTrial, TrialDurations, TrialTimestamps, draw_color, draw_digit};
use log::{debug, info, trace};
use rand::Rng;
use reflex_core::{Phase, ResultKind, Stimulus, Trial, TrialOutcome};
use reflex_timing::{Scheduler, Timer, TimerToken};
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_SESSION_ID: AtomicU64 = AtomicU64::new(1);

/// What a scheduled timer does when it fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerKind {
    CountdownTick,
    /// Sprint: "on your marks" hold is over, go to "set".
    Arm,
    /// Foreperiod is over, show the go cue.
    Onset,
    /// Color/dual response window closed without a tap.
    ResponseWindow,
    /// Result cooldown is over.
    Advance,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    Start,
    Tap,
    SubmitRecall(u32),
    Reset,
}

/// Notifications for whoever renders the session.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionSignal {
    PhaseChanged(Phase),
    StimulusShown { index: usize, stimulus: Stimulus },
    TrialRecorded(Trial),
    Completed(SessionSummary),
}

/// One game session, driven by polling `update` and feeding it input
/// through `handle_event`.
///
/// Every timer is armed under the current `(session, epoch)` token. Any
/// transition bumps the epoch and cancels what was pending, and a timer
/// whose token no longer matches is dropped when it comes due.
pub struct SessionMachine<T, R>
where
    T: Timer,
    R: Rng,
{
    pub config: SessionConfig,
    pub timer: T,
    rng: R,
    scheduler: Scheduler<TimerKind>,
    session_id: u64,
    epoch: u64,
    phase: Phase,
    current: Option<ActiveTrial>,
    trials: Vec<Trial>,
    memorized_digits: Vec<u8>,
    summary: Option<SessionSummary>,
}

impl<T, R> SessionMachine<T, R>
where
    T: Timer,
    R: Rng,
{
    pub fn new(config: SessionConfig, timer: T, rng: R) -> Self {
        Self {
            config,
            timer,
            rng,
            scheduler: Scheduler::new(),
            session_id: NEXT_SESSION_ID.fetch_add(1, Ordering::Relaxed),
            epoch: 0,
            phase: Phase::Intro,
            current: None,
            trials: Vec::new(),
            memorized_digits: Vec::new(),
            summary: None,
        }
    }

    pub fn token(&self) -> TimerToken {
        TimerToken {
            session: self.session_id,
            epoch: self.epoch,
        }
    }

    /// Fires every timer that is due and returns what changed. Each timer
    /// acts at its own deadline, so transitions it starts are timed from
    /// when they were scheduled rather than from this poll.
    pub fn update(&mut self) -> Vec<SessionSignal> {
        let mut signals = Vec::new();
        let now = self.timer.now();
        while let Some(fired) = self.scheduler.pop_due(now) {
            if fired.token != self.token() {
                trace!(target: "session", "Discarding stale {:?} timer {:?}", fired.kind, fired.token);
                continue;
            }
            self.fire(fired.kind, fired.deadline, &mut signals);
        }
        signals
    }

    pub fn handle_event(&mut self, event: SessionEvent) -> Vec<SessionSignal> {
        let mut signals = Vec::new();
        match (self.phase, event) {
            (Phase::Intro, SessionEvent::Start) => self.start(&mut signals),
            (phase, SessionEvent::Tap) if phase.accepts_tap() => self.tap(&mut signals),
            (Phase::NumberEntry, SessionEvent::SubmitRecall(sum)) => {
                self.submit_recall(sum, &mut signals)
            }
            (_, SessionEvent::Reset) => self.reset(&mut signals),
            (phase, event) => {
                trace!(target: "session", "Ignoring {:?} during {:?}", event, phase);
            }
        }
        signals
    }

    fn start(&mut self, signals: &mut Vec<SessionSignal>) {
        info!(
            target: "session",
            "Session {} started: {} ({})",
            self.session_id, self.config.mode, self.config.difficulty
        );
        let now = self.timer.now();
        let countdown = self.config.rules.countdown().clone();
        if countdown.ticks == 0 {
            self.begin_trial(now, signals);
            return;
        }
        self.enter(
            Phase::Countdown {
                remaining: countdown.ticks,
            },
            signals,
        );
        self.arm(now, countdown.interval_ms, TimerKind::CountdownTick);
    }

    fn fire(&mut self, kind: TimerKind, at: u64, signals: &mut Vec<SessionSignal>) {
        trace!(target: "session", "Timer {:?} fired during {:?} (due {})", kind, self.phase, at);
        match (kind, self.phase) {
            (TimerKind::CountdownTick, Phase::Countdown { remaining }) if remaining > 1 => {
                let interval = self.config.rules.countdown().interval_ms;
                self.enter(
                    Phase::Countdown {
                        remaining: remaining - 1,
                    },
                    signals,
                );
                self.arm(at, interval, TimerKind::CountdownTick);
            }
            (TimerKind::CountdownTick, Phase::Countdown { .. }) => self.begin_trial(at, signals),
            (TimerKind::Arm, Phase::Ready) => self.enter_set(at, signals),
            (TimerKind::Onset, Phase::Waiting | Phase::Set) => self.show_go_cue(at, signals),
            (TimerKind::ResponseWindow, Phase::Playing) => self.close_response_window(at, signals),
            (TimerKind::Advance, Phase::Result(_)) => self.begin_trial(at, signals),
            (kind, phase) => {
                trace!(target: "session", "Timer {:?} does not apply to {:?}", kind, phase);
            }
        }
    }

    /// Starts the next trial at time `at`, or wraps the session up.
    fn begin_trial(&mut self, at: u64, signals: &mut Vec<SessionSignal>) {
        let index = self.trials.len();
        if index >= self.config.rules.trials() {
            let needs_recall = matches!(
                self.config.rules,
                ModeRules::Judgment(JudgmentRules {
                    digit_chance: Some(_),
                    ..
                })
            );
            if needs_recall {
                self.enter(Phase::NumberEntry, signals);
            } else {
                self.finish(None, signals);
            }
            return;
        }

        match self.config.rules.clone() {
            ModeRules::Speed(rules) => self.begin_speed_trial(index, at, &rules, signals),
            ModeRules::Judgment(rules) => self.begin_judgment_trial(index, at, &rules, signals),
        }
    }

    fn begin_speed_trial(
        &mut self,
        index: usize,
        at: u64,
        rules: &SpeedRules,
        signals: &mut Vec<SessionSignal>,
    ) {
        let (lo, hi) = rules.foreperiod_range_ms;
        let durations = TrialDurations {
            ready_ms: rules.ready_ms,
            foreperiod_ms: self.rng.random_range(lo..=hi),
            response_window_ms: None,
        };
        debug!(
            target: "session",
            "Trial {} armed: ready {:?}ms, foreperiod {}ms", index, durations.ready_ms, durations.foreperiod_ms
        );

        match durations.ready_ms {
            Some(ready_ms) => {
                self.enter(Phase::Ready, signals);
                self.arm(at, ready_ms, TimerKind::Arm);
            }
            None => {
                self.enter(Phase::Waiting, signals);
                self.arm(at, durations.foreperiod_ms, TimerKind::Onset);
            }
        }
        self.current = Some(ActiveTrial {
            index,
            stimulus: Stimulus::Cue,
            durations,
            timestamps: TrialTimestamps::default(),
        });
    }

    fn begin_judgment_trial(
        &mut self,
        index: usize,
        at: u64,
        rules: &JudgmentRules,
        signals: &mut Vec<SessionSignal>,
    ) {
        let previous = self.trials.last().and_then(|t| t.stimulus.color());
        let color = draw_color(&mut self.rng, &rules.palette, previous);
        let digit = draw_digit(&mut self.rng, rules.digit_chance, rules.digit_range);
        if let Some(d) = digit {
            self.memorized_digits.push(d);
        }
        let stimulus = Stimulus::Color { color, digit };
        let durations = TrialDurations {
            response_window_ms: Some(rules.response_window_ms),
            ..Default::default()
        };

        if self.phase != Phase::Playing {
            self.enter(Phase::Playing, signals);
        } else {
            self.invalidate();
        }
        signals.push(SessionSignal::StimulusShown { index, stimulus });
        if let Some(window) = durations.response_window_ms {
            self.arm(at, window, TimerKind::ResponseWindow);
        }
        self.current = Some(ActiveTrial {
            index,
            stimulus,
            durations,
            timestamps: TrialTimestamps {
                onset: Some(at),
                response: None,
            },
        });
    }

    fn enter_set(&mut self, at: u64, signals: &mut Vec<SessionSignal>) {
        let foreperiod = self
            .current
            .as_ref()
            .map_or(0, |t| t.durations.foreperiod_ms);
        self.enter(Phase::Set, signals);
        self.arm(at, foreperiod, TimerKind::Onset);
    }

    fn show_go_cue(&mut self, at: u64, signals: &mut Vec<SessionSignal>) {
        self.enter(Phase::Go, signals);
        if let Some(trial) = &mut self.current {
            trial.timestamps.onset = Some(at);
            debug!(target: "session", "Go cue for trial {} at {}", trial.index, at);
            signals.push(SessionSignal::StimulusShown {
                index: trial.index,
                stimulus: trial.stimulus,
            });
        }
    }

    fn tap(&mut self, signals: &mut Vec<SessionSignal>) {
        let now = self.timer.now();
        let Some(mut active) = self.current.take() else {
            return;
        };
        active.timestamps.response = Some(now);

        let rules = self.config.rules.clone();
        match (&rules, self.phase) {
            (ModeRules::Speed(rules), phase) if phase.is_false_start_window() => {
                debug!(target: "session", "False start on trial {} during {:?}", active.index, phase);
                let cooldown = rules.false_start_cooldown_ms;
                self.record(&active, TrialOutcome::FalseStart, true, None, signals);
                self.show_result(ResultKind::FalseStart, now, cooldown, signals);
            }
            (ModeRules::Speed(rules), Phase::Go) => {
                let rt = active.reaction_time().unwrap_or(0);
                let too_fast = rules.min_valid_rt_ms.is_some_and(|min| rt < min);
                let (false_start, valid) = (rules.false_start_cooldown_ms, rules.result_cooldown_ms);
                if too_fast {
                    debug!(target: "session", "Anticipated start on trial {}: {}ms", active.index, rt);
                    self.record(&active, TrialOutcome::FalseStart, true, None, signals);
                    self.show_result(ResultKind::FalseStart, now, false_start, signals);
                } else {
                    self.record(&active, TrialOutcome::Correct, true, Some(rt), signals);
                    self.show_result(ResultKind::Valid, now, valid, signals);
                }
            }
            (ModeRules::Judgment(_), Phase::Playing) => {
                let rt = active.reaction_time().unwrap_or(0);
                if active.stimulus.requires_tap() {
                    self.record(&active, TrialOutcome::Correct, true, Some(rt), signals);
                } else {
                    self.record(&active, TrialOutcome::Incorrect, true, None, signals);
                }
                self.begin_trial(now, signals);
            }
            (_, phase) => {
                trace!(target: "session", "Tap has no effect during {:?}", phase);
                active.timestamps.response = None;
                self.current = Some(active);
            }
        }
    }

    /// Response window elapsed untapped: right for a no-go color, a miss for
    /// green.
    fn close_response_window(&mut self, at: u64, signals: &mut Vec<SessionSignal>) {
        let Some(active) = self.current.take() else {
            return;
        };
        let outcome = if active.stimulus.requires_tap() {
            TrialOutcome::Timeout
        } else {
            TrialOutcome::Correct
        };
        self.record(&active, outcome, false, None, signals);
        self.begin_trial(at, signals);
    }

    fn show_result(
        &mut self,
        kind: ResultKind,
        at: u64,
        cooldown_ms: u64,
        signals: &mut Vec<SessionSignal>,
    ) {
        self.enter(Phase::Result(kind), signals);
        self.arm(at, cooldown_ms, TimerKind::Advance);
    }

    fn submit_recall(&mut self, sum: u32, signals: &mut Vec<SessionSignal>) {
        let memory = MemoryResult {
            true_sum: self.memorized_digits.iter().map(|&d| d as u32).sum(),
            digits: self.memorized_digits.clone(),
            recalled_sum: sum,
        };
        debug!(
            target: "session",
            "Recall submitted: {} (actual {})", memory.recalled_sum, memory.true_sum
        );
        self.finish(Some(memory), signals);
    }

    fn finish(&mut self, memory: Option<MemoryResult>, signals: &mut Vec<SessionSignal>) {
        self.current = None;
        let summary = SessionSummary::new(
            self.config.mode,
            self.config.difficulty,
            self.trials.clone(),
            memory,
        );
        info!(
            target: "session",
            "Session {} complete: {} trials, {} correct, {}ms, score {:?}",
            self.session_id,
            summary.trials.len(),
            summary.correct_count,
            summary.reaction_time_ms,
            summary.score
        );
        self.enter(Phase::Complete, signals);
        self.summary = Some(summary.clone());
        signals.push(SessionSignal::Completed(summary));
    }

    /// Back to the intro screen as a brand-new session. Nothing armed before
    /// the reset can touch the new one.
    fn reset(&mut self, signals: &mut Vec<SessionSignal>) {
        let cancelled = self.scheduler.cancel_all();
        let old = self.session_id;
        self.session_id = NEXT_SESSION_ID.fetch_add(1, Ordering::Relaxed);
        self.epoch = 0;
        self.current = None;
        self.trials.clear();
        self.memorized_digits.clear();
        self.summary = None;
        debug!(
            target: "session",
            "Session {} reset as {} ({} timers cancelled)", old, self.session_id, cancelled
        );
        self.enter(Phase::Intro, signals);
    }

    /// Cancels everything pending. Called when the owner goes away.
    pub fn teardown(&mut self) {
        let cancelled = self.scheduler.cancel_all();
        self.epoch += 1;
        trace!(target: "session", "Session {} torn down, {} timers cancelled", self.session_id, cancelled);
    }

    fn record(
        &mut self,
        active: &ActiveTrial,
        outcome: TrialOutcome,
        tapped: bool,
        reaction_time_ms: Option<u64>,
        signals: &mut Vec<SessionSignal>,
    ) {
        let trial = Trial {
            index: active.index,
            stimulus: active.stimulus,
            outcome,
            tapped,
            reaction_time_ms,
        };
        trace!(target: "session", "Recorded {:?}", trial);
        self.trials.push(trial.clone());
        signals.push(SessionSignal::TrialRecorded(trial));
    }

    fn enter(&mut self, phase: Phase, signals: &mut Vec<SessionSignal>) {
        self.invalidate();
        debug!(target: "session", "Phase {:?} -> {:?}", self.phase, phase);
        self.phase = phase;
        signals.push(SessionSignal::PhaseChanged(phase));
    }

    /// Cancels the timers of the current epoch and opens a new one.
    fn invalidate(&mut self) {
        self.scheduler.cancel(self.token());
        self.epoch += 1;
    }

    /// Schedules `kind` for `delay_ms` after `from`.
    fn arm(&mut self, from: u64, delay_ms: u64, kind: TimerKind) {
        let deadline = from + delay_ms;
        let token = self.token();
        self.scheduler.schedule(token, deadline, kind);
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn session_id(&self) -> u64 {
        self.session_id
    }

    pub fn trials(&self) -> &[Trial] {
        &self.trials
    }

    pub fn memorized_digits(&self) -> &[u8] {
        &self.memorized_digits
    }

    pub fn current_stimulus(&self) -> Option<Stimulus> {
        match self.phase {
            Phase::Go | Phase::Playing => self.current.as_ref().map(|t| t.stimulus),
            _ => None,
        }
    }

    /// `(current, total)` with `current` counted from 1.
    pub fn trial_progress(&self) -> Option<(usize, usize)> {
        let total = self.config.rules.trials();
        match self.phase {
            Phase::Intro | Phase::Complete | Phase::NumberEntry => None,
            Phase::Result(_) => Some((self.trials.len(), total)),
            _ => Some(((self.trials.len() + 1).min(total), total)),
        }
    }

    pub fn summary(&self) -> Option<&SessionSummary> {
        self.summary.as_ref()
    }

    pub fn next_deadline(&self) -> Option<u64> {
        self.scheduler.next_deadline()
    }

    pub fn pending_timers(&self) -> usize {
        self.scheduler.len()
    }
}

impl<T: Timer, R: Rng> Drop for SessionMachine<T, R> {
    fn drop(&mut self) {
        self.teardown();
    }
}
