//! Text rendering of session signals and results for the console.

use reflex_core::{Color, Mode, Phase, ResultKind, Stimulus, Trial, TrialOutcome};
use reflex_session::evaluation::{accuracy_verdict, sprint_impact};
use reflex_session::{SessionSignal, SessionSummary, classify, classify_composite_score};
use reflex_store::{Record, Ranking, rank_label};

/// Truecolor foreground escape for a stimulus color.
pub fn paint(color: Color, text: &str) -> String {
    let [r, g, b, _] = color.rgba();
    format!("\x1b[1;38;2;{r};{g};{b}m{text}\x1b[0m")
}

pub fn phase_line(phase: Phase, progress: Option<(usize, usize)>) -> Option<String> {
    let counter = progress.map_or(String::new(), |(n, total)| format!("[{n}/{total}] "));
    let line = match phase {
        Phase::Intro => return None,
        Phase::Countdown { remaining } => format!("{remaining}..."),
        Phase::Ready => format!("{counter}On your marks..."),
        Phase::Set => format!("{counter}Set..."),
        Phase::Waiting => format!("{counter}Wait for it..."),
        // the go cue and color stimuli are rendered from StimulusShown
        Phase::Go | Phase::Playing => return None,
        Phase::Result(ResultKind::FalseStart) => "False start! Wait for the signal.".to_string(),
        Phase::Result(ResultKind::Valid) => return None,
        Phase::NumberEntry => "What was the sum of the digits? (type the number)".to_string(),
        Phase::Complete => "Finished!".to_string(),
    };
    Some(line)
}

pub fn stimulus_line(mode: Mode, stimulus: Stimulus, progress: Option<(usize, usize)>) -> String {
    let counter = progress.map_or(String::new(), |(n, total)| format!("[{n}/{total}] "));
    match stimulus {
        Stimulus::Cue if mode == Mode::Sprint => format!("{counter}BANG! Go!"),
        Stimulus::Cue => format!("{counter}GO! Press Enter!"),
        Stimulus::Color { color, digit } => {
            let swatch = paint(color, &format!("■ {}", color.name().to_uppercase()));
            match digit {
                Some(d) => format!("{counter}{swatch}   remember: {d}"),
                None => format!("{counter}{swatch}"),
            }
        }
    }
}

/// Feedback right after a speed trial. Judgment trials stay silent until the
/// summary so the player is not distracted.
pub fn trial_line(mode: Mode, trial: &Trial) -> Option<String> {
    if !mode.is_speed() {
        return None;
    }
    match (trial.outcome, trial.reaction_time_ms) {
        (TrialOutcome::Correct, Some(rt)) => Some(format!("{rt} ms {}", classify(rt as f64).emoji)),
        _ => None,
    }
}

pub fn signal_lines(mode: Mode, signal: &SessionSignal, progress: Option<(usize, usize)>) -> Vec<String> {
    match signal {
        SessionSignal::PhaseChanged(phase) => phase_line(*phase, progress).into_iter().collect(),
        SessionSignal::StimulusShown { stimulus, .. } => vec![stimulus_line(mode, *stimulus, progress)],
        SessionSignal::TrialRecorded(trial) => trial_line(mode, trial).into_iter().collect(),
        SessionSignal::Completed(summary) => summary_lines(summary),
    }
}

pub fn summary_lines(summary: &SessionSummary) -> Vec<String> {
    let mut lines = vec![format!("== {} results ==", summary.mode.display_name())];
    if let Some(difficulty) = summary.difficulty {
        lines.push(format!("Difficulty: {difficulty}"));
    }

    if summary.mode.is_speed() {
        match &summary.stats {
            Some(stats) => {
                let eval = classify(stats.average as f64);
                lines.push(format!("{} {}  {}", eval.emoji, eval.label, eval.message));
                lines.push(format!(
                    "Average {} ms  fastest {} ms  slowest {} ms  consistency {} (±{} ms)",
                    stats.average,
                    stats.fastest,
                    stats.slowest,
                    stats.consistency.label(),
                    stats.std_dev
                ));
                let impact = sprint_impact(stats.average as f64);
                lines.push(format!(
                    "At the start: {:.3} s reaction, {:.3} s to gain. {}",
                    impact.start_advantage_s, impact.improvement_potential_s, eval.sprint_impact
                ));
            }
            None => lines.push("No valid attempts.".to_string()),
        }
        if summary.false_starts > 0 {
            lines.push(format!("False starts: {}", summary.false_starts));
        }
    } else {
        let accuracy = summary.accuracy_pct.unwrap_or(0);
        let score = summary.score.unwrap_or(0);
        if summary.mode == Mode::Dual {
            let eval = classify_composite_score(score as f64);
            lines.push(format!("{} {}  {}", eval.emoji, eval.label, eval.message));
            lines.push(format!("Sprint: {}", eval.sprint_impact));
        } else {
            let verdict = accuracy_verdict(accuracy as f64);
            lines.push(format!("{} {}", verdict.emoji, verdict.message));
        }
        lines.push(format!(
            "Score {score}  accuracy {accuracy}%  correct {}/{}",
            summary.correct_count,
            summary.trials.len()
        ));
        if summary.stats.is_some() {
            lines.push(format!("Average reaction {} ms", summary.reaction_time_ms));
        }
        if let Some(memory) = &summary.memory {
            let digits: Vec<String> = memory.digits.iter().map(u8::to_string).collect();
            lines.push(format!(
                "Digits {} = {}, you answered {} {}",
                digits.join(" + "),
                memory.true_sum,
                memory.recalled_sum,
                if memory.is_exact() { "✓" } else { "✗" }
            ));
        }
    }
    lines
}

pub fn ranking_lines(ranking: &Ranking, user_id: Option<&str>) -> Vec<String> {
    let mut lines = vec![format!("== Ranking ({}) ==", ranking.filter)];
    if ranking.is_empty() {
        lines.push("No records yet.".to_string());
        return lines;
    }
    if let Some(id) = user_id {
        match (ranking.user_rank(id), ranking.user_best(id)) {
            (Some(rank), Some(best)) => lines.push(format!(
                "Your rank: {} ({} ms)",
                rank_label(rank),
                best.reaction_time_ms
            )),
            _ => lines.push("You are not on the board yet.".to_string()),
        }
    }
    for (rank, record) in ranking.entries() {
        let marker = if Some(record.user_id.as_str()) == user_id { "*" } else { " " };
        lines.push(format!(
            "{marker}{:>5} {:<20} {:>5} ms {} {}",
            rank_label(rank),
            record.user_name,
            record.reaction_time_ms,
            classify(record.reaction_time_ms as f64).emoji,
            record.mode.display_name()
        ));
    }
    lines.push(format!(
        "{} records, {} participants, average {} ms, best {} ms",
        ranking.len(),
        ranking.participants(),
        ranking.average_ms().unwrap_or(0),
        ranking.best_ms().unwrap_or(0)
    ));
    lines
}

pub fn history_lines(records: &[Record]) -> Vec<String> {
    if records.is_empty() {
        return vec!["No records yet.".to_string()];
    }
    records
        .iter()
        .rev()
        .map(|r| {
            let mut line = format!(
                "{}  {:<15} {:>5} ms",
                r.created_at.format("%Y-%m-%d %H:%M"),
                r.mode.display_name(),
                r.reaction_time_ms
            );
            if let Some(score) = r.score {
                line.push_str(&format!("  score {score}"));
            }
            if let Some(accuracy) = r.accuracy_pct {
                line.push_str(&format!("  accuracy {accuracy}%"));
            }
            line
        })
        .collect()
}
