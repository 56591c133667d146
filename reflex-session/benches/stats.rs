use criterion::{Criterion, black_box, criterion_group, criterion_main};
use reflex_core::{Color, Difficulty, Mode, Stimulus, Trial, TrialOutcome};
use reflex_session::{SessionSummary, compute_stats};

fn reaction_times(n: u64) -> Vec<u64> {
    (0..n).map(|i| 150 + (i * 37) % 220).collect()
}

fn color_trials(n: usize) -> Vec<Trial> {
    (0..n)
        .map(|index| {
            let go = index % 3 == 0;
            Trial {
                index,
                stimulus: Stimulus::Color {
                    color: if go { Color::Green } else { Color::Blue },
                    digit: None,
                },
                outcome: TrialOutcome::Correct,
                tapped: go,
                reaction_time_ms: go.then_some(200 + index as u64),
            }
        })
        .collect()
}

fn bench_stats(c: &mut Criterion) {
    let samples = reaction_times(1_000);
    c.bench_function("compute_stats_1000", |b| {
        b.iter(|| compute_stats(black_box(&samples)))
    });

    let trials = color_trials(25);
    c.bench_function("color_summary_25", |b| {
        b.iter(|| {
            SessionSummary::new(
                Mode::Color,
                Difficulty::Hard,
                black_box(trials.clone()),
                None,
            )
        })
    });
}

criterion_group!(benches, bench_stats);
criterion_main!(benches);
