//! Integration tests for the random draws behind a round.

use hotcup_core::missions::{DEFAULT_MISSIONS, DEFAULT_TITLES};
use hotcup_core::random::seeded;
use hotcup_core::{CountdownEngine, MissionSelector};

/// Chi-square critical value for 10 degrees of freedom at p = 0.001.
const CHI2_DF10_P001: f64 = 29.588;
/// Chi-square critical value for 28 degrees of freedom at p = 0.001.
const CHI2_DF28_P001: f64 = 56.893;

#[test]
fn test_duration_distribution_is_uniform() {
    let mut rng = seeded(2024);
    let mut counts = [0u32; 11];

    for _ in 0..1000 {
        let mut engine = CountdownEngine::default();
        let run = engine.start(0, &mut rng);
        assert!((5..=15).contains(&run.duration_secs), "drew {}", run.duration_secs);
        counts[(run.duration_secs - 5) as usize] += 1;
    }

    let expected = 1000.0 / 11.0;
    let chi2: f64 = counts
        .iter()
        .map(|&c| (c as f64 - expected).powi(2) / expected)
        .sum();
    assert!(counts.iter().all(|&c| c > 0), "missing durations: {counts:?}");
    assert!(chi2 < CHI2_DF10_P001, "chi2 = {chi2}, counts = {counts:?}");
}

#[test]
fn test_durations_are_drawn_fresh_each_round() {
    let mut rng = seeded(5);
    let mut engine = CountdownEngine::default();
    let mut durations = Vec::new();
    for round in 0..50 {
        let run = engine.start(round * 20_000, &mut rng);
        durations.push(run.duration_secs);
        let _ = engine.tick(run.ends_at_ms);
    }
    durations.sort_unstable();
    durations.dedup();
    assert!(durations.len() > 1, "every round drew the same duration");
}

#[test]
fn test_mission_and_title_coverage_and_independence() {
    let selector = MissionSelector::default();
    let mut rng = seeded(99);
    let missions = DEFAULT_MISSIONS.len();
    let titles = DEFAULT_TITLES.len();
    let mut table = vec![vec![0u32; titles]; missions];
    let draws = 10_000;

    for _ in 0..draws {
        let result = selector.pick(&mut rng);
        let m = DEFAULT_MISSIONS
            .iter()
            .position(|s| *s == result.mission)
            .expect("mission from the fixed table");
        let t = DEFAULT_TITLES
            .iter()
            .position(|s| *s == result.title)
            .expect("title from the fixed table");
        table[m][t] += 1;
    }

    let row_totals: Vec<f64> = table.iter().map(|r| r.iter().sum::<u32>() as f64).collect();
    let col_totals: Vec<f64> = (0..titles)
        .map(|t| table.iter().map(|r| r[t]).sum::<u32>() as f64)
        .collect();
    assert!(row_totals.iter().all(|&n| n > 0.0), "a mission was never drawn");
    assert!(col_totals.iter().all(|&n| n > 0.0), "a title was never drawn");

    let n = draws as f64;
    let mut chi2 = 0.0;
    for m in 0..missions {
        for t in 0..titles {
            let expected = row_totals[m] * col_totals[t] / n;
            chi2 += (table[m][t] as f64 - expected).powi(2) / expected;
        }
    }
    assert!(chi2 < CHI2_DF28_P001, "mission/title correlation: chi2 = {chi2}");
}
