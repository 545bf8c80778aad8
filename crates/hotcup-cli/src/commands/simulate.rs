use chrono::Utc;
use clap::Args;
use hotcup_core::{
    AudioDeck, Clock, Config, Event, GamePhase, GameSession, ManualClock, MemoryChannel,
    MemoryHaptics,
};
use serde::Serialize;

#[derive(Args)]
pub struct SimulateArgs {
    /// Random seed (defaults to the configured seed, then the current time)
    #[arg(long)]
    seed: Option<u64>,
    /// Simulated frame length in milliseconds
    #[arg(long, default_value = "16")]
    frame_ms: u64,
    /// Toggle the passing direction every N milliseconds of play
    #[arg(long)]
    toggle_every_ms: Option<u64>,
    /// Stop at the explosion instead of restarting
    #[arg(long)]
    no_restart: bool,
    /// Print a JSON report instead of text
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct SimulationReport {
    seed: u64,
    frames: u64,
    events: Vec<Event>,
    final_state: Event,
    ambient_volume: f32,
    haptic_pulses: usize,
}

fn settle(
    session: &mut GameSession<ManualClock>,
    clock: &ManualClock,
    frame_ms: u64,
    frames: &mut u64,
) {
    // Fades are bounded by their duration; cap in case one is configured absurdly long.
    for _ in 0..10_000 {
        if session.is_settled() {
            return;
        }
        clock.advance(frame_ms);
        *frames += 1;
        session.frame();
    }
}

pub fn run(args: SimulateArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = Config::load_or_default();
    let seed = args
        .seed
        .or(config.seed)
        .unwrap_or_else(|| Utc::now().timestamp_nanos_opt().unwrap_or_default() as u64);
    config.seed = Some(seed);

    let clock = ManualClock::new();
    let ambient = MemoryChannel::new();
    let haptics = MemoryHaptics::new();
    let deck = AudioDeck::new(MemoryChannel::new(), MemoryChannel::new(), ambient.clone());
    let mut session =
        GameSession::from_config(&config, clock.clone(), deck, Some(Box::new(haptics.clone())))?;

    let frame_ms = args.frame_ms.max(1);
    let deadline = (config.countdown.max_secs as u64 + 1) * 1000;
    let mut frames = 0u64;
    let mut events = Vec::new();
    let mut next_toggle = args.toggle_every_ms.filter(|ms| *ms > 0);

    events.extend(session.start());
    while session.phase() == GamePhase::Playing {
        clock.advance(frame_ms);
        frames += 1;
        if let (Some(at), Some(every)) = (next_toggle, args.toggle_every_ms) {
            if clock.now_ms() >= at {
                events.push(session.toggle_direction());
                next_toggle = Some(at + every);
            }
        }
        events.extend(session.frame());
        if clock.now_ms() > deadline + frame_ms {
            return Err("countdown never exploded".into());
        }
    }
    settle(&mut session, &clock, frame_ms, &mut frames);

    if !args.no_restart {
        events.extend(session.restart());
        settle(&mut session, &clock, frame_ms, &mut frames);
    }

    let report = SimulationReport {
        seed,
        frames,
        events,
        final_state: session.snapshot(),
        ambient_volume: ambient.current_volume(),
        haptic_pulses: haptics.patterns().len(),
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("seed {} · {} frames of {frame_ms}ms", report.seed, report.frames);
    for event in &report.events {
        match event {
            Event::GameStarted { duration_secs, .. } => {
                println!("  started   countdown {duration_secs}s")
            }
            Event::DirectionToggled { direction, .. } => println!("  toggled   {direction:?}"),
            Event::Exploded {
                title,
                mission,
                exploded_at_ms,
                ..
            } => println!("  exploded  at {exploded_at_ms}ms: {title} / {mission}"),
            Event::Restarted { .. } => println!("  restarted"),
            Event::StateSnapshot { .. } => {}
        }
    }
    println!(
        "ambient volume {:.2}, haptic pulses {}",
        report.ambient_volume, report.haptic_pulses
    );
    Ok(())
}
