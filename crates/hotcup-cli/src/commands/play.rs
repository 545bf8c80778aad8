use std::io::Write;
use std::time::Duration;

use clap::Args;
use hotcup_core::{AudioDeck, Config, Direction, Event, GameSession, HapticDevice, MonotonicClock};

use crate::terminal::{TerminalBell, TerminalChannel};

#[derive(Args)]
pub struct PlayArgs {
    /// Number of rounds to play
    #[arg(long, default_value = "1")]
    rounds: u32,
    /// Fixed random seed (overrides config)
    #[arg(long)]
    seed: Option<u64>,
    /// Pause between rounds, in milliseconds
    #[arg(long, default_value = "3000")]
    pause_ms: u64,
    /// Frames per second
    #[arg(long, default_value = "60")]
    fps: u32,
    /// Do not ring the terminal bell on explosion
    #[arg(long)]
    no_bell: bool,
}

fn arrow(direction: Direction) -> &'static str {
    match direction {
        Direction::Cw => "↻",
        Direction::Ccw => "↺",
    }
}

fn danger_bar(intensity: f64) -> String {
    let filled = (intensity * 2.0).round().clamp(0.0, 10.0) as usize;
    format!("[{}{}]", "#".repeat(filled), ".".repeat(10 - filled))
}

pub fn run(args: PlayArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = Config::load_or_default();
    if args.seed.is_some() {
        config.seed = args.seed;
    }

    let deck = AudioDeck::new(
        TerminalChannel::new("tension"),
        TerminalChannel::new("impact"),
        TerminalChannel::new("ambient"),
    );
    let haptics: Option<Box<dyn HapticDevice>> = if args.no_bell {
        None
    } else {
        Some(Box::new(TerminalBell))
    };
    let mut session = GameSession::from_config(&config, MonotonicClock::new(), deck, haptics)?;
    let frame = Duration::from_secs_f64(1.0 / args.fps.max(1) as f64);
    let mut stdout = std::io::stdout();

    for round in 1..=args.rounds.max(1) {
        session.start();
        println!("Round {round}: pass the cup! {}", arrow(session.direction()));

        loop {
            if let Some(Event::Exploded { mission, title, .. }) = session.frame() {
                println!("\r{:<40}", "");
                println!("💥 {title}");
                println!("   {mission}");
                break;
            }
            if let Some(reading) = session.reading() {
                print!(
                    "\r{:>6.2}s {} {}",
                    reading.remaining_secs,
                    danger_bar(reading.intensity),
                    arrow(session.direction())
                );
                stdout.flush()?;
            }
            std::thread::sleep(frame);
        }

        if round < args.rounds {
            idle_frames(&mut session, args.pause_ms, frame, false);
            session.restart();
        }
    }

    session.restart();
    idle_frames(&mut session, 1_000, frame, true);
    Ok(())
}

/// Keeps fades running for up to `ms` without a countdown.
fn idle_frames(
    session: &mut GameSession<MonotonicClock>,
    ms: u64,
    frame: Duration,
    until_settled: bool,
) {
    let until = session.now_ms() + ms;
    while session.now_ms() < until {
        session.frame();
        if until_settled && session.is_settled() {
            break;
        }
        std::thread::sleep(frame);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bar_fills_with_intensity() {
        assert_eq!(danger_bar(0.0), "[..........]");
        assert_eq!(danger_bar(5.0), "[##########]");
        assert_eq!(danger_bar(2.5), "[#####.....]");
    }
}
