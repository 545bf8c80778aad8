//! Integration tests for frame-driven volume fades.

use hotcup_core::feedback::FadeProgress;
use hotcup_core::{
    AudioChannel, ChannelRole, FadeController, FadeTask, FrameScheduler, FrameTask, MemoryChannel,
};

struct Bench {
    fades: FadeController,
    channel: MemoryChannel,
    scheduler: FrameScheduler<FrameTask>,
    now_ms: u64,
}

impl Bench {
    fn new(volume: f32) -> Self {
        let mut channel = MemoryChannel::new();
        channel.set_volume(volume);
        Self {
            fades: FadeController::new(),
            channel,
            scheduler: FrameScheduler::new(),
            now_ms: 0,
        }
    }

    fn fade_to(&mut self, target: f32, duration_ms: u64) -> u64 {
        self.fades.fade_to(
            ChannelRole::Ambient,
            &self.channel,
            FadeTask::new(target, duration_ms),
            self.now_ms,
            &mut self.scheduler,
        )
    }

    /// Advances time and runs one frame.
    fn frame_after(&mut self, ms: u64) -> Vec<FadeProgress> {
        self.now_ms += ms;
        self.scheduler.begin_frame();
        let mut out = Vec::new();
        while let Some((_, task)) = self.scheduler.next_due() {
            if let FrameTask::FadeStep { channel, generation } = task {
                out.push(self.fades.step(
                    channel,
                    generation,
                    &mut self.channel,
                    self.now_ms,
                    &mut self.scheduler,
                ));
            }
        }
        out
    }
}

#[test]
fn test_fade_reaches_midpoint_then_target_exactly() {
    let mut bench = Bench::new(0.0);
    bench.fade_to(1.0, 1000);

    bench.frame_after(500);
    assert!((bench.channel.current_volume() - 0.5).abs() < 0.01);

    let progress = bench.frame_after(500);
    assert_eq!(progress, vec![FadeProgress::Finished]);
    assert_eq!(bench.channel.current_volume(), 1.0);

    let writes = bench.channel.state().volume_history.len();
    for _ in 0..10 {
        assert!(bench.frame_after(16).is_empty());
    }
    assert_eq!(bench.channel.state().volume_history.len(), writes);
    assert!(bench.scheduler.is_idle());
}

#[test]
fn test_newer_fade_wins() {
    let mut bench = Bench::new(0.0);
    bench.fade_to(0.2, 1000);
    for _ in 0..12 {
        bench.frame_after(16);
    }
    let second_started = bench.now_ms;
    let mid_fade = bench.channel.current_volume();
    assert!(mid_fade > 0.0 && mid_fade < 0.2);

    bench.fade_to(0.8, 500);
    let writes_before = bench.channel.state().volume_history.len();
    while bench.now_ms < second_started + 700 {
        bench.frame_after(16);
    }

    assert_eq!(bench.channel.current_volume(), 0.8);
    let history = bench.channel.state().volume_history;
    let after_second = &history[writes_before..];
    assert!(after_second.windows(2).all(|w| w[0] <= w[1]), "volume dipped: {after_second:?}");
    assert!(after_second.iter().all(|v| *v >= mid_fade));
}

#[test]
fn test_superseded_fade_starts_from_current_volume() {
    let mut bench = Bench::new(0.0);
    bench.fade_to(1.0, 1000);
    bench.frame_after(250);
    let captured = bench.channel.current_volume();

    bench.fade_to(0.0, 1000);
    bench.frame_after(500);
    let expected = captured / 2.0;
    assert!((bench.channel.current_volume() - expected).abs() < 0.01);
}

#[test]
fn test_fades_on_different_channels_are_independent() {
    let mut bench = Bench::new(0.5);
    let mut other = MemoryChannel::new();
    other.set_volume(0.0);

    bench.fade_to(0.0, 100);
    bench.fades.fade_to(
        ChannelRole::Tension,
        &other,
        FadeTask::new(1.0, 100),
        bench.now_ms,
        &mut bench.scheduler,
    );
    assert!(bench.fades.is_fading(ChannelRole::Ambient));
    assert!(bench.fades.is_fading(ChannelRole::Tension));
}
