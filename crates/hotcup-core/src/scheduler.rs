//! Cooperative, frame-driven scheduling.
//!
//! All periodic work runs one step per animation frame. A step is a plain
//! [`FrameTask`] value rather than a closure; the session dispatches each due
//! task and the task's owner decides whether to schedule the next one.
//!
//! ```text
//! schedule_step(task) ──► pending ──begin_frame()──► in flight ──next_due()──► dispatch
//!                                                          ▲
//!                                   cancel(handle) removes from either queue
//! ```

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::feedback::ChannelRole;

/// Identifies a scheduled step so it can be cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StepHandle(u64);

/// Work that can be queued for the next frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FrameTask {
    CountdownTick,
    FadeStep { channel: ChannelRole, generation: u64 },
}

/// `scheduleStep(fn) -> handle` / `cancel(handle)`.
pub trait CooperativeScheduler<T> {
    fn schedule_step(&mut self, task: T) -> StepHandle;

    /// Cancelling an unknown or already-run handle is a no-op.
    fn cancel(&mut self, handle: StepHandle);
}

/// Single-threaded frame queue.
#[derive(Debug)]
pub struct FrameScheduler<T> {
    next_id: u64,
    pending: Vec<(StepHandle, T)>,
    in_flight: VecDeque<(StepHandle, T)>,
}

impl<T> Default for FrameScheduler<T> {
    fn default() -> Self {
        Self {
            next_id: 1,
            pending: Vec::new(),
            in_flight: VecDeque::new(),
        }
    }
}

impl<T> FrameScheduler<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Moves everything scheduled so far into the current frame.
    ///
    /// Steps scheduled while the frame is being dispatched land in the next one.
    pub fn begin_frame(&mut self) {
        debug_assert!(self.in_flight.is_empty(), "previous frame not drained");
        self.in_flight.extend(self.pending.drain(..));
    }

    /// Next step of the current frame, in scheduling order.
    pub fn next_due(&mut self) -> Option<(StepHandle, T)> {
        self.in_flight.pop_front()
    }

    pub fn is_scheduled(&self, handle: StepHandle) -> bool {
        self.pending.iter().any(|(h, _)| *h == handle)
            || self.in_flight.iter().any(|(h, _)| *h == handle)
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len() + self.in_flight.len()
    }

    /// True when no step is waiting for a future frame.
    pub fn is_idle(&self) -> bool {
        self.pending_len() == 0
    }
}

impl<T> CooperativeScheduler<T> for FrameScheduler<T> {
    fn schedule_step(&mut self, task: T) -> StepHandle {
        let handle = StepHandle(self.next_id);
        self.next_id += 1;
        self.pending.push((handle, task));
        handle
    }

    fn cancel(&mut self, handle: StepHandle) {
        self.pending.retain(|(h, _)| *h != handle);
        self.in_flight.retain(|(h, _)| *h != handle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(scheduler: &mut FrameScheduler<&'static str>) -> Vec<&'static str> {
        scheduler.begin_frame();
        let mut ran = Vec::new();
        while let Some((_, task)) = scheduler.next_due() {
            ran.push(task);
        }
        ran
    }

    #[test]
    fn steps_run_once_in_order() {
        let mut s = FrameScheduler::new();
        s.schedule_step("a");
        s.schedule_step("b");
        assert_eq!(drain(&mut s), vec!["a", "b"]);
        assert!(drain(&mut s).is_empty());
        assert!(s.is_idle());
    }

    #[test]
    fn cancel_removes_pending_step() {
        let mut s = FrameScheduler::new();
        let a = s.schedule_step("a");
        s.schedule_step("b");
        s.cancel(a);
        s.cancel(a);
        assert!(!s.is_scheduled(a));
        assert_eq!(drain(&mut s), vec!["b"]);
    }

    #[test]
    fn cancel_during_frame_skips_in_flight_step() {
        let mut s = FrameScheduler::new();
        s.schedule_step("a");
        let b = s.schedule_step("b");
        s.begin_frame();
        let (_, first) = s.next_due().unwrap();
        assert_eq!(first, "a");
        s.cancel(b);
        assert!(s.next_due().is_none());
    }

    #[test]
    fn steps_scheduled_mid_frame_wait_for_next_frame() {
        let mut s = FrameScheduler::new();
        s.schedule_step("a");
        s.begin_frame();
        let _ = s.next_due();
        s.schedule_step("again");
        assert!(s.next_due().is_none());
        assert_eq!(drain(&mut s), vec!["again"]);
    }
}
