//! Next-frame deferral.
//!
//! There is one primitive: a single-shot slot that holds at most one pending
//! payload until the next frame boundary. Scheduling into an occupied slot
//! replaces the payload; nothing is ever queued.

use nodal_engine::coords::Vec2;

/// Single-shot slot for work deferred to the next frame.
#[derive(Debug)]
pub struct FrameSlot<T> {
    pending: Option<T>,
    name: &'static str,
}

impl<T> FrameSlot<T> {
    pub const fn new(name: &'static str) -> Self {
        Self { pending: None, name }
    }

    /// Schedules `payload`, superseding any pending one.
    pub fn schedule(&mut self, payload: T) {
        if self.pending.replace(payload).is_some() {
            log::trace!("{}: pending frame callback superseded", self.name);
        }
    }

    /// Takes the pending payload at the frame boundary.
    pub fn take(&mut self) -> Option<T> {
        self.pending.take()
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

/// Keeps only the latest event until the next frame.
#[derive(Debug)]
pub struct FrameThrottle<E> {
    slot: FrameSlot<E>,
}

impl<E> FrameThrottle<E> {
    pub const fn new(name: &'static str) -> Self {
        Self { slot: FrameSlot::new(name) }
    }

    pub fn push(&mut self, event: E) {
        self.slot.schedule(event);
    }

    pub fn take(&mut self) -> Option<E> {
        self.slot.take()
    }

    pub fn cancel(&mut self) {
        self.slot.cancel();
    }

    pub fn is_pending(&self) -> bool {
        self.slot.is_pending()
    }
}

/// One frame of a smooth zoom.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomStep {
    /// Screen-space anchor.
    pub anchor: Vec2,
    pub factor: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct ZoomRun {
    anchor: Vec2,
    per_frame: f32,
    frames_left: u32,
}

/// Smooth zoom spread over a fixed number of frames.
///
/// A total factor `f` over `n` frames applies `f^(1/n)` per frame, so the
/// completed run multiplies the radius by exactly `f` about a fixed anchor.
/// Starting a new run drops whatever is left of the previous one.
#[derive(Debug)]
pub struct ZoomAnimation {
    slot: FrameSlot<ZoomRun>,
}

impl Default for ZoomAnimation {
    fn default() -> Self {
        Self { slot: FrameSlot::new("zoom animation") }
    }
}

impl ZoomAnimation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self, anchor: Vec2, total_factor: f32, frames: u32) {
        if !total_factor.is_finite() || total_factor <= 0.0 {
            return;
        }
        let frames = frames.max(1);
        self.slot.schedule(ZoomRun {
            anchor,
            per_frame: total_factor.powf(1.0 / frames as f32),
            frames_left: frames,
        });
    }

    /// Advances one frame. Reschedules itself until the run is finished.
    pub fn tick(&mut self) -> Option<ZoomStep> {
        let run = self.slot.take()?;
        let step = ZoomStep { anchor: run.anchor, factor: run.per_frame };
        if run.frames_left > 1 {
            self.slot.schedule(ZoomRun { frames_left: run.frames_left - 1, ..run });
        }
        Some(step)
    }

    pub fn cancel(&mut self) {
        self.slot.cancel();
    }

    pub fn is_running(&self) -> bool {
        self.slot.is_pending()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    // ── slot ──────────────────────────────────────────────────────────────

    #[test]
    fn slot_keeps_only_latest() {
        let mut slot = FrameSlot::new("test");
        slot.schedule(1);
        slot.schedule(2);
        assert!(slot.is_pending());
        assert_eq!(slot.take(), Some(2));
        assert_eq!(slot.take(), None);
    }

    #[test]
    fn cancel_clears_pending() {
        let mut throttle = FrameThrottle::new("moves");
        throttle.push(Vec2::new(1.0, 1.0));
        throttle.cancel();
        assert!(!throttle.is_pending());
        assert_eq!(throttle.take(), None);
    }

    // ── zoom animation ────────────────────────────────────────────────────

    #[test]
    fn completed_run_multiplies_by_total_factor() {
        let mut anim = ZoomAnimation::new();
        anim.start(Vec2::new(5.0, 5.0), 1.25, 12);

        let mut total = 1.0;
        let mut frames = 0;
        while let Some(step) = anim.tick() {
            assert_eq!(step.anchor, Vec2::new(5.0, 5.0));
            total *= step.factor;
            frames += 1;
        }
        assert_eq!(frames, 12);
        assert_relative_eq!(total, 1.25, epsilon = 1e-4);
        assert!(!anim.is_running());
    }

    #[test]
    fn new_run_supersedes_in_flight_one() {
        let mut anim = ZoomAnimation::new();
        anim.start(Vec2::zero(), 2.0, 4);
        anim.tick();
        anim.start(Vec2::new(1.0, 1.0), 0.5, 2);

        let steps: Vec<ZoomStep> = std::iter::from_fn(|| anim.tick()).collect();
        assert_eq!(steps.len(), 2);
        assert!(steps.iter().all(|s| s.anchor == Vec2::new(1.0, 1.0)));
        assert_relative_eq!(steps[0].factor * steps[1].factor, 0.5, epsilon = 1e-5);
    }

    #[test]
    fn invalid_factor_is_ignored() {
        let mut anim = ZoomAnimation::new();
        anim.start(Vec2::zero(), -1.0, 4);
        assert!(!anim.is_running());
    }
}
