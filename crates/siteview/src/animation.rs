use std::time::Duration;

use log::{debug, trace};

use crate::camera::CameraPose;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum AnimationState {
    #[default]
    Stopped,
    Running,
    Completed,
}

/// Moves a camera pose toward a target over a fixed time span.
///
/// The animator never schedules itself. The owner samples it once per
/// render tick, either with the total time since [`start`](Self::start) or
/// with the delta since the previous tick.
#[derive(Debug, Clone)]
pub struct CameraAnimator {
    from: CameraPose,
    to: CameraPose,
    current: CameraPose,
    duration_ms: f32,
    elapsed_ms: f32,
    state: AnimationState,
}

impl CameraAnimator {
    pub fn new(pose: CameraPose) -> Self {
        Self {
            from: pose,
            to: pose,
            current: pose,
            duration_ms: 0.0,
            elapsed_ms: 0.0,
            state: AnimationState::Stopped,
        }
    }

    /// An animation still in flight is replaced, and the new one departs
    /// from its last sampled pose instead of `from`.
    pub fn start(&mut self, from: CameraPose, to: CameraPose, duration_ms: f32) {
        let from = if self.state == AnimationState::Running {
            debug!(
                "Replacing camera animation toward {:?} at {:.0}/{:.0}ms",
                self.to.position, self.elapsed_ms, self.duration_ms
            );
            self.current
        } else {
            from
        };
        self.from = from;
        self.to = to;
        self.current = from;
        self.duration_ms = duration_ms.max(0.0);
        self.elapsed_ms = 0.0;
        self.state = AnimationState::Running;
        if self.duration_ms == 0.0 {
            self.finish();
        }
    }

    /// Start from wherever the camera is now.
    pub fn retarget(&mut self, to: CameraPose, duration_ms: f32) {
        self.start(self.current, to, duration_ms);
    }

    /// Sample the animation at `elapsed_ms` after its start. Negative or NaN
    /// times count as zero.
    pub fn tick(&mut self, elapsed_ms: f32) -> CameraPose {
        if self.state != AnimationState::Running {
            return self.current;
        }
        let elapsed_ms = elapsed_ms.max(0.0);
        self.elapsed_ms = elapsed_ms;
        if elapsed_ms >= self.duration_ms {
            self.finish();
        } else {
            let progress = elapsed_ms / self.duration_ms;
            self.current = self.from.lerp(&self.to, progress);
            trace!(
                "Camera animation progress: {:.3}, position {:?}",
                progress,
                self.current.position
            );
        }
        self.current
    }

    pub fn advance(&mut self, delta: Duration) -> CameraPose {
        let elapsed_ms = self.elapsed_ms + delta.as_secs_f32() * 1000.0;
        self.tick(elapsed_ms)
    }

    fn finish(&mut self) {
        self.current = self.to;
        self.elapsed_ms = self.duration_ms;
        self.state = AnimationState::Completed;
    }

    pub fn is_complete(&self) -> bool {
        self.state != AnimationState::Running
    }

    pub fn state(&self) -> AnimationState {
        self.state
    }

    pub fn current(&self) -> CameraPose {
        self.current
    }

    pub fn target(&self) -> CameraPose {
        self.to
    }

    pub fn elapsed_ms(&self) -> f32 {
        self.elapsed_ms
    }

    pub fn duration_ms(&self) -> f32 {
        self.duration_ms
    }
}

#[cfg(test)]
mod test {
    use std::time::Duration;

    use glam::Vec3;

    use crate::camera::CameraPose;

    use super::{AnimationState, CameraAnimator};

    fn poses() -> (CameraPose, CameraPose) {
        (
            CameraPose::new(Vec3::new(0.0, 70.0, 0.0), Vec3::ZERO),
            CameraPose::new(Vec3::new(5.0, 20.0, 25.0), Vec3::new(5.0, 10.0, 5.0)),
        )
    }

    #[test]
    fn test_tick_at_duration_is_exact_target() {
        let (from, to) = poses();
        let mut animator = CameraAnimator::new(from);
        animator.start(from, to, 700.0);
        assert!(!animator.is_complete());
        assert_eq!(animator.tick(700.0), to);
        assert!(animator.is_complete());
        assert_eq!(animator.tick(1400.0), to);
    }

    #[test]
    fn test_tick_half_is_midpoint() {
        let (from, to) = poses();
        let mut animator = CameraAnimator::new(from);
        animator.start(from, to, 700.0);
        let pose = animator.tick(350.0);
        assert!(pose
            .position
            .abs_diff_eq((from.position + to.position) / 2.0, 1e-5));
        assert!(pose
            .look_at
            .abs_diff_eq((from.look_at + to.look_at) / 2.0, 1e-5));
    }

    #[test]
    fn test_negative_time_clamped() {
        let (from, to) = poses();
        let mut animator = CameraAnimator::new(from);
        animator.start(from, to, 700.0);
        assert_eq!(animator.tick(-50.0), from);
        assert_eq!(animator.tick(f32::NAN), from);
        assert!(!animator.is_complete());
    }

    #[test]
    fn test_replace_starts_from_last_sample() {
        let (from, to) = poses();
        let mut animator = CameraAnimator::new(from);
        animator.start(from, to, 1000.0);
        let sampled = animator.tick(250.0);

        let other = CameraPose::new(Vec3::new(-10.0, 30.0, 0.0), Vec3::new(-10.0, 0.0, 0.0));
        animator.start(from, other, 1000.0);
        assert_eq!(animator.current(), sampled);
        assert_eq!(animator.tick(0.0), sampled);
        assert_eq!(animator.target(), other);
    }

    #[test]
    fn test_start_after_completion_uses_given_from() {
        let (from, to) = poses();
        let mut animator = CameraAnimator::new(from);
        animator.start(from, to, 100.0);
        animator.tick(100.0);
        animator.start(to, from, 100.0);
        assert_eq!(animator.tick(0.0), to);
    }

    #[test]
    fn test_zero_duration_completes_immediately() {
        let (from, to) = poses();
        let mut animator = CameraAnimator::new(from);
        animator.start(from, to, 0.0);
        assert!(animator.is_complete());
        assert_eq!(animator.current(), to);
        assert_eq!(animator.state(), AnimationState::Completed);
    }

    #[test]
    fn test_advance_accumulates_deltas() {
        let (from, to) = poses();
        let mut animator = CameraAnimator::new(from);
        animator.retarget(to, 100.0);
        animator.advance(Duration::from_millis(40));
        animator.advance(Duration::from_millis(40));
        assert!(!animator.is_complete());
        assert_eq!(animator.advance(Duration::from_millis(40)), to);
    }

    #[test]
    fn test_idle_animator_keeps_pose() {
        let (from, _) = poses();
        let mut animator = CameraAnimator::new(from);
        assert!(animator.is_complete());
        assert_eq!(animator.tick(500.0), from);
        assert_eq!(animator.state(), AnimationState::Stopped);
    }
}
