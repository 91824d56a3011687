use std::{collections::VecDeque, time::Duration};

use web_time::Instant;

pub const FRAME_TIME_SAMPLES: usize = 60;

/// Turns frame timestamps into deltas and keeps a short history of them.
#[derive(Debug)]
pub struct TickClock {
    frame_time_samples: usize,
    last_tick: Option<Instant>,
    frame_time: VecDeque<Duration>,
    frame_time_sum: Duration,
}

impl Default for TickClock {
    fn default() -> Self {
        Self::new(FRAME_TIME_SAMPLES)
    }
}

impl TickClock {
    pub fn new(frame_time_samples: usize) -> Self {
        Self {
            frame_time_samples: frame_time_samples.max(1),
            last_tick: None,
            frame_time: VecDeque::new(),
            frame_time_sum: Duration::ZERO,
        }
    }

    /// Time since the previous tick; zero on the first one or when the
    /// timestamp went backwards.
    pub fn tick(&mut self, now: Instant) -> Duration {
        let Some(last_tick) = self.last_tick.replace(now) else {
            return Duration::ZERO;
        };
        let delta = now.checked_duration_since(last_tick).unwrap_or_default();
        self.add_sample(delta);
        delta
    }

    fn add_sample(&mut self, frame_time: Duration) {
        self.frame_time.push_back(frame_time);
        self.frame_time_sum += frame_time;
        while self.frame_time.len() > self.frame_time_samples {
            if let Some(first_frame_time) = self.frame_time.pop_front() {
                self.frame_time_sum -= first_frame_time;
            }
        }
    }

    pub fn last_frame_time(&self) -> Option<&Duration> {
        self.frame_time.back()
    }

    pub fn avg_frame_time(&self) -> Option<Duration> {
        if self.frame_time.is_empty() {
            None
        } else {
            Some(self.frame_time_sum / self.frame_time.len() as u32)
        }
    }

    pub fn fps(&self) -> Option<f32> {
        self.avg_frame_time()
            .filter(|avg| !avg.is_zero())
            .map(|avg| 1.0 / avg.as_secs_f32())
    }
}
