use std::{
    thread,
    time::{Duration, Instant},
};

// Based on: https://stackoverflow.com/a/33554241
/// Frame pacing for the event loop. With a target of `0` the loop runs
/// uncapped and only the frame time is measured.
#[derive(Debug, Clone)]
pub struct Timing {
    fps: u32,
    fps_start_time: Instant,
    fps_frame_count: u32,

    last_time: Instant,
    frame_time: f64,
}

impl Timing {
    pub fn new(tick_rate: u32) -> Timing {
        Timing {
            fps: tick_rate,
            fps_start_time: Instant::now(),
            fps_frame_count: 0,
            frame_time: 0.0,
            last_time: Instant::now(),
        }
    }

    pub fn sleep(&mut self) {
        if self.fps > 60 {
            let freq: u64 = 1_000_000_000; // Nanoseconds per second
            let mut frame = Instant::now();

            while (frame.duration_since(self.fps_start_time).as_nanos() as u64 * self.fps as u64)
                < (freq * self.fps_frame_count as u64)
            {
                let target = Duration::from_nanos(freq * self.fps_frame_count as u64 / self.fps as u64);
                let spent = frame.duration_since(self.fps_start_time);

                if let Some(remaining) = target.checked_sub(spent) {
                    thread::sleep(remaining.min(Duration::from_millis(1)));
                }

                frame = Instant::now();
            }

            self.fps_frame_count += 1;
            if self.fps_frame_count > self.fps || self.fps_start_time.elapsed().as_secs() >= 1 {
                self.fps_frame_count = 1;
                self.fps_start_time = Instant::now();
            }

            self.frame_time = self.last_time.elapsed().as_secs_f64();
            self.last_time = Instant::now();
        } else {
            let delta_in_seconds = self.last_time.elapsed().as_secs_f64();

            if self.fps > 0 {
                let sleep_time = 1.0 / self.fps as f64 - delta_in_seconds;
                if sleep_time > 0.0 {
                    thread::sleep(Duration::from_secs_f64(sleep_time));
                }
            }

            self.frame_time = self.last_time.elapsed().as_secs_f64();
            self.last_time = Instant::now();
        }
    }

    pub fn get_fps(&self) -> u32 {
        if self.frame_time <= 0.0 {
            return 0;
        }

        (1.0 / self.frame_time) as u32
    }

    pub fn set_fps(&mut self, fps: u32) {
        self.fps = fps;
    }

    pub fn get_target_fps(&self) -> u32 {
        self.fps
    }

    pub fn get_frame_time(&self) -> f64 {
        self.frame_time
    }
}

/// Monotonic stopwatch, started on creation.
#[derive(Debug, Clone, Copy)]
pub struct Clock {
    start: Instant,
    last: Instant,
}

impl Clock {
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            start: now,
            last: now,
        }
    }

    /// Time since the clock was created.
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Time since the previous call to [Clock::tick] (or since creation).
    pub fn tick(&mut self) -> Duration {
        let now = Instant::now();
        let delta = now.duration_since(self.last);
        self.last = now;
        delta
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}
