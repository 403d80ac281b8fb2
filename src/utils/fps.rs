use std::time::{Duration, Instant};

pub struct FPSCounter {
    last_update_time: Instant,
    frames_since_last_update: u32,
}

impl FPSCounter {
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    pub fn starting_at(now: Instant) -> Self {
        FPSCounter { last_update_time: now, frames_since_last_update: 0 }
    }

    /// Call once per presented frame. Returns `Some(fps)` roughly once per second.
    pub fn update(&mut self) -> Option<u32> {
        self.update_at(Instant::now())
    }

    pub fn update_at(&mut self, now: Instant) -> Option<u32> {
        self.frames_since_last_update += 1;
        if now.duration_since(self.last_update_time) < Duration::from_secs(1) {
            return None;
        }

        let fps = self.frames_since_last_update;
        self.frames_since_last_update = 0;
        // Step by whole seconds so reports don't drift, unless we fell far behind.
        self.last_update_time += Duration::from_secs(1);
        if now.duration_since(self.last_update_time) > Duration::from_secs(1) {
            self.last_update_time = now;
        }
        Some(fps)
    }
}

impl Default for FPSCounter {
    fn default() -> Self {
        Self::new()
    }
}
