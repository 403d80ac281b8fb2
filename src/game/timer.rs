use log::{debug, info, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};
use std::time::Duration;

// --- Countdown ---

/// Tick counter that raises a one-shot trigger once it runs past `max`.
///
/// Disabled timers keep `tick` at zero. The trigger stays set until the owner
/// takes it or re-arms the timer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CountdownTimer {
    enabled: bool,
    tick: u32,
    max: u32,
    triggered: bool,
}

impl CountdownTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restart from zero with a new limit; clears any pending trigger.
    pub fn arm(&mut self, max: u32) {
        self.enabled = true;
        self.tick = 0;
        self.max = max;
        self.triggered = false;
    }

    pub fn advance(&mut self) {
        if !self.enabled {
            return;
        }
        self.tick += 1;
        if self.tick > self.max {
            self.triggered = true;
            self.enabled = false;
            self.tick = 0;
        }
    }

    /// Consumes the trigger.
    pub fn take_trigger(&mut self) -> bool {
        std::mem::take(&mut self.triggered)
    }

    #[inline(always)] pub fn triggered(&self) -> bool { self.triggered }
    #[inline(always)] pub fn enabled(&self) -> bool { self.enabled }
    #[inline(always)] pub fn tick(&self) -> u32 { self.tick }
    #[inline(always)] pub fn max(&self) -> u32 { self.max }
}

// --- Shared between the tick driver and the game loop ---

/// The countdown behind a single lock, cloned into both execution contexts.
#[derive(Debug, Clone, Default)]
pub struct SharedTimer {
    inner: Arc<Mutex<CountdownTimer>>,
}

impl SharedTimer {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, CountdownTimer> {
        self.inner.lock().unwrap_or_else(|p| p.into_inner())
    }

    pub fn arm(&self, max: u32) { self.lock().arm(max) }
    pub fn advance(&self) { self.lock().advance() }
    pub fn take_trigger(&self) -> bool { self.lock().take_trigger() }

    /// Copy of the current state.
    pub fn snapshot(&self) -> CountdownTimer {
        *self.lock()
    }
}

// --- Fixed-period driver ---

/// Calls [`SharedTimer::advance`] every `period` on its own thread until stopped.
pub struct TickDriver {
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl TickDriver {
    pub fn spawn(timer: SharedTimer, period: Duration) -> Self {
        let stop = Arc::new(AtomicBool::new(false));
        let stop_flag = stop.clone();
        let handle = thread::Builder::new()
            .name("tick-driver".into())
            .spawn(move || {
                info!("Tick driver started ({} ms period).", period.as_millis());
                while !stop_flag.load(Ordering::Acquire) {
                    thread::sleep(period);
                    timer.advance();
                }
                debug!("Tick driver stopped.");
            })
            .inspect_err(|e| warn!("Tick driver failed to start, timers will not fire: {}", e))
            .ok();
        Self { stop, handle }
    }

    pub fn stop(&mut self) {
        self.stop.store(true, Ordering::Release);
        if let Some(h) = self.handle.take() {
            let _ = h.join();
        }
    }
}

impl Drop for TickDriver {
    fn drop(&mut self) {
        self.stop();
    }
}
