// src/state.rs
use crate::game::scene::Scene;
use crate::game::timer::SharedTimer;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;

// --- Cross-context game state ---

/// Everything the tick driver, the game loop and the presentation side share.
///
/// Only scalars cross the thread boundary: the countdown (behind its own lock),
/// the running flag, the shutdown request and the current scene index.
#[derive(Debug)]
pub struct SharedState {
    pub timer: SharedTimer,
    running: AtomicBool,
    shutdown_requested: AtomicBool,
    scene: AtomicU8,
}

impl SharedState {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            timer: SharedTimer::new(),
            running: AtomicBool::new(false),
            shutdown_requested: AtomicBool::new(false),
            scene: AtomicU8::new(Scene::Title as u8),
        })
    }

    #[inline(always)]
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    pub fn set_running(&self, running: bool) {
        self.running.store(running, Ordering::Release);
    }

    /// Set once the terminal scene expires; the owner tears the process down.
    pub fn request_shutdown(&self) {
        self.shutdown_requested.store(true, Ordering::Release);
        self.set_running(false);
    }

    pub fn shutdown_requested(&self) -> bool {
        self.shutdown_requested.load(Ordering::Acquire)
    }

    pub fn scene(&self) -> Scene {
        Scene::from_index(self.scene.load(Ordering::Acquire) as usize).unwrap_or(Scene::Title)
    }

    pub fn publish_scene(&self, scene: Scene) {
        self.scene.store(scene as u8, Ordering::Release);
    }
}
