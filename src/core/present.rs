use crate::game::scene::{Backdrop, Scene};
use crate::game::things::{Segment, Surface};
use crate::utils::fps::FPSCounter;
use log::{debug, info};
use std::error::Error;
use std::fmt;
use std::io;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::thread::{self, JoinHandle};

// --- Draw list ---

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DrawOp {
    Clear,
    Circle { x: f64, y: f64, radius: f64 },
    Segment(Segment),
    Backdrop(Backdrop),
}

/// Draw calls recorded on the simulation side and replayed by the presenter.
#[derive(Debug, Default, Clone)]
pub struct DisplayList {
    ops: Vec<DrawOp>,
}

impl DisplayList {
    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    pub fn replay(&self, target: &mut dyn Surface) {
        for op in &self.ops {
            match *op {
                DrawOp::Clear => target.clear(),
                DrawOp::Circle { x, y, radius } => target.draw_circle(x, y, radius),
                DrawOp::Segment(ref s) => target.draw_segment(s),
                DrawOp::Backdrop(b) => target.draw_backdrop(b),
            }
        }
    }
}

impl Surface for DisplayList {
    fn clear(&mut self) {
        self.ops.clear();
        self.ops.push(DrawOp::Clear);
    }

    fn draw_circle(&mut self, x: f64, y: f64, radius: f64) {
        self.ops.push(DrawOp::Circle { x, y, radius });
    }

    fn draw_segment(&mut self, segment: &Segment) {
        self.ops.push(DrawOp::Segment(*segment));
    }

    fn draw_backdrop(&mut self, backdrop: Backdrop) {
        self.ops.push(DrawOp::Backdrop(backdrop));
    }
}

// --- Commands ---

/// One frame for the presentation side; the sender waits on `ack`.
pub struct FrameCommand {
    pub frame_count: u64,
    pub scene: Scene,
    pub list: DisplayList,
    pub ack: Sender<Presented>,
}

/// Acknowledgment for a drawn frame: the list back for reuse and the target's size.
#[derive(Debug)]
pub struct Presented {
    pub list: DisplayList,
    pub size: Option<(f64, f64)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PresenterGone;

impl fmt::Display for PresenterGone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "presentation thread is no longer receiving frames")
    }
}

impl Error for PresenterGone {}

/// Simulation-side handle onto the presentation thread.
pub struct Presenter {
    command_sender: Sender<FrameCommand>,
}

impl Presenter {
    pub fn spawn(surface: Box<dyn Surface + Send>) -> io::Result<(Self, JoinHandle<()>)> {
        let (command_sender, command_receiver) = channel();
        let handle = thread::Builder::new()
            .name("present".into())
            .spawn(move || present_thread(command_receiver, surface))?;
        Ok((Self { command_sender }, handle))
    }

    /// Wraps an existing queue; the caller plays the presentation side.
    pub fn from_sender(command_sender: Sender<FrameCommand>) -> Self {
        Self { command_sender }
    }

    /// Sends the frame and blocks until it has been drawn.
    pub fn present(&self, frame_count: u64, scene: Scene, list: DisplayList) -> Result<Presented, PresenterGone> {
        let (ack, done) = channel();
        self.command_sender
            .send(FrameCommand { frame_count, scene, list, ack })
            .map_err(|_| PresenterGone)?;
        done.recv().map_err(|_| PresenterGone)
    }
}

fn present_thread(command_receiver: Receiver<FrameCommand>, mut surface: Box<dyn Surface + Send>) {
    let mut fps = FPSCounter::new();
    let mut presented = 0u64;
    for cmd in command_receiver {
        cmd.list.replay(surface.as_mut());
        presented += 1;
        if let Some(rate) = fps.update() {
            info!("Presenting at {} fps (frame {}, {:?}).", rate, cmd.frame_count, cmd.scene);
        }
        // The game loop may already be gone during shutdown.
        let _ = cmd.ack.send(Presented { list: cmd.list, size: surface.size() });
    }
    debug!("Presentation thread exiting after {} frames.", presented);
}

// --- Headless surface ---

/// Surface for running without a display: counts primitives and logs backdrop changes.
#[derive(Debug, Default)]
pub struct LogSurface {
    shapes: usize,
    backdrop: Option<Backdrop>,
    size: Option<(f64, f64)>,
}

impl LogSurface {
    /// A headless target that reports a fixed drawable size.
    pub fn sized(width: f64, height: f64) -> Self {
        Self { size: Some((width, height)), ..Self::default() }
    }

    pub fn shapes(&self) -> usize {
        self.shapes
    }

    pub fn backdrop(&self) -> Option<Backdrop> {
        self.backdrop
    }
}

impl Surface for LogSurface {
    fn clear(&mut self) {
        self.shapes = 0;
    }

    fn draw_circle(&mut self, _x: f64, _y: f64, _radius: f64) {
        self.shapes += 1;
    }

    fn draw_segment(&mut self, _segment: &Segment) {
        self.shapes += 1;
    }

    fn draw_backdrop(&mut self, backdrop: Backdrop) {
        if self.backdrop == Some(backdrop) {
            return;
        }
        match backdrop {
            Backdrop::Snapshot(snap) => debug!("Backdrop -> photo '{}'", snap.file_name()),
            other => debug!("Backdrop -> {:?}", other),
        }
        self.backdrop = Some(backdrop);
    }

    fn size(&self) -> Option<(f64, f64)> {
        self.size
    }
}
