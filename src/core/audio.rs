use log::{debug, info, warn};
use std::collections::HashSet;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::thread;

// --- Public API Types ---

/// Named sound handles the scene flow starts and stops.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SoundCue {
    Opening,
    CalibrateLoop,
    Stage1,
    Stage2,
    Stage3,
    Stage4,
    Success,
    Goal,
    ResultScene,
    Pop,
    Hit,
    Squeeze,
}

impl SoundCue {
    /// Background cues silenced by a scene change; effects are left to finish.
    pub const AMBIENT: [SoundCue; 9] = [
        SoundCue::Opening,
        SoundCue::CalibrateLoop,
        SoundCue::Stage1,
        SoundCue::Stage2,
        SoundCue::Stage3,
        SoundCue::Stage4,
        SoundCue::Success,
        SoundCue::Goal,
        SoundCue::ResultScene,
    ];

    pub const fn asset_name(self) -> &'static str {
        match self {
            SoundCue::Opening => "opening",
            SoundCue::CalibrateLoop => "calibrate_loop",
            SoundCue::Stage1 => "stage1",
            SoundCue::Stage2 => "stage2",
            SoundCue::Stage3 => "stage3",
            SoundCue::Stage4 => "stage4",
            SoundCue::Success => "success",
            SoundCue::Goal => "goal",
            SoundCue::ResultScene => "result_scene",
            SoundCue::Pop => "pop_5",
            SoundCue::Hit => "hit_2",
            SoundCue::Squeeze => "squeeze",
        }
    }
}

/// Fire-and-forget playback. Implementations swallow their own failures.
pub trait AudioCues: Send {
    fn play(&self, cue: SoundCue);
    fn stop(&self, cue: SoundCue);

    fn stop_all(&self) {
        for cue in SoundCue::AMBIENT {
            self.stop(cue);
        }
    }
}

// --- Engine Commands ---
enum AudioCommand {
    Play(SoundCue),
    Stop(SoundCue),
}

/// Cue dispatcher running on its own thread; the output device is owned by
/// whatever sink consumes the log, so this only tracks which cues are live.
pub struct CueEngine {
    command_sender: Sender<AudioCommand>,
}

impl CueEngine {
    pub fn spawn() -> Self {
        let (command_sender, command_receiver) = channel();
        let spawned = thread::Builder::new()
            .name("audio-cues".into())
            .spawn(move || cue_thread(command_receiver));
        if let Err(e) = spawned {
            warn!("Audio cue thread failed to start, cues will be dropped: {}", e);
        }
        Self { command_sender }
    }

    fn send(&self, cmd: AudioCommand) {
        if self.command_sender.send(cmd).is_err() {
            warn!("Audio cue thread is gone; dropping command.");
        }
    }
}

impl AudioCues for CueEngine {
    fn play(&self, cue: SoundCue) {
        self.send(AudioCommand::Play(cue));
    }

    fn stop(&self, cue: SoundCue) {
        self.send(AudioCommand::Stop(cue));
    }
}

fn cue_thread(command_receiver: Receiver<AudioCommand>) {
    let mut playing: HashSet<SoundCue> = HashSet::new();
    for cmd in command_receiver {
        match cmd {
            AudioCommand::Play(cue) => {
                info!("Playing cue '{}'.", cue.asset_name());
                playing.insert(cue);
            }
            AudioCommand::Stop(cue) => {
                if playing.remove(&cue) {
                    debug!("Stopped cue '{}'.", cue.asset_name());
                }
            }
        }
    }
    debug!("Audio cue thread exiting ({} cues still live).", playing.len());
}
