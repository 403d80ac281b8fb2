// Scene list, per-scene transition rules and the presentation keys that go with them.
use crate::core::audio::SoundCue;

/* ---------------------------- scenes ---------------------------- */

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Scene {
    Title = 0,
    Rules,
    Stage1Left,
    Stage1Calibrate,
    Stage1MapLoad,
    Stage1Play,
    Stage1Result,
    Stage2Left,
    Stage2Calibrate,
    Stage2MapLoad,
    Stage2Play,
    Stage2Result,
    Stage3Left,
    Stage3Calibrate,
    Stage3MapLoad,
    Stage3Play,
    Stage3Result,
    Stage4Left,
    Stage4Calibrate,
    Stage4MapLoad,
    Stage4Play,
    Stage4Result,
    Goal,
    ResultTitle,
    ResultMovie,
    End,
}

pub const STAGE_COUNT: usize = 4;
const STAGE_PHASES: usize = 5;
const FIRST_STAGE_SCENE: usize = Scene::Stage1Left as usize;

impl Scene {
    pub const COUNT: usize = 26;

    pub const ALL: [Scene; Self::COUNT] = [
        Scene::Title, Scene::Rules,
        Scene::Stage1Left, Scene::Stage1Calibrate, Scene::Stage1MapLoad, Scene::Stage1Play, Scene::Stage1Result,
        Scene::Stage2Left, Scene::Stage2Calibrate, Scene::Stage2MapLoad, Scene::Stage2Play, Scene::Stage2Result,
        Scene::Stage3Left, Scene::Stage3Calibrate, Scene::Stage3MapLoad, Scene::Stage3Play, Scene::Stage3Result,
        Scene::Stage4Left, Scene::Stage4Calibrate, Scene::Stage4MapLoad, Scene::Stage4Play, Scene::Stage4Result,
        Scene::Goal, Scene::ResultTitle, Scene::ResultMovie, Scene::End,
    ];

    #[inline(always)]
    pub const fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(i: usize) -> Option<Scene> {
        Self::ALL.get(i).copied()
    }

    /// The following scene, or `None` for the terminal one.
    pub fn next(self) -> Option<Scene> {
        Self::from_index(self.index() + 1)
    }

    /// Zero-based stage this scene belongs to.
    pub fn stage(self) -> Option<usize> {
        let i = self.index();
        if (FIRST_STAGE_SCENE..FIRST_STAGE_SCENE + STAGE_COUNT * STAGE_PHASES).contains(&i) {
            Some((i - FIRST_STAGE_SCENE) / STAGE_PHASES)
        } else {
            None
        }
    }

    pub fn phase(self) -> Option<StagePhase> {
        let i = self.index();
        self.stage().map(|_| StagePhase::ALL[(i - FIRST_STAGE_SCENE) % STAGE_PHASES])
    }

    pub fn rule(self) -> &'static SceneRule {
        &SCENE_TABLE[self.index()]
    }

    /// Full-screen image shown while in this scene. `None` keeps whatever is up.
    pub fn backdrop(self) -> Option<Backdrop> {
        let img = match (self, self.phase(), self.stage()) {
            (Scene::Title, _, _) => "intro_title",
            (Scene::Stage4Result, _, _) => return None,
            (Scene::Rules, _, _) => "intro_info",
            (_, Some(StagePhase::Left), Some(stage)) => STAGES_LEFT_IMAGES[stage],
            (_, Some(StagePhase::Calibrate), _) => "calibrate",
            (_, Some(StagePhase::MapLoad), _) => return Some(Backdrop::Blank),
            (_, Some(StagePhase::Play), _) => return None,
            (_, Some(StagePhase::Result), _) => "success_image",
            (Scene::Goal, _, _) => "goal_image",
            (Scene::ResultTitle, _, _) => "result_title",
            (Scene::ResultMovie, _, _) => return None,
            (Scene::End, _, _) => "result_end",
            _ => return None,
        };
        Some(Backdrop::Image(img))
    }
}

const STAGES_LEFT_IMAGES: [&str; STAGE_COUNT] =
    ["stage_start_4left", "stage_start_3left", "stage_start_2left", "stage_start_1left"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StagePhase {
    Left,
    Calibrate,
    MapLoad,
    Play,
    Result,
}

impl StagePhase {
    pub const ALL: [StagePhase; STAGE_PHASES] =
        [StagePhase::Left, StagePhase::Calibrate, StagePhase::MapLoad, StagePhase::Play, StagePhase::Result];
}

/* ------------------------- transition table ------------------------- */

/// What has to happen before a scene may hand over to its successor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
    /// Countdown trigger fired.
    Timer,
    /// Every calibration zone hit by one skeleton.
    Collision,
    /// Advance on the first check.
    Immediate,
    /// Falling-object field is empty.
    Completion,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CueChange {
    Keep,
    /// Start a cue on top of whatever is playing.
    Play(SoundCue),
    /// Silence ambient cues, then start this one.
    Switch(SoundCue),
}

/// Side effects applied once, in the check that enters the scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Entry {
    pub arm_timer: Option<u32>,
    pub cue: CueChange,
    pub load_zones: bool,
    pub reset_zones: bool,
    pub spawn: bool,
    pub collage: Option<bool>,
}

impl Entry {
    pub const NONE: Entry = Entry {
        arm_timer: None,
        cue: CueChange::Keep,
        load_zones: false,
        reset_zones: false,
        spawn: false,
        collage: None,
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SceneRule {
    pub scene: Scene,
    pub gate: Gate,
    pub enter: Entry,
}

const fn timed(scene: Scene, ticks: u32, cue: CueChange) -> SceneRule {
    SceneRule { scene, gate: Gate::Timer, enter: Entry { arm_timer: Some(ticks), cue, ..Entry::NONE } }
}

const fn stage_rules(left: Scene, music: SoundCue) -> [SceneRule; STAGE_PHASES] {
    let i = left as u8;
    [
        timed(left, 15, CueChange::Switch(SoundCue::CalibrateLoop)),
        SceneRule {
            scene: scene_at(i + 1),
            gate: Gate::Collision,
            enter: Entry { arm_timer: Some(10), load_zones: true, ..Entry::NONE },
        },
        SceneRule { scene: scene_at(i + 2), gate: Gate::Immediate, enter: Entry { reset_zones: true, ..Entry::NONE } },
        SceneRule {
            scene: scene_at(i + 3),
            gate: Gate::Completion,
            enter: Entry { spawn: true, cue: CueChange::Switch(music), ..Entry::NONE },
        },
        timed(scene_at(i + 4), 15, CueChange::Switch(SoundCue::Success)),
    ]
}

const fn scene_at(i: u8) -> Scene {
    Scene::ALL[i as usize]
}

const fn build_table() -> [SceneRule; Scene::COUNT] {
    let s1 = stage_rules(Scene::Stage1Left, SoundCue::Stage1);
    let s2 = stage_rules(Scene::Stage2Left, SoundCue::Stage2);
    let s3 = stage_rules(Scene::Stage3Left, SoundCue::Stage3);
    let s4 = stage_rules(Scene::Stage4Left, SoundCue::Stage4);

    [
        timed(Scene::Title, 40, CueChange::Play(SoundCue::Opening)),
        timed(Scene::Rules, 30, CueChange::Keep),
        s1[0], s1[1], s1[2], s1[3], s1[4],
        s2[0], s2[1], s2[2], s2[3], s2[4],
        s3[0], s3[1], s3[2], s3[3], s3[4],
        s4[0], s4[1], s4[2], s4[3],
        // The last stage has no result screen of its own; Goal follows at once.
        SceneRule { scene: Scene::Stage4Result, gate: Gate::Immediate, enter: Entry::NONE },
        timed(Scene::Goal, 25, CueChange::Switch(SoundCue::Goal)),
        timed(Scene::ResultTitle, 15, CueChange::Switch(SoundCue::ResultScene)),
        SceneRule {
            scene: Scene::ResultMovie,
            gate: Gate::Timer,
            enter: Entry { arm_timer: Some(COLLAGE_TICKS), collage: Some(true), ..Entry::NONE },
        },
        SceneRule {
            scene: Scene::End,
            gate: Gate::Timer,
            enter: Entry { arm_timer: Some(50), collage: Some(false), ..Entry::NONE },
        },
    ]
}

pub static SCENE_TABLE: [SceneRule; Scene::COUNT] = build_table();

/* ------------------------- backdrops / collage ------------------------- */

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backdrop {
    Blank,
    Image(&'static str),
    Snapshot(Snapshot),
}

/// Photos taken at the spawn points; the finale cycles through them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Snapshot {
    Default,
    Left1,
    Left2,
    Left3,
    Left4,
    Top,
    Right1,
    Right2,
    Right3,
    Right4,
}

impl Snapshot {
    pub const fn file_name(self) -> &'static str {
        match self {
            Snapshot::Default => "Snap_000_000.png",
            Snapshot::Left1 => "Snap_150_200.png",
            Snapshot::Left2 => "Snap_150_300.png",
            Snapshot::Left3 => "Snap_150_450.png",
            Snapshot::Left4 => "Snap_200_500.png",
            Snapshot::Top => "Snap_300_150.png",
            Snapshot::Right4 => "Snap_400_500.png",
            Snapshot::Right1 => "Snap_450_200.png",
            Snapshot::Right2 => "Snap_450_300.png",
            Snapshot::Right3 => "Snap_450_450.png",
        }
    }
}

pub const COLLAGE_TICKS: u32 = 210;
const COLLAGE_FIRST_TICK: u32 = 27;

use Snapshot as S;
#[rustfmt::skip]
const COLLAGE_FRAMES: [Snapshot; 184] = [
    S::Right1, S::Left2, S::Right4, S::Default, S::Right4, S::Right2, S::Left3, S::Right2,
    S::Top, S::Top, S::Right1, S::Right1, S::Left1, S::Top, S::Right1, S::Right3, S::Left3,
    S::Right1, S::Right4, S::Left4, S::Right4, S::Left2, S::Left4, S::Left3, S::Top, S::Right3,
    S::Right4, S::Left1, S::Left1, S::Right2, S::Right2, S::Right3, S::Left3, S::Top,
    S::Default, S::Right2, S::Left3, S::Left3, S::Right2, S::Left2, S::Left3, S::Right1,
    S::Top, S::Default, S::Right1, S::Top, S::Left1, S::Right4, S::Right2, S::Left1, S::Right1,
    S::Default, S::Left2, S::Right4, S::Right1, S::Left4, S::Right2, S::Top, S::Top, S::Left3,
    S::Left3, S::Right1, S::Left2, S::Top, S::Default, S::Default, S::Right1, S::Left1,
    S::Left3, S::Left1, S::Right4, S::Left2, S::Left1, S::Default, S::Default, S::Left2,
    S::Left2, S::Left1, S::Right4, S::Left3, S::Left1, S::Left1, S::Right4, S::Right2,
    S::Right2, S::Left3, S::Default, S::Left3, S::Right2, S::Right1, S::Default, S::Right1,
    S::Right1, S::Right1, S::Left3, S::Left4, S::Default, S::Left2, S::Top, S::Top, S::Default,
    S::Right4, S::Right4, S::Left1, S::Right1, S::Left4, S::Default, S::Right1, S::Right4,
    S::Right1, S::Right4, S::Right1, S::Default, S::Right1, S::Left4, S::Left3, S::Left2,
    S::Top, S::Default, S::Left2, S::Top, S::Left1, S::Right4, S::Left1, S::Right1, S::Left4,
    S::Left2, S::Left1, S::Top, S::Left3, S::Right3, S::Right1, S::Default, S::Left4, S::Left4,
    S::Left2, S::Top, S::Left3, S::Left4, S::Left2, S::Left1, S::Top, S::Left4, S::Default,
    S::Left3, S::Top, S::Left1, S::Right2, S::Default, S::Right4, S::Right4, S::Left1,
    S::Right2, S::Left2, S::Right4, S::Top, S::Left3, S::Left4, S::Default, S::Left4,
    S::Right2, S::Right4, S::Left4, S::Default, S::Default, S::Top, S::Right4, S::Right4,
    S::Right3, S::Left4, S::Left2, S::Right4, S::Right2, S::Default, S::Left4, S::Left2,
    S::Left3, S::Default, S::Right2, S::Top, S::Default, S::Left1, S::Default, S::Right2,
];

/// Photo shown at a given tick of the finale, if that tick changes it.
pub fn collage_frame(tick: u32) -> Option<Snapshot> {
    let i = tick.checked_sub(COLLAGE_FIRST_TICK)? as usize;
    COLLAGE_FRAMES.get(i).copied()
}
