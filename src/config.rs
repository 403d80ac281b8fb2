use configparser::ini::Ini;
use log::{info, warn};
use once_cell::sync::Lazy;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

// Pacing
pub const MAX_FRAMERATE: f64 = 70.0;
pub const MIN_FRAMERATE: f64 = 15.0;
pub const TIMER_RESOLUTION_MS: f64 = 2.0;
pub const INTRA_FRAMES: u32 = 3;
pub const RATE_CHECK_INTERVAL: u64 = 100;
pub const RATE_SHORTFALL: f64 = 0.92;

// Timer
pub const TICK_PERIOD: Duration = Duration::from_millis(100);
pub const FAST_TICK_PERIOD: Duration = Duration::from_millis(10);

// Playfield (only used until the presentation side reports a real size)
pub const PLAYFIELD_WIDTH: f64 = 800.0;
pub const PLAYFIELD_HEIGHT: f64 = 600.0;

// Falling shapes
pub const MAX_SHAPES: u32 = 80;
pub const DEFAULT_DROP_RATE: f64 = 2.5;
pub const DEFAULT_DROP_SIZE: f64 = 32.0;
pub const DEFAULT_DROP_GRAVITY: f64 = 2.0;

pub const CONFIG_INI_PATH: &str = "shapestage.ini";

// --- Runtime Config ---

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub max_framerate: f64,
    pub min_framerate: f64,
    pub timer_resolution_ms: f64,
    pub intra_frames: u32,
    pub tick_period: Duration,
    pub playfield_width: f64,
    pub playfield_height: f64,
    pub max_shapes: u32,
    pub drop_rate: f64,
    pub drop_size: f64,
    pub drop_gravity: f64,
    pub script_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_framerate: MAX_FRAMERATE,
            min_framerate: MIN_FRAMERATE,
            timer_resolution_ms: TIMER_RESOLUTION_MS,
            intra_frames: INTRA_FRAMES,
            tick_period: TICK_PERIOD,
            playfield_width: PLAYFIELD_WIDTH,
            playfield_height: PLAYFIELD_HEIGHT,
            max_shapes: MAX_SHAPES,
            drop_rate: DEFAULT_DROP_RATE,
            drop_size: DEFAULT_DROP_SIZE,
            drop_gravity: DEFAULT_DROP_GRAVITY,
            script_path: None,
        }
    }
}

static CONFIG: Lazy<Mutex<Config>> = Lazy::new(|| Mutex::new(Config::default()));

fn create_default_file(path: &Path) -> Result<(), std::io::Error> {
    info!("Config file not found, writing defaults to '{}'.", path.display());
    let d = Config::default();
    let mut conf = Ini::new_cs();
    conf.set("Pacing", "MaxFramerate", Some(d.max_framerate.to_string()));
    conf.set("Pacing", "MinFramerate", Some(d.min_framerate.to_string()));
    conf.set("Pacing", "TimerResolutionMs", Some(d.timer_resolution_ms.to_string()));
    conf.set("Pacing", "IntraFrames", Some(d.intra_frames.to_string()));
    conf.set("Timer", "TickMs", Some(d.tick_period.as_millis().to_string()));
    conf.set("Playfield", "Width", Some(d.playfield_width.to_string()));
    conf.set("Playfield", "Height", Some(d.playfield_height.to_string()));
    conf.set("Shapes", "MaxShapes", Some(d.max_shapes.to_string()));
    conf.set("Shapes", "DropRate", Some(d.drop_rate.to_string()));
    conf.set("Shapes", "DropSize", Some(d.drop_size.to_string()));
    conf.set("Shapes", "DropGravity", Some(d.drop_gravity.to_string()));
    conf.set("Stages", "ScriptPath", Some(String::new()));
    conf.write(path)
}

/// Reads `section.key` as a positive number, keeping `fallback` on anything else.
fn read_positive<T>(conf: &Ini, section: &str, key: &str, fallback: T) -> T
where
    T: std::str::FromStr + PartialOrd + Default + Copy + std::fmt::Display,
{
    let Some(raw) = conf.get(section, key) else { return fallback };
    match raw.trim().parse::<T>() {
        Ok(v) if v > T::default() => v,
        _ => {
            warn!("Invalid {}.{} '{}', using {}.", section, key, raw, fallback);
            fallback
        }
    }
}

/// Parses an already-read INI document into a validated config.
pub fn from_ini(conf: &Ini) -> Config {
    let d = Config::default();
    let mut c = Config {
        max_framerate: read_positive(conf, "Pacing", "MaxFramerate", d.max_framerate),
        min_framerate: read_positive(conf, "Pacing", "MinFramerate", d.min_framerate),
        timer_resolution_ms: read_positive(conf, "Pacing", "TimerResolutionMs", d.timer_resolution_ms),
        intra_frames: read_positive(conf, "Pacing", "IntraFrames", d.intra_frames),
        tick_period: Duration::from_millis(read_positive(conf, "Timer", "TickMs", d.tick_period.as_millis() as u64)),
        playfield_width: read_positive(conf, "Playfield", "Width", d.playfield_width),
        playfield_height: read_positive(conf, "Playfield", "Height", d.playfield_height),
        max_shapes: read_positive(conf, "Shapes", "MaxShapes", d.max_shapes),
        drop_rate: read_positive(conf, "Shapes", "DropRate", d.drop_rate),
        drop_size: read_positive(conf, "Shapes", "DropSize", d.drop_size),
        drop_gravity: read_positive(conf, "Shapes", "DropGravity", d.drop_gravity),
        script_path: conf
            .get("Stages", "ScriptPath")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .map(PathBuf::from),
    };

    if c.min_framerate > c.max_framerate {
        warn!(
            "MinFramerate {} exceeds MaxFramerate {}, using {}..{}.",
            c.min_framerate, c.max_framerate, d.min_framerate, d.max_framerate
        );
        c.min_framerate = d.min_framerate;
        c.max_framerate = d.max_framerate;
    }
    c
}

/// Reads `path` into the global config; read it back with [`get`].
pub fn load_from(path: &Path) {
    if !path.exists() {
        if let Err(e) = create_default_file(path) {
            warn!("Failed to create default config '{}': {}", path.display(), e);
        }
    }

    let mut conf = Ini::new_cs();
    let loaded = match conf.load(path) {
        Ok(_) => from_ini(&conf),
        Err(e) => {
            warn!("Failed to load '{}' ({}), using default config.", path.display(), e);
            Config::default()
        }
    };

    *CONFIG.lock().unwrap_or_else(|p| p.into_inner()) = loaded;
}

pub fn load() {
    load_from(Path::new(CONFIG_INI_PATH))
}

/// Returns a copy of the currently loaded config.
pub fn get() -> Config {
    CONFIG.lock().unwrap_or_else(|p| p.into_inner()).clone()
}
