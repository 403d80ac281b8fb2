use crate::game::collision::CalibrationZone;
use crate::game::scene::STAGE_COUNT;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt;
use std::fs;
use std::path::Path;

// --- Stage content ---

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpawnPoint {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageContent {
    /// Rectangles the player must reach into before the stage starts.
    pub zones: Vec<CalibrationZone>,
    /// Where the stage's falling objects appear.
    pub spawns: Vec<SpawnPoint>,
}

/// Per-stage data; the scene table supplies the timing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageScript {
    pub stages: Vec<StageContent>,
}

const HAND_ZONES: [CalibrationZone; 2] = [
    CalibrationZone::new(200.0, 250.0, 300.0, 350.0),
    CalibrationZone::new(400.0, 250.0, 500.0, 300.0),
];

fn stage(spawns: &[(f64, f64)]) -> StageContent {
    StageContent {
        zones: HAND_ZONES.to_vec(),
        spawns: spawns.iter().map(|&(x, y)| SpawnPoint { x, y }).collect(),
    }
}

impl Default for StageScript {
    fn default() -> Self {
        Self {
            stages: vec![
                stage(&[(150.0, 200.0), (450.0, 200.0)]),
                stage(&[(150.0, 450.0), (450.0, 450.0)]),
                stage(&[(150.0, 300.0), (450.0, 300.0)]),
                stage(&[(300.0, 150.0), (200.0, 500.0), (400.0, 500.0)]),
            ],
        }
    }
}

impl StageScript {
    pub fn from_json(text: &str) -> Result<Self, ScriptError> {
        let script: StageScript = serde_json::from_str(text).map_err(ScriptError::Parse)?;
        script.validate()?;
        Ok(script)
    }

    pub fn validate(&self) -> Result<(), ScriptError> {
        if self.stages.len() != STAGE_COUNT {
            return Err(ScriptError::StageCount(self.stages.len()));
        }
        for (i, s) in self.stages.iter().enumerate() {
            for z in &s.zones {
                if !(z.x_min < z.x_max && z.y_min < z.y_max) {
                    return Err(ScriptError::EmptyZone(i));
                }
            }
        }
        Ok(())
    }

    /// Loads a script file, keeping the built-in content if anything is wrong with it.
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let Some(path) = path else { return Self::default() };
        let loaded = fs::read_to_string(path)
            .map_err(ScriptError::Io)
            .and_then(|text| Self::from_json(&text));
        match loaded {
            Ok(script) => {
                info!("Loaded stage script from '{}'.", path.display());
                script
            }
            Err(e) => {
                warn!("Failed to load stage script '{}': {}. Using built-in stages.", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn stage(&self, index: usize) -> Option<&StageContent> {
        self.stages.get(index)
    }
}

// --- Errors ---

#[derive(Debug)]
pub enum ScriptError {
    Io(std::io::Error),
    Parse(serde_json::Error),
    StageCount(usize),
    EmptyZone(usize),
}

impl fmt::Display for ScriptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScriptError::Io(e) => write!(f, "read failed: {}", e),
            ScriptError::Parse(e) => write!(f, "invalid JSON: {}", e),
            ScriptError::StageCount(n) => write!(f, "expected {} stages, found {}", STAGE_COUNT, n),
            ScriptError::EmptyZone(i) => write!(f, "stage {} has an empty calibration zone", i + 1),
        }
    }
}

impl Error for ScriptError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ScriptError::Io(e) => Some(e),
            ScriptError::Parse(e) => Some(e),
            _ => None,
        }
    }
}
