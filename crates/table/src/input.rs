//! # Input
//!
//! Two gestures drive the table: charge-and-release on the plunger, and a
//! flip per side. Keys map to gestures through [`KeyBindings`]; headless runs
//! replay a timed [`InputScript`] instead.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::error::InputError;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Gesture {
    Charge,
    FlipLeft,
    FlipRight,
}

impl FromStr for Gesture {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "charge" | "plunger" => Ok(Self::Charge),
            "left" | "flip_left" => Ok(Self::FlipLeft),
            "right" | "flip_right" => Ok(Self::FlipRight),
            other => Err(InputError::UnknownGesture(other.to_owned())),
        }
    }
}

impl fmt::Display for Gesture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Charge => "charge",
            Self::FlipLeft => "left",
            Self::FlipRight => "right",
        })
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Edge {
    Press,
    Release,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct InputEvent {
    pub gesture: Gesture,
    pub edge: Edge,
}

impl InputEvent {
    #[must_use]
    pub fn press(gesture: Gesture) -> Self {
        Self {
            gesture,
            edge: Edge::Press,
        }
    }

    #[must_use]
    pub fn release(gesture: Gesture) -> Self {
        Self {
            gesture,
            edge: Edge::Release,
        }
    }
}

/// Key name to gesture table. Names follow physical key codes, e.g. `Space`
#[derive(Clone, Debug)]
pub struct KeyBindings {
    keys: HashMap<String, Gesture>,
}

impl Default for KeyBindings {
    fn default() -> Self {
        let mut bindings = Self {
            keys: HashMap::new(),
        };
        bindings.bind("Space", Gesture::Charge);
        bindings.bind("ArrowLeft", Gesture::FlipLeft);
        bindings.bind("ArrowRight", Gesture::FlipRight);
        bindings
    }
}

impl KeyBindings {
    pub fn bind(&mut self, key: impl Into<String>, gesture: Gesture) {
        self.keys.insert(key.into(), gesture);
    }

    #[must_use]
    pub fn gesture(&self, key: &str) -> Option<Gesture> {
        self.keys.get(key).copied()
    }

    /// Translate a key edge, ignoring unbound keys.
    #[must_use]
    pub fn event(&self, key: &str, pressed: bool) -> Option<InputEvent> {
        let gesture = self.gesture(key)?;
        Some(if pressed {
            InputEvent::press(gesture)
        } else {
            InputEvent::release(gesture)
        })
    }
}

/// A press and its release, in simulated seconds
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ScriptedGesture {
    pub gesture: Gesture,
    pub press_at: f64,
    pub release_at: f64,
}

/// Timeline of gestures, written as `gesture@press-release` entries
/// separated by commas, e.g. `charge@0.0-1.0,left@2.0-2.3`.
#[derive(Clone, Debug, Default)]
pub struct InputScript {
    entries: Vec<ScriptedGesture>,
    timeline: Vec<(f64, InputEvent)>,
    cursor: usize,
}

impl InputScript {
    #[must_use]
    pub fn new(entries: Vec<ScriptedGesture>) -> Self {
        let mut timeline: Vec<(f64, InputEvent)> = entries
            .iter()
            .flat_map(|entry| {
                [
                    (entry.press_at, InputEvent::press(entry.gesture)),
                    (entry.release_at, InputEvent::release(entry.gesture)),
                ]
            })
            .collect();
        timeline.sort_by(|a, b| a.0.total_cmp(&b.0));
        Self {
            entries,
            timeline,
            cursor: 0,
        }
    }

    #[must_use]
    pub fn entries(&self) -> &[ScriptedGesture] {
        &self.entries
    }

    /// Events not yet handed out whose time has come by `now`.
    pub fn due(&mut self, now: f64) -> Vec<InputEvent> {
        let start = self.cursor;
        while self
            .timeline
            .get(self.cursor)
            .is_some_and(|(at, _)| *at <= now + 1e-9)
        {
            self.cursor += 1;
        }
        self.timeline[start..self.cursor]
            .iter()
            .map(|(_, event)| *event)
            .collect()
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.cursor >= self.timeline.len()
    }
}

impl FromStr for InputScript {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let entries = s
            .split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(parse_entry)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(entries))
    }
}

fn parse_entry(entry: &str) -> Result<ScriptedGesture, InputError> {
    let malformed = || InputError::Malformed(entry.to_owned());
    let (name, window) = entry.split_once('@').ok_or_else(malformed)?;
    let gesture = name.parse::<Gesture>()?;
    let (press, release) = window.split_once('-').ok_or_else(malformed)?;
    let press_at: f64 = press.trim().parse().map_err(|_| malformed())?;
    let release_at: f64 = release.trim().parse().map_err(|_| malformed())?;
    if !press_at.is_finite() || !release_at.is_finite() {
        return Err(malformed());
    }
    if release_at < press_at {
        return Err(InputError::ReleaseBeforePress(entry.to_owned()));
    }
    Ok(ScriptedGesture {
        gesture,
        press_at,
        release_at,
    })
}
