use std::fmt;

/// Key naming a status or stat modifier (e.g. `"yoimiyaskill"`).
///
/// Kits are compiled code, so keys are static strings.
pub type Key = &'static str;

/// Smallest unit of simulated time. Never decreases within a trial.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Frame(pub u64);

impl Frame {
    pub const ZERO: Self = Self(0);

    /// Expiry of effects that never run out.
    pub const NEVER: Self = Self(u64::MAX);

    pub fn new(value: u64) -> Self {
        Self(value)
    }

    /// The frame immediately after this one.
    #[inline]
    pub fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }

    /// Frames from `earlier` to `self`, zero when `earlier` is later.
    #[inline]
    pub fn since(self, earlier: Frame) -> u64 {
        self.0.saturating_sub(earlier.0)
    }

    /// Converts to seconds at [`SimConfig::FRAMES_PER_SECOND`](crate::SimConfig::FRAMES_PER_SECOND).
    pub fn as_seconds(self) -> f64 {
        self.0 as f64 / crate::SimConfig::FRAMES_PER_SECOND as f64
    }
}

impl std::ops::Add<u64> for Frame {
    type Output = Frame;
    fn add(self, rhs: u64) -> Frame {
        Frame(self.0.saturating_add(rhs))
    }
}

impl std::ops::Sub<u64> for Frame {
    type Output = Frame;
    fn sub(self, rhs: u64) -> Frame {
        Frame(self.0.saturating_sub(rhs))
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == Self::NEVER {
            write!(f, "never")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

/// Position of a character within the party.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CharIndex(pub usize);

impl fmt::Display for CharIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "char#{}", self.0)
    }
}

/// Identifier of an enemy target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TargetId(pub u32);

impl fmt::Display for TargetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "target#{}", self.0)
    }
}

/// Point on the combat plane, in meters.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub const ORIGIN: Self = Self { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Position) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}
