use serde::{Deserialize, Serialize};

const SCALE: f64 = 10_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position2D {
    pub x: f64,
    pub y: f64,
}

impl Position2D {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Build from a JSON position array, ignoring anything past x and y.
    pub fn from_slice(coords: &[f64]) -> Option<Self> {
        match coords {
            [x, y, ..] => Some(Self::new(*x, *y)),
            _ => None,
        }
    }

    pub fn rounded(&self) -> Self {
        Self::new(round4(self.x), round4(self.y))
    }
}

/// Round to 4 decimal places.
pub fn round4(value: f64) -> f64 {
    (value * SCALE).round() / SCALE
}

/// Value scaled to an integer number of ten-thousandths.
pub fn quantize4(value: f64) -> i64 {
    (value * SCALE).round() as i64
}

/// Euclidean distance, rounded to 4 decimal places so repeated comparisons are stable.
pub fn distance(a: &Position2D, b: &Position2D) -> f64 {
    round4((b.x - a.x).hypot(b.y - a.y))
}
