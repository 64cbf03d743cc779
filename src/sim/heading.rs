//! Axis-aligned headings
//!
//! The track only ever runs along the four ground axes. Keeping headings as
//! an enum instead of raw vectors means repeated turns never drift.

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

/// A 90 degree turn request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Turn {
    Left,
    Right,
}

/// One of the four ground directions. North is +Z (forward).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Heading {
    #[default]
    North,
    East,
    South,
    West,
}

impl Heading {
    pub const ALL: [Heading; 4] = [Heading::North, Heading::East, Heading::South, Heading::West];

    /// Unit vector on the ground plane
    pub fn vector(self) -> Vec3 {
        match self {
            Heading::North => Vec3::Z,
            Heading::East => Vec3::X,
            Heading::South => Vec3::NEG_Z,
            Heading::West => Vec3::NEG_X,
        }
    }

    /// Heading after a 90 degree turn (right is clockwise seen from above)
    pub fn turned(self, turn: Turn) -> Heading {
        let idx = self as usize;
        let next = match turn {
            Turn::Right => (idx + 1) % 4,
            Turn::Left => (idx + 3) % 4,
        };
        Self::ALL[next]
    }

    /// Unit vector pointing to the right of this heading
    pub fn right(self) -> Vec3 {
        self.turned(Turn::Right).vector()
    }

    /// Rotation looking along this heading with +Y up
    pub fn look_rotation(self) -> Quat {
        let v = self.vector();
        Quat::from_rotation_y(v.x.atan2(v.z))
    }
}
