//! Tile and obstacle descriptors
//!
//! Static records the pools instantiate from. A `Catalog` bundles one
//! descriptor per variant and can be loaded from JSON.

use glam::{EulerRot, Quat, Vec3};
use serde::{Deserialize, Serialize};

use super::heading::Heading;
use crate::consts::*;
use crate::persistence::PersistError;

/// A closed set of enum variants usable as pool partition keys
pub trait Variant: Copy + Eq + std::fmt::Debug + 'static {
    /// Every variant, in index order
    const ALL: &'static [Self];

    /// Dense index in `0..ALL.len()`
    fn index(self) -> usize;
}

/// Track segment types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileType {
    Straight,
    Left,
    Right,
    Sideways,
}

impl TileType {
    /// Turn tiles hold still; the cursor moves on the turn commit instead
    pub fn is_turn(self) -> bool {
        self != TileType::Straight
    }
}

impl Variant for TileType {
    const ALL: &'static [Self] = &[
        TileType::Straight,
        TileType::Left,
        TileType::Right,
        TileType::Sideways,
    ];

    fn index(self) -> usize {
        self as usize
    }
}

/// Hazard types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObstacleType {
    /// Low barrier, clear it by jumping
    Jumping,
    /// High bar, clear it by sliding
    Sliding,
}

impl Variant for ObstacleType {
    const ALL: &'static [Self] = &[ObstacleType::Jumping, ObstacleType::Sliding];

    fn index(self) -> usize {
        self as usize
    }
}

/// Footprint in the placing heading's frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocalBounds {
    /// Extent behind the origin (usually <= 0)
    pub back: f32,
    /// Extent ahead of the origin
    pub front: f32,
    /// Half extent across the heading
    pub half_width: f32,
}

impl LocalBounds {
    /// Check a world point against the footprint placed at `origin` facing `heading`.
    /// Height is ignored.
    pub fn contains(&self, origin: Vec3, heading: Heading, point: Vec3) -> bool {
        let local = point - origin;
        let along = local.dot(heading.vector());
        let across = local.dot(heading.right());
        along >= self.back && along <= self.front && across.abs() <= self.half_width
    }

    /// Signed distance along `heading` from `point` to the near edge.
    pub fn distance_ahead(&self, origin: Vec3, heading: Heading, point: Vec3) -> f32 {
        (origin - point).dot(heading.vector()) + self.back
    }
}

/// World placement of an instance
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
        }
    }
}

/// Describes a placeable track segment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileDescriptor {
    pub kind: TileType,
    /// Distance from this tile's placement point to the next one
    pub offset: f32,
    /// Turn anchor in the tile's local frame (x right, z forward)
    #[serde(default)]
    pub pivot: Vec3,
    /// Baked mesh rotation, Euler degrees
    #[serde(default)]
    pub initial_rotation: Vec3,
    pub bounds: LocalBounds,
}

impl TileDescriptor {
    pub fn straight() -> Self {
        Self {
            kind: TileType::Straight,
            offset: STRAIGHT_TILE_LENGTH,
            pivot: Vec3::ZERO,
            initial_rotation: Vec3::ZERO,
            bounds: LocalBounds {
                back: 0.0,
                front: STRAIGHT_TILE_LENGTH,
                half_width: TILE_HALF_WIDTH,
            },
        }
    }

    pub fn turn(kind: TileType) -> Self {
        Self {
            kind,
            offset: TURN_TILE_HALF_SIZE,
            pivot: Vec3::ZERO,
            initial_rotation: Vec3::ZERO,
            bounds: LocalBounds {
                back: -TURN_TILE_HALF_SIZE,
                front: TURN_TILE_HALF_SIZE,
                half_width: TURN_TILE_HALF_SIZE,
            },
        }
    }

    /// Baked rotation as a quaternion (Y, then X, then Z intrinsic)
    pub fn baked_rotation(&self) -> Quat {
        let r = self.initial_rotation;
        Quat::from_euler(
            EulerRot::YXZ,
            r.y.to_radians(),
            r.x.to_radians(),
            r.z.to_radians(),
        )
    }
}

/// Describes a hazard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObstacleDescriptor {
    pub kind: ObstacleType,
    /// Extent along the heading, centered on the placement point
    pub depth: f32,
    /// Feet must be above this to jump clear
    pub height: f32,
}

impl ObstacleDescriptor {
    pub fn new(kind: ObstacleType) -> Self {
        Self {
            kind,
            depth: OBSTACLE_DEPTH,
            height: JUMP_OBSTACLE_HEIGHT,
        }
    }

    pub fn bounds(&self) -> LocalBounds {
        LocalBounds {
            back: -self.depth / 2.0,
            front: self.depth / 2.0,
            half_width: TILE_HALF_WIDTH,
        }
    }

    /// Whether a player at `feet_height`, optionally sliding, passes through
    pub fn is_cleared(&self, feet_height: f32, sliding: bool) -> bool {
        match self.kind {
            ObstacleType::Jumping => feet_height >= self.height,
            ObstacleType::Sliding => sliding,
        }
    }
}

/// The descriptor set pools are built from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    pub tiles: Vec<TileDescriptor>,
    pub obstacles: Vec<ObstacleDescriptor>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self {
            tiles: vec![
                TileDescriptor::straight(),
                TileDescriptor::turn(TileType::Left),
                TileDescriptor::turn(TileType::Right),
                TileDescriptor::turn(TileType::Sideways),
            ],
            obstacles: vec![
                ObstacleDescriptor::new(ObstacleType::Jumping),
                ObstacleDescriptor::new(ObstacleType::Sliding),
            ],
        }
    }
}

impl Catalog {
    pub fn from_json(json: &str) -> Result<Self, PersistError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, PersistError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
