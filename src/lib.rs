//! Endless Runner - procedural track core
//!
//! Core modules:
//! - `sim`: Track generation, pooling, locomotion and game flow
//! - `audio`: Sound cue contract consumed by the presentation layer
//! - `persistence`: Key-value storage for the high score and settings
//! - `platform`: Browser/native platform abstraction

pub mod audio;
pub mod highscores;
pub mod persistence;
pub mod platform;
pub mod settings;
pub mod sim;

pub use highscores::HighScore;
pub use settings::Settings;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Track geometry
    pub const TILE_HALF_WIDTH: f32 = 3.0;
    pub const STRAIGHT_TILE_LENGTH: f32 = 10.0;
    /// Turn tiles are squares centered on their placement point
    pub const TURN_TILE_HALF_SIZE: f32 = 3.0;

    /// Obstacle geometry
    pub const OBSTACLE_DEPTH: f32 = 1.0;
    pub const JUMP_OBSTACLE_HEIGHT: f32 = 0.5;

    /// Player movement
    pub const INITIAL_PLAYER_SPEED: f32 = 10.0;
    pub const MAX_PLAYER_SPEED: f32 = 15.0;
    pub const PLAYER_SPEED_INCREASE_RATE: f32 = 0.1;
    pub const JUMP_HEIGHT: f32 = 1.0;
    pub const INITIAL_GRAVITY: f32 = -9.81;
    pub const JUMP_COEFFICIENT: f32 = -3.0;
    /// Feet within this height of the ground count as grounded
    pub const GROUNDED_TOLERANCE: f32 = 0.2;

    /// Score accrued per second of running
    pub const SCORE_PER_SECOND: f32 = 10.0;

    /// Slide length at playback rate 1.0
    pub const SLIDE_SECONDS: f32 = 0.6;
    pub const MAX_PLAYBACK_RATE: f32 = 1.25;

    /// Delay between a play request and player activation (real time)
    pub const PLAYER_START_DELAY: f32 = 0.5;
}
