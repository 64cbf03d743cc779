//! Simplified player locomotion
//!
//! Runs forward along the current heading, ramps speed, integrates
//! gravity, and reports turn commits, score and game over as events.

use glam::Vec3;

use super::heading::{Heading, Turn};
use super::timer::DeferredTimer;
use super::track::TrackGenerator;
use crate::audio::SoundCue;
use crate::consts::*;

/// Signals raised by the player during a tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlayerEvent {
    Sound(SoundCue),
    /// Whole points so far, once per tick while moving
    ScoreUpdated(u64),
    /// Final score, once per life
    GameOver(u64),
}

/// A validated turn, applied after the track has reacted to it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TurnCommit {
    pub heading: Heading,
    pub pivot: Vec3,
}

#[derive(Debug, Clone)]
pub struct Player {
    /// Feet position; y is height above the track surface
    pub position: Vec3,
    pub heading: Heading,
    vertical_velocity: f32,
    speed: f32,
    gravity: f32,
    score: f32,
    sliding: bool,
    slide_timer: DeferredTimer,
    /// Animation playback rate, only used to scale the slide length
    playback_rate: f32,
    active: bool,
    movement_enabled: bool,
}

impl Default for Player {
    fn default() -> Self {
        Self::new()
    }
}

impl Player {
    /// A player at the origin, inactive until activated
    pub fn new() -> Self {
        Self {
            position: Vec3::ZERO,
            heading: Heading::North,
            vertical_velocity: 0.0,
            speed: INITIAL_PLAYER_SPEED,
            gravity: INITIAL_GRAVITY,
            score: 0.0,
            sliding: false,
            slide_timer: DeferredTimer::new(),
            playback_rate: 1.0,
            active: false,
            movement_enabled: true,
        }
    }

    /// Back to the start line. Activation and the movement flag are untouched.
    pub fn reset(&mut self) {
        self.position = Vec3::ZERO;
        self.heading = Heading::North;
        self.vertical_velocity = 0.0;
        self.speed = INITIAL_PLAYER_SPEED;
        self.gravity = INITIAL_GRAVITY;
        self.score = 0.0;
        self.sliding = false;
        self.slide_timer.cancel();
        self.playback_rate = 1.0;
    }

    pub fn activate(&mut self) {
        self.active = true;
    }

    pub fn deactivate(&mut self) {
        self.active = false;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn set_movement_enabled(&mut self, enabled: bool) {
        self.movement_enabled = enabled;
    }

    pub fn score(&self) -> u64 {
        self.score as u64
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn is_sliding(&self) -> bool {
        self.sliding
    }

    fn can_act(&self) -> bool {
        self.active && self.movement_enabled
    }

    /// On the surface and not still rising from a jump
    pub fn is_grounded(&self, track: &TrackGenerator) -> bool {
        self.position.y <= GROUNDED_TOLERANCE
            && self.vertical_velocity <= 0.0
            && track.is_on_track(self.position)
    }

    pub fn jump(&mut self, track: &TrackGenerator, events: &mut Vec<PlayerEvent>) {
        if !self.can_act() || self.sliding || !self.is_grounded(track) {
            return;
        }
        events.push(PlayerEvent::Sound(SoundCue::Jump));
        self.vertical_velocity += (JUMP_HEIGHT * self.gravity * JUMP_COEFFICIENT).sqrt();
    }

    pub fn slide(&mut self, track: &TrackGenerator, events: &mut Vec<PlayerEvent>) {
        if !self.can_act() || self.sliding || !self.is_grounded(track) {
            return;
        }
        self.sliding = true;
        self.slide_timer.schedule(SLIDE_SECONDS / self.playback_rate);
        events.push(PlayerEvent::Sound(SoundCue::Slide));
    }

    /// Ask the track to accept a turn here. The caller forwards the new
    /// heading to the generator, then calls `apply_turn`.
    pub fn check_turn(
        &mut self,
        turn: Turn,
        track: &mut TrackGenerator,
        events: &mut Vec<PlayerEvent>,
    ) -> Option<TurnCommit> {
        if !self.can_act() {
            return None;
        }
        let pivot = track.try_commit_turn(self.position, turn)?;
        events.push(PlayerEvent::Sound(SoundCue::Turn));
        Some(TurnCommit {
            heading: self.heading.turned(turn),
            pivot,
        })
    }

    /// Snap onto the turn pivot, keeping height
    pub fn apply_turn(&mut self, commit: TurnCommit) {
        self.position = Vec3::new(commit.pivot.x, self.position.y, commit.pivot.z);
        self.heading = commit.heading;
    }

    pub fn tick(&mut self, dt: f32, track: &TrackGenerator, events: &mut Vec<PlayerEvent>) {
        if !self.can_act() {
            return;
        }

        if !track.is_on_track(self.position) {
            log::info!("Player left the track at {:?}", self.position);
            self.game_over(events);
            return;
        }

        self.score += SCORE_PER_SECOND * dt;
        events.push(PlayerEvent::ScoreUpdated(self.score()));

        if self.slide_timer.tick(dt) {
            self.sliding = false;
        }

        self.update_movement(dt);

        if let Some(obstacle) = track.obstacle_at(self.position) {
            if !obstacle
                .descriptor()
                .is_cleared(self.position.y, self.sliding)
            {
                log::info!("Player hit a {:?} obstacle", obstacle.descriptor().kind);
                events.push(PlayerEvent::Sound(SoundCue::ObstacleHit));
                self.game_over(events);
            }
        }
    }

    fn update_movement(&mut self, dt: f32) {
        self.position += self.heading.vector() * self.speed * dt;

        let grounded = self.position.y <= GROUNDED_TOLERANCE;
        if grounded && self.vertical_velocity < 0.0 {
            self.vertical_velocity = 0.0;
        }
        self.vertical_velocity += self.gravity * dt;
        self.position.y += self.vertical_velocity * dt;
        // Track surface
        if self.position.y < 0.0 {
            self.position.y = 0.0;
        }

        if self.speed < MAX_PLAYER_SPEED {
            self.speed += dt * PLAYER_SPEED_INCREASE_RATE;
            self.gravity = INITIAL_GRAVITY - self.speed;
            if self.playback_rate < MAX_PLAYBACK_RATE {
                self.playback_rate += 1.0 / self.speed * dt;
            }
        }
    }

    fn game_over(&mut self, events: &mut Vec<PlayerEvent>) {
        self.slide_timer.cancel();
        self.sliding = false;
        events.push(PlayerEvent::GameOver(self.score()));
        self.active = false;
    }
}
