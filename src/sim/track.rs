//! Procedural track generation
//!
//! The generator keeps a short window of track ahead of the player: a run
//! of straight tiles ending in one turn tile. When the player commits the
//! turn everything behind the turn tile goes back to the pool and a fresh
//! run is laid out along the new heading.

use std::collections::VecDeque;

use glam::Vec3;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::descriptor::{Catalog, ObstacleType, TileType, Transform};
use super::heading::{Heading, Turn};
use super::pool::{Obstacle, PoolError, Pooled, ResourcePool, Tile};

/// Generation tuning
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackParams {
    /// Shortest straight run after a turn
    pub min_straight_run: usize,
    /// Upper bound (exclusive) of a straight run; `<= min` means exactly `min`
    pub max_straight_run: usize,
    /// Chance that an eligible straight tile carries an obstacle
    pub obstacle_spawn_probability: f32,
    /// Obstacle-free straights laid before the first turn
    pub initial_straight_count: usize,
}

impl Default for TrackParams {
    fn default() -> Self {
        Self {
            min_straight_run: 3,
            max_straight_run: 10,
            obstacle_spawn_probability: 0.6,
            initial_straight_count: 5,
        }
    }
}

/// Where the track currently ends
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Cursor {
    pub position: Vec3,
    pub heading: Heading,
}

/// Non-owning link to the most recently placed tile
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileLink {
    pub id: u32,
    pub offset: f32,
}

/// Default turn tile candidates
const TURN_TYPES: [TileType; 3] = [TileType::Left, TileType::Right, TileType::Sideways];

#[derive(Debug)]
pub struct TrackGenerator {
    pool: ResourcePool,
    params: TrackParams,
    cursor: Cursor,
    previous_tile: Option<TileLink>,
    /// Spawn order, oldest first
    active_tiles: VecDeque<Tile>,
    /// Spawn order, oldest first
    active_obstacles: VecDeque<Obstacle>,
    turn_candidates: Vec<TileType>,
    obstacle_candidates: Vec<ObstacleType>,
    rng: Pcg32,
}

impl TrackGenerator {
    pub fn new(catalog: &Catalog, params: TrackParams) -> Result<Self, PoolError> {
        Ok(Self::with_pool(ResourcePool::new(catalog)?, params))
    }

    pub fn with_pool(pool: ResourcePool, params: TrackParams) -> Self {
        Self {
            pool,
            params,
            cursor: Cursor::default(),
            previous_tile: None,
            active_tiles: VecDeque::new(),
            active_obstacles: VecDeque::new(),
            turn_candidates: TURN_TYPES.to_vec(),
            obstacle_candidates: vec![ObstacleType::Jumping, ObstacleType::Sliding],
            rng: Pcg32::seed_from_u64(0),
        }
    }

    /// Seed the RNG and lay the opening run: obstacle-free straights then one turn
    pub fn start_track(&mut self, seed: u64) {
        if !self.active_tiles.is_empty() {
            log::warn!(
                "start_track with {} tiles still active; call reset_track first",
                self.active_tiles.len()
            );
        }
        self.rng = Pcg32::seed_from_u64(seed);
        log::info!("Track started with seed {}", seed);

        self.spawn_straight_run(self.params.initial_straight_count, false);
        let turn = self.select_turn_type();
        self.place_tile(turn, false);
    }

    /// The player committed a turn onto `heading`
    pub fn on_player_turned(&mut self, heading: Heading) {
        debug_assert!(
            self.previous_tile.is_some(),
            "on_player_turned before start_track"
        );
        self.cursor.heading = heading;
        self.retire_behind(1);
        self.cursor.position += self.offset_step();

        let run = self.roll_run_length();
        log::debug!("Turned {:?}, laying {} straights", heading, run);
        self.spawn_straight_run(run, true);
        let turn = self.select_turn_type();
        self.place_tile(turn, false);
    }

    /// Return everything to the pool and rewind the cursor
    pub fn reset_track(&mut self) {
        self.cursor = Cursor::default();
        self.previous_tile = None;
        self.retire_behind(0);
        log::info!("Track reset");
    }

    /// Random turn type, `Sideways` if there are no candidates
    pub fn select_turn_type(&mut self) -> TileType {
        self.turn_candidates
            .choose(&mut self.rng)
            .copied()
            .unwrap_or(TileType::Sideways)
    }

    /// Random obstacle type, `Jumping` if there are no candidates
    pub fn select_obstacle_type(&mut self) -> ObstacleType {
        self.obstacle_candidates
            .choose(&mut self.rng)
            .copied()
            .unwrap_or(ObstacleType::Jumping)
    }

    pub fn set_turn_candidates(&mut self, candidates: Vec<TileType>) {
        debug_assert!(candidates.iter().all(|t| t.is_turn()));
        self.turn_candidates = candidates;
    }

    pub fn set_obstacle_candidates(&mut self, candidates: Vec<ObstacleType>) {
        self.obstacle_candidates = candidates;
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub fn previous_tile(&self) -> Option<TileLink> {
        self.previous_tile
    }

    pub fn active_tiles(&self) -> &VecDeque<Tile> {
        &self.active_tiles
    }

    pub fn active_obstacles(&self) -> &VecDeque<Obstacle> {
        &self.active_obstacles
    }

    pub fn pool(&self) -> &ResourcePool {
        &self.pool
    }

    /// Whether any active tile lies under `point`
    pub fn is_on_track(&self, point: Vec3) -> bool {
        self.active_tiles.iter().any(|t| t.contains(point))
    }

    /// Untouched turn tile under `point`, if any
    pub fn turn_tile_at(&self, point: Vec3) -> Option<&Tile> {
        self.active_tiles
            .iter()
            .find(|t| t.descriptor().kind.is_turn() && !t.turned && t.contains(point))
    }

    /// Validate a turn request at `point`. On success the tile is marked
    /// turned and its pivot is returned.
    pub fn try_commit_turn(&mut self, point: Vec3, turn: Turn) -> Option<Vec3> {
        // Consumed turn tiles may overlap the next one at the pivot
        let tile = self
            .active_tiles
            .iter_mut()
            .find(|t| t.descriptor().kind.is_turn() && !t.turned && t.contains(point))?;

        let allowed = match tile.descriptor().kind {
            TileType::Left => turn == Turn::Left,
            TileType::Right => turn == Turn::Right,
            TileType::Sideways => true,
            TileType::Straight => false,
        };
        if !allowed {
            return None;
        }

        tile.turned = true;
        Some(tile.pivot_position())
    }

    /// Active obstacle whose footprint contains `point`
    pub fn obstacle_at(&self, point: Vec3) -> Option<&Obstacle> {
        self.active_obstacles.iter().find(|o| o.contains(point))
    }

    /// Nearest obstacle on `heading` not yet passed, with the distance to its near edge
    pub fn next_obstacle_ahead(&self, point: Vec3, heading: Heading) -> Option<(&Obstacle, f32)> {
        self.active_obstacles
            .iter()
            .filter(|o| o.heading == heading)
            .map(|o| (o, o.distance_ahead(point, heading)))
            .filter(|(o, d)| *d >= -o.descriptor().depth)
            .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
    }

    fn roll_run_length(&mut self) -> usize {
        let (min, max) = (self.params.min_straight_run, self.params.max_straight_run);
        if max > min {
            self.rng.random_range(min..max)
        } else {
            min
        }
    }

    fn spawn_straight_run(&mut self, count: usize, with_obstacles: bool) {
        for i in 0..count {
            // First tile of a run is a safe landing
            self.place_tile(TileType::Straight, with_obstacles && i != 0);
        }
    }

    fn place_tile(&mut self, kind: TileType, allow_obstacle: bool) {
        let mut tile = self.pool.tiles.acquire(kind);
        let rotation = tile.descriptor().baked_rotation() * self.cursor.heading.look_rotation();
        tile.place(
            Transform {
                position: self.cursor.position,
                rotation,
            },
            self.cursor.heading,
        );
        self.previous_tile = Some(TileLink {
            id: tile.id(),
            offset: tile.offset(),
        });
        self.active_tiles.push_back(tile);

        if allow_obstacle && self.roll_obstacle() {
            self.place_obstacle();
        }

        if kind == TileType::Straight {
            self.cursor.position += self.offset_step();
        }
    }

    fn roll_obstacle(&mut self) -> bool {
        self.rng.random::<f32>() < self.params.obstacle_spawn_probability
    }

    fn place_obstacle(&mut self) {
        let kind = self.select_obstacle_type();
        let mut obstacle = self.pool.obstacles.acquire(kind);
        obstacle.place(
            Transform {
                position: self.cursor.position,
                rotation: self.cursor.heading.look_rotation(),
            },
            self.cursor.heading,
        );
        self.active_obstacles.push_back(obstacle);
    }

    /// Previous tile's offset along the current heading
    fn offset_step(&self) -> Vec3 {
        let offset = self.previous_tile.map_or(0.0, |link| link.offset);
        self.cursor.heading.vector() * offset
    }

    /// Retire the oldest tiles until `keep` remain, and every obstacle
    fn retire_behind(&mut self, keep: usize) {
        while self.active_tiles.len() > keep {
            if let Some(tile) = self.active_tiles.pop_front() {
                self.pool.tiles.release(tile);
            }
        }
        while let Some(obstacle) = self.active_obstacles.pop_front() {
            self.pool.obstacles.release(obstacle);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;
    use proptest::prelude::*;

    fn generator(params: TrackParams) -> TrackGenerator {
        TrackGenerator::new(&Catalog::default(), params).unwrap()
    }

    fn last_turn(track: &TrackGenerator) -> TileType {
        track.active_tiles().back().unwrap().descriptor().kind
    }

    /// Heading the player would take off the current last turn tile
    fn exit_heading(track: &TrackGenerator, prefer_right: bool) -> Heading {
        let turn = match last_turn(track) {
            TileType::Left => Turn::Left,
            TileType::Right => Turn::Right,
            _ if prefer_right => Turn::Right,
            _ => Turn::Left,
        };
        track.cursor().heading.turned(turn)
    }

    #[test]
    fn test_start_track_layout() {
        let mut track = generator(TrackParams {
            initial_straight_count: 5,
            obstacle_spawn_probability: 1.0,
            ..Default::default()
        });
        track.start_track(7);

        assert_eq!(track.active_tiles().len(), 6);
        assert_eq!(track.active_obstacles().len(), 0);
        let kinds: Vec<_> = track.active_tiles().iter().map(|t| t.descriptor().kind).collect();
        assert!(kinds[..5].iter().all(|k| *k == TileType::Straight));
        assert!(kinds[5].is_turn());

        // Turn tile sits where the last straight ends; the cursor stays there
        let turn_pos = track.active_tiles()[5].transform.position;
        assert!((turn_pos - Vec3::Z * 5.0 * STRAIGHT_TILE_LENGTH).length() < 1e-4);
        assert_eq!(track.cursor().position, turn_pos);
    }

    #[test]
    fn test_turn_keeps_only_turn_tile() {
        let mut track = generator(TrackParams::default());
        track.start_track(1);
        let turn_id = track.active_tiles().back().unwrap().id();
        let heading = exit_heading(&track, true);
        assert!(matches!(heading, Heading::East | Heading::West));

        track.on_player_turned(heading);
        assert_eq!(track.active_tiles().front().unwrap().id(), turn_id);
        assert_eq!(track.cursor().heading, heading);
    }

    #[test]
    fn test_trim_leaves_one_tile() {
        let mut track = generator(TrackParams {
            obstacle_spawn_probability: 1.0,
            ..Default::default()
        });
        track.start_track(3);
        let heading = exit_heading(&track, false);
        track.on_player_turned(heading);
        assert!(!track.active_obstacles().is_empty());

        track.retire_behind(1);
        assert_eq!(track.active_tiles().len(), 1);
        assert!(track.active_obstacles().is_empty());
        assert_eq!(track.pool().tiles.live(), 1);
    }

    #[test]
    fn test_fixed_run_length_and_safe_landing() {
        let mut track = generator(TrackParams {
            min_straight_run: 3,
            max_straight_run: 3,
            obstacle_spawn_probability: 1.0,
            initial_straight_count: 5,
        });
        track.start_track(11);

        for i in 0..8 {
            let heading = exit_heading(&track, i % 2 == 0);
            track.on_player_turned(heading);

            let tiles = track.active_tiles();
            assert_eq!(tiles.len(), 3 + 2);
            let straights = tiles.iter().filter(|t| t.descriptor().kind == TileType::Straight);
            assert_eq!(straights.count(), 3);

            // Every eligible tile got one; the landing tile did not
            assert_eq!(track.active_obstacles().len(), 2);
            let landing = tiles[1].transform.position;
            assert!(
                track
                    .active_obstacles()
                    .iter()
                    .all(|o| (o.transform.position - landing).length() > 1e-3)
            );
        }
    }

    #[test]
    fn test_run_starts_past_turn_tile() {
        let mut track = generator(TrackParams::default());
        track.start_track(5);
        let pivot = track.active_tiles().back().unwrap().pivot_position();
        let heading = exit_heading(&track, true);
        track.on_player_turned(heading);

        let first_run_tile = &track.active_tiles()[1];
        let expected = pivot + heading.vector() * TURN_TILE_HALF_SIZE;
        assert!((first_run_tile.transform.position - expected).length() < 1e-4);
        assert_eq!(first_run_tile.heading, heading);
    }

    #[test]
    fn test_reset_is_idempotent() {
        let mut track = generator(TrackParams::default());
        track.start_track(9);
        track.on_player_turned(exit_heading(&track, true));

        track.reset_track();
        let once = (track.cursor(), track.active_tiles().len(), track.active_obstacles().len());
        track.reset_track();
        let twice = (track.cursor(), track.active_tiles().len(), track.active_obstacles().len());

        assert_eq!(once, twice);
        assert_eq!(once.0, Cursor::default());
        assert_eq!(once.1, 0);
        assert_eq!(once.2, 0);
        assert!(track.previous_tile().is_none());
        assert_eq!(track.pool().tiles.live(), 0);
        assert_eq!(track.pool().obstacles.live(), 0);
    }

    #[test]
    fn test_restart_reuses_pooled_tiles() {
        let mut track = generator(TrackParams::default());
        track.start_track(2);
        let constructed = track.pool().tiles.constructed(TileType::Straight);
        track.reset_track();
        track.start_track(2);
        assert_eq!(track.pool().tiles.constructed(TileType::Straight), constructed);
    }

    #[test]
    fn test_same_seed_same_layout() {
        let layout = |seed| {
            let mut track = generator(TrackParams::default());
            track.start_track(seed);
            let mut out = Vec::new();
            for i in 0..5 {
                track.on_player_turned(exit_heading(&track, i % 2 == 0));
                out.extend(
                    track
                        .active_tiles()
                        .iter()
                        .map(|t| (t.descriptor().kind, t.transform.position)),
                );
                out.extend(
                    track
                        .active_obstacles()
                        .iter()
                        .map(|o| (TileType::Straight, o.transform.position)),
                );
            }
            out
        };
        assert_eq!(layout(42), layout(42));
    }

    #[test]
    fn test_empty_turn_candidates_fall_back() {
        let mut track = generator(TrackParams::default());
        track.set_turn_candidates(Vec::new());
        for _ in 0..4 {
            assert_eq!(track.select_turn_type(), TileType::Sideways);
        }
    }

    #[test]
    fn test_empty_obstacle_candidates_fall_back() {
        let mut track = generator(TrackParams::default());
        track.set_obstacle_candidates(Vec::new());
        assert_eq!(track.select_obstacle_type(), ObstacleType::Jumping);
    }

    #[test]
    fn test_commit_turn_rules() {
        let mut track = generator(TrackParams::default());
        track.set_turn_candidates(vec![TileType::Left]);
        track.start_track(4);
        let center = track.active_tiles().back().unwrap().transform.position;

        assert!(track.try_commit_turn(center, Turn::Right).is_none());
        assert_eq!(track.try_commit_turn(center, Turn::Left), Some(center));
        // Already consumed
        assert!(track.try_commit_turn(center, Turn::Left).is_none());
        assert!(track.turn_tile_at(center).is_none());
        // Not on a turn tile
        assert!(track.try_commit_turn(Vec3::new(0.0, 0.0, 1.0), Turn::Left).is_none());
    }

    #[test]
    fn test_sideways_accepts_both() {
        let mut track = generator(TrackParams::default());
        track.set_turn_candidates(vec![TileType::Sideways]);
        track.start_track(4);
        let center = track.active_tiles().back().unwrap().transform.position;
        assert!(track.turn_tile_at(center).is_some());
        assert!(track.try_commit_turn(center, Turn::Right).is_some());
    }

    #[test]
    fn test_back_to_back_turns_commit() {
        let mut track = generator(TrackParams {
            min_straight_run: 0,
            max_straight_run: 0,
            ..Default::default()
        });
        track.set_turn_candidates(vec![TileType::Sideways]);
        track.start_track(2);
        let pivot = track.active_tiles().back().unwrap().transform.position;
        let pivot = track.try_commit_turn(pivot, Turn::Right).unwrap();
        track.on_player_turned(Heading::East);

        // The next turn tile's back edge touches the pivot of the used one
        assert_eq!(track.active_tiles().len(), 2);
        let next = track.turn_tile_at(pivot).unwrap().id();
        assert_ne!(next, track.active_tiles()[0].id());
        assert!(track.try_commit_turn(pivot, Turn::Right).is_some());
        assert!(track.active_tiles()[1].turned);
    }

    #[test]
    fn test_zero_probability_never_spawns() {
        let mut track = generator(TrackParams {
            obstacle_spawn_probability: 0.0,
            ..Default::default()
        });
        track.start_track(17);
        for _ in 0..20 {
            let heading = exit_heading(&track, true);
            track.on_player_turned(heading);
            assert!(track.active_obstacles().is_empty());
        }
        assert_eq!(track.pool().obstacles.live(), 0);
    }

    #[test]
    fn test_track_surface_queries() {
        let mut track = generator(TrackParams::default());
        track.start_track(8);
        assert!(track.is_on_track(Vec3::new(0.0, 0.0, 0.0)));
        assert!(track.is_on_track(Vec3::new(2.5, 0.0, 25.0)));
        assert!(!track.is_on_track(Vec3::new(4.0, 0.0, 25.0)));
        // Past the far edge of the turn tile
        let end = 5.0 * STRAIGHT_TILE_LENGTH + TURN_TILE_HALF_SIZE + 0.1;
        assert!(!track.is_on_track(Vec3::new(0.0, 0.0, end)));
    }

    #[test]
    fn test_next_obstacle_ahead() {
        let mut track = generator(TrackParams {
            min_straight_run: 4,
            max_straight_run: 4,
            obstacle_spawn_probability: 1.0,
            ..Default::default()
        });
        track.start_track(6);
        let heading = exit_heading(&track, true);
        track.on_player_turned(heading);

        let landing = track.active_tiles()[1].transform.position;
        let (obstacle, distance) = track.next_obstacle_ahead(landing, heading).unwrap();
        let expected = STRAIGHT_TILE_LENGTH - obstacle.descriptor().depth / 2.0;
        assert!((distance - expected).abs() < 1e-3);
        assert!(track.obstacle_at(landing).is_none());
        assert!(track.obstacle_at(obstacle.transform.position).is_some());
    }

    proptest! {
        #[test]
        fn prop_window_stays_bounded(seed in any::<u64>(), picks in prop::collection::vec(any::<bool>(), 1..24)) {
            let params = TrackParams::default();
            let mut track = generator(params);
            track.start_track(seed);

            for prefer_right in picks {
                let trailing = track.active_tiles().back().unwrap().id();
                track.on_player_turned(exit_heading(&track, prefer_right));

                let tiles = track.active_tiles();
                let run = tiles.len() - 2;
                prop_assert!(run >= params.min_straight_run && run < params.max_straight_run);
                prop_assert_eq!(tiles.front().unwrap().id(), trailing);
                prop_assert!(tiles.back().unwrap().descriptor().kind.is_turn());
                prop_assert!(track.active_obstacles().len() < run);
                prop_assert_eq!(track.pool().tiles.live(), tiles.len());
                prop_assert_eq!(track.pool().obstacles.live(), track.active_obstacles().len());
            }
        }
    }
}
