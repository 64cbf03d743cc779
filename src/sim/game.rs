//! Game orchestration
//!
//! Wires the player, the track generator, audio cues and the high score
//! together. All mutation goes through `&mut Game`, so turn handling and
//! track start/reset are serialized by construction.

use super::descriptor::{Catalog, ObstacleType, TileType};
use super::heading::{Heading, Turn};
use super::player::{Player, PlayerEvent};
use super::pool::PoolError;
use super::timer::DeferredTimer;
use super::track::TrackGenerator;
use crate::audio::{AudioSink, SoundCue};
use crate::highscores::HighScore;
use crate::persistence::KeyValueStore;
use crate::platform;
use crate::settings::Settings;

/// Current phase of the game flow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    /// Main menu, no run in progress
    Menu,
    /// A run is live (the player may still be waiting to start)
    Playing,
    /// Run frozen
    Paused,
    /// Run ended
    GameOver,
}

/// Notifications for the presentation layer
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GameEvent {
    PhaseChanged(GamePhase),
    /// The start delay elapsed and the player began running
    PlayerActivated,
    ScoreUpdated(u64),
    PlayerTurned(Heading),
    GameOver { score: u64, new_high_score: bool },
}

/// Input commands for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    pub turn: Option<Turn>,
    pub jump: bool,
    pub slide: bool,
    /// Demo mode - the game plays itself
    pub autopilot: bool,
}

pub struct Game {
    phase: GamePhase,
    track: TrackGenerator,
    player: Player,
    high_score: HighScore,
    store: Box<dyn KeyValueStore>,
    audio: Box<dyn AudioSink>,
    /// Player activation after a play request (real time)
    enable_player: DeferredTimer,
    start_delay: f32,
    events: Vec<GameEvent>,
    player_events: Vec<PlayerEvent>,
}

impl Game {
    pub fn new(
        settings: &Settings,
        catalog: &Catalog,
        mut audio: Box<dyn AudioSink>,
        store: Box<dyn KeyValueStore>,
    ) -> Result<Self, PoolError> {
        let track = TrackGenerator::new(catalog, settings.track)?;
        let high_score = HighScore::load_or_default(store.as_ref());

        audio.set_volumes(settings.volumes());
        audio.play(SoundCue::MenuTheme);

        Ok(Self {
            phase: GamePhase::Menu,
            track,
            player: Player::new(),
            high_score,
            store,
            audio,
            enable_player: DeferredTimer::new(),
            start_delay: settings.start_delay_secs,
            events: Vec::new(),
            player_events: Vec::new(),
        })
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn track(&self) -> &TrackGenerator {
        &self.track
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn high_score(&self) -> HighScore {
        self.high_score
    }

    /// True while the start delay is running
    pub fn is_player_pending(&self) -> bool {
        self.enable_player.is_pending()
    }

    /// Take all events raised since the last call
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Start a run from the menu with a clock-derived seed
    pub fn play(&mut self) {
        self.play_with_seed(platform::run_seed());
    }

    pub fn play_with_seed(&mut self, seed: u64) {
        if self.phase != GamePhase::Menu {
            log::warn!("play ignored in {:?}", self.phase);
            return;
        }
        self.track.start_track(seed);
        self.enable_player.schedule(self.start_delay);
        self.set_phase(GamePhase::Playing);
    }

    pub fn pause(&mut self) {
        if self.phase != GamePhase::Playing {
            return;
        }
        self.player.set_movement_enabled(false);
        self.audio.pause_music();
        self.set_phase(GamePhase::Paused);
    }

    pub fn resume(&mut self) {
        if self.phase != GamePhase::Paused {
            return;
        }
        self.player.set_movement_enabled(true);
        self.audio.resume_music();
        self.set_phase(GamePhase::Playing);
    }

    /// Tear down the current run and start a new one
    pub fn restart(&mut self) {
        self.restart_with_seed(platform::run_seed());
    }

    pub fn restart_with_seed(&mut self, seed: u64) {
        self.teardown();
        self.set_phase(GamePhase::Menu);
        self.play_with_seed(seed);
    }

    pub fn exit_to_menu(&mut self) {
        self.teardown();
        self.set_phase(GamePhase::Menu);
        self.audio.play(SoundCue::MenuTheme);
    }

    /// Advance one simulation step
    pub fn tick(&mut self, dt: f32, input: &TickInput) {
        // Real-time wait: runs in every phase
        if self.enable_player.tick(dt) {
            self.player.activate();
            self.audio.play(SoundCue::GameplayTheme);
            if self.phase == GamePhase::Paused {
                self.audio.pause_music();
            }
            self.events.push(GameEvent::PlayerActivated);
        }

        if self.phase != GamePhase::Playing {
            return;
        }

        let input = if input.autopilot {
            self.autopilot_input()
        } else {
            input.clone()
        };

        let mut player_events = std::mem::take(&mut self.player_events);

        if let Some(turn) = input.turn {
            if let Some(commit) = self.player.check_turn(turn, &mut self.track, &mut player_events) {
                // Track reacts before the player moves onto the new heading
                self.track.on_player_turned(commit.heading);
                self.player.apply_turn(commit);
                self.events.push(GameEvent::PlayerTurned(commit.heading));
            }
        }
        if input.jump {
            self.player.jump(&self.track, &mut player_events);
        }
        if input.slide {
            self.player.slide(&self.track, &mut player_events);
        }

        self.player.tick(dt, &self.track, &mut player_events);

        for event in player_events.drain(..) {
            self.dispatch(event);
        }
        self.player_events = player_events;
    }

    fn dispatch(&mut self, event: PlayerEvent) {
        match event {
            PlayerEvent::Sound(cue) => self.audio.play(cue),
            PlayerEvent::ScoreUpdated(score) => self.events.push(GameEvent::ScoreUpdated(score)),
            PlayerEvent::GameOver(score) => self.on_game_over(score),
        }
    }

    fn on_game_over(&mut self, score: u64) {
        let new_high_score = self.high_score.submit(score);
        if new_high_score {
            if let Err(e) = self.high_score.save(self.store.as_mut()) {
                log::error!("Failed to save high score: {}", e);
            }
        }
        log::info!("Game over: score {} (new high score: {})", score, new_high_score);

        self.events.push(GameEvent::GameOver {
            score,
            new_high_score,
        });
        self.audio.play(SoundCue::GameOver);
        self.set_phase(GamePhase::GameOver);
    }

    /// Deactivate and rewind everything, leaving movement enabled
    fn teardown(&mut self) {
        self.enable_player.cancel();
        self.player.deactivate();
        self.track.reset_track();
        self.player.reset();
        self.player.set_movement_enabled(true);
    }

    fn set_phase(&mut self, phase: GamePhase) {
        if self.phase != phase {
            self.phase = phase;
            self.events.push(GameEvent::PhaseChanged(phase));
        }
    }

    /// Turn on every untouched turn tile, jump or slide approaching obstacles
    fn autopilot_input(&self) -> TickInput {
        let position = self.player.position;
        let heading = self.player.heading;
        let mut input = TickInput::default();

        if let Some(tile) = self.track.turn_tile_at(position) {
            input.turn = Some(match tile.descriptor().kind {
                TileType::Left => Turn::Left,
                _ => Turn::Right,
            });
        }

        if let Some((obstacle, distance)) = self.track.next_obstacle_ahead(position, heading) {
            match obstacle.descriptor().kind {
                ObstacleType::Jumping if (2.0..=4.0).contains(&distance) => input.jump = true,
                ObstacleType::Sliding if (0.5..=3.0).contains(&distance) => input.slide = true,
                _ => {}
            }
        }

        input
    }
}
