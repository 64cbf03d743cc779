//! Deterministic simulation module
//!
//! All gameplay logic lives here:
//! - Fixed timestep only
//! - Seeded RNG only (one `Pcg32` per run)
//! - Stable iteration order (track window is a FIFO)
//! - No rendering or platform dependencies beyond the injected sinks

pub mod descriptor;
pub mod game;
pub mod heading;
pub mod player;
pub mod pool;
pub mod timer;
pub mod track;

pub use descriptor::{
    Catalog, LocalBounds, ObstacleDescriptor, ObstacleType, TileDescriptor, TileType, Transform,
    Variant,
};
pub use game::{Game, GameEvent, GamePhase, TickInput};
pub use heading::{Heading, Turn};
pub use player::{Player, PlayerEvent, TurnCommit};
pub use pool::{Obstacle, Parent, Pool, PoolError, Pooled, ResourcePool, Tile};
pub use timer::DeferredTimer;
pub use track::{Cursor, TileLink, TrackGenerator, TrackParams};
