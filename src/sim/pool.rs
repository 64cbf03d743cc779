//! Instance pooling for tiles and obstacles
//!
//! Instances move between the pool and the active track by value, so an
//! instance is always owned by exactly one of them.

use glam::Vec3;
use thiserror::Error;

use super::descriptor::{
    Catalog, ObstacleDescriptor, ObstacleType, TileDescriptor, TileType, Transform, Variant,
};
use super::heading::Heading;

/// Startup configuration problems. These are fatal: no valid track can be built.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PoolError {
    #[error("{pool} pool: no descriptor for variant {variant}")]
    MissingDescriptor { pool: &'static str, variant: String },
    #[error("{pool} pool: duplicate descriptor for variant {variant}")]
    DuplicateDescriptor { pool: &'static str, variant: String },
}

/// Where an instance is attached in the scene
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parent {
    /// Placed on the track
    Ground,
    /// Parked in the pool
    Pool,
}

/// Something a `Pool` can construct from a descriptor and recycle
pub trait Pooled {
    type Kind: Variant;
    type Descriptor: Clone + std::fmt::Debug;

    fn descriptor_kind(descriptor: &Self::Descriptor) -> Self::Kind;

    /// Build a fresh, inactive instance
    fn instantiate(id: u32, descriptor: &Self::Descriptor) -> Self;

    fn id(&self) -> u32;

    fn kind(&self) -> Self::Kind;

    /// Deactivate, clear consumable state and park under the pool
    fn recycle(&mut self);
}

/// A placed track segment
#[derive(Debug)]
pub struct Tile {
    id: u32,
    descriptor: TileDescriptor,
    pub transform: Transform,
    /// Heading the tile was laid out along
    pub heading: Heading,
    pub active: bool,
    pub parent: Parent,
    /// Set once the player has used this tile's turn
    pub turned: bool,
}

impl Tile {
    pub fn descriptor(&self) -> &TileDescriptor {
        &self.descriptor
    }

    pub fn offset(&self) -> f32 {
        self.descriptor.offset
    }

    /// Turn anchor in world space
    pub fn pivot_position(&self) -> Vec3 {
        let local = self.descriptor.pivot;
        self.transform.position + self.heading.right() * local.x
            + Vec3::Y * local.y
            + self.heading.vector() * local.z
    }

    /// Whether a world point lies over this tile (height ignored)
    pub fn contains(&self, point: Vec3) -> bool {
        self.descriptor
            .bounds
            .contains(self.transform.position, self.heading, point)
    }

    pub(crate) fn place(&mut self, transform: Transform, heading: Heading) {
        self.transform = transform;
        self.heading = heading;
        self.parent = Parent::Ground;
        self.active = true;
    }
}

impl Pooled for Tile {
    type Kind = TileType;
    type Descriptor = TileDescriptor;

    fn descriptor_kind(descriptor: &TileDescriptor) -> TileType {
        descriptor.kind
    }

    fn instantiate(id: u32, descriptor: &TileDescriptor) -> Self {
        Self {
            id,
            descriptor: descriptor.clone(),
            transform: Transform::default(),
            heading: Heading::North,
            active: false,
            parent: Parent::Pool,
            turned: false,
        }
    }

    fn id(&self) -> u32 {
        self.id
    }

    fn kind(&self) -> TileType {
        self.descriptor.kind
    }

    fn recycle(&mut self) {
        self.active = false;
        self.turned = false;
        self.parent = Parent::Pool;
    }
}

/// A placed hazard
#[derive(Debug)]
pub struct Obstacle {
    id: u32,
    descriptor: ObstacleDescriptor,
    pub transform: Transform,
    pub heading: Heading,
    pub active: bool,
    pub parent: Parent,
}

impl Obstacle {
    pub fn descriptor(&self) -> &ObstacleDescriptor {
        &self.descriptor
    }

    pub fn contains(&self, point: Vec3) -> bool {
        self.descriptor
            .bounds()
            .contains(self.transform.position, self.heading, point)
    }

    /// Distance along `heading` from `point` to this obstacle's near edge
    pub fn distance_ahead(&self, point: Vec3, heading: Heading) -> f32 {
        self.descriptor
            .bounds()
            .distance_ahead(self.transform.position, heading, point)
    }

    pub(crate) fn place(&mut self, transform: Transform, heading: Heading) {
        self.transform = transform;
        self.heading = heading;
        self.parent = Parent::Ground;
        self.active = true;
    }
}

impl Pooled for Obstacle {
    type Kind = ObstacleType;
    type Descriptor = ObstacleDescriptor;

    fn descriptor_kind(descriptor: &ObstacleDescriptor) -> ObstacleType {
        descriptor.kind
    }

    fn instantiate(id: u32, descriptor: &ObstacleDescriptor) -> Self {
        Self {
            id,
            descriptor: descriptor.clone(),
            transform: Transform::default(),
            heading: Heading::North,
            active: false,
            parent: Parent::Pool,
        }
    }

    fn id(&self) -> u32 {
        self.id
    }

    fn kind(&self) -> ObstacleType {
        self.descriptor.kind
    }

    // Transform is left as is; placement overwrites it on the next acquire.
    fn recycle(&mut self) {
        self.active = false;
        self.parent = Parent::Pool;
    }
}

/// Free bags partitioned by variant, plus the descriptors to grow them
#[derive(Debug)]
pub struct Pool<T: Pooled> {
    name: &'static str,
    /// Indexed by `Variant::index`, one per variant
    descriptors: Vec<T::Descriptor>,
    free: Vec<Vec<T>>,
    constructed: Vec<usize>,
    next_id: u32,
}

impl<T: Pooled> Pool<T> {
    /// Build a pool. Every variant needs exactly one descriptor.
    pub fn new(
        name: &'static str,
        descriptors: impl IntoIterator<Item = T::Descriptor>,
    ) -> Result<Self, PoolError> {
        let all = <T::Kind as Variant>::ALL;
        let mut slots: Vec<Option<T::Descriptor>> = vec![None; all.len()];

        for descriptor in descriptors {
            let kind = T::descriptor_kind(&descriptor);
            let slot = &mut slots[kind.index()];
            if slot.is_some() {
                return Err(PoolError::DuplicateDescriptor {
                    pool: name,
                    variant: format!("{:?}", kind),
                });
            }
            *slot = Some(descriptor);
        }

        let mut resolved = Vec::with_capacity(all.len());
        for (kind, slot) in all.iter().zip(slots) {
            match slot {
                Some(descriptor) => resolved.push(descriptor),
                None => {
                    return Err(PoolError::MissingDescriptor {
                        pool: name,
                        variant: format!("{:?}", kind),
                    });
                }
            }
        }

        Ok(Self {
            name,
            descriptors: resolved,
            free: (0..all.len()).map(|_| Vec::new()).collect(),
            constructed: vec![0; all.len()],
            next_id: 1,
        })
    }

    /// Take an idle instance of `kind`, constructing one if none is free.
    pub fn acquire(&mut self, kind: T::Kind) -> T {
        let idx = kind.index();
        if let Some(instance) = self.free[idx].pop() {
            return instance;
        }

        let id = self.next_id;
        self.next_id += 1;
        self.constructed[idx] += 1;
        log::debug!("{} pool: constructed {:?} #{}", self.name, kind, id);
        T::instantiate(id, &self.descriptors[idx])
    }

    /// Park an instance for reuse
    pub fn release(&mut self, mut instance: T) {
        let idx = instance.kind().index();
        debug_assert!(
            !self.free[idx].iter().any(|t| t.id() == instance.id()),
            "{} pool: instance #{} released twice",
            self.name,
            instance.id()
        );
        instance.recycle();
        self.free[idx].push(instance);
    }

    /// Instances ever constructed for `kind`
    pub fn constructed(&self, kind: T::Kind) -> usize {
        self.constructed[kind.index()]
    }

    /// Instances currently idle for `kind`
    pub fn idle(&self, kind: T::Kind) -> usize {
        self.free[kind.index()].len()
    }

    /// Instances handed out and not yet returned
    pub fn live(&self) -> usize {
        let constructed: usize = self.constructed.iter().sum();
        let idle: usize = self.free.iter().map(Vec::len).sum();
        constructed - idle
    }
}

/// The tile and obstacle pools the track generator draws from
#[derive(Debug)]
pub struct ResourcePool {
    pub tiles: Pool<Tile>,
    pub obstacles: Pool<Obstacle>,
}

impl ResourcePool {
    pub fn new(catalog: &Catalog) -> Result<Self, PoolError> {
        Ok(Self {
            tiles: Pool::new("tile", catalog.tiles.iter().cloned())?,
            obstacles: Pool::new("obstacle", catalog.obstacles.iter().cloned())?,
        })
    }
}
