//! Projectiles in flight towards a fixed aim point.

use glam::Vec2;
use seedpath_core::{EnemyId, TowerId};

/// Distance a projectile covers per tick.
pub(crate) const PROJECTILE_SPEED: f32 = 8.0;

/// Collision radius of every projectile.
pub(crate) const PROJECTILE_RADIUS: f32 = 5.0;

/// A projectile never re-aims; its velocity is fixed at launch.
#[derive(Clone, Debug)]
pub(crate) struct Projectile {
    pub(crate) tower: TowerId,
    pub(crate) target: EnemyId,
    pub(crate) position: Vec2,
    velocity: Vec2,
    pub(crate) damage: f32,
    hit: bool,
}

impl Projectile {
    pub(crate) fn launch(
        tower: TowerId,
        origin: Vec2,
        target: EnemyId,
        aim: Vec2,
        damage: f32,
    ) -> Self {
        Self {
            tower,
            target,
            position: origin,
            velocity: (aim - origin).normalize_or_zero() * PROJECTILE_SPEED,
            damage,
            hit: false,
        }
    }

    pub(crate) fn advance(&mut self) {
        self.position += self.velocity;
    }

    /// Circle overlap test against an enemy centre and radius.
    pub(crate) fn collides(&self, centre: Vec2, radius: f32) -> bool {
        !self.hit && self.position.distance(centre) < radius + PROJECTILE_RADIUS
    }

    /// Latches the hit so damage is applied once.
    pub(crate) fn mark_hit(&mut self) {
        self.hit = true;
    }
}
